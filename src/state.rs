use std::sync::Arc;
use std::time::Instant;

use serenity::prelude::{Context, TypeMapKey};
use tracing::warn;

use crate::config::BotConfig;
use crate::services::cache_service::QueryCache;
use crate::services::directory_service::SearchHistory;
use crate::services::form_service::FormStore;
use crate::services::session_service::SessionStore;
use crate::utils::encryption::{CryptoError, TokenCipher};

/// Everything the command handlers share
pub struct AppState {
    pub config: BotConfig,
    pub sessions: SessionStore,
    pub cache: QueryCache,
    pub forms: FormStore,
    pub searches: SearchHistory,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: BotConfig) -> Result<Self, CryptoError> {
        let cipher = match config.encryption_key.as_deref() {
            Some(key) => TokenCipher::from_hex(key)?,
            None => {
                warn!("TOKEN_ENCRYPTION_KEY not set, using a random key; links will not survive a restart");
                TokenCipher::ephemeral()
            }
        };

        Ok(Self {
            sessions: SessionStore::new(cipher, &config.api_base_url),
            cache: QueryCache::new(config.cache_ttl),
            forms: FormStore::new(),
            searches: SearchHistory::new(),
            started_at: Instant::now(),
            config,
        })
    }
}

pub struct AppStateKey;

impl TypeMapKey for AppStateKey {
    type Value = Arc<AppState>;
}

pub async fn app_state(ctx: &Context) -> Result<Arc<AppState>, String> {
    let data = ctx.data.read().await;
    data.get::<AppStateKey>()
        .cloned()
        .ok_or("Bot state not initialized".to_string())
}
