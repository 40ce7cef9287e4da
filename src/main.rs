use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod services;
mod state;
mod utils;

use config::BotConfig;
use state::{AppState, AppStateKey};

struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        commands::handle_message(&ctx, &msg).await;
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        debug!("Checking Discord rate limit status...");
        match ctx.http.get_current_user().await {
            Ok(_) => info!("No rate limit detected - Bot is fully ready!"),
            Err(e) => {
                let error_msg = e.to_string();
                if error_msg.contains("429") || error_msg.contains("rate limit") || error_msg.contains("Ratelimited") {
                    warn!("Bot is being rate limited by Discord! Error: {}", error_msg);
                } else {
                    warn!("Failed to check rate limit status: {}", error_msg);
                }
            }
        }
    }
}

fn init_tracing() {
    let mut filter = EnvFilter::from_default_env();
    for directive in ["pocketwallet_bot=debug", "serenity=warn"] {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    info!("👛 Starting Pocket Wallet bot...");
    info!("  ____            _        _    __        __    _ _      _   ");
    info!(" |  _ \\ ___   ___| | _____| |_  \\ \\      / /_ _| | | ___| |_ ");
    info!(" | |_) / _ \\ / __| |/ / _ \\ __|  \\ \\ /\\ / / _` | | |/ _ \\ __|");
    info!(" |  __/ (_) | (__|   <  __/ |_    \\ V  V / (_| | | |  __/ |_ ");
    info!(" |_|   \\___/ \\___|_|\\_\\___|\\__|    \\_/\\_/ \\__,_|_|_|\\___|\\__|");
    info!("  Pocket Wallet v{} - Digital wallet in your DMs", env!("CARGO_PKG_VERSION"));
    info!("");

    let config = match BotConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    info!("Wallet API: {}", config.api_base_url);

    utils::configure_wallet_api_limit(config.api_rate_limit);

    let token = config.discord_token.clone();
    let state = match AppState::new(config) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to set up token encryption: {}", e);
            return;
        }
    };

    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGES;

    let mut client = match Client::builder(&token, intents).event_handler(Handler).await {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create client: {}", e);
            return;
        }
    };

    {
        let mut data = client.data.write().await;
        data.insert::<AppStateKey>(Arc::new(state));
    }

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }
}
