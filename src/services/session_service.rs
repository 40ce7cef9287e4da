use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::api::wallet::WalletClient;
use crate::utils::encryption::{CryptoError, TokenCipher};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("You have not linked a wallet yet. DM me `$link <access token>` first.")]
    NotLinked,
    #[error("Access token must not be empty")]
    EmptyToken,
    #[error("Stored session could not be read, please `$link` again ({0})")]
    Crypto(#[from] CryptoError),
}

/// Linked wallet access tokens per chat user, sealed while stored
pub struct SessionStore {
    cipher: TokenCipher,
    sealed_tokens: RwLock<HashMap<u64, String>>,
    http_client: reqwest::Client,
    api_base_url: String,
}

impl SessionStore {
    pub fn new(cipher: TokenCipher, api_base_url: &str) -> Self {
        Self {
            cipher,
            sealed_tokens: RwLock::new(HashMap::new()),
            http_client: reqwest::Client::new(),
            api_base_url: api_base_url.to_string(),
        }
    }

    /// Store (or replace) the token for a user; returns true when one was replaced
    pub async fn link(&self, user_id: u64, access_token: &str) -> Result<bool, SessionError> {
        let token = access_token.trim();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        let sealed = self.cipher.seal(token)?;
        Ok(self.sealed_tokens.write().await.insert(user_id, sealed).is_some())
    }

    pub async fn unlink(&self, user_id: u64) -> bool {
        self.sealed_tokens.write().await.remove(&user_id).is_some()
    }

    pub async fn is_linked(&self, user_id: u64) -> bool {
        self.sealed_tokens.read().await.contains_key(&user_id)
    }

    /// API client authenticated as the given chat user
    pub async fn client_for(&self, user_id: u64) -> Result<WalletClient, SessionError> {
        let sealed = self
            .sealed_tokens
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or(SessionError::NotLinked)?;

        let token = self.cipher.open(&sealed)?;
        Ok(WalletClient::with_http_client(
            self.http_client.clone(),
            &self.api_base_url,
            token,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(TokenCipher::ephemeral(), "http://localhost:5000/api/v1")
    }

    #[tokio::test]
    async fn test_link_and_build_client() {
        let sessions = store();
        assert!(matches!(sessions.client_for(1).await, Err(SessionError::NotLinked)));

        assert!(!sessions.link(1, "  token-a  ").await.unwrap());
        assert!(sessions.link(1, "token-b").await.unwrap());
        assert!(sessions.is_linked(1).await);
        assert!(sessions.client_for(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_tokens_are_not_stored_in_clear() {
        let sessions = store();
        sessions.link(3, "plain-token").await.unwrap();
        let stored = sessions.sealed_tokens.read().await.get(&3).cloned().unwrap();
        assert!(!stored.contains("plain-token"));
    }

    #[tokio::test]
    async fn test_empty_token_and_unlink() {
        let sessions = store();
        assert!(matches!(sessions.link(2, "   ").await, Err(SessionError::EmptyToken)));
        sessions.link(2, "t").await.unwrap();
        assert!(sessions.unlink(2).await);
        assert!(!sessions.unlink(2).await);
        assert!(!sessions.is_linked(2).await);
    }
}
