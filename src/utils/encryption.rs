use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::Aes256Gcm;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use thiserror::Error;

type Nonce = [u8; 12];

const FORMAT_VERSION: u8 = 0x01;
const HEADER_LEN: usize = 1 + 12;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Encryption failed: {0}")]
    Encryption(String),
    #[error("Decryption failed: {0}")]
    Decryption(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Base64 decode error: {0}")]
    Base64Decode(String),
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(String),
}

/// AES-256-GCM sealing for wallet access tokens held by the session store.
/// Sealed form is base64 of `[version][nonce(12)][ciphertext]`.
#[derive(Clone)]
pub struct TokenCipher {
    key: [u8; 32],
}

impl TokenCipher {
    /// Build from a 64-character hex key (TOKEN_ENCRYPTION_KEY)
    pub fn from_hex(key_hex: &str) -> Result<Self, CryptoError> {
        let key_bytes = hex::decode(key_hex.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("not valid hex: {}", e)))?;

        let key: [u8; 32] = key_bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKey("Encryption key must be 32 bytes (256 bits)".to_string()))?;

        Ok(Self { key })
    }

    /// Fresh random key, used when no key is configured
    pub fn ephemeral() -> Self {
        let mut key = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut key);
        Self { key }
    }

    pub fn seal(&self, token: &str) -> Result<String, CryptoError> {
        let cipher = Aes256Gcm::new(&self.key.into());

        let mut nonce_bytes: Nonce = [0u8; 12];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = cipher
            .encrypt((&nonce_bytes).into(), token.as_bytes())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let mut sealed = Vec::with_capacity(HEADER_LEN + ciphertext.len());
        sealed.push(FORMAT_VERSION);
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(sealed))
    }

    pub fn open(&self, sealed_b64: &str) -> Result<String, CryptoError> {
        let sealed = BASE64
            .decode(sealed_b64)
            .map_err(|e| CryptoError::Base64Decode(e.to_string()))?;

        if sealed.len() < HEADER_LEN {
            return Err(CryptoError::InvalidData(
                "Sealed token too short (need version + nonce)".to_string(),
            ));
        }

        if sealed[0] != FORMAT_VERSION {
            return Err(CryptoError::InvalidData(format!(
                "Unsupported token format version: {}",
                sealed[0]
            )));
        }

        let nonce: Nonce = sealed[1..HEADER_LEN]
            .try_into()
            .map_err(|_| CryptoError::InvalidData("Failed to extract nonce".to_string()))?;

        let cipher = Aes256Gcm::new(&self.key.into());
        let plaintext = cipher
            .decrypt((&nonce).into(), &sealed[HEADER_LEN..])
            .map_err(|e| CryptoError::Decryption(e.to_string()))?;

        String::from_utf8(plaintext).map_err(|e| CryptoError::Utf8Error(e.to_string()))
    }
}
