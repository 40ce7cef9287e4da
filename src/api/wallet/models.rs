use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every successful API response wraps its payload under `data`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

/// A single ledger entry as returned by the summary endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub amount: Decimal,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Pre-summarized count + amount + list for one transaction category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionAggregate {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Response from GET /me/transaction-summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    #[serde(default)]
    pub send: TransactionAggregate,
    #[serde(default)]
    pub withdraw: TransactionAggregate,
    #[serde(default)]
    pub cash_in: TransactionAggregate,
}

/// Entry of the recipient directory and the profile payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletUser {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for POST /user/add-money and POST /user/withdraw
#[derive(Debug, Clone, Serialize)]
pub struct AmountRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Request body for POST /user/send, /agent/cash-in and /agent/cash-out
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAmountRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Request body for PATCH /user/:id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// Error body returned by the API on failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// Coarse classification of an API failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    RateLimited,
    Server,
    Http,
    Network,
    Decode,
}

/// Comprehensive error type for wallet API operations
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 400 Bad Request
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// 401 Unauthorized
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// 403 Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// 404 Not Found
    #[error("Not Found: {0}")]
    NotFound(String),
    /// 429 Too Many Requests
    #[error("Rate Limited: {0}")]
    RateLimited(String),
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Other HTTP errors
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    /// Deserialization error
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::BadRequest(_) => ApiErrorKind::BadRequest,
            ApiError::Unauthorized(_) => ApiErrorKind::Unauthorized,
            ApiError::Forbidden(_) => ApiErrorKind::Forbidden,
            ApiError::NotFound(_) => ApiErrorKind::NotFound,
            ApiError::RateLimited(_) => ApiErrorKind::RateLimited,
            ApiError::ServerError(..) => ApiErrorKind::Server,
            ApiError::HttpError(..) => ApiErrorKind::Http,
            ApiError::RequestError(_) => ApiErrorKind::Network,
            ApiError::DeserializationError(_) => ApiErrorKind::Decode,
        }
    }

    /// Human-readable message as sent by the server, if the server sent one.
    /// Transport and decode failures never carry a server message.
    pub fn server_message(&self) -> Option<&str> {
        let msg = match self {
            ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::Forbidden(m)
            | ApiError::NotFound(m)
            | ApiError::RateLimited(m)
            | ApiError::ServerError(_, m)
            | ApiError::HttpError(_, m) => m.as_str(),
            ApiError::RequestError(_) | ApiError::DeserializationError(_) => return None,
        };

        let trimmed = msg.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Message to show the user: the server's text verbatim, otherwise `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }
}
