use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{
    AmountRequest, ApiError, Envelope, ErrorResponse, ProfileUpdate, TransactionSummary,
    UserAmountRequest, WalletUser,
};
use crate::utils::rate_limit_wallet_api;

/// Payload of a mutation; the server may or may not echo a `data` object back
pub type MutationResponse = Envelope<Option<serde_json::Value>>;

/// Wallet API client bound to one user's access token
#[derive(Clone)]
pub struct WalletClient {
    http_client: HttpClient,
    access_token: String,
    base_url: String,
}

impl WalletClient {
    /// Create a new client for `base_url` authenticating as `access_token`
    pub fn new(base_url: &str, access_token: String) -> Self {
        Self::with_http_client(HttpClient::new(), base_url, access_token)
    }

    /// Reuse a shared connection pool
    pub fn with_http_client(http_client: HttpClient, base_url: &str, access_token: String) -> Self {
        Self {
            http_client,
            access_token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn create_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", self.access_token))
            .map_err(|e| ApiError::RequestError(format!("Failed to create auth header: {}", e)))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-2xx response to an error, keeping the server's `message` verbatim.
    /// Bodies without a JSON `message` (proxy pages, plain text) carry no message.
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();

        let message = match serde_json::from_str::<ErrorResponse>(&body_text) {
            Ok(ErrorResponse { message: Some(m), .. }) => m,
            _ => {
                debug!("Wallet API {} body without a message ({} bytes)", status_code, body_text.len());
                String::new()
            }
        };

        match status_code {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            429 => {
                warn!("Wallet API rate limited us: {}", message);
                ApiError::RateLimited(message)
            }
            500..=599 => {
                warn!("Wallet API server error {}: {}", status_code, message);
                ApiError::ServerError(status_code, message)
            }
            _ => ApiError::HttpError(status_code, message),
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        rate_limit_wallet_api().await;

        let headers = self.create_headers()?;
        let response = request
            .headers(headers)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        let status = response.status();
        debug!("Wallet API responded {} for {}", status, response.url().path());

        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }
        Ok(response)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Envelope<T>, ApiError> {
        self.send(request)
            .await?
            .json::<Envelope<T>>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }

    /// A 2xx already means the money moved; an empty or unexpected body is still a success
    async fn execute_mutation(&self, request: RequestBuilder) -> Result<MutationResponse, ApiError> {
        let body = self
            .send(request)
            .await?
            .text()
            .await
            .map_err(|e| ApiError::RequestError(format!("Failed to read response: {}", e)))?;

        if body.trim().is_empty() {
            return Ok(MutationResponse { data: None, message: None });
        }
        match serde_json::from_str::<MutationResponse>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(e) => {
                warn!("Mutation succeeded with an unreadable body: {}", e);
                Ok(MutationResponse { data: None, message: None })
            }
        }
    }

    /// POST /user/add-money
    pub async fn add_money(&self, amount: Decimal) -> Result<MutationResponse, ApiError> {
        let request = self.http_client
            .post(self.url("/user/add-money"))
            .json(&AmountRequest { amount });
        self.execute_mutation(request).await
    }

    /// POST /user/withdraw
    pub async fn withdraw(&self, amount: Decimal) -> Result<MutationResponse, ApiError> {
        let request = self.http_client
            .post(self.url("/user/withdraw"))
            .json(&AmountRequest { amount });
        self.execute_mutation(request).await
    }

    /// POST /user/send
    pub async fn send_money(&self, user_id: &str, amount: Decimal) -> Result<MutationResponse, ApiError> {
        let body = UserAmountRequest {
            user_id: Some(user_id.to_string()),
            amount,
        };
        let request = self.http_client.post(self.url("/user/send")).json(&body);
        self.execute_mutation(request).await
    }

    /// GET /me/transaction-summary
    pub async fn transaction_summary(&self) -> Result<TransactionSummary, ApiError> {
        let request = self.http_client.get(self.url("/me/transaction-summary"));
        self.execute(request).await.map(|envelope| envelope.data)
    }

    /// GET /user/all-users
    pub async fn all_users(&self) -> Result<Vec<WalletUser>, ApiError> {
        let request = self.http_client.get(self.url("/user/all-users"));
        self.execute(request).await.map(|envelope| envelope.data)
    }

    /// GET /user/me
    pub async fn user_info(&self) -> Result<WalletUser, ApiError> {
        let request = self.http_client.get(self.url("/user/me"));
        self.execute(request).await.map(|envelope| envelope.data)
    }

    /// POST /agent/cash-in
    ///
    /// Without `user_id` the agent tops up the wallet the API associates with the session.
    pub async fn cash_in(&self, user_id: Option<&str>, amount: Decimal) -> Result<MutationResponse, ApiError> {
        let body = UserAmountRequest {
            user_id: user_id.map(str::to_string),
            amount,
        };
        let request = self.http_client.post(self.url("/agent/cash-in")).json(&body);
        self.execute_mutation(request).await
    }

    /// POST /agent/cash-out
    pub async fn cash_out(&self, user_id: &str, amount: Decimal) -> Result<MutationResponse, ApiError> {
        let body = UserAmountRequest {
            user_id: Some(user_id.to_string()),
            amount,
        };
        let request = self.http_client.post(self.url("/agent/cash-out")).json(&body);
        self.execute_mutation(request).await
    }

    /// PATCH /user/:id
    pub async fn update_user(&self, user_id: &str, payload: &ProfileUpdate) -> Result<MutationResponse, ApiError> {
        let request = self.http_client
            .patch(self.url(&format!("/user/{}", user_id)))
            .json(payload);
        self.execute_mutation(request).await
    }

    /// POST /auth/logout
    pub async fn logout(&self) -> Result<MutationResponse, ApiError> {
        let request = self.http_client.post(self.url("/auth/logout"));
        self.execute_mutation(request).await
    }
}
