//! Wallet API calls on behalf of a linked chat user.
//!
//! Reads go through the query cache; mutations invalidate the tags they
//! affect and the summary is re-fetched explicitly after a successful one.

use std::future::Future;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::api::wallet::{
    ApiError, ApiErrorKind, MutationResponse, ProfileUpdate, TransactionSummary, WalletClient,
    WalletUser,
};
use crate::services::cache_service::{Cacheable, TAG_DEPOSIT, TAG_USER};
use crate::services::form_service::{FormError, FormKind, TransferForm, TransferRequest};
use crate::state::AppState;

/// What `$confirm` reports back
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub kind: FormKind,
    pub succeeded: bool,
    pub message: String,
    /// None when the draft was replaced while the call was in flight
    pub form: Option<TransferForm>,
    pub refreshed_summary: Option<TransactionSummary>,
}

fn describe_load_error(what: &str, error: &ApiError) -> String {
    let status = error.to_string();
    let detail = error.user_message(status.trim_end_matches(|c: char| c == ':' || c == ' '));
    if error.kind() == ApiErrorKind::Unauthorized {
        format!(
            "Failed to load {}: {}. Your access token may have expired, `$link` a fresh one.",
            what, detail
        )
    } else {
        format!("Failed to load {}: {}", what, detail)
    }
}

async fn client(state: &AppState, user_id: u64) -> Result<WalletClient, String> {
    state.sessions.client_for(user_id).await.map_err(|e| e.to_string())
}

async fn cached<T, F, Fut>(
    state: &AppState,
    user_id: u64,
    refresh: bool,
    what: &str,
    fetch: F,
) -> Result<T, String>
where
    T: Cacheable,
    F: FnOnce(WalletClient) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    if !refresh {
        if let Some(hit) = state.cache.get::<T>(user_id).await {
            debug!("Cache hit for {:?} (user {})", T::QUERY, user_id);
            return Ok(hit);
        }
    }

    let client = client(state, user_id).await?;
    let value = fetch(client)
        .await
        .map_err(|e| describe_load_error(what, &e))?;
    state.cache.insert(user_id, value.clone()).await;
    Ok(value)
}

pub async fn load_summary(state: &AppState, user_id: u64, refresh: bool) -> Result<TransactionSummary, String> {
    cached(state, user_id, refresh, "transaction summary", |client| async move {
        client.transaction_summary().await
    })
    .await
}

pub async fn load_users(state: &AppState, user_id: u64, refresh: bool) -> Result<Vec<WalletUser>, String> {
    cached(state, user_id, refresh, "users", |client| async move {
        client.all_users().await
    })
    .await
}

pub async fn load_profile(state: &AppState, user_id: u64, refresh: bool) -> Result<WalletUser, String> {
    cached(state, user_id, refresh, "profile", |client| async move {
        client.user_info().await
    })
    .await
}

/// Summary used for the client-side checks of `kind`, if it needs one.
/// A summary that cannot be loaded never blocks anything.
pub async fn advisory_summary(state: &AppState, user_id: u64, kind: FormKind) -> Option<TransactionSummary> {
    if !kind.spends_own_balance() {
        return None;
    }
    match load_summary(state, user_id, false).await {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!("Checking {} for user {} without a summary: {}", kind.title(), user_id, e);
            None
        }
    }
}

fn require_recipient(request: &TransferRequest) -> Result<&str, ApiError> {
    request
        .recipient_id
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Please select a recipient".to_string()))
}

async fn execute_request(client: &WalletClient, request: &TransferRequest) -> Result<MutationResponse, ApiError> {
    match request.kind {
        FormKind::Send => client.send_money(require_recipient(request)?, request.amount).await,
        FormKind::Withdraw => client.withdraw(request.amount).await,
        FormKind::Deposit => client.add_money(request.amount).await,
        FormKind::AgentCashIn => client.cash_in(request.recipient_id.as_deref(), request.amount).await,
        FormKind::AgentCashOut => client.cash_out(require_recipient(request)?, request.amount).await,
    }
}

/// Confirm the user's current draft: client-side gate, one API call, then
/// record the outcome on the draft. Gate failures return Err with nothing sent.
pub async fn confirm_current(
    state: &AppState,
    user_id: u64,
    now: DateTime<Utc>,
) -> Result<SubmissionOutcome, String> {
    let kind = state
        .forms
        .current_kind(user_id)
        .await
        .ok_or_else(|| FormError::NoDraft.to_string())?;
    let client = client(state, user_id).await?;

    let summary = advisory_summary(state, user_id, kind).await;

    let (request, _) = state
        .forms
        .update_current(user_id, |form| form.begin_submit(summary.as_ref(), now))
        .await
        .map_err(|e| e.to_string())?;

    info!(
        "User {} submitting {} of {} (form {})",
        user_id,
        request.kind.title(),
        request.amount,
        request.form_id
    );

    let (succeeded, message) = match execute_request(&client, &request).await {
        Ok(response) => {
            let evicted = state.cache.invalidate(TAG_DEPOSIT).await;
            debug!("{} succeeded, {} cached summaries evicted", request.kind.title(), evicted);
            let message = response
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| request.kind.success_message().to_string());
            (true, message)
        }
        Err(e) => {
            warn!("{} failed for user {}: {}", request.kind.title(), user_id, e);
            (false, e.user_message(request.kind.failure_fallback()))
        }
    };

    let outcome = if succeeded { Ok(message.clone()) } else { Err(message.clone()) };
    let form = state.forms.finish(user_id, &request, outcome).await;

    let refreshed_summary = if succeeded {
        load_summary(state, user_id, true)
            .await
            .map_err(|e| warn!("Post-submit refresh failed for user {}: {}", user_id, e))
            .ok()
    } else {
        None
    };

    Ok(SubmissionOutcome {
        kind: request.kind,
        succeeded,
        message,
        form,
        refreshed_summary,
    })
}

/// PATCH the caller's profile and return the refreshed copy
pub async fn update_profile(state: &AppState, user_id: u64, update: &ProfileUpdate) -> Result<WalletUser, String> {
    if update.is_empty() {
        return Err("Nothing to update. Use `name=`, `email=` or `phone=`.".to_string());
    }

    let profile = load_profile(state, user_id, false).await?;
    let client = client(state, user_id).await?;
    client
        .update_user(&profile.id, update)
        .await
        .map_err(|e| e.user_message("Failed to update profile"))?;

    state.cache.invalidate(TAG_USER).await;
    load_profile(state, user_id, true).await
}

async fn forget_local(state: &AppState, user_id: u64) {
    let evicted = state.cache.invalidate_scope(user_id).await;
    state.forms.clear_user(user_id).await;
    state.searches.forget(user_id).await;
    debug!("Forgot local data of user {} ({} cached responses)", user_id, evicted);
}

/// Link `access_token` to the chat user and load the profile it belongs to.
/// Data cached for a previously linked account is dropped first; a token the
/// API rejects is not kept. Returns the profile and whether a link was replaced.
pub async fn link(state: &AppState, user_id: u64, access_token: &str) -> Result<(WalletUser, bool), String> {
    let replaced = state
        .sessions
        .link(user_id, access_token)
        .await
        .map_err(|e| e.to_string())?;
    if replaced {
        forget_local(state, user_id).await;
    }

    match load_profile(state, user_id, true).await {
        Ok(profile) => Ok((profile, replaced)),
        Err(e) => {
            state.sessions.unlink(user_id).await;
            Err(e)
        }
    }
}

/// Drop everything held for a user locally
pub async fn unlink(state: &AppState, user_id: u64) -> bool {
    forget_local(state, user_id).await;
    state.sessions.unlink(user_id).await
}

/// End the remote session (best effort) and unlink
pub async fn logout(state: &AppState, user_id: u64) -> Result<(), String> {
    let client = client(state, user_id).await?;
    if let Err(e) = client.logout().await {
        warn!("Remote logout failed for user {}: {}", user_id, e);
    }
    state.cache.invalidate(TAG_USER).await;
    unlink(state, user_id).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BotConfig;
    use crate::services::cache_service::{QueryKey, QueryName};
    use crate::services::form_service::{FormState, Recipient};
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USER: u64 = 1001;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    async fn linked_state(server: &MockServer) -> AppState {
        let config = BotConfig {
            discord_token: "unused".to_string(),
            api_base_url: server.uri(),
            encryption_key: None,
            cache_ttl: Duration::from_secs(60),
            api_rate_limit: 20,
        };
        let state = AppState::new(config).unwrap();
        state.sessions.link(USER, "token-1").await.unwrap();
        state
    }

    fn summary_body(cash_in: i64, send: i64) -> serde_json::Value {
        json!({
            "data": {
                "cashIn": { "count": 1, "amount": cash_in, "transactions": [] },
                "send": { "count": 1, "amount": send, "transactions": [] },
                "withdraw": { "count": 0, "amount": 0, "transactions": [] }
            }
        })
    }

    fn bob() -> Recipient {
        Recipient {
            id: "u-bob".to_string(),
            name: "Bob".to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_summary_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/transaction-summary"))
            .and(header("Authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary_body(900, 100)))
            .expect(1)
            .mount(&server)
            .await;

        let state = linked_state(&server).await;
        let first = load_summary(&state, USER, false).await.unwrap();
        let second = load_summary(&state, USER, false).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.cash_in.amount, Decimal::from(900));
    }

    #[tokio::test]
    async fn test_successful_send_invalidates_and_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/transaction-summary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary_body(5000, 0)))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/user/send"))
            .and(body_json(json!({ "userId": "u-bob", "amount": 1000.0 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
            .expect(1)
            .mount(&server)
            .await;

        let state = linked_state(&server).await;
        state.forms.start(USER, FormKind::Send).await;
        state
            .forms
            .update_current(USER, |form| {
                form.set_amount(Decimal::from(1000))?;
                form.select_recipient(bob())
            })
            .await
            .unwrap();

        let outcome = confirm_current(&state, USER, now()).await.unwrap();
        assert!(outcome.succeeded);
        assert_eq!(outcome.message, "Money sent successfully!");
        assert!(outcome.refreshed_summary.is_some());
        assert!(matches!(outcome.form.unwrap().state(), FormState::Success { .. }));
    }

    #[tokio::test]
    async fn test_failed_send_keeps_the_draft() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/transaction-summary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary_body(5000, 0)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/user/send"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "success": false, "message": "Receiver wallet is blocked" })),
            )
            .mount(&server)
            .await;

        let state = linked_state(&server).await;
        state.forms.start(USER, FormKind::Send).await;
        state
            .forms
            .update_current(USER, |form| {
                form.set_amount(Decimal::from(250))?;
                form.select_recipient(bob())
            })
            .await
            .unwrap();

        let outcome = confirm_current(&state, USER, now()).await.unwrap();
        assert!(!outcome.succeeded);
        assert_eq!(outcome.message, "Receiver wallet is blocked");

        let form = outcome.form.unwrap();
        assert_eq!(form.amount(), Some(Decimal::from(250)));
        assert_eq!(form.recipient(), Some(&bob()));
        assert!(matches!(form.state(), FormState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_insufficient_balance_blocks_without_calling_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/transaction-summary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary_body(300, 0)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/user/send"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
            .expect(0)
            .mount(&server)
            .await;

        let state = linked_state(&server).await;
        state.forms.start(USER, FormKind::Send).await;
        state
            .forms
            .update_current(USER, |form| {
                form.set_amount(Decimal::from(500))?;
                form.select_recipient(bob())
            })
            .await
            .unwrap();

        let error = confirm_current(&state, USER, now()).await.unwrap_err();
        assert!(error.contains("Insufficient"));
        let form = state.forms.get(USER, FormKind::Send).await.unwrap();
        assert!(!matches!(form.state(), FormState::Submitting));
    }

    #[tokio::test]
    async fn test_deposit_skips_summary_and_accepts_empty_success() {
        let server = MockServer::start().await;
        // only the post-success refresh reads the summary
        Mock::given(method("GET"))
            .and(path("/me/transaction-summary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary_body(1500, 0)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/user/add-money"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let state = linked_state(&server).await;
        assert!(advisory_summary(&state, USER, FormKind::Deposit).await.is_none());

        state.forms.start(USER, FormKind::Deposit).await;
        state
            .forms
            .update_current(USER, |form| form.set_amount(Decimal::from(500)))
            .await
            .unwrap();

        let outcome = confirm_current(&state, USER, now()).await.unwrap();
        assert!(outcome.succeeded);
        assert_eq!(outcome.message, "Deposit successful!");
        assert!(matches!(outcome.form.unwrap().state(), FormState::Success { .. }));
    }

    #[tokio::test]
    async fn test_relinking_drops_the_previous_accounts_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/transaction-summary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary_body(900, 0)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/me"))
            .and(header("Authorization", "Bearer token-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "_id": "w-2", "name": "Karim", "email": "karim@example.com" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = linked_state(&server).await;
        load_summary(&state, USER, false).await.unwrap();
        state.forms.start(USER, FormKind::Send).await;
        let summary_key = QueryKey::new(USER, QueryName::TransactionSummary);
        assert!(state.cache.contains(summary_key).await);

        let (profile, replaced) = link(&state, USER, "token-2").await.unwrap();
        assert!(replaced);
        assert_eq!(profile.id, "w-2");
        assert!(!state.cache.contains(summary_key).await);
        assert!(state.forms.current_kind(USER).await.is_none());
    }

    #[tokio::test]
    async fn test_rejected_token_is_not_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt malformed" })))
            .mount(&server)
            .await;

        let state = linked_state(&server).await;
        let error = link(&state, USER, "bad-token").await.unwrap_err();
        assert!(error.contains("jwt malformed"));
        assert!(!state.sessions.is_linked(USER).await);
    }

    #[tokio::test]
    async fn test_unlinked_user_is_rejected() {
        let server = MockServer::start().await;
        let state = linked_state(&server).await;
        state.forms.start(2002, FormKind::Deposit).await;
        let error = confirm_current(&state, 2002, now()).await.unwrap_err();
        assert!(error.contains("link"));
    }
}
