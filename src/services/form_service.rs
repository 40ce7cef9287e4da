//! Transfer drafts
//!
//! Each chat user has at most one draft per form kind. A draft moves
//! `Idle -> Validating -> Submitting -> Success | Failed`; a failed draft keeps
//! every field so it can be corrected and confirmed again, a successful one is
//! closed until the user starts a new draft.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::wallet::{TransactionAggregate, TransactionSummary, WalletUser};
use crate::services::eligibility_service::{
    self, Eligibility, EligibilityError, EligibilityInput, TransferLimits, TransferMethod,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Send,
    Withdraw,
    Deposit,
    AgentCashIn,
    AgentCashOut,
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::Send => "Send Money",
            FormKind::Withdraw => "Withdraw",
            FormKind::Deposit => "Deposit",
            FormKind::AgentCashIn => "Add Money",
            FormKind::AgentCashOut => "Cash Out",
        }
    }

    pub fn limits(&self) -> &'static TransferLimits {
        match self {
            FormKind::Send => &eligibility_service::SEND_LIMITS,
            FormKind::Withdraw => &eligibility_service::WITHDRAW_LIMITS,
            FormKind::Deposit => &eligibility_service::DEPOSIT_LIMITS,
            FormKind::AgentCashIn => &eligibility_service::AGENT_CASH_IN_LIMITS,
            FormKind::AgentCashOut => &eligibility_service::AGENT_CASH_OUT_LIMITS,
        }
    }

    pub fn quick_amounts(&self) -> &'static [i64] {
        match self {
            FormKind::Send => &eligibility_service::SEND_QUICK_AMOUNTS,
            FormKind::Withdraw | FormKind::AgentCashOut => &eligibility_service::WITHDRAW_QUICK_AMOUNTS,
            FormKind::Deposit | FormKind::AgentCashIn => &[],
        }
    }

    pub fn needs_recipient(&self) -> bool {
        matches!(self, FormKind::Send | FormKind::AgentCashOut)
    }

    /// Cash-in may optionally name the customer
    pub fn accepts_recipient(&self) -> bool {
        self.needs_recipient() || *self == FormKind::AgentCashIn
    }

    pub fn needs_method(&self) -> bool {
        matches!(self, FormKind::Withdraw | FormKind::AgentCashOut)
    }

    /// Whether the amount leaves the caller's own wallet
    pub fn spends_own_balance(&self) -> bool {
        matches!(self, FormKind::Send | FormKind::Withdraw)
    }

    /// Category of the caller's summary the daily/monthly windows are counted on
    pub fn history<'a>(&self, summary: &'a TransactionSummary) -> Option<&'a TransactionAggregate> {
        match self {
            FormKind::Send => Some(&summary.send),
            FormKind::Withdraw => Some(&summary.withdraw),
            FormKind::Deposit => Some(&summary.cash_in),
            FormKind::AgentCashIn | FormKind::AgentCashOut => None,
        }
    }

    pub fn failure_fallback(&self) -> &'static str {
        match self {
            FormKind::Send => "Failed to send money",
            FormKind::Withdraw | FormKind::AgentCashOut => "Failed to process withdrawal",
            FormKind::Deposit => "Failed to deposit",
            FormKind::AgentCashIn => "Failed to add money",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            FormKind::Send => "Money sent successfully!",
            FormKind::Withdraw | FormKind::AgentCashOut => "Withdrawal successful!",
            FormKind::Deposit => "Deposit successful!",
            FormKind::AgentCashIn => "Money added successfully!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
}

impl From<&WalletUser> for Recipient {
    fn from(user: &WalletUser) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Validating,
    Submitting,
    Success { message: String },
    /// Editable and resubmittable, like Idle, with the server's error attached
    Failed { message: String },
}

/// Built on confirm, dropped once the API call resolves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub form_id: Uuid,
    pub kind: FormKind,
    pub recipient_id: Option<String>,
    pub amount: Decimal,
    pub method: Option<String>,
    pub account_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("No draft in progress. Start one with `$send`, `$withdraw`, `$deposit`, `$cashin` or `$cashout`.")]
    NoDraft,
    #[error("This {0} is already completed. Start a new one to continue.")]
    Completed(&'static str),
    #[error("A submission is already in progress for this {0}")]
    AlreadySubmitting(&'static str),
    #[error("Please enter an amount")]
    MissingAmount,
    #[error("Please select a recipient")]
    MissingRecipient,
    #[error("Please select a withdrawal method")]
    MissingMethod,
    #[error("{0} requires an account number")]
    MissingAccountNumber(&'static str),
    #[error("Unknown method '{0}'. Choose one of: bank, mobile, agent")]
    UnknownMethod(String),
    #[error("{0} does not take that field")]
    NotApplicable(&'static str),
    #[error("Amount must be a positive number")]
    InvalidAmount,
    #[error("{0}")]
    Ineligible(#[from] EligibilityError),
}

#[derive(Debug, Clone)]
pub struct TransferForm {
    pub id: Uuid,
    pub kind: FormKind,
    recipient: Option<Recipient>,
    amount: Option<Decimal>,
    method: Option<&'static TransferMethod>,
    account_number: Option<String>,
    state: FormState,
}

impl TransferForm {
    pub fn new(kind: FormKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            recipient: None,
            amount: None,
            method: None,
            account_number: None,
            state: FormState::Idle,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn amount(&self) -> Option<Decimal> {
        self.amount
    }

    pub fn recipient(&self) -> Option<&Recipient> {
        self.recipient.as_ref()
    }

    pub fn method(&self) -> Option<&'static TransferMethod> {
        self.method
    }

    pub fn account_number(&self) -> Option<&str> {
        self.account_number.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, FormState::Success { .. })
    }

    fn ensure_editable(&self) -> Result<(), FormError> {
        match self.state {
            FormState::Submitting => Err(FormError::AlreadySubmitting(self.kind.title())),
            FormState::Success { .. } => Err(FormError::Completed(self.kind.title())),
            _ => Ok(()),
        }
    }

    fn touch(&mut self) {
        self.state = FormState::Validating;
    }

    pub fn set_amount(&mut self, amount: Decimal) -> Result<(), FormError> {
        self.ensure_editable()?;
        if amount <= Decimal::ZERO {
            return Err(FormError::InvalidAmount);
        }
        self.amount = Some(amount);
        self.touch();
        Ok(())
    }

    pub fn select_recipient(&mut self, recipient: Recipient) -> Result<(), FormError> {
        self.ensure_editable()?;
        if !self.kind.accepts_recipient() {
            return Err(FormError::NotApplicable(self.kind.title()));
        }
        self.recipient = Some(recipient);
        self.touch();
        Ok(())
    }

    pub fn select_method(&mut self, method_id: &str) -> Result<&'static TransferMethod, FormError> {
        self.ensure_editable()?;
        if !self.kind.needs_method() {
            return Err(FormError::NotApplicable(self.kind.title()));
        }
        let method = eligibility_service::find_method(method_id)
            .ok_or_else(|| FormError::UnknownMethod(method_id.to_string()))?;
        self.method = Some(method);
        self.touch();
        Ok(method)
    }

    pub fn set_account_number(&mut self, account_number: &str) -> Result<(), FormError> {
        self.ensure_editable()?;
        if !self.kind.needs_method() {
            return Err(FormError::NotApplicable(self.kind.title()));
        }
        let trimmed = account_number.trim();
        self.account_number = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self.touch();
        Ok(())
    }

    /// Preview of what the draft would do against the given summary
    pub fn evaluate(&self, summary: Option<&TransactionSummary>, now: DateTime<Utc>) -> Eligibility {
        let available_balance = self.available_balance(summary);
        let input = EligibilityInput {
            amount: self.amount,
            available_balance,
            limits: self.kind.limits(),
            history: summary.and_then(|s| self.kind.history(s)),
            method: self.method,
            quick_amounts: self.kind.quick_amounts(),
            now,
        };
        eligibility_service::evaluate(&input)
    }

    fn available_balance(&self, summary: Option<&TransactionSummary>) -> Option<Decimal> {
        if self.kind.spends_own_balance() {
            summary.map(eligibility_service::available_balance)
        } else {
            None
        }
    }

    /// Run the client-side gate and move to Submitting.
    /// Any error leaves the draft exactly as it was.
    pub fn begin_submit(
        &mut self,
        summary: Option<&TransactionSummary>,
        now: DateTime<Utc>,
    ) -> Result<TransferRequest, FormError> {
        self.ensure_editable()?;

        let amount = self.amount.ok_or(FormError::MissingAmount)?;

        if self.kind.needs_recipient() && self.recipient.is_none() {
            return Err(FormError::MissingRecipient);
        }

        if self.kind.needs_method() {
            let method = self.method.ok_or(FormError::MissingMethod)?;
            if method.requires_account_number && self.account_number.is_none() {
                return Err(FormError::MissingAccountNumber(method.name));
            }
        }

        eligibility_service::validate_submission(
            amount,
            self.available_balance(summary),
            self.kind.limits(),
            summary.and_then(|s| self.kind.history(s)),
            now,
        )?;

        self.state = FormState::Submitting;

        Ok(TransferRequest {
            form_id: self.id,
            kind: self.kind,
            recipient_id: self.recipient.as_ref().map(|r| r.id.clone()),
            amount,
            method: self.method.map(|m| m.id.to_string()),
            account_number: self
                .method
                .filter(|m| m.requires_account_number)
                .and(self.account_number.clone()),
        })
    }

    pub fn complete_success(&mut self, message: String) {
        if self.state != FormState::Submitting {
            warn!("Form {} completed while not submitting ({:?})", self.id, self.state);
        }
        self.state = FormState::Success { message };
    }

    pub fn complete_failure(&mut self, message: String) {
        if self.state != FormState::Submitting {
            warn!("Form {} failed while not submitting ({:?})", self.id, self.state);
        }
        self.state = FormState::Failed { message };
    }
}

#[derive(Default)]
struct FormRegistry {
    forms: HashMap<(u64, FormKind), TransferForm>,
    /// Draft the short commands (`$amount`, `$confirm`, ...) act on
    current: HashMap<u64, FormKind>,
}

/// All live drafts, owned by the application shell
#[derive(Default)]
pub struct FormStore {
    registry: Mutex<FormRegistry>,
}

impl FormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh draft, replacing any previous one of the same kind
    pub async fn start(&self, user_id: u64, kind: FormKind) -> TransferForm {
        let form = TransferForm::new(kind);
        let mut registry = self.registry.lock().await;
        if let Some(previous) = registry.forms.insert((user_id, kind), form.clone()) {
            debug!("Replaced {} draft {} for user {}", kind.title(), previous.id, user_id);
        }
        registry.current.insert(user_id, kind);
        form
    }

    pub async fn current_kind(&self, user_id: u64) -> Option<FormKind> {
        self.registry.lock().await.current.get(&user_id).copied()
    }

    pub async fn get(&self, user_id: u64, kind: FormKind) -> Option<TransferForm> {
        self.registry.lock().await.forms.get(&(user_id, kind)).cloned()
    }

    /// Apply `f` to the user's current draft and return a snapshot of it afterwards
    pub async fn update_current<R, F>(&self, user_id: u64, f: F) -> Result<(R, TransferForm), FormError>
    where
        F: FnOnce(&mut TransferForm) -> Result<R, FormError>,
    {
        let mut registry = self.registry.lock().await;
        let kind = *registry.current.get(&user_id).ok_or(FormError::NoDraft)?;
        let form = registry
            .forms
            .get_mut(&(user_id, kind))
            .ok_or(FormError::NoDraft)?;
        let result = f(form)?;
        Ok((result, form.clone()))
    }

    /// Record the outcome of a submission, unless the draft was replaced meanwhile
    pub async fn finish(&self, user_id: u64, request: &TransferRequest, outcome: Result<String, String>) -> Option<TransferForm> {
        let mut registry = self.registry.lock().await;
        let form = registry.forms.get_mut(&(user_id, request.kind))?;
        if form.id != request.form_id {
            debug!("Draft {} was replaced before its submission finished", request.form_id);
            return None;
        }
        match outcome {
            Ok(message) => form.complete_success(message),
            Err(message) => form.complete_failure(message),
        }
        Some(form.clone())
    }

    pub async fn cancel_current(&self, user_id: u64) -> Option<TransferForm> {
        let mut registry = self.registry.lock().await;
        let kind = registry.current.remove(&user_id)?;
        let in_flight = registry
            .forms
            .get(&(user_id, kind))
            .map(|form| form.state == FormState::Submitting)?;
        if in_flight {
            // the in-flight call still needs somewhere to land
            registry.current.insert(user_id, kind);
            return None;
        }
        registry.forms.remove(&(user_id, kind))
    }

    pub async fn clear_user(&self, user_id: u64) {
        let mut registry = self.registry.lock().await;
        registry.forms.retain(|(owner, _), _| *owner != user_id);
        registry.current.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    fn summary_with_balance(balance: i64) -> TransactionSummary {
        let mut summary = TransactionSummary::default();
        summary.cash_in.amount = Decimal::from(balance);
        summary
    }

    fn alice() -> Recipient {
        Recipient {
            id: "u-alice".to_string(),
            name: "Alice".to_string(),
            phone: Some("01700000000".to_string()),
        }
    }

    #[test]
    fn test_edits_move_idle_to_validating() {
        let mut form = TransferForm::new(FormKind::Send);
        assert_eq!(form.state(), &FormState::Idle);

        form.set_amount(Decimal::from(500)).unwrap();
        assert_eq!(form.state(), &FormState::Validating);

        form.select_recipient(alice()).unwrap();
        assert_eq!(form.recipient().unwrap().name, "Alice");
    }

    #[test]
    fn test_confirm_requires_fields() {
        let mut form = TransferForm::new(FormKind::Send);
        let summary = summary_with_balance(1000);

        assert_eq!(form.begin_submit(Some(&summary), now()), Err(FormError::MissingAmount));
        form.set_amount(Decimal::from(100)).unwrap();
        assert_eq!(form.begin_submit(Some(&summary), now()), Err(FormError::MissingRecipient));

        let mut withdraw = TransferForm::new(FormKind::Withdraw);
        withdraw.set_amount(Decimal::from(100)).unwrap();
        assert_eq!(withdraw.begin_submit(Some(&summary), now()), Err(FormError::MissingMethod));
        withdraw.select_method("bank").unwrap();
        assert_eq!(
            withdraw.begin_submit(Some(&summary), now()),
            Err(FormError::MissingAccountNumber("Bank Transfer"))
        );
        withdraw.select_method("agent").unwrap();
        let request = withdraw.begin_submit(Some(&summary), now()).unwrap();
        assert_eq!(request.method.as_deref(), Some("agent"));
        assert!(request.account_number.is_none());
    }

    #[test]
    fn test_insufficient_balance_blocks_without_state_change() {
        let mut form = TransferForm::new(FormKind::Send);
        form.set_amount(Decimal::from(2000)).unwrap();
        form.select_recipient(alice()).unwrap();

        let result = form.begin_submit(Some(&summary_with_balance(1500)), now());
        assert!(matches!(
            result,
            Err(FormError::Ineligible(EligibilityError::InsufficientBalance { .. }))
        ));
        assert_eq!(form.state(), &FormState::Validating);
    }

    #[test]
    fn test_submit_then_double_submit_is_rejected() {
        let mut form = TransferForm::new(FormKind::Send);
        form.set_amount(Decimal::from(300)).unwrap();
        form.select_recipient(alice()).unwrap();

        let request = form.begin_submit(Some(&summary_with_balance(1000)), now()).unwrap();
        assert_eq!(request.recipient_id.as_deref(), Some("u-alice"));
        assert_eq!(form.state(), &FormState::Submitting);
        assert_eq!(
            form.begin_submit(Some(&summary_with_balance(1000)), now()),
            Err(FormError::AlreadySubmitting("Send Money"))
        );
        assert_eq!(form.set_amount(Decimal::from(1)), Err(FormError::AlreadySubmitting("Send Money")));
    }

    #[test]
    fn test_failed_submission_keeps_fields_and_can_retry() {
        let mut form = TransferForm::new(FormKind::Send);
        form.set_amount(Decimal::from(300)).unwrap();
        form.select_recipient(alice()).unwrap();
        form.begin_submit(Some(&summary_with_balance(1000)), now()).unwrap();

        form.complete_failure("Receiver wallet is blocked".to_string());
        assert_eq!(
            form.state(),
            &FormState::Failed { message: "Receiver wallet is blocked".to_string() }
        );
        assert_eq!(form.amount(), Some(Decimal::from(300)));
        assert_eq!(form.recipient(), Some(&alice()));

        assert!(form.begin_submit(Some(&summary_with_balance(1000)), now()).is_ok());
    }

    #[test]
    fn test_success_is_terminal() {
        let mut form = TransferForm::new(FormKind::Deposit);
        form.set_amount(Decimal::from(50)).unwrap();
        form.begin_submit(None, now()).unwrap();
        form.complete_success("Deposit successful!".to_string());

        assert!(form.is_closed());
        assert_eq!(form.set_amount(Decimal::from(10)), Err(FormError::Completed("Deposit")));
        assert_eq!(form.begin_submit(None, now()), Err(FormError::Completed("Deposit")));
    }

    #[test]
    fn test_fields_are_checked_against_kind() {
        let mut deposit = TransferForm::new(FormKind::Deposit);
        assert_eq!(deposit.select_recipient(alice()), Err(FormError::NotApplicable("Deposit")));
        assert_eq!(deposit.select_method("bank").unwrap_err(), FormError::NotApplicable("Deposit"));
        assert_eq!(deposit.set_amount(Decimal::ZERO), Err(FormError::InvalidAmount));

        let mut cash_out = TransferForm::new(FormKind::AgentCashOut);
        assert_eq!(
            cash_out.select_method("crypto").unwrap_err(),
            FormError::UnknownMethod("crypto".to_string())
        );
    }

    #[test]
    fn test_agent_cash_out_skips_own_balance() {
        let mut form = TransferForm::new(FormKind::AgentCashOut);
        form.set_amount(Decimal::from(9000)).unwrap();
        form.select_recipient(alice()).unwrap();
        form.select_method("mobile").unwrap();
        form.set_account_number("01811111111").unwrap();

        let request = form.begin_submit(Some(&summary_with_balance(0)), now()).unwrap();
        assert_eq!(request.account_number.as_deref(), Some("01811111111"));

        let preview = form.evaluate(Some(&summary_with_balance(0)), now());
        assert!(preview.available_balance.is_none());
        assert!(!preview.insufficient);
        assert_eq!(preview.fee.unwrap().net, Decimal::from(8990));
    }

    #[tokio::test]
    async fn test_store_routes_short_commands_to_current_draft() {
        let store = FormStore::new();
        assert_eq!(
            store.update_current(1, |f| f.set_amount(Decimal::ONE)).await.unwrap_err(),
            FormError::NoDraft
        );

        store.start(1, FormKind::Withdraw).await;
        store.start(1, FormKind::Send).await;
        assert_eq!(store.current_kind(1).await, Some(FormKind::Send));

        let (_, snapshot) = store
            .update_current(1, |f| f.set_amount(Decimal::from(700)))
            .await
            .unwrap();
        assert_eq!(snapshot.kind, FormKind::Send);
        assert!(store.get(1, FormKind::Withdraw).await.unwrap().amount().is_none());
    }

    #[tokio::test]
    async fn test_finish_ignores_replaced_drafts() {
        let store = FormStore::new();
        store.start(5, FormKind::Deposit).await;
        let (request, _) = store
            .update_current(5, |f| {
                f.set_amount(Decimal::from(20))?;
                f.begin_submit(None, now())
            })
            .await
            .unwrap();

        store.start(5, FormKind::Deposit).await;
        assert!(store.finish(5, &request, Ok("done".to_string())).await.is_none());
        assert_eq!(store.get(5, FormKind::Deposit).await.unwrap().state(), &FormState::Idle);
    }

    #[tokio::test]
    async fn test_cancel_refuses_in_flight_draft() {
        let store = FormStore::new();
        store.start(9, FormKind::Deposit).await;
        store
            .update_current(9, |f| {
                f.set_amount(Decimal::from(20))?;
                f.begin_submit(None, now())
            })
            .await
            .unwrap();

        assert!(store.cancel_current(9).await.is_none());
        assert_eq!(store.current_kind(9).await, Some(FormKind::Deposit));

        store.clear_user(9).await;
        assert!(store.get(9, FormKind::Deposit).await.is_none());
    }
}
