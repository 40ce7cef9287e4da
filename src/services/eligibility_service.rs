//! Transfer eligibility
//!
//! Client-side, advisory checks run before a wallet mutation is sent: the
//! available balance derived from the transaction summary, per-transaction /
//! daily / monthly limits, quick-amount shortcuts and the fee / net preview
//! for withdrawal methods. The wallet API re-validates everything; nothing
//! here is authoritative.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::api::wallet::{TransactionAggregate, TransactionSummary};

/// Static catalog entry for a withdrawal / cash-out method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferMethod {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Display label; the fee is the leading integer of this string
    pub fee_label: &'static str,
    pub processing: &'static str,
    pub requires_account_number: bool,
}

impl TransferMethod {
    pub fn fee(&self) -> Decimal {
        parse_fee_label(self.fee_label).unwrap_or(Decimal::ZERO)
    }
}

pub const TRANSFER_METHODS: [TransferMethod; 3] = [
    TransferMethod {
        id: "bank",
        name: "Bank Transfer",
        description: "Transfer to a bank account",
        fee_label: "15 ৳",
        processing: "1-2 business days",
        requires_account_number: true,
    },
    TransferMethod {
        id: "mobile",
        name: "Mobile Banking",
        description: "bKash, Nagad, Rocket",
        fee_label: "10 ৳",
        processing: "Instant",
        requires_account_number: true,
    },
    TransferMethod {
        id: "agent",
        name: "Agent Cashout",
        description: "Collect cash from a nearby agent",
        fee_label: "5 ৳",
        processing: "Instant",
        requires_account_number: false,
    },
];

pub const SEND_QUICK_AMOUNTS: [i64; 5] = [100, 500, 1000, 2000, 5000];
pub const WITHDRAW_QUICK_AMOUNTS: [i64; 5] = [500, 1000, 2000, 5000, 10000];

/// Look up a method by id (case-insensitive)
pub fn find_method(id: &str) -> Option<&'static TransferMethod> {
    TRANSFER_METHODS
        .iter()
        .find(|method| method.id.eq_ignore_ascii_case(id.trim()))
}

/// Parse the leading integer of a fee label: `"15 ৳"` -> 15.
/// Returns None when the label does not start with a number.
pub fn parse_fee_label(label: &str) -> Option<Decimal> {
    let trimmed = label.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    let value: i64 = digits.parse().ok()?;
    Some(Decimal::from(if negative { -value } else { value }))
}

/// `cashIn.amount - (send.amount + withdraw.amount)`; may be negative
pub fn compute_available_balance(
    cash_in: &TransactionAggregate,
    send: &TransactionAggregate,
    withdraw: &TransactionAggregate,
) -> Decimal {
    cash_in.amount - (send.amount + withdraw.amount)
}

pub fn available_balance(summary: &TransactionSummary) -> Decimal {
    compute_available_balance(&summary.cash_in, &summary.send, &summary.withdraw)
}

pub fn is_insufficient(amount: Decimal, available_balance: Decimal) -> bool {
    amount > available_balance
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub fee: Decimal,
    pub net: Decimal,
}

/// Fee is the method's fixed fee; net is not clamped and goes negative when amount < fee
pub fn compute_fee_and_net(amount: Decimal, method: &TransferMethod) -> FeeBreakdown {
    let fee = method.fee();
    FeeBreakdown {
        fee,
        net: amount - fee,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAmount {
    pub amount: Decimal,
    pub enabled: bool,
}

/// Every candidate is kept; the ones above the balance are disabled.
/// With an unknown balance everything stays enabled.
pub fn filter_quick_amounts(candidates: &[i64], available_balance: Option<Decimal>) -> Vec<QuickAmount> {
    candidates
        .iter()
        .map(|&candidate| {
            let amount = Decimal::from(candidate);
            QuickAmount {
                amount,
                enabled: available_balance.map_or(true, |balance| amount <= balance),
            }
        })
        .collect()
}

/// Static per-flow limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferLimits {
    pub minimum: i64,
    pub maximum_per_transaction: Option<i64>,
    pub daily: Option<i64>,
    pub monthly: Option<i64>,
}

pub const SEND_LIMITS: TransferLimits = TransferLimits {
    minimum: 1,
    maximum_per_transaction: Some(50_000),
    daily: Some(100_000),
    monthly: None,
};

pub const WITHDRAW_LIMITS: TransferLimits = TransferLimits {
    minimum: 1,
    maximum_per_transaction: Some(50_000),
    daily: Some(100_000),
    monthly: Some(500_000),
};

pub const DEPOSIT_LIMITS: TransferLimits = TransferLimits {
    minimum: 1,
    maximum_per_transaction: None,
    daily: None,
    monthly: None,
};

pub const AGENT_CASH_IN_LIMITS: TransferLimits = TransferLimits {
    minimum: 1,
    maximum_per_transaction: Some(1_000_000),
    daily: None,
    monthly: None,
};

pub const AGENT_CASH_OUT_LIMITS: TransferLimits = WITHDRAW_LIMITS;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EligibilityError {
    #[error("Amount must be at least {minimum}")]
    BelowMinimum { minimum: Decimal },
    #[error("Maximum per transaction is {maximum}")]
    AboveMaximum { maximum: Decimal },
    #[error("Daily limit of {limit} would be exceeded ({used} already used today)")]
    DailyLimitExceeded { limit: Decimal, used: Decimal },
    #[error("Monthly limit of {limit} would be exceeded ({used} already used this month)")]
    MonthlyLimitExceeded { limit: Decimal, used: Decimal },
    #[error("Insufficient balance: {amount} requested, {available} available")]
    InsufficientBalance { amount: Decimal, available: Decimal },
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
        .single()
        .unwrap_or(now)
}

fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// Sum of transactions created at or after `since`; undated entries are skipped
pub fn sum_since(history: &TransactionAggregate, since: DateTime<Utc>) -> Decimal {
    history
        .transactions
        .iter()
        .filter(|t| t.created_at.map_or(false, |at| at >= since))
        .map(|t| t.amount)
        .sum()
}

pub fn check_limits(
    amount: Decimal,
    limits: &TransferLimits,
    history: &TransactionAggregate,
    now: DateTime<Utc>,
) -> Result<(), EligibilityError> {
    let minimum = Decimal::from(limits.minimum);
    if amount < minimum {
        return Err(EligibilityError::BelowMinimum { minimum });
    }

    if let Some(maximum) = limits.maximum_per_transaction.map(Decimal::from) {
        if amount > maximum {
            return Err(EligibilityError::AboveMaximum { maximum });
        }
    }

    if let Some(limit) = limits.daily.map(Decimal::from) {
        let used = sum_since(history, start_of_day(now));
        if used + amount > limit {
            return Err(EligibilityError::DailyLimitExceeded { limit, used });
        }
    }

    if let Some(limit) = limits.monthly.map(Decimal::from) {
        let used = sum_since(history, start_of_month(now));
        if used + amount > limit {
            return Err(EligibilityError::MonthlyLimitExceeded { limit, used });
        }
    }

    Ok(())
}

/// Snapshot rendered next to a draft while the user edits it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligibility {
    pub available_balance: Option<Decimal>,
    pub insufficient: bool,
    pub limit_violation: Option<EligibilityError>,
    pub fee: Option<FeeBreakdown>,
    pub quick_amounts: Vec<QuickAmount>,
}

impl Eligibility {
    pub fn can_submit(&self) -> bool {
        !self.insufficient && self.limit_violation.is_none()
    }
}

/// Inputs for one evaluation; `available_balance` is None when the flow does not
/// spend from the caller's own wallet.
pub struct EligibilityInput<'a> {
    pub amount: Option<Decimal>,
    pub available_balance: Option<Decimal>,
    pub limits: &'a TransferLimits,
    pub history: Option<&'a TransactionAggregate>,
    pub method: Option<&'a TransferMethod>,
    pub quick_amounts: &'a [i64],
    pub now: DateTime<Utc>,
}

pub fn evaluate(input: &EligibilityInput<'_>) -> Eligibility {
    let empty = TransactionAggregate::default();
    let history = input.history.unwrap_or(&empty);

    let (insufficient, limit_violation, fee) = match input.amount {
        Some(amount) => (
            input
                .available_balance
                .map_or(false, |balance| is_insufficient(amount, balance)),
            check_limits(amount, input.limits, history, input.now).err(),
            input.method.map(|method| compute_fee_and_net(amount, method)),
        ),
        None => (false, None, None),
    };

    Eligibility {
        available_balance: input.available_balance,
        insufficient,
        limit_violation,
        fee,
        quick_amounts: filter_quick_amounts(input.quick_amounts, input.available_balance),
    }
}

/// Gate applied on confirm: limits first, then balance
pub fn validate_submission(
    amount: Decimal,
    available_balance: Option<Decimal>,
    limits: &TransferLimits,
    history: Option<&TransactionAggregate>,
    now: DateTime<Utc>,
) -> Result<(), EligibilityError> {
    let empty = TransactionAggregate::default();
    check_limits(amount, limits, history.unwrap_or(&empty), now)?;

    if let Some(available) = available_balance {
        if is_insufficient(amount, available) {
            return Err(EligibilityError::InsufficientBalance { amount, available });
        }
    }

    Ok(())
}
