use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serenity::builder::{CreateEmbed, CreateEmbedFooter};

use crate::api::wallet::{Transaction, TransactionAggregate, TransactionSummary};
use crate::services::eligibility_service;
use crate::utils::{format_money, relative_time};

pub const RECENT_PER_CATEGORY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    CashIn,
    Send,
    Withdraw,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::CashIn => "Cash In",
            Category::Send => "Send",
            Category::Withdraw => "Withdraw",
        }
    }

    /// What one entry of this category is called in counts ("3 deposits")
    pub fn noun(&self) -> &'static str {
        match self {
            Category::CashIn => "deposits",
            Category::Send => "transfers",
            Category::Withdraw => "withdrawals",
        }
    }

    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Category::CashIn => (0x10, 0xb9, 0x81),
            Category::Send => (0x3b, 0x82, 0xf6),
            Category::Withdraw => (0xef, 0x44, 0x44),
        }
    }

    fn aggregate<'a>(&self, summary: &'a TransactionSummary) -> &'a TransactionAggregate {
        match self {
            Category::CashIn => &summary.cash_in,
            Category::Send => &summary.send,
            Category::Withdraw => &summary.withdraw,
        }
    }
}

pub const CATEGORIES: [Category; 3] = [Category::CashIn, Category::Send, Category::Withdraw];

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: Category,
    pub count: u64,
    pub amount: Decimal,
    /// Share of cashIn + send + withdraw, one decimal; 0 when that total is 0
    pub percent: Decimal,
    pub recent: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub total_count: u64,
    pub net_flow: Decimal,
    pub shares: Vec<CategoryShare>,
}

impl Overview {
    pub fn is_positive(&self) -> bool {
        self.net_flow >= Decimal::ZERO
    }

    pub fn share(&self, category: Category) -> Option<&CategoryShare> {
        self.shares.iter().find(|s| s.category == category)
    }
}

pub fn build_overview(summary: &TransactionSummary) -> Overview {
    let total_amount: Decimal = CATEGORIES
        .iter()
        .map(|c| c.aggregate(summary).amount)
        .sum();

    let shares = CATEGORIES
        .iter()
        .map(|&category| {
            let aggregate = category.aggregate(summary);
            let percent = if total_amount.is_zero() {
                Decimal::ZERO
            } else {
                (aggregate.amount * Decimal::ONE_HUNDRED / total_amount)
                    .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
            };
            CategoryShare {
                category,
                count: aggregate.count,
                amount: aggregate.amount,
                percent,
                recent: aggregate
                    .transactions
                    .iter()
                    .take(RECENT_PER_CATEGORY)
                    .cloned()
                    .collect(),
            }
        })
        .collect();

    Overview {
        total_count: CATEGORIES.iter().map(|c| c.aggregate(summary).count).sum(),
        net_flow: eligibility_service::available_balance(summary),
        shares,
    }
}

fn recent_lines(share: &CategoryShare, now: DateTime<Utc>) -> String {
    if share.recent.is_empty() {
        return "No transactions yet".to_string();
    }
    share
        .recent
        .iter()
        .map(|tx| format!("`{}` • {}", format_money(tx.amount), relative_time(tx.created_at, now)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn create_overview_embed(overview: &Overview, now: DateTime<Utc>) -> CreateEmbed {
    let flow = if overview.is_positive() { "Positive" } else { "Negative" };
    let mut embed = CreateEmbed::default()
        .title("📊 Financial Overview")
        .field("Net Flow", format!("**{}**\n{} cash flow this period", format_money(overview.net_flow), flow), true)
        .field("Transactions", overview.total_count.to_string(), true)
        .color(if overview.is_positive() { 0x10b981 } else { 0xef4444 });

    for share in &overview.shares {
        embed = embed.field(
            share.category.label(),
            format!(
                "{} • {} {} • {}%",
                format_money(share.amount),
                share.count,
                share.category.noun(),
                share.percent.normalize()
            ),
            false,
        );
    }

    for share in &overview.shares {
        embed = embed.field(
            format!("Recent {}", share.category.label()),
            recent_lines(share, now),
            true,
        );
    }

    embed.footer(CreateEmbedFooter::new("Amounts are advisory; the wallet service is authoritative"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn aggregate(count: u64, amount: i64, n: usize, now: DateTime<Utc>) -> TransactionAggregate {
        TransactionAggregate {
            count,
            amount: Decimal::from(amount),
            transactions: (0..n)
                .map(|i| Transaction {
                    amount: Decimal::from(10 + i as i64),
                    created_at: Some(now - Duration::hours(i as i64)),
                })
                .collect(),
        }
    }

    #[test]
    fn test_overview_shares_and_recent() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let summary = TransactionSummary {
            cash_in: aggregate(7, 6000, 7, now),
            send: aggregate(2, 3000, 2, now),
            withdraw: aggregate(1, 1000, 1, now),
        };

        let overview = build_overview(&summary);
        assert_eq!(overview.total_count, 10);
        assert_eq!(overview.net_flow, Decimal::from(2000));
        assert!(overview.is_positive());

        let cash_in = overview.share(Category::CashIn).unwrap();
        assert_eq!(cash_in.percent, Decimal::from(60));
        assert_eq!(cash_in.recent.len(), RECENT_PER_CATEGORY);
        assert_eq!(overview.share(Category::Send).unwrap().percent, Decimal::from(30));
        assert_eq!(overview.share(Category::Withdraw).unwrap().recent.len(), 1);
    }

    #[test]
    fn test_empty_summary_has_zero_shares() {
        let overview = build_overview(&TransactionSummary::default());
        assert_eq!(overview.total_count, 0);
        assert!(overview.shares.iter().all(|s| s.percent.is_zero()));
        assert!(overview.is_positive());
    }

    #[test]
    fn test_negative_flow() {
        let now = Utc::now();
        let summary = TransactionSummary {
            cash_in: aggregate(1, 100, 0, now),
            send: aggregate(1, 300, 0, now),
            withdraw: TransactionAggregate::default(),
        };
        let overview = build_overview(&summary);
        assert_eq!(overview.net_flow, Decimal::from(-200));
        assert!(!overview.is_positive());
        assert_eq!(overview.share(Category::CashIn).unwrap().percent, Decimal::from(25));
    }
}
