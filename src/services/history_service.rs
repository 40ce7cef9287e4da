use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serenity::builder::{CreateEmbed, CreateEmbedFooter};

use crate::api::wallet::{Transaction, TransactionSummary};
use crate::utils::{format_money, relative_time, Align, Table};

pub const TRANSACTIONS_PER_PAGE: usize = 5;

/// Counterpart label shown for outgoing transfers; searchable like the amount
const TRANSFER_COUNTERPART: &str = "To: User";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Deposit,
    Transfer,
    Withdraw,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Deposit => "deposit",
            EntryType::Transfer => "transfer",
            EntryType::Withdraw => "withdraw",
        }
    }

    fn sign(&self) -> &'static str {
        match self {
            EntryType::Deposit => "+",
            EntryType::Transfer | EntryType::Withdraw => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    All,
    Only(EntryType),
}

impl TypeFilter {
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "all" => Some(TypeFilter::All),
            "deposit" | "deposits" | "cashin" => Some(TypeFilter::Only(EntryType::Deposit)),
            "transfer" | "transfers" | "send" => Some(TypeFilter::Only(EntryType::Transfer)),
            "withdraw" | "withdrawals" | "withdrawal" => Some(TypeFilter::Only(EntryType::Withdraw)),
            _ => None,
        }
    }

    fn matches(&self, entry_type: EntryType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(only) => *only == entry_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub created_at: Option<DateTime<Utc>>,
}

impl HistoryEntry {
    fn from_transaction(entry_type: EntryType, tx: &Transaction) -> Self {
        Self {
            entry_type,
            amount: tx.amount,
            created_at: tx.created_at,
        }
    }

    fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        self.amount.normalize().to_string().contains(query)
            || (self.entry_type == EntryType::Transfer
                && TRANSFER_COUNTERPART.to_lowercase().contains(&query.to_lowercase()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    pub filter: TypeFilter,
    pub search: String,
    /// 1-based
    pub page: usize,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            filter: TypeFilter::All,
            search: String::new(),
            page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub entries: Vec<HistoryEntry>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

/// Deposits, transfers and withdrawals in one list, newest first.
/// Undated entries sort last, ties keep category order.
pub fn merge_history(summary: &TransactionSummary) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = summary
        .cash_in
        .transactions
        .iter()
        .map(|tx| HistoryEntry::from_transaction(EntryType::Deposit, tx))
        .chain(summary.send.transactions.iter().map(|tx| HistoryEntry::from_transaction(EntryType::Transfer, tx)))
        .chain(summary.withdraw.transactions.iter().map(|tx| HistoryEntry::from_transaction(EntryType::Withdraw, tx)))
        .collect();

    entries.sort_by(|a, b| match (a.created_at, b.created_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    entries
}

pub fn query_history(summary: &TransactionSummary, query: &HistoryQuery) -> Result<HistoryPage, String> {
    let search = query.search.trim();
    let filtered: Vec<HistoryEntry> = merge_history(summary)
        .into_iter()
        .filter(|entry| query.filter.matches(entry.entry_type) && entry.matches_search(search))
        .collect();

    let total_matches = filtered.len();
    let total_pages = (total_matches + TRANSACTIONS_PER_PAGE - 1) / TRANSACTIONS_PER_PAGE;

    if query.page == 0 || (total_pages > 0 && query.page > total_pages) {
        return Err(format!(
            "❌ Invalid page number. There are {} page(s)",
            total_pages.max(1)
        ));
    }

    let entries = filtered
        .into_iter()
        .skip((query.page - 1) * TRANSACTIONS_PER_PAGE)
        .take(TRANSACTIONS_PER_PAGE)
        .collect();

    Ok(HistoryPage {
        entries,
        page: query.page,
        total_pages,
        total_matches,
    })
}

pub fn create_history_embed(page: &HistoryPage, query: &HistoryQuery, now: DateTime<Utc>) -> CreateEmbed {
    let embed = CreateEmbed::default().title("📋 Transaction History");

    if page.entries.is_empty() {
        return embed
            .description("No transactions found\nTry adjusting your filters")
            .color(0xffa500);
    }

    let mut table = Table::new(vec!["Type", "Amount", "When"]).align(1, Align::Right);
    for entry in &page.entries {
        table.add_row(vec![
            entry.entry_type.as_str().to_string(),
            format!("{}{}", entry.entry_type.sign(), format_money(entry.amount)),
            relative_time(entry.created_at, now),
        ]);
    }

    let filter = match query.filter {
        TypeFilter::All => "all".to_string(),
        TypeFilter::Only(t) => t.as_str().to_string(),
    };

    embed
        .description(table.render())
        .footer(CreateEmbedFooter::new(format!(
            "Page {}/{} • {} transactions found • filter: {}",
            page.page,
            page.total_pages,
            page.total_matches,
            filter
        )))
        .color(0x00ff00)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::wallet::TransactionAggregate;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn tx(amount: i64, hours_ago: Option<i64>) -> Transaction {
        Transaction {
            amount: Decimal::from(amount),
            created_at: hours_ago.map(|h| now() - Duration::hours(h)),
        }
    }

    fn aggregate(transactions: Vec<Transaction>) -> TransactionAggregate {
        TransactionAggregate {
            count: transactions.len() as u64,
            amount: transactions.iter().map(|t| t.amount).sum(),
            transactions,
        }
    }

    fn summary() -> TransactionSummary {
        TransactionSummary {
            cash_in: aggregate(vec![tx(1000, Some(5)), tx(2500, Some(1)), tx(700, None)]),
            send: aggregate(vec![tx(150, Some(2)), tx(300, Some(30))]),
            withdraw: aggregate(vec![tx(500, Some(3)), tx(1500, Some(0))]),
        }
    }

    #[test]
    fn test_merge_sorts_newest_first_with_undated_last() {
        let merged = merge_history(&summary());
        let amounts: Vec<i64> = merged
            .iter()
            .map(|e| e.amount.to_string().parse().unwrap())
            .collect();
        assert_eq!(amounts, vec![1500, 2500, 150, 500, 1000, 300, 700]);
        assert_eq!(merged[0].entry_type, EntryType::Withdraw);
        assert!(merged.last().unwrap().created_at.is_none());
    }

    #[test]
    fn test_pagination() {
        let first = query_history(&summary(), &HistoryQuery::default()).unwrap();
        assert_eq!(first.total_matches, 7);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.entries.len(), 5);

        let second = query_history(&summary(), &HistoryQuery { page: 2, ..Default::default() }).unwrap();
        assert_eq!(second.entries.len(), 2);

        assert!(query_history(&summary(), &HistoryQuery { page: 3, ..Default::default() }).is_err());
        assert!(query_history(&summary(), &HistoryQuery { page: 0, ..Default::default() }).is_err());
    }

    #[test]
    fn test_type_filter_and_search() {
        let deposits = query_history(
            &summary(),
            &HistoryQuery {
                filter: TypeFilter::Only(EntryType::Deposit),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(deposits.total_matches, 3);
        assert_eq!(deposits.total_pages, 1);

        let fifteen = query_history(&summary(), &HistoryQuery { search: "15".to_string(), ..Default::default() }).unwrap();
        let amounts: Vec<Decimal> = fifteen.entries.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![Decimal::from(1500), Decimal::from(150)]);

        // every transfer matches its counterpart label
        let to_user = query_history(&summary(), &HistoryQuery { search: "user".to_string(), ..Default::default() }).unwrap();
        assert_eq!(to_user.total_matches, 2);
        assert!(to_user.entries.iter().all(|e| e.entry_type == EntryType::Transfer));
    }

    #[test]
    fn test_empty_history_is_one_empty_page() {
        let page = query_history(&TransactionSummary::default(), &HistoryQuery::default()).unwrap();
        assert_eq!(page.total_pages, 0);
        assert!(page.entries.is_empty());
        assert_eq!(TypeFilter::parse("Transfer"), Some(TypeFilter::Only(EntryType::Transfer)));
        assert_eq!(TypeFilter::parse("loans"), None);
    }
}
