use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

pub const CURRENCY_SYMBOL: &str = "৳";

/// `৳12,345.5` style: thousands separators, at most two decimals, no trailing zeros
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    match fraction {
        Some(fraction) => format!("{}{}{}.{}", sign, CURRENCY_SYMBOL, grouped, fraction),
        None => format!("{}{}{}", sign, CURRENCY_SYMBOL, grouped),
    }
}

/// Human age of a transaction; missing timestamps read as "Recently"
pub fn relative_time(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created_at) = created_at else {
        return "Recently".to_string();
    };

    let elapsed = now.signed_duration_since(created_at);
    let days = elapsed.num_days();
    let hours = elapsed.num_hours();
    let minutes = elapsed.num_minutes();

    if days > 0 {
        format!("{} {} ago", days, plural(days, "day"))
    } else if hours > 0 {
        format!("{} {} ago", hours, plural(hours, "hour"))
    } else if minutes > 0 {
        format!("{} {} ago", minutes, plural(minutes, "minute"))
    } else {
        "Just now".to_string()
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        unit.to_string()
    } else {
        format!("{}s", unit)
    }
}

/// Parse a user-typed amount such as `1,500` or `250.75`
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .trim()
        .trim_start_matches(CURRENCY_SYMBOL)
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse::<Decimal>().ok()
}
