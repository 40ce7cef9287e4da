//! How a draft and a submission result are presented

use serenity::builder::{CreateEmbed, CreateEmbedFooter};

use crate::services::eligibility_service::{self, Eligibility, TRANSFER_METHODS};
use crate::services::form_service::{FormKind, FormState, TransferForm};
use crate::services::wallet_service::SubmissionOutcome;
use crate::utils::format_money;

fn kind_emoji(kind: FormKind) -> &'static str {
    match kind {
        FormKind::Send => "💸",
        FormKind::Withdraw | FormKind::AgentCashOut => "🏧",
        FormKind::Deposit | FormKind::AgentCashIn => "💰",
    }
}

fn status_label(state: &FormState) -> &'static str {
    match state {
        FormState::Idle => "New",
        FormState::Validating => "Editing",
        FormState::Submitting => "Submitting...",
        FormState::Success { .. } => "Completed",
        FormState::Failed { .. } => "Failed, edit and confirm again",
    }
}

/// Name/value pairs describing a draft, in display order
pub fn draft_fields(form: &TransferForm, eligibility: &Eligibility) -> Vec<(String, String)> {
    let kind = form.kind;
    let mut fields = vec![(
        "Amount".to_string(),
        form.amount().map(format_money).unwrap_or_else(|| "Not set".to_string()),
    )];

    if kind.accepts_recipient() {
        let value = match form.recipient() {
            Some(r) => match &r.phone {
                Some(phone) => format!("{} ({})", r.name, phone),
                None => r.name.clone(),
            },
            None if kind.needs_recipient() => "Not selected".to_string(),
            None => "Optional".to_string(),
        };
        fields.push((
            if kind == FormKind::Send { "Recipient" } else { "Customer" }.to_string(),
            value,
        ));
    }

    if kind.needs_method() {
        let value = match form.method() {
            Some(m) => format!("{} • fee {} • {}", m.name, m.fee_label, m.processing),
            None => {
                let ids: Vec<&str> = TRANSFER_METHODS.iter().map(|m| m.id).collect();
                format!("Not selected ({})", ids.join(" | "))
            }
        };
        fields.push(("Method".to_string(), value));

        if form.method().map_or(false, |m| m.requires_account_number) {
            fields.push((
                "Account Number".to_string(),
                form.account_number().unwrap_or("Required").to_string(),
            ));
        }
    }

    if let Some(balance) = eligibility.available_balance {
        fields.push(("Available Balance".to_string(), format_money(balance)));
    }

    if let Some(fee) = eligibility.fee {
        fields.push((
            "Fee / Net".to_string(),
            format!("{} fee • {} net", format_money(fee.fee), format_money(fee.net)),
        ));
    }

    if !eligibility.quick_amounts.is_empty() {
        let quick: Vec<String> = eligibility
            .quick_amounts
            .iter()
            .map(|q| {
                if q.enabled {
                    format!("`{}`", format_money(q.amount))
                } else {
                    format!("~~{}~~", format_money(q.amount))
                }
            })
            .collect();
        fields.push(("Quick Amounts".to_string(), quick.join(" ")));
    }

    if eligibility.insufficient {
        fields.push(("⚠️ Warning".to_string(), "Insufficient balance".to_string()));
    } else if let Some(violation) = &eligibility.limit_violation {
        fields.push(("⚠️ Warning".to_string(), violation.to_string()));
    }

    if let FormState::Failed { message } = form.state() {
        fields.push(("Last Attempt".to_string(), message.clone()));
    }

    fields.push(("Status".to_string(), status_label(form.state()).to_string()));
    fields
}

/// The command the user most likely needs next
pub fn next_step(form: &TransferForm, eligibility: &Eligibility) -> &'static str {
    let kind = form.kind;
    if form.is_closed() {
        return "Start a new one to continue";
    }
    if form.amount().is_none() {
        return "Set the amount with `$amount <n>`";
    }
    if kind.needs_recipient() && form.recipient().is_none() {
        return "Choose who with `$to <name|email|#>` (see `$users`)";
    }
    if kind.needs_method() {
        match form.method() {
            None => return "Pick a method with `$method bank|mobile|agent`",
            Some(m) if m.requires_account_number && form.account_number().is_none() => {
                return "Add the account with `$account <number>`";
            }
            _ => {}
        }
    }
    if eligibility.can_submit() {
        "`$confirm` to submit • `$cancel` to discard"
    } else {
        "Adjust the amount to clear the warning"
    }
}

pub fn create_draft_embed(form: &TransferForm, eligibility: &Eligibility, note: Option<&str>) -> CreateEmbed {
    let mut embed = CreateEmbed::default().title(format!("{} {}", kind_emoji(form.kind), form.kind.title()));
    if let Some(note) = note {
        embed = embed.description(note);
    }
    for (name, value) in draft_fields(form, eligibility) {
        let inline = !matches!(name.as_str(), "Quick Amounts" | "⚠️ Warning" | "Last Attempt");
        embed = embed.field(name, value, inline);
    }

    let blocked = form.amount().is_some() && !eligibility.can_submit();
    embed
        .footer(CreateEmbedFooter::new(next_step(form, eligibility)))
        .color(if blocked { 0xff3333 } else { 0x3b82f6 })
}

pub fn create_outcome_embed(outcome: &SubmissionOutcome) -> CreateEmbed {
    if !outcome.succeeded {
        return CreateEmbed::default()
            .title(format!("❌ {} failed", outcome.kind.title()))
            .description(&outcome.message)
            .field("Your draft was kept", "Fix it and `$confirm` again, or `$cancel`", false)
            .color(0xff3333);
    }

    let mut embed = CreateEmbed::default()
        .title(format!("✅ {}", outcome.message))
        .color(0x00ff00);

    if let Some(form) = &outcome.form {
        if let Some(amount) = form.amount() {
            embed = embed.field("Amount", format_money(amount), true);
            if let Some(method) = form.method() {
                let breakdown = eligibility_service::compute_fee_and_net(amount, method);
                embed = embed.field(
                    method.name,
                    format!("{} fee • {} net", format_money(breakdown.fee), format_money(breakdown.net)),
                    true,
                );
            }
        }
        if let Some(recipient) = form.recipient() {
            embed = embed.field("To", &recipient.name, true);
        }
        embed = embed.footer(CreateEmbedFooter::new(format!("Draft {}", form.id)));
    }

    if let Some(summary) = &outcome.refreshed_summary {
        embed = embed.field(
            "Balance Now",
            format_money(eligibility_service::available_balance(summary)),
            false,
        );
    }

    embed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::wallet::TransactionSummary;
    use crate::services::form_service::Recipient;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn summary_with_balance(balance: i64) -> TransactionSummary {
        let mut summary = TransactionSummary::default();
        summary.cash_in.amount = Decimal::from(balance);
        summary
    }

    fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
        fields.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_withdraw_draft_shows_fee_and_disabled_quick_amounts() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let summary = summary_with_balance(3000);
        let mut form = TransferForm::new(FormKind::Withdraw);
        form.set_amount(Decimal::from(1000)).unwrap();
        form.select_method("bank").unwrap();

        let eligibility = form.evaluate(Some(&summary), now);
        let fields = draft_fields(&form, &eligibility);

        assert_eq!(field(&fields, "Fee / Net"), Some("৳15 fee • ৳985 net"));
        assert_eq!(field(&fields, "Account Number"), Some("Required"));
        assert_eq!(field(&fields, "Available Balance"), Some("৳3,000"));
        let quick = field(&fields, "Quick Amounts").unwrap();
        assert!(quick.contains("`৳2,000`"));
        assert!(quick.contains("~~৳5,000~~"));
        assert_eq!(next_step(&form, &eligibility), "Add the account with `$account <number>`");
    }

    #[test]
    fn test_send_draft_warns_when_insufficient() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let summary = summary_with_balance(100);
        let mut form = TransferForm::new(FormKind::Send);
        form.set_amount(Decimal::from(500)).unwrap();
        form.select_recipient(Recipient {
            id: "u1".to_string(),
            name: "Bob".to_string(),
            phone: Some("017".to_string()),
        })
        .unwrap();

        let eligibility = form.evaluate(Some(&summary), now);
        let fields = draft_fields(&form, &eligibility);
        assert_eq!(field(&fields, "Recipient"), Some("Bob (017)"));
        assert_eq!(field(&fields, "⚠️ Warning"), Some("Insufficient balance"));
        assert_eq!(next_step(&form, &eligibility), "Adjust the amount to clear the warning");
    }

    #[test]
    fn test_cash_in_customer_is_optional() {
        let form = TransferForm::new(FormKind::AgentCashIn);
        let eligibility = form.evaluate(None, Utc::now());
        let fields = draft_fields(&form, &eligibility);
        assert_eq!(field(&fields, "Customer"), Some("Optional"));
        assert!(field(&fields, "Available Balance").is_none());
        assert_eq!(next_step(&form, &eligibility), "Set the amount with `$amount <n>`");
    }
}
