use serenity::model::channel::Message;
use serenity::prelude::Context;
use tracing::{debug, info};

use super::form::render;
use crate::services::directory_service::{self, SUGGESTED_CONTACTS};
use crate::services::eligibility_service;
use crate::services::form_service::{FormKind, TransferForm};
use crate::services::permission_service::{self, Role};
use crate::services::session_service::SessionError;
use crate::services::wallet_service;
use crate::state::{app_state, AppState};
use crate::utils::parse_amount;

/// Shortcut fields typed after the command, e.g. `$withdraw 1500 mobile`
#[derive(Debug, Default, PartialEq)]
struct Shortcuts {
    amount: Option<rust_decimal::Decimal>,
    method: Option<&'static str>,
    recipient: Option<String>,
}

fn parse_shortcuts(kind: FormKind, args: &[&str]) -> Result<Shortcuts, String> {
    let mut shortcuts = Shortcuts::default();
    let mut words = Vec::new();

    for arg in args {
        if shortcuts.amount.is_none() {
            if let Some(amount) = parse_amount(arg) {
                shortcuts.amount = Some(amount);
                continue;
            }
        }
        if kind.needs_method() && shortcuts.method.is_none() {
            if let Some(method) = eligibility_service::find_method(&arg.to_lowercase()) {
                shortcuts.method = Some(method.id);
                continue;
            }
        }
        words.push(*arg);
    }

    if !words.is_empty() {
        if !kind.accepts_recipient() {
            return Err(format!("❌ Unexpected '{}'. Usage: `{}`", words.join(" "), usage(kind)));
        }
        shortcuts.recipient = Some(words.join(" "));
    }
    Ok(shortcuts)
}

fn usage(kind: FormKind) -> &'static str {
    match kind {
        FormKind::Send => "$send [recipient] [amount]",
        FormKind::Withdraw => "$withdraw [amount] [bank|mobile|agent]",
        FormKind::Deposit => "$deposit [amount]",
        FormKind::AgentCashIn => "$cashin [amount] [customer]",
        FormKind::AgentCashOut => "$cashout [customer] [amount] [bank|mobile|agent]",
    }
}

async fn suggested_contacts(state: &AppState, user_id: u64) -> Option<String> {
    let users = wallet_service::load_users(state, user_id, false).await.ok()?;
    let suggestions = directory_service::search_users(&users, "");
    let shown: Vec<_> = suggestions.into_iter().take(SUGGESTED_CONTACTS).collect();
    if shown.is_empty() {
        return None;
    }
    state.searches.remember(user_id, &shown).await;

    let lines: Vec<String> = shown
        .iter()
        .enumerate()
        .map(|(i, u)| format!("**{}.** {} {}", i + 1, u.name, u.phone.as_deref().unwrap_or("")))
        .collect();
    Some(format!("Recent contacts, pick with `$to <number>`:\n{}", lines.join("\n")))
}

pub async fn execute(ctx: &Context, msg: &Message, kind: FormKind, args: &[&str]) -> Result<(), String> {
    let state = app_state(ctx).await?;
    let user_id = msg.author.id.get();

    if !state.sessions.is_linked(user_id).await {
        return Err(SessionError::NotLinked.to_string());
    }
    if matches!(kind, FormKind::AgentCashIn | FormKind::AgentCashOut) {
        permission_service::check_permission(ctx, msg, &state, &[Role::Agent]).await?;
    }

    let shortcuts = parse_shortcuts(kind, args)?;
    let recipient = match &shortcuts.recipient {
        Some(selector) => {
            let users = wallet_service::load_users(&state, user_id, false).await?;
            Some(directory_service::resolve_recipient(&users, selector)?)
        }
        None => None,
    };

    let started = state.forms.start(user_id, kind).await;
    info!("User {} started {} draft {}", user_id, kind.title(), started.id);

    let (_, form): ((), TransferForm) = state
        .forms
        .update_current(user_id, |form| {
            if let Some(amount) = shortcuts.amount {
                form.set_amount(amount)?;
            }
            if let Some(method) = shortcuts.method {
                form.select_method(method)?;
            }
            if let Some(recipient) = recipient {
                form.select_recipient(recipient)?;
            }
            Ok(())
        })
        .await
        .map_err(|e| e.to_string())?;
    debug!("Draft {} after shortcuts: {:?}", form.id, form.state());

    let note = if kind == FormKind::Send && form.recipient().is_none() {
        suggested_contacts(&state, user_id).await
    } else {
        None
    };

    render(ctx, msg, &state, &form, note.as_deref()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_withdraw_shortcuts() {
        let shortcuts = parse_shortcuts(FormKind::Withdraw, &["1,500", "Mobile"]).unwrap();
        assert_eq!(shortcuts.amount, Some(Decimal::from(1500)));
        assert_eq!(shortcuts.method, Some("mobile"));
        assert!(shortcuts.recipient.is_none());

        assert!(parse_shortcuts(FormKind::Withdraw, &["500", "alice"]).is_err());
    }

    #[test]
    fn test_send_shortcuts_collect_recipient_words() {
        let shortcuts = parse_shortcuts(FormKind::Send, &["Bob", "Karim", "250"]).unwrap();
        assert_eq!(shortcuts.amount, Some(Decimal::from(250)));
        assert_eq!(shortcuts.recipient.as_deref(), Some("Bob Karim"));

        assert_eq!(parse_shortcuts(FormKind::Deposit, &[]).unwrap(), Shortcuts::default());
    }
}
