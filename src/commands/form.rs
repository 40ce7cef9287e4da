use chrono::Utc;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::reply_embed;
use crate::services::form_service::{FormError, Recipient, TransferForm};
use crate::services::{directory_service, transfer_service, wallet_service};
use crate::state::{app_state, AppState};
use crate::utils::parse_amount;

/// Show a draft with a fresh eligibility preview
pub(crate) async fn render(
    ctx: &Context,
    msg: &Message,
    state: &AppState,
    form: &TransferForm,
    note: Option<&str>,
) -> Result<(), String> {
    let summary = wallet_service::advisory_summary(state, msg.author.id.get(), form.kind).await;
    let eligibility = form.evaluate(summary.as_ref(), Utc::now());
    reply_embed(ctx, msg, transfer_service::create_draft_embed(form, &eligibility, note)).await
}

async fn edit<F>(ctx: &Context, msg: &Message, f: F) -> Result<(), String>
where
    F: FnOnce(&mut TransferForm) -> Result<(), FormError>,
{
    let state = app_state(ctx).await?;
    let (_, form) = state
        .forms
        .update_current(msg.author.id.get(), f)
        .await
        .map_err(|e| e.to_string())?;
    render(ctx, msg, &state, &form, None).await
}

pub async fn amount(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let input = args.first().ok_or("Usage: `$amount <n>`, e.g. `$amount 1,500`".to_string())?;
    let amount = parse_amount(input).ok_or(format!("❌ '{}' is not an amount", input))?;
    edit(ctx, msg, |form| form.set_amount(amount)).await
}

pub async fn method(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let id = args
        .first()
        .ok_or("Usage: `$method bank|mobile|agent`".to_string())?
        .to_lowercase();
    edit(ctx, msg, |form| form.select_method(&id).map(|_| ())).await
}

pub async fn account(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    if args.is_empty() {
        return Err("Usage: `$account <account or wallet number>`".to_string());
    }
    let number = args.join(" ");
    edit(ctx, msg, |form| form.set_account_number(&number)).await
}

/// `$to 2` picks from the last `$users` list; anything else is an id, name or email
async fn find_recipient(state: &AppState, user_id: u64, selector: &str) -> Result<Recipient, String> {
    if let Ok(index) = selector.trim_start_matches('#').parse::<usize>() {
        if let Some(recipient) = state.searches.pick(user_id, index).await {
            return Ok(recipient);
        }
    }

    let users = wallet_service::load_users(state, user_id, false).await?;
    directory_service::resolve_recipient(&users, selector)
}

pub async fn recipient(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    if args.is_empty() {
        return Err("Usage: `$to <name | email | id | number from $users>`".to_string());
    }
    let state = app_state(ctx).await?;
    let recipient = find_recipient(&state, msg.author.id.get(), &args.join(" ")).await?;
    edit(ctx, msg, |form| form.select_recipient(recipient)).await
}

pub async fn confirm(ctx: &Context, msg: &Message) -> Result<(), String> {
    let state = app_state(ctx).await?;
    let outcome = wallet_service::confirm_current(&state, msg.author.id.get(), Utc::now()).await?;
    reply_embed(ctx, msg, transfer_service::create_outcome_embed(&outcome)).await
}

pub async fn cancel(ctx: &Context, msg: &Message) -> Result<(), String> {
    let state = app_state(ctx).await?;
    let user_id = msg.author.id.get();

    match state.forms.cancel_current(user_id).await {
        Some(form) => {
            let embed = serenity::builder::CreateEmbed::default()
                .title("🗑️ Draft Discarded")
                .description(format!("Your {} draft was discarded.", form.kind.title()))
                .color(0xffa500);
            reply_embed(ctx, msg, embed).await
        }
        None => match state.forms.current_kind(user_id).await {
            Some(kind) => Err(FormError::AlreadySubmitting(kind.title()).to_string()),
            None => Err(FormError::NoDraft.to_string()),
        },
    }
}

pub async fn show(ctx: &Context, msg: &Message) -> Result<(), String> {
    let state = app_state(ctx).await?;
    let user_id = msg.author.id.get();
    let kind = state
        .forms
        .current_kind(user_id)
        .await
        .ok_or_else(|| FormError::NoDraft.to_string())?;
    let form = state
        .forms
        .get(user_id, kind)
        .await
        .ok_or_else(|| FormError::NoDraft.to_string())?;
    render(ctx, msg, &state, &form, None).await
}
