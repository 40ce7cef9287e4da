use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use tracing::{info, warn};

use super::reply_embed;
use crate::services::wallet_service;
use crate::state::app_state;

pub async fn link(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    if msg.guild_id.is_some() {
        // never leave a token readable in a shared channel
        if let Err(e) = msg.delete(ctx).await {
            warn!("Could not delete $link message from {}: {}", msg.author.id, e);
        }
        return Err("For your safety `$link` only works in DMs. If your token was posted here, log out and get a new one.".to_string());
    }

    let token = match args {
        [token] => *token,
        _ => {
            let embed = CreateEmbed::default()
                .title("🔐 Link Command")
                .description("Link your wallet account to this chat user")
                .field("Usage", "`$link <access token>`", false)
                .field("Notes", "• DM only\n• The token is kept encrypted in memory\n• `$unlink` forgets it, `$logout` also ends the wallet session", false)
                .color(0x00ff00);
            return reply_embed(ctx, msg, embed).await;
        }
    };

    let state = app_state(ctx).await?;
    let user_id = msg.author.id.get();
    let (profile, replaced) = wallet_service::link(&state, user_id, token).await?;

    info!("User {} linked wallet account {} (replaced: {})", user_id, profile.id, replaced);

    let embed = CreateEmbed::default()
        .title("✅ Wallet Linked")
        .description(format!("Welcome, **{}**!", profile.name))
        .field("Email", &profile.email, true)
        .field("Role", profile.role.as_deref().unwrap_or("USER"), true)
        .field("Next", "`$dashboard` to see what you can do", false)
        .color(0x00ff00);
    reply_embed(ctx, msg, embed).await
}

pub async fn unlink(ctx: &Context, msg: &Message) -> Result<(), String> {
    let state = app_state(ctx).await?;
    let description = if wallet_service::unlink(&state, msg.author.id.get()).await {
        "Your access token and drafts were removed from this bot."
    } else {
        "No wallet was linked."
    };

    reply_embed(ctx, msg, CreateEmbed::default().title("🔓 Unlinked").description(description).color(0xffa500)).await
}

pub async fn logout(ctx: &Context, msg: &Message) -> Result<(), String> {
    let state = app_state(ctx).await?;
    wallet_service::logout(&state, msg.author.id.get()).await?;
    info!("User {} logged out", msg.author.id);

    reply_embed(
        ctx,
        msg,
        CreateEmbed::default()
            .title("👋 Logged Out")
            .description("Your wallet session has ended and your token was removed.")
            .color(0xffa500),
    )
    .await
}
