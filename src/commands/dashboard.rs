use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::reply_embed;
use crate::services::dashboard_service;
use crate::services::permission_service::{self, Role};
use crate::state::app_state;

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let state = app_state(ctx).await?;
    let linked = state.sessions.is_linked(msg.author.id.get()).await;

    let requested = match args.first() {
        Some(name) => Some(Role::parse(name).ok_or(format!(
            "❌ Unknown dashboard '{}'. Use user, agent or admin.",
            name
        ))?),
        None => None,
    };

    // an unlinked DM user has no roles to look up yet
    let role = if !linked && msg.guild_id.is_none() {
        match requested {
            Some(role) if role != Role::User => {
                return Err("Link your wallet with `$link <access token>` to see that dashboard".to_string());
            }
            _ => Role::User,
        }
    } else {
        let permission = permission_service::check_permission(ctx, msg, &state, &[]).await?;
        match requested {
            Some(role) if permission_service::has_access(&permission.roles, &[role]) || role == Role::User => role,
            Some(role) => {
                return Err(format!("You need the {} role to open that dashboard", role.name()));
            }
            None => permission.primary_role(),
        }
    };

    reply_embed(ctx, msg, dashboard_service::create_dashboard_embed(role, linked)).await
}
