use serenity::model::channel::Message;
use serenity::model::prelude::{GuildId, UserId};
use serenity::prelude::Context;
use tracing::debug;

use crate::services::wallet_service;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    User,
    Agent,
    Admin,
}

impl Role {
    /// Case-insensitive; accepts chat role names and the wallet API's `USER`/`AGENT`/`ADMIN`
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "user" => Some(Role::User),
            "agent" => Some(Role::Agent),
            "admin" | "super_admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Agent => "Agent",
            Role::Admin => "Admin",
        }
    }
}

pub struct PermissionContext {
    pub user_id: u64,
    pub roles: Vec<Role>,
}

impl PermissionContext {
    /// Dashboard to show by default: the highest role held
    pub fn primary_role(&self) -> Role {
        self.roles.iter().copied().max().unwrap_or(Role::User)
    }
}

/// Admin passes every check; otherwise one of `required` must be held.
/// An empty `required` means any recognised role (or none) is enough.
pub fn has_access(roles: &[Role], required: &[Role]) -> bool {
    required.is_empty() || roles.contains(&Role::Admin) || required.iter().any(|r| roles.contains(r))
}

/// Get user's role names from a guild
pub async fn get_user_role_names(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
) -> Result<Vec<String>, String> {
    let member = match guild_id.member(&ctx.http, user_id).await {
        Ok(m) => m,
        Err(e) => {
            debug!("User {} is not a member of guild {}: {}", user_id, guild_id, e);
            return Ok(Vec::new());
        }
    };

    if let Some(guild) = guild_id.to_guild_cached(&ctx.cache) {
        let roles: Vec<String> = member
            .roles
            .iter()
            .filter_map(|rid| guild.roles.get(rid))
            .map(|role| role.name.clone())
            .collect();
        debug!("User {} roles in guild {} (from cache): {:?}", user_id, guild_id, roles);
        return Ok(roles);
    }

    let guild = guild_id
        .to_partial_guild(&ctx.http)
        .await
        .map_err(|e| format!("Failed to get guild: {}", e))?;
    let mut roles: Vec<String> = member
        .roles
        .iter()
        .filter_map(|rid| guild.roles.get(rid))
        .map(|role| role.name.clone())
        .collect();

    if user_id == guild.owner_id {
        roles.push("Admin".to_string());
    }

    debug!("User {} roles in guild {} (from API): {:?}", user_id, guild_id, roles);
    Ok(roles)
}

/// Roles of the message author.
///
/// In a guild these are the chat roles (the owner counts as Admin). In DMs
/// the role on the linked wallet profile is used instead.
pub async fn resolve_roles(ctx: &Context, msg: &Message, state: &AppState) -> Result<Vec<Role>, String> {
    let names = match msg.guild_id {
        Some(guild_id) => {
            let mut names = get_user_role_names(ctx, guild_id, msg.author.id).await?;
            if let Some(owner_id) = guild_id.to_guild_cached(&ctx.cache).map(|g| g.owner_id) {
                if owner_id == msg.author.id {
                    names.push("Admin".to_string());
                }
            }
            names
        }
        None => {
            let profile = wallet_service::load_profile(state, msg.author.id.get(), false).await?;
            profile.role.into_iter().collect()
        }
    };

    let mut roles: Vec<Role> = names.iter().filter_map(|n| Role::parse(n)).collect();
    roles.sort();
    roles.dedup();
    Ok(roles)
}

/// Check the author holds one of `required`
pub async fn check_permission(
    ctx: &Context,
    msg: &Message,
    state: &AppState,
    required: &[Role],
) -> Result<PermissionContext, String> {
    let roles = resolve_roles(ctx, msg, state).await?;
    debug!("User {} roles: {:?}, required: {:?}", msg.author.id, roles, required);

    if !has_access(&roles, required) {
        let names: Vec<&str> = required.iter().map(|r| r.name()).collect();
        return Err(format!(
            "You need one of these roles to use this command: {}",
            names.join(", ")
        ));
    }

    Ok(PermissionContext {
        user_id: msg.author.id.get(),
        roles,
    })
}
