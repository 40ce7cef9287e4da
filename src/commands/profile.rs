use chrono::Utc;
use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use tracing::info;

use super::reply_embed;
use crate::api::wallet::{ProfileUpdate, WalletUser};
use crate::services::wallet_service;
use crate::state::app_state;
use crate::utils::relative_time;

const USAGE: &str = "Usage: `$profile set name=<name> email=<email> phone=<phone>`";

/// `name=Rahim Uddin phone=017...`; words without `=` continue the previous value
fn parse_update(args: &[&str]) -> Result<ProfileUpdate, String> {
    let mut update = ProfileUpdate::default();
    let mut current: Option<&mut Option<String>> = None;

    for arg in args {
        if let Some((key, value)) = arg.split_once('=') {
            let slot = match key.to_lowercase().as_str() {
                "name" => &mut update.name,
                "email" => &mut update.email,
                "phone" => &mut update.phone,
                other => return Err(format!("❌ Unknown profile field '{}'. {}", other, USAGE)),
            };
            *slot = Some(value.to_string());
            current = Some(slot);
        } else {
            match current.as_deref_mut() {
                Some(Some(value)) => {
                    value.push(' ');
                    value.push_str(arg);
                }
                _ => return Err(USAGE.to_string()),
            }
        }
    }

    for value in [&update.name, &update.email, &update.phone] {
        if value.as_deref().map_or(false, |v| v.trim().is_empty()) {
            return Err(format!("❌ Profile fields cannot be empty. {}", USAGE));
        }
    }
    Ok(update)
}

fn create_profile_embed(profile: &WalletUser, title: &str) -> CreateEmbed {
    CreateEmbed::default()
        .title(title)
        .field("Name", if profile.name.is_empty() { "Not set" } else { &profile.name }, true)
        .field("Email", if profile.email.is_empty() { "Not set" } else { &profile.email }, true)
        .field("Phone", profile.phone.as_deref().unwrap_or("Not set"), true)
        .field("Role", profile.role.as_deref().unwrap_or("user"), true)
        .field("Member Since", relative_time(profile.created_at, Utc::now()), true)
        .footer(CreateEmbedFooter::new(format!("Wallet ID {}", profile.id)))
        .color(0x3b82f6)
}

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let state = app_state(ctx).await?;
    let user_id = msg.author.id.get();

    match args.split_first() {
        None => {
            let profile = wallet_service::load_profile(&state, user_id, false).await?;
            reply_embed(ctx, msg, create_profile_embed(&profile, "👤 Your Profile")).await
        }
        Some((&sub, rest)) if sub.eq_ignore_ascii_case("set") => {
            let update = parse_update(rest)?;
            let profile = wallet_service::update_profile(&state, user_id, &update).await?;
            info!("User {} updated wallet profile {}", user_id, profile.id);
            reply_embed(ctx, msg, create_profile_embed(&profile, "✅ Profile Updated")).await
        }
        Some(_) => Err(USAGE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update_joins_multi_word_values() {
        let update = parse_update(&["name=Rahim", "Uddin", "phone=01700000000"]).unwrap();
        assert_eq!(update.name.as_deref(), Some("Rahim Uddin"));
        assert_eq!(update.phone.as_deref(), Some("01700000000"));
        assert!(update.email.is_none());
    }

    #[test]
    fn test_parse_update_rejects_bad_input() {
        assert!(parse_update(&["nickname=x"]).is_err());
        assert!(parse_update(&["Rahim"]).is_err());
        assert!(parse_update(&["email="]).is_err());
        assert!(parse_update(&[]).unwrap().is_empty());
    }
}
