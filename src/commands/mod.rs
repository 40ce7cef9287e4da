pub mod help;
pub mod info;
pub mod dashboard;
pub mod session;
pub mod overview;
pub mod history;
pub mod users;
pub mod transfer;
pub mod form;
pub mod profile;

use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use tracing::{debug, error, warn};

use crate::services::form_service::FormKind;
use crate::utils::{check_cooldown, check_global_rate_limit, user_facing_error, Cooldown};

const KNOWN_COMMANDS: [&str; 30] = [
    "$help", "$commands", "$home", "$start", "$about", "$features", "$pricing", "$faq",
    "$contact", "$dashboard", "$link", "$unlink", "$logout", "$overview", "$history",
    "$users", "$deposit", "$withdraw", "$send", "$cashin", "$cashout", "$amount",
    "$method", "$account", "$to", "$confirm", "$cancel", "$form", "$profile", "$addmoney",
];

pub async fn handle_message(ctx: &Context, msg: &Message) {
    if msg.author.bot {
        return;
    }

    let parts: Vec<&str> = msg.content.split_whitespace().collect();
    let Some((&command, args)) = parts.split_first() else {
        return;
    };
    let command = command.to_lowercase();
    if !KNOWN_COMMANDS.contains(&command.as_str()) {
        return;
    }

    if let Cooldown::Active { remaining, warn } = check_cooldown(msg.author.id, &command).await {
        if warn {
            let embed = CreateEmbed::default()
                .title("Command Cooldown")
                .description(format!("⏳ Please wait {} seconds before using this command again.", remaining))
                .color(0xffa500);
            let _ = msg.channel_id.send_message(ctx, CreateMessage::default().embed(embed)).await;
        }
        return;
    }

    if let Err(wait_ms) = check_global_rate_limit().await {
        warn!("Global command limit hit, dropping {} from {} ({}ms)", command, msg.author.id, wait_ms);
        return;
    }

    debug!("{} ran {} {:?}", msg.author.id, command, args);

    let result = match command.as_str() {
        "$help" | "$commands" => help::execute(ctx, msg).await,
        "$home" | "$start" | "$about" | "$features" | "$pricing" | "$faq" | "$contact" => {
            info::execute(ctx, msg, &command, args).await
        }
        "$dashboard" => dashboard::execute(ctx, msg, args).await,
        "$link" => session::link(ctx, msg, args).await,
        "$unlink" => session::unlink(ctx, msg).await,
        "$logout" => session::logout(ctx, msg).await,
        "$overview" => overview::execute(ctx, msg, args).await,
        "$history" => history::execute(ctx, msg, args).await,
        "$users" => users::execute(ctx, msg, args).await,
        "$deposit" => transfer::execute(ctx, msg, FormKind::Deposit, args).await,
        "$withdraw" => transfer::execute(ctx, msg, FormKind::Withdraw, args).await,
        "$send" => transfer::execute(ctx, msg, FormKind::Send, args).await,
        "$cashin" | "$addmoney" => transfer::execute(ctx, msg, FormKind::AgentCashIn, args).await,
        "$cashout" => transfer::execute(ctx, msg, FormKind::AgentCashOut, args).await,
        "$amount" => form::amount(ctx, msg, args).await,
        "$method" => form::method(ctx, msg, args).await,
        "$account" => form::account(ctx, msg, args).await,
        "$to" => form::recipient(ctx, msg, args).await,
        "$confirm" => form::confirm(ctx, msg).await,
        "$cancel" => form::cancel(ctx, msg).await,
        "$form" => form::show(ctx, msg).await,
        "$profile" => profile::execute(ctx, msg, args).await,
        _ => return,
    };

    if let Err(e) = result {
        error!("❌ Error executing command {}: {}", command, e);

        let embed = CreateEmbed::default()
            .title("Command Error")
            .description(user_facing_error(&e))
            .color(0xff0000);

        let _ = msg.channel_id
            .send_message(ctx, CreateMessage::default().embed(embed))
            .await;
    }
}

/// Send one embed to the channel the command came from
pub(crate) async fn reply_embed(ctx: &Context, msg: &Message, embed: CreateEmbed) -> Result<(), String> {
    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
        .map(|_| ())
        .map_err(|e| e.to_string())
}
