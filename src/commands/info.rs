use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::reply_embed;
use crate::services::info_service::{self, InfoPage};

pub async fn execute(ctx: &Context, msg: &Message, command: &str, args: &[&str]) -> Result<(), String> {
    let page = InfoPage::from_command(command).ok_or(format!("Unknown page {}", command))?;

    let embed = match (page, args.first()) {
        (InfoPage::Faq, Some(category)) => info_service::create_faq_category_embed(category).ok_or(format!(
            "❌ Unknown FAQ category '{}'. Try: general, account, transactions, security, agent",
            category
        ))?,
        _ => info_service::create_info_embed(page),
    };

    reply_embed(ctx, msg, embed).await
}
