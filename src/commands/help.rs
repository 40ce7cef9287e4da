use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::reply_embed;
use crate::state::app_state;

fn format_uptime(secs: u64) -> String {
    format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
}

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let uptime = app_state(ctx).await?.started_at.elapsed().as_secs();
    let embed = CreateEmbed::default()
        .title("📖 Digital Wallet Commands")
        .description("Manage your wallet from chat. Link your account in a DM first; everything else works in DMs and servers.")
        .color(0x00b0f4)
        .field(
            "🏠 Pages",
            "`$home` `$about` `$features` `$pricing` `$contact`\n`$faq [category]` - Questions and answers",
            false,
        )
        .field(
            "🔐 Account",
            "`$link <access token>` - Link your wallet (DM only)\n`$unlink` - Forget your token here\n`$logout` - End your wallet session\n`$profile` / `$profile set name=.. email=.. phone=..`",
            false,
        )
        .field(
            "📊 Dashboard",
            "`$dashboard [user|agent|admin]` - Your menu\n`$overview [chart] [refresh]` - Totals and recent activity\n`$history [all|deposit|transfer|withdraw] [search] [p2]`\n`$users [search]` - Find recipients",
            false,
        )
        .field(
            "💸 Money",
            "`$deposit [amount]`\n`$withdraw [amount] [bank|mobile|agent]`\n`$send [recipient] [amount]`\n`$cashin [amount] [customer]` (Agent)\n`$cashout [customer] [amount] [method]` (Agent)",
            false,
        )
        .field(
            "📝 Drafts",
            "`$amount <n>` `$to <name|email|id|#>` `$method <id>` `$account <number>`\n`$form` - Show the draft\n`$confirm` - Submit\n`$cancel` - Discard",
            false,
        )
        .field(
            "⚡ Rate Limiting",
            "5-second cooldown per command for commands that reach the wallet service",
            false,
        )
        .footer(CreateEmbedFooter::new(format!("Up for {}", format_uptime(uptime))));

    reply_embed(ctx, msg, embed)
        .await
        .map_err(|e| format!("Failed to send help message: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(59), "0h 0m");
        assert_eq!(format_uptime(3 * 3600 + 25 * 60 + 7), "3h 25m");
    }
}
