use chrono::Utc;
use serenity::all::CreateAttachment;
use serenity::builder::CreateMessage;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use tracing::debug;

use super::reply_embed;
use crate::services::{chart_service, summary_service, wallet_service};
use crate::state::app_state;

const CHART_FILE: &str = "overview.png";

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let with_chart = args.iter().any(|a| a.eq_ignore_ascii_case("chart"));
    let refresh = args.iter().any(|a| a.eq_ignore_ascii_case("refresh"));

    let state = app_state(ctx).await?;
    let summary = wallet_service::load_summary(&state, msg.author.id.get(), refresh).await?;
    let overview = summary_service::build_overview(&summary);
    let embed = summary_service::create_overview_embed(&overview, Utc::now());

    if !with_chart {
        return reply_embed(ctx, msg, embed).await;
    }

    let png = chart_service::generate_overview_chart(&overview, 900, 500)?;
    debug!("Overview chart rendered ({} bytes)", png.len());

    let message = CreateMessage::default()
        .embed(embed.image(format!("attachment://{}", CHART_FILE)))
        .add_file(CreateAttachment::bytes(png, CHART_FILE));

    msg.channel_id
        .send_message(ctx, message)
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}
