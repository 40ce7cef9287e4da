use chrono::Utc;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::reply_embed;
use crate::services::history_service::{self, HistoryQuery, TypeFilter};
use crate::services::wallet_service;
use crate::state::app_state;

/// `[type] [search words...] [p<page>]`, in any order
fn parse_query(args: &[&str]) -> Result<HistoryQuery, String> {
    let mut query = HistoryQuery::default();
    let mut search = Vec::new();

    for arg in args {
        let lowered = arg.to_lowercase();
        if let Some(page) = lowered.strip_prefix('p').filter(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())) {
            query.page = page
                .parse()
                .map_err(|_| "Invalid page number. Use: `$history p2`".to_string())?;
        } else if let Some(filter) = TypeFilter::parse(&lowered).filter(|_| search.is_empty() && query.filter == TypeFilter::All) {
            query.filter = filter;
        } else {
            search.push(*arg);
        }
    }

    query.search = search.join(" ");
    Ok(query)
}

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let query = parse_query(args)?;
    let state = app_state(ctx).await?;
    let summary = wallet_service::load_summary(&state, msg.author.id.get(), false).await?;

    let page = history_service::query_history(&summary, &query)?;
    reply_embed(ctx, msg, history_service::create_history_embed(&page, &query, Utc::now())).await
}
