use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::reply_embed;
use crate::services::{directory_service, wallet_service};
use crate::state::app_state;

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let query = args.join(" ");
    let user_id = msg.author.id.get();

    let state = app_state(ctx).await?;
    let users = wallet_service::load_users(&state, user_id, false).await?;

    let results = directory_service::search_users(&users, &query);
    state.searches.remember(user_id, &results).await;

    reply_embed(ctx, msg, directory_service::create_users_embed(&results, &query)).await
}
