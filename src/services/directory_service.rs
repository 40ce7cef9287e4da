use std::collections::HashMap;

use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use tokio::sync::Mutex;

use crate::api::wallet::WalletUser;
use crate::services::form_service::Recipient;

/// Contacts suggested on a fresh send draft
pub const SUGGESTED_CONTACTS: usize = 3;
const MAX_LISTED: usize = 15;

/// Case-insensitive substring match on name or email; an empty query matches everyone
pub fn search_users<'a>(users: &'a [WalletUser], query: &str) -> Vec<&'a WalletUser> {
    let needle = query.trim().to_lowercase();
    users
        .iter()
        .filter(|user| {
            needle.is_empty()
                || user.name.to_lowercase().contains(&needle)
                || user.email.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Last search result per chat user, so `$to 2` can pick from it
#[derive(Default)]
pub struct SearchHistory {
    results: Mutex<HashMap<u64, Vec<Recipient>>>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn remember(&self, user_id: u64, results: &[&WalletUser]) {
        let recipients = results.iter().map(|u| Recipient::from(*u)).collect();
        self.results.lock().await.insert(user_id, recipients);
    }

    pub async fn pick(&self, user_id: u64, index: usize) -> Option<Recipient> {
        let results = self.results.lock().await;
        index
            .checked_sub(1)
            .and_then(|i| results.get(&user_id)?.get(i).cloned())
    }

    pub async fn forget(&self, user_id: u64) {
        self.results.lock().await.remove(&user_id);
    }
}

/// Resolve `$to <selector>`: exact id first, then a unique name/email match
pub fn resolve_recipient(users: &[WalletUser], selector: &str) -> Result<Recipient, String> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Err("Please name a recipient".to_string());
    }

    if let Some(user) = users.iter().find(|u| u.id == selector) {
        return Ok(Recipient::from(user));
    }

    let matches = search_users(users, selector);
    match matches.as_slice() {
        [] => Err(format!("❌ No user matches '{}'", selector)),
        [only] => Ok(Recipient::from(*only)),
        many => {
            // an exact email or name wins over partial matches
            let exact: Vec<&&WalletUser> = many
                .iter()
                .filter(|u| u.email.eq_ignore_ascii_case(selector) || u.name.eq_ignore_ascii_case(selector))
                .collect();
            match exact.as_slice() {
                [only] => Ok(Recipient::from(**only)),
                _ => Err(format!(
                    "❌ {} users match '{}'. Narrow it down or use `$users {}` and pick by number.",
                    many.len(),
                    selector,
                    selector
                )),
            }
        }
    }
}

pub fn create_users_embed(results: &[&WalletUser], query: &str) -> CreateEmbed {
    let title = if query.trim().is_empty() {
        "👥 Users".to_string()
    } else {
        format!("👥 Users matching '{}'", query.trim())
    };

    if results.is_empty() {
        return CreateEmbed::default()
            .title(title)
            .description("No users found")
            .color(0xffa500);
    }

    let mut description = String::new();
    for (idx, user) in results.iter().take(MAX_LISTED).enumerate() {
        description.push_str(&format!("**{}.** {} • {}", idx + 1, user.name, user.email));
        if let Some(phone) = &user.phone {
            description.push_str(&format!(" • {}", phone));
        }
        if let Some(role) = &user.role {
            description.push_str(&format!(" • `{}`", role));
        }
        description.push('\n');
    }

    let shown = results.len().min(MAX_LISTED);
    CreateEmbed::default()
        .title(title)
        .description(description)
        .footer(CreateEmbedFooter::new(format!(
            "Showing {} of {} • pick one with `$to <number>`",
            shown,
            results.len()
        )))
        .color(0x00b0f4)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str, email: &str) -> WalletUser {
        WalletUser {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: Some("01700000000".to_string()),
            role: Some("USER".to_string()),
            created_at: None,
        }
    }

    fn users() -> Vec<WalletUser> {
        vec![
            user("1", "Alice Rahman", "alice@example.com"),
            user("2", "Bob Karim", "bob@example.com"),
            user("3", "Alicia Keys", "keys@example.org"),
        ]
    }

    #[test]
    fn test_search_by_name_or_email() {
        let users = users();
        assert_eq!(search_users(&users, "ALI").len(), 2);
        assert_eq!(search_users(&users, "example.org").len(), 1);
        assert_eq!(search_users(&users, "").len(), 3);
        assert!(search_users(&users, "zed").is_empty());
    }

    #[test]
    fn test_resolve_recipient() {
        let users = users();
        assert_eq!(resolve_recipient(&users, "2").unwrap().name, "Bob Karim");
        assert_eq!(resolve_recipient(&users, "bob").unwrap().id, "2");
        assert_eq!(resolve_recipient(&users, "alice@example.com").unwrap().id, "1");
        assert!(resolve_recipient(&users, "ali").is_err());
        assert!(resolve_recipient(&users, "nobody").is_err());
    }

    #[tokio::test]
    async fn test_pick_from_last_search() {
        let users = users();
        let history = SearchHistory::new();
        history.remember(9, &search_users(&users, "ali")).await;

        assert_eq!(history.pick(9, 2).await.unwrap().id, "3");
        assert!(history.pick(9, 0).await.is_none());
        assert!(history.pick(9, 3).await.is_none());
        assert!(history.pick(8, 1).await.is_none());

        history.forget(9).await;
        assert!(history.pick(9, 1).await.is_none());
    }
}
