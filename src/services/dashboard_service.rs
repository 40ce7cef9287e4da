use serenity::builder::{CreateEmbed, CreateEmbedFooter};

use crate::services::permission_service::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardItem {
    pub title: &'static str,
    /// None when this client has no command behind the entry
    pub command: Option<&'static str>,
}

const fn item(title: &'static str, command: &'static str) -> DashboardItem {
    DashboardItem { title, command: Some(command) }
}

const fn unavailable(title: &'static str) -> DashboardItem {
    DashboardItem { title, command: None }
}

const USER_ITEMS: [DashboardItem; 6] = [
    item("Overview", "$overview"),
    item("Deposit", "$deposit"),
    item("Withdraw", "$withdraw"),
    item("Send Money", "$send"),
    item("Transaction History", "$history"),
    item("Profile", "$profile"),
];

const AGENT_ITEMS: [DashboardItem; 3] = [
    item("Add Money", "$cashin"),
    item("Withdraw", "$cashout"),
    item("Profile", "$profile"),
];

const ADMIN_ITEMS: [DashboardItem; 5] = [
    item("Overview", "$overview"),
    item("Manage Users", "$users"),
    unavailable("Manage Agents"),
    unavailable("Transactions"),
    item("Profile", "$profile"),
];

pub fn dashboard_title(role: Role) -> &'static str {
    match role {
        Role::User => "User Dashboard",
        Role::Agent => "Agent Dashboard",
        Role::Admin => "Admin Dashboard",
    }
}

pub fn dashboard_items(role: Role) -> &'static [DashboardItem] {
    match role {
        Role::User => &USER_ITEMS,
        Role::Agent => &AGENT_ITEMS,
        Role::Admin => &ADMIN_ITEMS,
    }
}

pub fn create_dashboard_embed(role: Role, linked: bool) -> CreateEmbed {
    let lines: Vec<String> = dashboard_items(role)
        .iter()
        .map(|entry| match entry.command {
            Some(command) => format!("• **{}** → `{}`", entry.title, command),
            None => format!("• ~~{}~~ (not available here)", entry.title),
        })
        .collect();

    let footer = if linked {
        "Wallet linked".to_string()
    } else {
        "No wallet linked yet. DM `$link <access token>` to get started.".to_string()
    };

    CreateEmbed::default()
        .title(format!("🧭 {}", dashboard_title(role)))
        .description(lines.join("\n"))
        .footer(CreateEmbedFooter::new(footer))
        .color(match role {
            Role::User => 0x3b82f6,
            Role::Agent => 0x10b981,
            Role::Admin => 0x8b5cf6,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_per_role() {
        let user: Vec<&str> = dashboard_items(Role::User).iter().map(|i| i.title).collect();
        assert_eq!(user, vec!["Overview", "Deposit", "Withdraw", "Send Money", "Transaction History", "Profile"]);

        assert_eq!(dashboard_items(Role::Agent)[0].command, Some("$cashin"));
        assert_eq!(
            dashboard_items(Role::Admin).iter().filter(|i| i.command.is_none()).count(),
            2
        );
    }
}
