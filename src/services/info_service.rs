//! Static pages: home, about, features, pricing, FAQ and contact

use serenity::builder::{CreateEmbed, CreateEmbedFooter};

use crate::services::eligibility_service::TRANSFER_METHODS;

const BRAND_COLOR: u32 = 0x2563eb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoPage {
    Home,
    About,
    Features,
    Pricing,
    Faq,
    Contact,
}

impl InfoPage {
    pub fn from_command(command: &str) -> Option<Self> {
        match command.trim_start_matches('$') {
            "home" | "start" => Some(InfoPage::Home),
            "about" => Some(InfoPage::About),
            "features" => Some(InfoPage::Features),
            "pricing" => Some(InfoPage::Pricing),
            "faq" => Some(InfoPage::Faq),
            "contact" => Some(InfoPage::Contact),
            _ => None,
        }
    }
}

struct FaqCategory {
    name: &'static str,
    keys: &'static [&'static str],
    entries: &'static [(&'static str, &'static str)],
}

const FAQ: [FaqCategory; 5] = [
    FaqCategory {
        name: "General",
        keys: &["general"],
        entries: &[
            ("What is Digital Wallet?", "A secure mobile payment system to send and receive money, pay bills and make purchases from your phone, similar to bKash or Nagad."),
            ("Is Digital Wallet free to use?", "Basic usage is free. Creating an account, checking your balance and receiving money cost nothing; any fee is shown before you confirm."),
            ("Which countries do you operate in?", "Multiple countries across Asia, with more regions planned."),
        ],
    },
    FaqCategory {
        name: "Account Management",
        keys: &["account"],
        entries: &[
            ("Can I have multiple accounts?", "No. Each individual can hold one personal account; businesses can apply for merchant accounts."),
            ("How do I update my personal information?", "Use `$profile set name=... email=... phone=...`. Some changes may need verification."),
            ("What should I do if my phone is lost or stolen?", "Contact support immediately to freeze your account, then `$logout` here."),
        ],
    },
    FaqCategory {
        name: "Transactions",
        keys: &["transactions", "transaction"],
        entries: &[
            ("How long do transactions take?", "Most are instant. Extra security checks can take up to 24 hours."),
            ("Is there a transaction limit?", "Yes: 50,000 ৳ per transfer, 100,000 ৳ per day and 500,000 ৳ per month for withdrawals."),
            ("What should I do if a transaction fails?", "Check your balance and `$history`. If funds were deducted but not received, contact support."),
            ("How do I send money to someone?", "`$send`, then `$to <name or email>`, `$amount <n>` and `$confirm`."),
        ],
    },
    FaqCategory {
        name: "Security & Privacy",
        keys: &["security", "privacy"],
        entries: &[
            ("How secure is my money?", "Bank-level encryption protects your data and every transaction is monitored for suspicious activity."),
            ("What should I do if I notice suspicious activity?", "Change your password, `$logout`, and contact support right away."),
        ],
    },
    FaqCategory {
        name: "Agent Services",
        keys: &["agent", "agents"],
        entries: &[
            ("What services can agents provide?", "Cash-in (adding money to a wallet) and cash-out (withdrawing cash)."),
            ("Are there fees for agent services?", "Agent cash-out costs 5 ৳. Cash-in through an agent is free."),
            ("How do I become an agent?", "Apply through the Agent Registration portal with a valid business license and a minimum initial deposit."),
        ],
    },
];

pub fn create_info_embed(page: InfoPage) -> CreateEmbed {
    match page {
        InfoPage::Home => home(),
        InfoPage::About => about(),
        InfoPage::Features => features(),
        InfoPage::Pricing => pricing(),
        InfoPage::Faq => faq_overview(),
        InfoPage::Contact => contact(),
    }
}

fn home() -> CreateEmbed {
    CreateEmbed::default()
        .title("💳 Digital Wallet")
        .description("Send, receive and manage your money from chat.")
        .field("Seamless Mobile Payments", "Send and receive money with just a few commands", false)
        .field("Bank-Level Security", "Access tokens are encrypted while the bot holds them", false)
        .field("Lightning Fast Transfers", "Instant money transfers, 24/7", false)
        .field("Get Started", "DM `$link <access token>`, then `$dashboard`", false)
        .color(BRAND_COLOR)
}

fn about() -> CreateEmbed {
    CreateEmbed::default()
        .title("ℹ️ About Digital Wallet")
        .description(
            "Digital Wallet makes everyday money movement simple for users, agents and admins. \
             Balances, limits and commissions are handled by our wallet service; this bot is a front door to it.",
        )
        .field("Users", "Deposit, withdraw, send money and track history", true)
        .field("Agents", "Cash-in and cash-out for customers", true)
        .field("Admins", "Oversee users and platform activity", true)
        .color(BRAND_COLOR)
}

fn features() -> CreateEmbed {
    let methods: Vec<String> = TRANSFER_METHODS
        .iter()
        .map(|m| format!("• **{}** ({}), fee {}, {}", m.name, m.description, m.fee_label, m.processing))
        .collect();

    CreateEmbed::default()
        .title("✨ Features")
        .field("Mobile Payments", "Peer-to-peer transfers with quick-amount shortcuts", false)
        .field("Bill Payments", "Top up and pay from one balance", false)
        .field("Role-Based Access", "Separate dashboards for users, agents and admins", false)
        .field("Withdrawal Methods", methods.join("\n"), false)
        .color(BRAND_COLOR)
}

fn pricing() -> CreateEmbed {
    CreateEmbed::default()
        .title("🏷️ Pricing")
        .field("Basic • Free forever", "Send money to other users\nBasic wallet functionality\nTransaction history (30 days)", true)
        .field("Premium • $3.00 / month", "Everything in Basic\nHigher limits ($1,000/day)\nHistory for 1 year\nPriority support\n0.5% cashback", true)
        .field("Family • $5.00 / month", "Everything in Premium\nUp to 5 family accounts\nParental controls & spending limits", true)
        .field("Agents", "Starter, Professional and Enterprise plans. Contact sales.", false)
        .footer(CreateEmbedFooter::new("Annual billing: Premium $2.50, Family $4.00 per month"))
        .color(BRAND_COLOR)
}

fn faq_overview() -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title("❓ Frequently Asked Questions")
        .color(BRAND_COLOR);
    for category in &FAQ {
        let questions: Vec<String> = category.entries.iter().map(|(q, _)| format!("• {}", q)).collect();
        embed = embed.field(
            format!("{} (`$faq {}`)", category.name, category.keys[0]),
            questions.join("\n"),
            false,
        );
    }
    embed
}

/// Answers for one FAQ category, looked up by key (`$faq security`)
pub fn create_faq_category_embed(key: &str) -> Option<CreateEmbed> {
    let key = key.to_lowercase();
    let category = FAQ.iter().find(|c| c.keys.contains(&key.as_str()))?;

    let mut embed = CreateEmbed::default()
        .title(format!("❓ FAQ: {}", category.name))
        .color(BRAND_COLOR);
    for (question, answer) in category.entries {
        embed = embed.field(*question, *answer, false);
    }
    Some(embed)
}

fn contact() -> CreateEmbed {
    CreateEmbed::default()
        .title("📞 Contact Us")
        .description("Have questions or need assistance? Our support team is ready to help.")
        .field("Phone", "+1 (555) 123-4567\nInternational: +1 (555) 987-6543\nMon-Fri 8am-10pm, Sat-Sun 9am-6pm", true)
        .field("Email", "support@digitalwallet.com\nbusiness@digitalwallet.com", true)
        .field("Live Chat", "Available 24/7", true)
        .field("Office", "Digital Wallet Headquarters\nSan Francisco, CA 94103\nUnited States", false)
        .field("Urgent?", "Emergency line: +1 (555) 911-WALLET", false)
        .color(BRAND_COLOR)
}
