use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use lazy_static::lazy_static;
use serenity::model::id::UserId;
use tokio::sync::Mutex;

lazy_static! {
    static ref COMMAND_COOLDOWNS: Mutex<HashMap<(UserId, String), u64>> =
        Mutex::new(HashMap::new());

    // Last cooldown warning per (user, command), so a retry storm gets one reply
    static ref COOLDOWN_WARNINGS: Mutex<HashMap<(UserId, String), u64>> =
        Mutex::new(HashMap::new());

    // Sliding one-second window of accepted commands across all users
    static ref GLOBAL_REQUESTS: Mutex<Vec<u64>> = Mutex::new(Vec::new());
}

const COOLDOWN_SECONDS: u64 = 5;
const GLOBAL_RATE_LIMIT: usize = 50;
const RATE_WINDOW_MS: u64 = 1000;

/// Commands that only edit a local draft or print static text
const NO_COOLDOWN: [&str; 16] = [
    "$help", "$home", "$about", "$features", "$pricing", "$faq", "$contact",
    "$dashboard", "$amount", "$method", "$account", "$to", "$cancel", "$form",
    "$commands", "$start",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cooldown {
    Ready,
    /// Still cooling down; `warn` is true only for the first hit in this period
    Active { remaining: u64, warn: bool },
}

/// Cooldown in seconds for a command, 0 when exempt
pub fn cooldown_seconds(command: &str) -> u64 {
    if NO_COOLDOWN.contains(&command) {
        0
    } else {
        COOLDOWN_SECONDS
    }
}

pub async fn check_cooldown(user_id: UserId, command: &str) -> Cooldown {
    let cooldown = cooldown_seconds(command);
    if cooldown == 0 {
        return Cooldown::Ready;
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let key = (user_id, command.to_string());

    let mut cooldowns = COMMAND_COOLDOWNS.lock().await;
    match cooldowns.get(&key).copied() {
        Some(last_time) if now.saturating_sub(last_time) < cooldown => {
            let remaining = cooldown - now.saturating_sub(last_time);

            let mut warnings = COOLDOWN_WARNINGS.lock().await;
            let warn = warnings
                .get(&key)
                .map_or(true, |&last_warning| last_warning < last_time);
            if warn {
                warnings.insert(key, now);
            }

            Cooldown::Active { remaining, warn }
        }
        _ => {
            cooldowns.insert(key, now);
            Cooldown::Ready
        }
    }
}

/// Global limit across all users; Err carries milliseconds until a slot frees up
pub async fn check_global_rate_limit() -> Result<(), u64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let window_start = now.saturating_sub(RATE_WINDOW_MS);

    let mut requests = GLOBAL_REQUESTS.lock().await;
    requests.retain(|&timestamp| timestamp > window_start);

    if requests.len() >= GLOBAL_RATE_LIMIT {
        let oldest_leaves_at = requests[0] + RATE_WINDOW_MS;
        Err(oldest_leaves_at.saturating_sub(now))
    } else {
        requests.push(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drafting_commands_are_exempt() {
        assert_eq!(cooldown_seconds("$amount"), 0);
        assert_eq!(cooldown_seconds("$faq"), 0);
        assert_eq!(cooldown_seconds("$confirm"), COOLDOWN_SECONDS);
        assert_eq!(cooldown_seconds("$overview"), COOLDOWN_SECONDS);
    }

    #[tokio::test]
    async fn test_cooldown_warns_once() {
        let user = UserId::new(424242);
        assert_eq!(check_cooldown(user, "$overview").await, Cooldown::Ready);

        match check_cooldown(user, "$overview").await {
            Cooldown::Active { remaining, warn } => {
                assert!(remaining > 0 && remaining <= COOLDOWN_SECONDS);
                assert!(warn);
            }
            other => panic!("expected cooldown, got {:?}", other),
        }
        assert!(matches!(
            check_cooldown(user, "$overview").await,
            Cooldown::Active { warn: false, .. }
        ));

        // other commands and exempt commands are unaffected
        assert_eq!(check_cooldown(user, "$history").await, Cooldown::Ready);
        assert_eq!(check_cooldown(user, "$amount").await, Cooldown::Ready);
        assert_eq!(check_cooldown(user, "$amount").await, Cooldown::Ready);
    }
}
