/// Turn a command error into the text shown in the error embed.
///
/// Gateway failures get a generic explanation; anything else is the
/// handler's own message with redundant prefixes removed, e.g.
/// "Bad Request: Insufficient balance" -> "❌ Insufficient balance".
pub fn user_facing_error(error_msg: &str) -> String {
    let lowered = error_msg.to_lowercase();

    if lowered.contains("ratelimited") || lowered.contains("discord rate limit") {
        return "⚠️ **Rate Limited**: Discord is rate limiting us. Please try again in a moment.".to_string();
    }
    if lowered.contains("error sending request") || lowered.contains("http request") {
        return "⚠️ **Network Error**: Having trouble reaching the wallet service. Please try again.".to_string();
    }

    let clean = extract_clean_error(error_msg);
    if clean.is_empty() {
        "❌ An error occurred while executing the command.".to_string()
    } else if clean.starts_with('❌') || clean.starts_with('⚠') {
        clean
    } else {
        format!("❌ {}", clean)
    }
}

/// Strip the error-kind prefix the API client puts in front of server messages
pub fn extract_clean_error(error_msg: &str) -> String {
    const PREFIXES: [&str; 5] = [
        "Bad Request: ",
        "Unauthorized: ",
        "Forbidden: ",
        "Not Found: ",
        "Rate Limited: ",
    ];

    let trimmed = error_msg.trim();
    PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_clean_error() {
        assert_eq!(extract_clean_error("Bad Request: Insufficient balance"), "Insufficient balance");
        assert_eq!(extract_clean_error("  plain message "), "plain message");
    }

    #[test]
    fn test_user_facing_error() {
        assert_eq!(user_facing_error("Forbidden: Agent only"), "❌ Agent only");
        assert_eq!(user_facing_error("❌ Invalid amount"), "❌ Invalid amount");
        assert_eq!(user_facing_error(""), "❌ An error occurred while executing the command.");
        assert!(user_facing_error("Ratelimited by Discord").contains("**Rate Limited**"));
        assert!(user_facing_error("error sending request for url").contains("Network Error"));
    }
}
