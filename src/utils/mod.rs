pub mod table;
pub mod errors;
pub mod format;
pub mod ratelimit;
pub mod api_ratelimit;
pub mod encryption;

pub use table::{Align, Table};
pub use errors::user_facing_error;
pub use format::{format_money, parse_amount, relative_time};
pub use ratelimit::{check_cooldown, check_global_rate_limit, Cooldown};
pub use api_ratelimit::{configure_wallet_api_limit, rate_limit_wallet_api};
pub use encryption::TokenCipher;
