/// Outbound throttle for the wallet API - N requests per second across the whole bot
use lazy_static::lazy_static;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_REQUESTS_PER_SECOND: usize = 20;

lazy_static! {
    static ref WALLET_API_LIMITER: Mutex<ApiRateLimiter> =
        Mutex::new(ApiRateLimiter::new(DEFAULT_MAX_REQUESTS_PER_SECOND));
}

pub struct ApiRateLimiter {
    /// Timestamps of requests inside the current window
    request_times: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl ApiRateLimiter {
    fn new(max_requests: usize) -> Self {
        Self {
            request_times: VecDeque::new(),
            max_requests: max_requests.max(1),
            window: Duration::from_secs(1),
        }
    }

    fn check_and_record(&mut self) -> Duration {
        let now = Instant::now();

        while let Some(&front) = self.request_times.front() {
            if now.duration_since(front) > self.window {
                self.request_times.pop_front();
            } else {
                break;
            }
        }

        if self.request_times.len() >= self.max_requests {
            if let Some(&oldest) = self.request_times.front() {
                let elapsed = now.duration_since(oldest);
                if elapsed < self.window {
                    return self.window - elapsed;
                }
            }
        }

        self.request_times.push_back(now);
        Duration::from_secs(0)
    }
}

/// Replace the global limit, used once at startup from configuration
pub fn configure_wallet_api_limit(max_requests: usize) {
    match WALLET_API_LIMITER.lock() {
        Ok(mut limiter) => *limiter = ApiRateLimiter::new(max_requests),
        Err(e) => tracing::warn!("Wallet API limiter poisoned, keeping old limit: {}", e),
    }
}

/// Wait if necessary to stay under the wallet API request rate
pub async fn rate_limit_wallet_api() {
    let wait_duration = match WALLET_API_LIMITER.lock() {
        Ok(mut limiter) => limiter.check_and_record(),
        Err(_) => Duration::from_secs(0),
    };

    if wait_duration.as_millis() > 0 {
        tracing::debug!("Wallet API rate limit: waiting {}ms", wait_duration.as_millis());
        tokio::time::sleep(wait_duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_allows_requests_within_limit() {
        let mut limiter = ApiRateLimiter::new(20);

        for _ in 0..20 {
            let wait = limiter.check_and_record();
            assert_eq!(wait.as_millis(), 0);
        }
    }

    #[test]
    fn test_rate_limiter_blocks_over_limit() {
        let mut limiter = ApiRateLimiter::new(3);

        for _ in 0..3 {
            limiter.check_and_record();
        }

        let wait = limiter.check_and_record();
        assert!(wait.as_millis() > 0);
    }

    #[test]
    fn test_zero_limit_is_raised_to_one() {
        let mut limiter = ApiRateLimiter::new(0);
        assert_eq!(limiter.check_and_record().as_millis(), 0);
    }
}
