use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

/// Fixed-window request limiter keyed by client.
pub struct RateLimiter {
    max_requests: u64,
    window_secs: u64,
    windows: Mutex<HashMap<String, (Instant, u64)>>,
}

impl RateLimiter {
    pub fn new(max_requests: u64, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Counts a request for `key`, failing once the window is full.
    pub fn check_and_increment(&self, key: &str) -> Result<(), String> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), String> {
        let mut windows = self
            .windows
            .lock()
            .map_err(|_| "rate limiter unavailable".to_string())?;

        let entry = windows.entry(key.to_string()).or_insert((now, 0));
        if now.duration_since(entry.0).as_secs() >= self.window_secs {
            *entry = (now, 0);
        }

        if entry.1 >= self.max_requests {
            return Err(format!(
                "{} requests per {} seconds",
                self.max_requests, self.window_secs
            ));
        }

        entry.1 += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_rate_limiter() {
        let limiter = RateLimiter::new(2, 60);
        assert!(limiter.check_and_increment("a").is_ok());
        assert!(limiter.check_and_increment("a").is_ok());
        assert!(limiter.check_and_increment("a").is_err());
        assert!(limiter.check_and_increment("b").is_ok());
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(1, 60);
        let start = Instant::now();
        assert!(limiter.check_at("a", start).is_ok());
        assert!(limiter.check_at("a", start + Duration::from_secs(30)).is_err());
        assert!(limiter.check_at("a", start + Duration::from_secs(61)).is_ok());
    }
}
