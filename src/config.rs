use std::env;
use std::ops::RangeInclusive;

use crate::services::booking::BookingConfig;
use crate::services::outreach::OutreachConfig;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub cors_origin: Option<String>,
    pub deepgram_api_key: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub google_maps_api_key: String,
    pub fast_demo: bool,
    pub outreach_success_rate: f64,
    pub outreach_max_attempts: u32,
    pub booking_success_rate: f64,
    pub rate_limit_max: u64,
    pub rate_limit_window_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parse_var("PORT").unwrap_or(3001),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "gaspar.db".to_string()),
            cors_origin: env::var("CORS_ORIGIN").ok().filter(|v| !v.is_empty()),
            deepgram_api_key: env::var("DEEPGRAM_API_KEY").unwrap_or_default(),
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            google_maps_api_key: env::var("GOOGLE_MAPS_API_KEY").unwrap_or_default(),
            fast_demo: env::var("FAST_DEMO")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            outreach_success_rate: parse_var("OUTREACH_SUCCESS_RATE")
                .map(|r: f64| r.clamp(0.0, 1.0))
                .unwrap_or(0.8),
            outreach_max_attempts: parse_var("OUTREACH_MAX_ATTEMPTS").unwrap_or(3),
            booking_success_rate: parse_var("BOOKING_SUCCESS_RATE")
                .map(|r: f64| r.clamp(0.0, 1.0))
                .unwrap_or(0.85),
            rate_limit_max: parse_var("RATE_LIMIT_MAX").unwrap_or(60),
            rate_limit_window_secs: parse_var("RATE_LIMIT_WINDOW_SECS").unwrap_or(60),
        }
    }

    pub fn outreach(&self) -> OutreachConfig {
        OutreachConfig {
            fast_demo: self.fast_demo,
            success_rate: self.outreach_success_rate,
            max_attempts: self.outreach_max_attempts,
            ..OutreachConfig::default()
        }
    }

    pub fn booking(&self) -> BookingConfig {
        BookingConfig {
            fast_demo: self.fast_demo,
            success_rate: self.booking_success_rate,
            ..BookingConfig::default()
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Scales a delay range down for fast demo runs.
pub fn demo_delay(range: &RangeInclusive<u64>, fast_demo: bool) -> RangeInclusive<u64> {
    if fast_demo {
        (range.start() / 10)..=(range.end() / 10)
    } else {
        range.clone()
    }
}
