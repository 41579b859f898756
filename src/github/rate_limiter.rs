use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{Response, StatusCode};
use tokio::sync::Mutex;

use crate::models::RateLimitCore;

/// Tracks the core request quota as reported by GitHub.
///
/// The quota is seeded by the `/rate_limit` preflight and refreshed from the
/// `x-ratelimit-*` headers of every later response.
pub struct RateLimiter {
    state: Arc<Mutex<RateLimitState>>,
}

#[derive(Debug, Default)]
struct RateLimitState {
    remaining: Option<u32>,
    /// Unix timestamp in seconds.
    reset_at: Option<u64>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RateLimitState::default())),
        }
    }

    pub async fn record(&self, core: &RateLimitCore) {
        let mut state = self.state.lock().await;
        state.remaining = Some(core.remaining);
        state.reset_at = Some(core.reset);
    }

    pub async fn update_from_response(&self, response: &Response) {
        let remaining = header_value::<u32>(response, "x-ratelimit-remaining");
        let reset = header_value::<u64>(response, "x-ratelimit-reset");

        let mut state = self.state.lock().await;
        if remaining.is_some() {
            state.remaining = remaining;
        }
        if reset.is_some() {
            state.reset_at = reset;
        }
    }

    pub async fn remaining(&self) -> Option<u32> {
        self.state.lock().await.remaining
    }

    /// Seconds until the quota window resets, zero if unknown or already past.
    pub async fn seconds_until_reset(&self) -> u64 {
        let reset_at = self.state.lock().await.reset_at;
        reset_at
            .map(|reset| reset.saturating_sub(unix_now()))
            .unwrap_or(0)
    }

    /// A 403/429 is a quota signal only when GitHub also reports zero
    /// remaining requests; other 403s are permission errors.
    pub fn is_quota_exceeded(response: &Response) -> bool {
        let status = response.status();
        if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
            return false;
        }
        status == StatusCode::TOO_MANY_REQUESTS
            || header_value::<u32>(response, "x-ratelimit-remaining") == Some(0)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

fn header_value<T: std::str::FromStr>(response: &Response, name: &str) -> Option<T> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
