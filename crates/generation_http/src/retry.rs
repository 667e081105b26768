use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

/// Default retry attempts after an initial request attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Default base delay before the first retry.
pub const BASE_DELAY_MS: u64 = 250;

fn retryable_text_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?i)rate.?limit|overloaded|service.?unavailable|upstream.?connect|connection.?refused")
            .expect("retry regex must compile")
    })
}

/// Status/body retry policy for transient HTTP failures.
pub fn is_retryable_http_error(status: u16, body: &str) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504) || retryable_text_regex().is_match(body)
}

/// Exponential backoff delay for a retry attempt.
pub fn retry_delay(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.min(16);
    base.saturating_mul(2u32.saturating_pow(exponent))
}
