//! # Runtime Configuration Module
//!
//! Environment-driven knobs for the dispatch core.
//!
//! ## Environment Variables
//!
//! ### `BRRTD_SLOW_MATCH_US`
//!
//! Candidate selection taking longer than this many microseconds is logged at
//! `warn` level with the number of candidates considered. Accepts decimal or
//! `0x`-prefixed hexadecimal values.
//!
//! Default: `1000` (1 ms)
//!
//! ### `BRRTD_EXPOSE_ERRORS`
//!
//! When `true`, the text of internal errors (failed interceptors, handlers
//! returning the wrong kind of reply) is written into 500 response bodies.
//! Leave it off in production: the body then only says
//! `"Internal Server Error"` and the detail goes to the log.
//!
//! Default: `false`
//!
//! ## Usage
//!
//! ```rust
//! use brrtdispatch::runtime_config::DispatchConfig;
//!
//! let config = DispatchConfig::from_env();
//! println!("slow match threshold: {:?}", config.slow_match_threshold);
//! ```

use std::env;
use std::time::Duration;

const DEFAULT_SLOW_MATCH_US: u64 = 1_000;

/// Dispatcher configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Candidate selection slower than this is logged as a warning
    pub slow_match_threshold: Duration,
    /// Write internal error details into 500 bodies
    pub expose_internal_errors: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            slow_match_threshold: Duration::from_micros(DEFAULT_SLOW_MATCH_US),
            expose_internal_errors: false,
        }
    }
}

impl DispatchConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let slow_match_us = env::var("BRRTD_SLOW_MATCH_US")
            .ok()
            .and_then(|val| parse_number(&val))
            .unwrap_or(DEFAULT_SLOW_MATCH_US);
        let expose_internal_errors = env::var("BRRTD_EXPOSE_ERRORS")
            .ok()
            .and_then(|val| val.trim().parse().ok())
            .unwrap_or(false);
        DispatchConfig {
            slow_match_threshold: Duration::from_micros(slow_match_us),
            expose_internal_errors,
        }
    }
}

fn parse_number(val: &str) -> Option<u64> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}
