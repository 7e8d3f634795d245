//! # Media Module
//!
//! Content negotiation primitives: parsing `Content-Type` and `Accept`
//! headers into [`MediaRange`] values and picking the closest range for a
//! concrete media type.
//!
//! ## Specificity
//!
//! Ranges are ranked, most specific first, by:
//!
//! 1. wildcard shape: `type/subtype` before `type/*` before `*/*`
//! 2. an explicit `charset` parameter before none
//! 3. more parameters before fewer
//! 4. higher `q` value before lower
//!
//! Two ranges that agree on all four compare equal even if they name
//! different types; callers that need a winner take the first minimum.
//!
//! ## Example
//!
//! ```rust
//! use brrtdispatch::media::{closest_match, MediaRange};
//!
//! let accepted = MediaRange::parse_list("text/*;q=0.5, application/json");
//! let content_type: MediaRange = "application/json; charset=utf-8".parse().unwrap();
//!
//! let best = closest_match(&accepted, &content_type).unwrap();
//! assert_eq!(best.media_range.essence(), "application/json");
//! assert!(!best.matches_charset);
//! ```

mod range;

pub use range::{closest_match, MediaRange, MediaRangeError, MediaRangeMatch, Specificity};
