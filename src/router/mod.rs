//! # Router Module
//!
//! Path templates and their compiled matchers.
//!
//! ## Overview
//!
//! Every action declares a path template. At bind time the template is
//! compiled into a [`PathPattern`]: a regex plus a description of each
//! segment that is used to rank patterns against one another when several
//! of them accept the same URL.
//!
//! Supported template syntax:
//!
//! | Segment            | Matches                                   |
//! |--------------------|-------------------------------------------|
//! | `users`            | exactly `users`                           |
//! | `{id}`             | any single non-empty segment              |
//! | `{id:[0-9]+}`      | a single segment matching the given regex |
//! | `{rest:.*}`        | everything to the end of the path         |
//!
//! ## Example
//!
//! ```rust
//! use brrtdispatch::router::PathPattern;
//!
//! let pattern = PathPattern::parse("/users/{id}/posts/{post_id}").unwrap();
//! let matched = pattern.matcher("/users/42/posts/abc").unwrap();
//! assert_eq!(matched.get("id"), Some("42"));
//! assert_eq!(matched.get("post_id"), Some("abc"));
//! ```
//!
//! ## Specificity
//!
//! Patterns are compared segment by segment: a literal beats a constrained
//! variable, which beats a plain variable, which beats a catch-all. When the
//! shared prefix ties, the pattern with more segments wins, then the one with
//! more literal characters. See [`PathPattern::cmp_specificity`].

mod pattern;
#[cfg(test)]
mod tests;

pub use pattern::{ParamVec, PathMatch, PathPattern, PatternError, SegmentKind, MAX_INLINE_PARAMS};
