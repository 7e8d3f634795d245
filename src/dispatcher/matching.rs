use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::media::MediaRange;
use crate::router::{PathMatch, PathPattern};

/// How well one action fits one request.
///
/// Ordered so that the best candidate is the minimum:
///
/// 1. path pattern specificity
/// 2. specificity of the accepted range that matched the request body
/// 3. specificity of the client's Accept range that matched the response type
/// 4. a request charset match before none
///
/// Matches equal on all four compare `Equal` even when they belong to
/// different actions.
#[derive(Debug, Clone, Serialize)]
pub struct RequestMatch {
    #[serde(serialize_with = "serialize_pattern")]
    pub path_pattern: Arc<PathPattern>,
    #[serde(rename = "path_params", serialize_with = "serialize_params")]
    pub path_match: PathMatch,
    /// `*/*` when the request carried no content type
    #[serde(serialize_with = "serialize_range")]
    pub accepted_media_range: MediaRange,
    pub request_charset_match: bool,
    /// `*/*` when the action declares no response type
    #[serde(serialize_with = "serialize_range")]
    pub response_content_type: MediaRange,
}

impl RequestMatch {
    /// Path variables captured for this match
    #[must_use]
    pub fn params(&self) -> &PathMatch {
        &self.path_match
    }
}

impl Ord for RequestMatch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path_pattern
            .cmp_specificity(&other.path_pattern)
            .then_with(|| {
                other
                    .accepted_media_range
                    .specificity()
                    .cmp(&self.accepted_media_range.specificity())
            })
            .then_with(|| {
                other
                    .response_content_type
                    .specificity()
                    .cmp(&self.response_content_type.specificity())
            })
            .then_with(|| other.request_charset_match.cmp(&self.request_charset_match))
    }
}

impl PartialOrd for RequestMatch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RequestMatch {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RequestMatch {}

fn serialize_pattern<S: serde::Serializer>(
    pattern: &Arc<PathPattern>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(pattern)
}

fn serialize_params<S: serde::Serializer>(
    path_match: &PathMatch,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(path_match.params().iter().map(|(k, v)| (k.as_ref(), v)))
}

fn serialize_range<S: serde::Serializer>(
    range: &MediaRange,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(template: &str, path: &str, accepted: MediaRange, charset: bool) -> RequestMatch {
        let pattern = Arc::new(PathPattern::parse(template).expect("template compiles"));
        let path_match = pattern.matcher(path).expect("path matches");
        RequestMatch {
            path_pattern: pattern,
            path_match,
            accepted_media_range: accepted,
            request_charset_match: charset,
            response_content_type: MediaRange::any(),
        }
    }

    #[test]
    fn test_literal_path_ranks_first() {
        let literal = candidate("/users/me", "/users/me", MediaRange::any(), false);
        let variable = candidate("/users/{id}", "/users/me", MediaRange::any(), false);
        assert!(literal < variable);
        assert_eq!(variable.params().get("id"), Some("me"));
    }

    #[test]
    fn test_media_range_breaks_path_tie() {
        let exact = candidate("/upload", "/upload", MediaRange::json(), false);
        let subtype = candidate("/upload", "/upload", MediaRange::new("application", "*"), false);
        let any = candidate("/upload", "/upload", MediaRange::any(), false);
        assert!(exact < subtype);
        assert!(subtype < any);
        assert!(exact < any);
    }

    #[test]
    fn test_path_outranks_media_range() {
        let literal_any = candidate("/upload/raw", "/upload/raw", MediaRange::any(), false);
        let variable_exact = candidate("/upload/{kind}", "/upload/raw", MediaRange::json(), true);
        assert!(literal_any < variable_exact);
    }

    #[test]
    fn test_charset_match_is_last_criterion() {
        let with = candidate("/a", "/a", MediaRange::json(), true);
        let without = candidate("/a", "/a", MediaRange::json(), false);
        assert!(with < without);
    }

    #[test]
    fn test_response_type_specificity() {
        let mut specific = candidate("/a", "/a", MediaRange::any(), false);
        specific.response_content_type = MediaRange::json();
        let generic = candidate("/a", "/a", MediaRange::any(), false);
        assert!(specific < generic);
    }

    #[test]
    fn test_identical_criteria_compare_equal() {
        let a = candidate("/items/{id}", "/items/1", MediaRange::any(), false);
        let b = candidate("/items/{key}", "/items/1", MediaRange::any(), false);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }
}
