use super::{PathPattern, PatternError, SegmentKind};
use std::cmp::Ordering;

fn pattern(template: &str) -> PathPattern {
    PathPattern::parse(template).expect("template compiles")
}

#[test]
fn test_root_path() {
    let p = pattern("/");
    assert!(p.matcher("/").is_some());
    assert!(p.matcher("/users").is_none());
    assert!(p.segment_kinds().next().is_none());
}

#[test]
fn test_parameterized_path() {
    let p = pattern("/items/{id}");
    let m = p.matcher("/items/123").expect("match");
    assert_eq!(m.get("id"), Some("123"));
    assert!(p.matcher("/items/").is_none());
    assert!(p.matcher("/items/1/2").is_none());
}

#[test]
fn test_nested_path() {
    let p = pattern("/a/{b}/c");
    let m = p.matcher("/a/1/c").expect("match");
    assert_eq!(m.get("b"), Some("1"));
    assert_eq!(p.variables().collect::<Vec<_>>(), vec!["b"]);
}

#[test]
fn test_literal_segments_are_escaped() {
    let p = pattern("/v1.0/status");
    assert!(p.matcher("/v1.0/status").is_some());
    assert!(p.matcher("/v1x0/status").is_none());
}

#[test]
fn test_constrained_variable() {
    let p = pattern("/orders/{id:[0-9]+}");
    assert_eq!(
        p.segment_kinds().collect::<Vec<_>>(),
        vec![SegmentKind::Literal, SegmentKind::Constrained]
    );
    assert_eq!(p.matcher("/orders/77").and_then(|m| m.get("id").map(str::to_owned)), Some("77".to_string()));
    assert!(p.matcher("/orders/seventy").is_none());
}

#[test]
fn test_constrained_variable_stays_in_one_segment() {
    let p = pattern("/files/{name:[^.]+}");
    assert_eq!(p.matcher("/files/a").and_then(|m| m.get("name").map(str::to_owned)), Some("a".to_string()));
    assert!(p.matcher("/files/a/b/c").is_none());
    assert!(p.matcher("/files/a.txt").is_none());

    let lazy = pattern("/docs/{slug:.+?}/edit");
    assert!(lazy.matcher("/docs/intro/edit").is_some());
    assert!(lazy.matcher("/docs/guide/intro/edit").is_none());
}

#[test]
fn test_catch_all_captures_remaining_path() {
    let p = pattern("/static/{path:.*}");
    let m = p.matcher("/static/css/site.css").expect("match");
    assert_eq!(m.get("path"), Some("css/site.css"));
    assert_eq!(p.matcher("/static/").and_then(|m| m.get("path").map(str::len)), Some(0));
}

#[test]
fn test_invalid_templates() {
    assert!(matches!(PathPattern::parse("users"), Err(PatternError::NotAbsolute(_))));
    assert!(matches!(
        PathPattern::parse("/users/{id"),
        Err(PatternError::MalformedSegment { .. })
    ));
    assert!(matches!(
        PathPattern::parse("/users/x{id}"),
        Err(PatternError::MalformedSegment { .. })
    ));
    assert!(matches!(
        PathPattern::parse("/a/{id}/b/{id}"),
        Err(PatternError::DuplicateVariable { .. })
    ));
    assert!(matches!(
        PathPattern::parse("/a/{rest:.*}/b"),
        Err(PatternError::CatchAllNotLast { .. })
    ));
    assert!(matches!(
        PathPattern::parse("/a/{id:[0-9}"),
        Err(PatternError::InvalidRegex { .. })
    ));
}

#[test]
fn test_literal_beats_variable() {
    let literal = pattern("/users/me");
    let variable = pattern("/users/{id}");
    assert!(literal.matcher("/users/me").is_some());
    assert!(variable.matcher("/users/me").is_some());
    assert_eq!(literal.cmp_specificity(&variable), Ordering::Less);
    assert_eq!(variable.cmp_specificity(&literal), Ordering::Greater);
}

#[test]
fn test_constrained_beats_plain_variable_beats_catch_all() {
    let constrained = pattern("/files/{id:[0-9]+}");
    let plain = pattern("/files/{name}");
    let catch_all = pattern("/files/{rest:.*}");
    assert_eq!(constrained.cmp_specificity(&plain), Ordering::Less);
    assert_eq!(plain.cmp_specificity(&catch_all), Ordering::Less);
    assert_eq!(constrained.cmp_specificity(&catch_all), Ordering::Less);
}

#[test]
fn test_longer_literal_prefix_wins() {
    let deep = pattern("/api/v1/{rest:.*}");
    let shallow = pattern("/api/{rest:.*}");
    assert_eq!(deep.cmp_specificity(&shallow), Ordering::Less);
}

#[test]
fn test_equally_specific_patterns_tie() {
    let a = pattern("/a/{x}");
    let b = pattern("/a/{y}");
    assert_eq!(a.cmp_specificity(&b), Ordering::Equal);
    assert_ne!(a, b);
}
