//! Path pattern compilation - part of the request hot path.
//!
//! # JSF Compliance (Rule 206)
//!
//! Matching runs once per candidate action per request. All allocation
//! (regex compilation, capture group names) happens in [`PathPattern::parse`]
//! at bind time; [`PathPattern::matcher`] only allocates the captured values.

// JSF Rule 206: Deny heap allocations in the hot path
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use regex::Regex;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Maximum number of path/query parameters before heap allocation.
/// Most REST APIs have ≤4 path params (e.g., /users/{id}/posts/{postId}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names are `Arc<str>` shared with the compiled pattern (known at
/// startup); values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Reasons a path template fails to compile
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("path template `{0}` must start with `/`")]
    NotAbsolute(String),
    #[error("path template `{template}` has a malformed segment `{segment}`")]
    MalformedSegment { template: String, segment: String },
    #[error("path template `{template}` declares `{name}` more than once")]
    DuplicateVariable { template: String, name: String },
    #[error("path template `{template}`: catch-all `{name}` must be the last segment")]
    CatchAllNotLast { template: String, name: String },
    #[error("path template `{template}` does not compile: {reason}")]
    InvalidRegex { template: String, reason: String },
}

/// Shape of one template segment, ordered most specific first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SegmentKind {
    /// `users`
    Literal,
    /// `{id:[0-9]+}`
    Constrained,
    /// `{id}`
    Variable,
    /// `{rest:.*}`
    CatchAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    kind: SegmentKind,
    literal_len: usize,
}

#[derive(Debug, Clone)]
struct Variable {
    name: Arc<str>,
    group: String,
    /// Only catch-alls may capture across `/`
    multi_segment: bool,
}

/// A compiled path template
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
    variables: Vec<Variable>,
    segments: Vec<Segment>,
}

/// Variables captured by a successful [`PathPattern::matcher`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMatch {
    params: ParamVec,
}

impl PathMatch {
    /// Get a captured variable by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn params(&self) -> &ParamVec {
        &self.params
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl PathPattern {
    /// Compile a path template.
    ///
    /// Empty segments are ignored, so `/users/` and `/users` compile to the
    /// same matcher.
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        if !template.starts_with('/') {
            return Err(PatternError::NotAbsolute(template.to_string()));
        }

        let raw: Vec<&str> = template.split('/').filter(|s| !s.is_empty()).collect();
        let mut pattern = String::with_capacity(template.len() + 16);
        pattern.push('^');
        let mut variables: Vec<Variable> = Vec::with_capacity(template.matches('{').count());
        let mut segments = Vec::with_capacity(raw.len());

        for (index, segment) in raw.iter().enumerate() {
            let malformed = || PatternError::MalformedSegment {
                template: template.to_string(),
                segment: (*segment).to_string(),
            };

            let Some(inner) = segment.strip_prefix('{') else {
                if segment.contains('{') || segment.contains('}') {
                    return Err(malformed());
                }
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
                segments.push(Segment {
                    kind: SegmentKind::Literal,
                    literal_len: segment.len(),
                });
                continue;
            };

            let inner = inner.strip_suffix('}').ok_or_else(malformed)?;
            let (name, constraint) = match inner.split_once(':') {
                Some((name, constraint)) => (name.trim(), Some(constraint.trim())),
                None => (inner.trim(), None),
            };
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(malformed());
            }
            if variables.iter().any(|v| v.name.as_ref() == name) {
                return Err(PatternError::DuplicateVariable {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }

            let kind = match constraint {
                None => SegmentKind::Variable,
                Some("") => return Err(malformed()),
                Some(".*") | Some(".+") => SegmentKind::CatchAll,
                Some(_) => SegmentKind::Constrained,
            };
            if kind == SegmentKind::CatchAll && index + 1 != raw.len() {
                return Err(PatternError::CatchAllNotLast {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }

            let group = format!("v{}", variables.len());
            pattern.push_str("/(?P<");
            pattern.push_str(&group);
            pattern.push('>');
            pattern.push_str(constraint.unwrap_or("[^/]+"));
            pattern.push(')');

            variables.push(Variable {
                name: Arc::from(name),
                group,
                multi_segment: kind == SegmentKind::CatchAll,
            });
            segments.push(Segment {
                kind,
                literal_len: 0,
            });
        }

        if segments.is_empty() {
            pattern.push('/');
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|err| PatternError::InvalidRegex {
            template: template.to_string(),
            reason: err.to_string(),
        })?;

        Ok(Self {
            source: template.to_string(),
            regex,
            variables,
            segments,
        })
    }

    /// Match a request path (without query string) against the pattern.
    ///
    /// A constraint such as `{name:[^.]+}` can match `/` at the regex level;
    /// such captures are rejected so every non-catch-all variable stays
    /// within one segment.
    #[must_use]
    pub fn matcher(&self, path: &str) -> Option<PathMatch> {
        let captures = self.regex.captures(path)?;
        let mut params = ParamVec::with_capacity(self.variables.len());
        for var in &self.variables {
            let value = captures.name(&var.group).map_or("", |m| m.as_str());
            if !var.multi_segment && value.contains('/') {
                return None;
            }
            params.push((Arc::clone(&var.name), value.to_owned()));
        }
        Some(PathMatch { params })
    }

    /// The template this pattern was compiled from
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Declared variable names in template order
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_ref())
    }

    #[must_use]
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v.name.as_ref() == name)
    }

    /// Segment shapes in template order
    pub fn segment_kinds(&self) -> impl Iterator<Item = SegmentKind> + '_ {
        self.segments.iter().map(|s| s.kind)
    }

    fn literal_len(&self) -> usize {
        self.segments.iter().map(|s| s.literal_len).sum()
    }

    /// Order two patterns by specificity; `Less` means `self` is more specific.
    ///
    /// Patterns that tie on every criterion compare `Equal` even when their
    /// templates differ (`/a/{x}` and `/a/{y}`).
    #[must_use]
    pub fn cmp_specificity(&self, other: &Self) -> Ordering {
        for (ours, theirs) in self.segment_kinds().zip(other.segment_kinds()) {
            match ours.cmp(&theirs) {
                Ordering::Equal => {}
                decided => return decided,
            }
        }
        other
            .segments
            .len()
            .cmp(&self.segments.len())
            .then_with(|| other.literal_len().cmp(&self.literal_len()))
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for PathPattern {}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
