use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

const WILDCARD: &str = "*";
const FULL_QUALITY: u16 = 1000;

/// Reasons a media range string is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaRangeError {
    #[error("media range is empty")]
    Empty,
    #[error("media range `{0}` is missing a `/` between type and subtype")]
    MissingSubtype(String),
    #[error("media range `{0}` pairs a wildcard type with a concrete subtype")]
    WildcardType(String),
    #[error("media range `{0}` has an invalid quality value")]
    InvalidQuality(String),
}

/// How narrowly a range constrains the media types it accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Specificity {
    /// `*/*`
    AnyType,
    /// `type/*`
    AnySubtype,
    /// `type/subtype`
    Exact,
}

/// A parsed `Content-Type` value or one element of an `Accept` header
///
/// Type, subtype and charset are lower-cased at parse time so comparisons
/// are plain string equality. The quality factor is kept in thousandths
/// (`q=0.5` is `500`) to keep the ordering integral.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaRange {
    kind: String,
    subtype: String,
    charset: Option<String>,
    parameters: Vec<(String, String)>,
    quality: u16,
}

/// Result of matching a [`MediaRange`] against a concrete media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRangeMatch {
    /// The range that accepted the media type
    pub media_range: MediaRange,
    /// Both sides named a charset and they agree
    pub matches_charset: bool,
}

impl MediaRange {
    #[must_use]
    pub fn new(kind: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            kind: kind.into().to_ascii_lowercase(),
            subtype: subtype.into().to_ascii_lowercase(),
            charset: None,
            parameters: Vec::new(),
            quality: FULL_QUALITY,
        }
    }

    /// `*/*`
    #[must_use]
    pub fn any() -> Self {
        Self::new(WILDCARD, WILDCARD)
    }

    #[must_use]
    pub fn json() -> Self {
        Self::new("application", "json")
    }

    #[must_use]
    pub fn grpc() -> Self {
        Self::new("application", "grpc")
    }

    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into().to_ascii_lowercase());
        self
    }

    /// Quality in thousandths, clamped to `1000`
    #[must_use]
    pub fn with_quality(mut self, quality: u16) -> Self {
        self.quality = quality.min(FULL_QUALITY);
        self
    }

    /// Parse a single media range such as `text/html; charset=UTF-8; q=0.8`
    pub fn parse(s: &str) -> Result<Self, MediaRangeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MediaRangeError::Empty);
        }
        let mut parts = s.split(';');
        let essence = parts.next().unwrap_or_default().trim();
        let (kind, subtype) = essence
            .split_once('/')
            .map(|(k, st)| (k.trim(), st.trim()))
            .filter(|(k, st)| !k.is_empty() && !st.is_empty())
            .ok_or_else(|| MediaRangeError::MissingSubtype(s.to_string()))?;
        if kind == WILDCARD && subtype != WILDCARD {
            return Err(MediaRangeError::WildcardType(s.to_string()));
        }

        let mut range = Self::new(kind, subtype);
        for param in parts {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().trim_matches('"');
            match key.as_str() {
                "q" => {
                    range.quality = parse_quality(value)
                        .ok_or_else(|| MediaRangeError::InvalidQuality(s.to_string()))?;
                }
                "charset" => range.charset = Some(value.to_ascii_lowercase()),
                _ => range.parameters.push((key, value.to_string())),
            }
        }
        Ok(range)
    }

    /// Parse a comma-separated header such as `Accept`.
    ///
    /// Elements that fail to parse are skipped; header order is kept.
    #[must_use]
    pub fn parse_list(header: &str) -> Vec<Self> {
        header
            .split(',')
            .filter(|element| !element.trim().is_empty())
            .filter_map(|element| match Self::parse(element) {
                Ok(range) => Some(range),
                Err(err) => {
                    debug!(element = %element.trim(), error = %err, "Skipping malformed media range");
                    None
                }
            })
            .collect()
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Parameters other than `charset` and `q`, in declaration order
    #[must_use]
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// Quality factor in thousandths
    #[must_use]
    pub fn quality(&self) -> u16 {
        self.quality
    }

    /// `type/subtype` without parameters
    #[must_use]
    pub fn essence(&self) -> String {
        format!("{}/{}", self.kind, self.subtype)
    }

    #[must_use]
    pub fn specificity(&self) -> Specificity {
        match (self.kind.as_str(), self.subtype.as_str()) {
            (WILDCARD, _) => Specificity::AnyType,
            (_, WILDCARD) => Specificity::AnySubtype,
            _ => Specificity::Exact,
        }
    }

    /// Order two ranges by specificity; `Less` means `self` is more specific.
    #[must_use]
    pub fn cmp_specificity(&self, other: &Self) -> Ordering {
        other
            .specificity()
            .cmp(&self.specificity())
            .then_with(|| other.charset.is_some().cmp(&self.charset.is_some()))
            .then_with(|| other.parameters.len().cmp(&self.parameters.len()))
            .then_with(|| other.quality.cmp(&self.quality))
    }

    /// Test whether this range accepts `media_type`.
    ///
    /// A range with `q=0` accepts nothing.
    #[must_use]
    pub fn matcher(&self, media_type: &MediaRange) -> Option<MediaRangeMatch> {
        if self.quality == 0 {
            return None;
        }
        let kind_matches = self.kind == WILDCARD || self.kind == media_type.kind;
        let subtype_matches = self.subtype == WILDCARD || self.subtype == media_type.subtype;
        if !(kind_matches && subtype_matches) {
            return None;
        }
        let matches_charset = match (&self.charset, &media_type.charset) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => false,
        };
        Some(MediaRangeMatch {
            media_range: self.clone(),
            matches_charset,
        })
    }
}

impl MediaRangeMatch {
    /// Range specificity first, then a charset match before none.
    #[must_use]
    pub fn cmp_specificity(&self, other: &Self) -> Ordering {
        self.media_range
            .cmp_specificity(&other.media_range)
            .then_with(|| other.matches_charset.cmp(&self.matches_charset))
    }
}

/// Pick the most specific range in `ranges` that accepts `media_type`.
///
/// Equally specific candidates resolve to the one listed first.
#[must_use]
pub fn closest_match(ranges: &[MediaRange], media_type: &MediaRange) -> Option<MediaRangeMatch> {
    ranges
        .iter()
        .filter_map(|range| range.matcher(media_type))
        .min_by(|a, b| a.cmp_specificity(b))
}

impl FromStr for MediaRange {
    type Err = MediaRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MediaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)?;
        if let Some(charset) = &self.charset {
            write!(f, "; charset={charset}")?;
        }
        for (key, value) in &self.parameters {
            write!(f, "; {key}={value}")?;
        }
        if self.quality == 0 {
            write!(f, "; q=0")?;
        } else if self.quality < FULL_QUALITY {
            let q = format!("{:03}", self.quality);
            write!(f, "; q=0.{}", q.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

/// `q` values are `0`, `1`, or a decimal with up to three fraction digits.
fn parse_quality(value: &str) -> Option<u16> {
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if fraction.len() > 3 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let thousandths = format!("{fraction:0<3}").parse::<u16>().ok()?;
    match whole {
        "0" => Some(thousandths),
        "1" if thousandths == 0 => Some(FULL_QUALITY),
        _ => None,
    }
}

#[cfg(test)]
mod quality_tests {
    use super::parse_quality;

    #[test]
    fn test_parse_quality() {
        assert_eq!(parse_quality("1"), Some(1000));
        assert_eq!(parse_quality("1.000"), Some(1000));
        assert_eq!(parse_quality("0.5"), Some(500));
        assert_eq!(parse_quality("0.125"), Some(125));
        assert_eq!(parse_quality("0"), Some(0));
        assert_eq!(parse_quality("1.5"), None);
        assert_eq!(parse_quality("0.1234"), None);
        assert_eq!(parse_quality("high"), None);
    }
}
