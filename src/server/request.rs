use http::Method;
use smallvec::SmallVec;
use std::sync::Arc;

use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::media::MediaRange;
use crate::router::ParamVec;

/// Maximum inline headers/cookies before heap allocation
/// Most requests have ≤16 headers (JSF: no heap in hot path)
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header/cookie storage for the hot path
///
/// Header names use `Arc<str>` so that the common ones (`content-type`,
/// `accept`, ...) can be shared instead of copied.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// An inbound request as handed over by the transport
///
/// The transport fills in method, target, headers and body; the query
/// string and cookies are parsed once here so extractors can read them
/// without re-parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// Raw query string (without the leading `?`)
    pub query: Option<String>,
    /// Query string parameters (stack-allocated for ≤8 params)
    pub query_params: ParamVec,
    /// HTTP headers, names lower-cased
    pub headers: HeaderVec,
    /// Cookies parsed from the Cookie header
    pub cookies: HeaderVec,
    /// Raw request body
    pub body: Vec<u8>,
}

impl Request {
    /// Build a request from a method and a request target such as
    /// `/users/42?verbose=true`.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (target, None),
        };
        let query_params = query.as_deref().map(parse_query_params).unwrap_or_default();
        Self {
            request_id: RequestId::new(),
            method,
            path: path.to_string(),
            query,
            query_params,
            headers: HeaderVec::new(),
            cookies: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(target: &str) -> Self {
        Self::new(Method::GET, target)
    }

    #[must_use]
    pub fn post(target: &str) -> Self {
        Self::new(Method::POST, target)
    }

    /// Append a header.
    ///
    /// `cookie` headers are also parsed into [`Request::cookies`] and an
    /// `x-request-id` header replaces the generated request id when valid.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        if name == "cookie" {
            self.cookies.extend(parse_cookies(&value));
        } else if name == REQUEST_ID_HEADER {
            self.request_id = RequestId::from_header_or_new(Some(&value));
        }
        self.headers.push((Arc::from(name), value));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body and matching content type
    #[must_use]
    pub fn with_json(self, body: &serde_json::Value) -> Self {
        self.with_header("content-type", "application/json")
            .with_body(body.to_string())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name
    ///
    /// Uses "last write wins" semantics: if duplicate query parameter names exist
    /// (e.g., `?limit=10&limit=20`), returns the last occurrence.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value of a repeated query parameter, in order
    pub fn get_query_params<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query_params
            .iter()
            .filter(move |(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a cookie by name
    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parsed `Content-Type`, `None` when absent or malformed
    #[must_use]
    pub fn content_type(&self) -> Option<MediaRange> {
        self.get_header("content-type")
            .and_then(|value| MediaRange::parse(value).ok())
    }

    /// Parsed `Accept` ranges; an absent or empty header means `*/*`
    #[must_use]
    pub fn accepted_media_ranges(&self) -> Vec<MediaRange> {
        let ranges = self
            .get_header("accept")
            .map(MediaRange::parse_list)
            .unwrap_or_default();
        if ranges.is_empty() {
            vec![MediaRange::any()]
        } else {
            ranges
        }
    }
}

/// Parse a `Cookie` header value into name/value pairs.
#[must_use]
pub fn parse_cookies(header: &str) -> HeaderVec {
    header
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim().to_string();
            Some((Arc::from(name), value))
        })
        .collect()
}

/// Parse a query string (without the leading `?`), URL-decoding names and
/// values. Repeated names are kept in order.
#[must_use]
pub fn parse_query_params(query: &str) -> ParamVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}
