use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::request::HeaderVec;
use super::websocket::WebSocketListener;

/// A response body the transport knows how to write
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Text(String),
    Json(Value),
    Bytes(Vec<u8>),
}

impl Body {
    /// Content type implied by the body variant
    #[must_use]
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Body::Empty => None,
            Body::Text(_) => Some("text/plain; charset=utf-8"),
            Body::Json(_) => Some("application/json"),
            Body::Bytes(_) => Some("application/octet-stream"),
        }
    }

    /// Serialized bytes for the transport
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Body::Empty => Vec::new(),
            Body::Text(s) => s.clone().into_bytes(),
            Body::Json(v) => v.to_string().into_bytes(),
            Body::Bytes(b) => b.clone(),
        }
    }
}

/// A response ready for the transport
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// Response headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Trailing metadata, written after the body (gRPC status lives here)
    pub trailers: HeaderVec,
    pub body: Body,
}

impl Response {
    /// Create a new response; a `content-type` header is added from the body
    /// when one is implied.
    #[must_use]
    pub fn new(status: u16, body: Body) -> Self {
        let mut headers = HeaderVec::new();
        if let Some(content_type) = body.content_type() {
            headers.push((Arc::from("content-type"), content_type.to_string()));
        }
        Self {
            status,
            headers,
            trailers: HeaderVec::new(),
            body,
        }
    }

    /// Create a JSON response
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self::new(status, Body::Json(body))
    }

    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, Body::Text(body.into()))
    }

    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self::new(status, Body::Empty)
    }

    /// Create an error response: `{"error": message}`
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        find(&self.headers, name)
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        replace(&mut self.headers, name, value.into());
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    #[inline]
    #[must_use]
    pub fn get_trailer(&self, name: &str) -> Option<&str> {
        find(&self.trailers, name)
    }

    /// Add or replace a trailer
    pub fn set_trailer(&mut self, name: &str, value: impl Into<String>) {
        replace(&mut self.trailers, name, value.into());
    }
}

fn find<'a>(headers: &'a HeaderVec, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn replace(headers: &mut HeaderVec, name: &str, value: String) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((Arc::from(name), value));
}

/// What the application chain produced
///
/// HTTP and gRPC actions must reply with a [`Response`] or a raw JSON value;
/// WebSocket actions must reply with a listener.
#[derive(Clone)]
pub enum Reply {
    Response(Response),
    Value(Value),
    Listener(Arc<dyn WebSocketListener>),
}

impl Reply {
    /// Name of the variant, for diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Response(_) => "response",
            Reply::Value(_) => "value",
            Reply::Listener(_) => "websocket listener",
        }
    }

    /// Wrap a raw value as `200 application/json`; pass a response through
    /// untouched. Returns `Err(self)` for replies that cannot be written as a
    /// response body.
    pub fn into_response(self) -> Result<Response, Reply> {
        match self {
            Reply::Response(response) => Ok(response),
            Reply::Value(value) => Ok(Response::json(200, value)),
            other => Err(other),
        }
    }

    pub fn into_listener(self) -> Result<Arc<dyn WebSocketListener>, Reply> {
        match self {
            Reply::Listener(listener) => Ok(listener),
            other => Err(other),
        }
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Response(response)
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Value(value)
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Response(response) => f.debug_tuple("Response").field(response).finish(),
            Reply::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Reply::Listener(_) => f.write_str("Listener(..)"),
        }
    }
}
