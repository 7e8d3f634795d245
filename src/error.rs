//! Error types for binding and dispatch

use thiserror::Error;

use crate::media::MediaRangeError;
use crate::router::PatternError;

/// Startup-time failures turning an [`Action`](crate::action::Action) into a
/// [`BoundAction`](crate::dispatcher::BoundAction). The service must not
/// start with any of these outstanding.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("action `{action}` has an invalid path: {source}")]
    Pattern {
        action: String,
        #[source]
        source: PatternError,
    },

    #[error("no parameter extractor applies to `{parameter}` of action `{action}`")]
    NoExtractor { action: String, parameter: String },

    #[error("parameter `{parameter}` of action `{action}` is claimed by several extractors: {}", .factories.join(", "))]
    AmbiguousExtractor {
        action: String,
        parameter: String,
        factories: Vec<&'static str>,
    },

    #[error("action `{0}` is declared more than once")]
    DuplicateAction(String),
}

/// Request-time failures producing a handler argument
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("missing required {source_kind} parameter `{name}`")]
    Missing {
        source_kind: &'static str,
        name: String,
    },

    #[error("{source_kind} parameter `{name}` expected {expected}, got `{value}`")]
    InvalidValue {
        source_kind: &'static str,
        name: String,
        expected: &'static str,
        value: String,
    },

    #[error("request body for `{name}` is invalid: {reason}")]
    InvalidBody { name: String, reason: String },
}

/// Failures dispatching a single request
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no action matches {method} {path}")]
    NoMatchingAction { method: String, path: String },

    #[error("bad request: {0}")]
    BadRequest(#[from] ExtractError),

    /// The application chain of an HTTP or gRPC action produced something
    /// that cannot be written as a response body. This is a programming
    /// error in the action, not a client fault.
    #[error("action `{action}` returned a {kind}, which is not a response body")]
    InvalidResponseBody { action: String, kind: &'static str },

    /// The application chain of a WebSocket action did not produce a
    /// listener.
    #[error("websocket action `{action}` returned a {kind} instead of a listener")]
    NotAWebSocketListener { action: String, kind: &'static str },

    /// An interceptor or handler failed; nothing inside the chain caught it.
    #[error("action `{action}` failed: {error:#}")]
    Handler {
        action: String,
        error: anyhow::Error,
    },
}

impl DispatchError {
    /// HTTP status reported to the client
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::NoMatchingAction { .. } => 404,
            DispatchError::BadRequest(_) => 400,
            DispatchError::InvalidResponseBody { .. }
            | DispatchError::NotAWebSocketListener { .. }
            | DispatchError::Handler { .. } => 500,
        }
    }

    /// Programming errors in an action's wiring; never retried.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DispatchError::InvalidResponseBody { .. } | DispatchError::NotAWebSocketListener { .. }
        )
    }

    /// Recover a typed error that crossed an `anyhow` interceptor boundary.
    pub(crate) fn from_chain(action: &str, error: anyhow::Error) -> Self {
        let error = match error.downcast::<DispatchError>() {
            Ok(dispatch) => return dispatch,
            Err(other) => other,
        };
        match error.downcast::<ExtractError>() {
            Ok(extract) => DispatchError::BadRequest(extract),
            Err(other) => DispatchError::Handler {
                action: action.to_string(),
                error: other,
            },
        }
    }
}

/// Failures loading a route manifest or binding it to handlers
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("action `{action}` has invalid method `{method}`")]
    InvalidMethod { action: String, method: String },

    #[error("action `{action}` has invalid media type `{value}`: {source}")]
    InvalidMediaType {
        action: String,
        value: String,
        #[source]
        source: MediaRangeError,
    },

    #[error("action `{action}` uses unregistered handler `{handler}`")]
    UnknownHandler { action: String, handler: String },

    #[error(transparent)]
    Bind(#[from] BindError),
}
