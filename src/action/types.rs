use http::Method;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::media::MediaRange;
use crate::server::Request;

/// The transport protocol class an action serves
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DispatchMechanism {
    /// Plain HTTP with the given method
    Http(Method),
    /// gRPC over HTTP/2 (`POST` with an `application/grpc` body)
    Grpc,
    /// WebSocket upgrade (`GET` with `Upgrade: websocket`)
    WebSocket,
}

impl DispatchMechanism {
    /// Classify an inbound request.
    #[must_use]
    pub fn for_request(request: &Request) -> Self {
        let upgrade = request
            .get_header("upgrade")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("websocket"));
        if request.method == Method::GET && upgrade {
            return DispatchMechanism::WebSocket;
        }
        let grpc = request
            .content_type()
            .is_some_and(|ct| ct.kind() == "application" && ct.subtype().starts_with("grpc"));
        if request.method == Method::POST && grpc {
            return DispatchMechanism::Grpc;
        }
        DispatchMechanism::Http(request.method.clone())
    }
}

impl fmt::Display for DispatchMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMechanism::Http(method) => write!(f, "{method}"),
            DispatchMechanism::Grpc => f.write_str("GRPC"),
            DispatchMechanism::WebSocket => f.write_str("WEBSOCKET"),
        }
    }
}

impl Serialize for DispatchMechanism {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Declared value type of a parameter; drives decoding of raw strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    String,
    Integer,
    Number,
    Boolean,
    /// Arbitrary JSON
    Json,
    /// Repeated or comma-separated strings
    StringList,
}

/// Where a parameter value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterSource {
    Path,
    Query,
    Header,
    Cookie,
    Body,
    RequestPath,
}

impl fmt::Display for ParameterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParameterSource::Path => "path",
            ParameterSource::Query => "query",
            ParameterSource::Header => "header",
            ParameterSource::Cookie => "cookie",
            ParameterSource::Body => "body",
            ParameterSource::RequestPath => "request_path",
        };
        f.write_str(s)
    }
}

/// Metadata attached to a parameter declaration.
///
/// The optional string on the named sources overrides the lookup name
/// (`Query(Some("page_size"))` on a parameter called `limit`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterTag {
    Path(Option<String>),
    Query(Option<String>),
    Header(Option<String>),
    Cookie(Option<String>),
    Body,
    RequestPath,
    /// Free-form marker for user supplied extractor factories
    Custom(String),
}

impl ParameterTag {
    #[must_use]
    pub fn source(&self) -> Option<ParameterSource> {
        match self {
            ParameterTag::Path(_) => Some(ParameterSource::Path),
            ParameterTag::Query(_) => Some(ParameterSource::Query),
            ParameterTag::Header(_) => Some(ParameterSource::Header),
            ParameterTag::Cookie(_) => Some(ParameterSource::Cookie),
            ParameterTag::Body => Some(ParameterSource::Body),
            ParameterTag::RequestPath => Some(ParameterSource::RequestPath),
            ParameterTag::Custom(_) => None,
        }
    }

    #[must_use]
    pub fn rename(&self) -> Option<&str> {
        match self {
            ParameterTag::Path(name)
            | ParameterTag::Query(name)
            | ParameterTag::Header(name)
            | ParameterTag::Cookie(name) => name.as_deref(),
            _ => None,
        }
    }
}

/// One declared handler parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub type_tag: TypeTag,
    pub tags: Vec<ParameterTag>,
    /// Missing values are a bad request unless a default is set
    pub required: bool,
    pub default: Option<Value>,
}

impl ParameterDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
            tags: Vec::new(),
            required: true,
            default: None,
        }
    }

    #[must_use]
    pub fn tag(mut self, tag: ParameterTag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Missing values become `null` instead of failing the request
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// First tag reading from `source`
    #[must_use]
    pub fn tag_for(&self, source: ParameterSource) -> Option<&ParameterTag> {
        self.tags.iter().find(|t| t.source() == Some(source))
    }

    /// Name to look the value up under for `source`: the tag's rename if
    /// any, else the parameter name.
    #[must_use]
    pub fn lookup_name(&self, source: ParameterSource) -> Option<&str> {
        self.tag_for(source)
            .map(|tag| tag.rename().unwrap_or(&self.name))
    }

    #[must_use]
    pub fn has_custom_tag(&self, marker: &str) -> bool {
        self.tags
            .iter()
            .any(|t| matches!(t, ParameterTag::Custom(m) if m == marker))
    }

    /// Sources named by this parameter's tags, in declaration order
    #[must_use]
    pub fn sources(&self) -> Vec<ParameterSource> {
        self.tags.iter().filter_map(ParameterTag::source).collect()
    }
}

/// Immutable declaration of one dispatchable endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    name: String,
    path: String,
    parameters: Vec<ParameterDescriptor>,
    accepted_media_ranges: Vec<MediaRange>,
    response_content_type: Option<MediaRange>,
    dispatch_mechanism: DispatchMechanism,
}

impl Action {
    #[must_use]
    pub fn builder(name: impl Into<String>, path: impl Into<String>) -> ActionBuilder {
        ActionBuilder {
            name: name.into(),
            path: path.into(),
            parameters: Vec::new(),
            accepted_media_ranges: Vec::new(),
            response_content_type: None,
            dispatch_mechanism: DispatchMechanism::Http(Method::GET),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path template, e.g. `/users/{id}`
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// Request body types this action accepts, most specific first
    #[must_use]
    pub fn accepted_media_ranges(&self) -> &[MediaRange] {
        &self.accepted_media_ranges
    }

    #[must_use]
    pub fn response_content_type(&self) -> Option<&MediaRange> {
        self.response_content_type.as_ref()
    }

    #[must_use]
    pub fn dispatch_mechanism(&self) -> &DispatchMechanism {
        &self.dispatch_mechanism
    }
}

/// Builder for [`Action`]
#[derive(Debug, Clone)]
pub struct ActionBuilder {
    name: String,
    path: String,
    parameters: Vec<ParameterDescriptor>,
    accepted_media_ranges: Vec<MediaRange>,
    response_content_type: Option<MediaRange>,
    dispatch_mechanism: DispatchMechanism,
}

impl ActionBuilder {
    /// Defaults to `Http(GET)`
    #[must_use]
    pub fn mechanism(mut self, mechanism: DispatchMechanism) -> Self {
        self.dispatch_mechanism = mechanism;
        self
    }

    #[must_use]
    pub fn method(self, method: Method) -> Self {
        self.mechanism(DispatchMechanism::Http(method))
    }

    #[must_use]
    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn accepts(mut self, range: MediaRange) -> Self {
        self.accepted_media_ranges.push(range);
        self
    }

    #[must_use]
    pub fn produces(mut self, content_type: MediaRange) -> Self {
        self.response_content_type = Some(content_type);
        self
    }

    /// Finish the declaration.
    ///
    /// Accepted ranges are sorted most specific first (stable). gRPC actions
    /// that declare no media types accept `application/grpc` and its
    /// `+proto`/`+json` codec variants, and produce `application/grpc`.
    #[must_use]
    pub fn build(mut self) -> Action {
        if self.dispatch_mechanism == DispatchMechanism::Grpc {
            if self.accepted_media_ranges.is_empty() {
                self.accepted_media_ranges.extend([
                    MediaRange::grpc(),
                    MediaRange::new("application", "grpc+proto"),
                    MediaRange::new("application", "grpc+json"),
                ]);
            }
            if self.response_content_type.is_none() {
                self.response_content_type = Some(MediaRange::grpc());
            }
        }
        self.accepted_media_ranges.sort_by(|a, b| a.cmp_specificity(b));
        Action {
            name: self.name,
            path: self.path,
            parameters: self.parameters,
            accepted_media_ranges: self.accepted_media_ranges,
            response_content_type: self.response_content_type,
            dispatch_mechanism: self.dispatch_mechanism,
        }
    }
}
