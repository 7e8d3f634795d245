use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::matching::RequestMatch;
use crate::action::{Action, DispatchMechanism, ParameterSource};
use crate::error::{BindError, DispatchError};
use crate::extract::{extract_arguments, ExtractorRegistry, ParameterExtractor};
use crate::handler::HandlerProvider;
use crate::interceptor::{
    allowed_callers, ApplicationChain, ApplicationInterceptor, NetworkChain, NetworkInterceptor,
    RequestBridgeInterceptor,
};
use crate::media::{closest_match, MediaRange};
use crate::router::{PathMatch, PathPattern};
use crate::server::{Request, Response, WebSocketListener};

/// Trailer carrying the gRPC status; always `0`
pub const GRPC_STATUS: &str = "grpc-status";
/// Headers stamped on every gRPC response
pub const GRPC_ENCODING: &str = "grpc-encoding";
pub const GRPC_ACCEPT_ENCODING: &str = "grpc-accept-encoding";

/// Public description of a bound action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionMetadata {
    pub name: String,
    pub path: String,
    pub dispatch_mechanism: String,
    pub request_media_types: Vec<String>,
    pub response_media_type: Option<String>,
    pub parameters: Vec<ParameterMetadata>,
    pub network_interceptors: Vec<String>,
    pub application_interceptors: Vec<String>,
    pub allowed_services: Vec<String>,
    pub allowed_roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterMetadata {
    pub name: String,
    pub sources: Vec<ParameterSource>,
    pub required: bool,
}

/// An [`Action`] wired to its handler, interceptors and extractors.
///
/// Built once at startup and shared read-only across request threads.
pub struct BoundAction {
    action: Action,
    pattern: Arc<PathPattern>,
    provider: Arc<dyn HandlerProvider>,
    network: Vec<Arc<dyn NetworkInterceptor>>,
    application: Vec<Arc<dyn ApplicationInterceptor>>,
    extractors: Vec<Box<dyn ParameterExtractor>>,
}

impl BoundAction {
    /// Compile the path template and resolve one extractor per parameter.
    ///
    /// Fails if the template is invalid or any parameter has zero or
    /// several applicable extractors.
    pub fn bind(
        action: Action,
        provider: Arc<dyn HandlerProvider>,
        network: Vec<Arc<dyn NetworkInterceptor>>,
        application: Vec<Arc<dyn ApplicationInterceptor>>,
        registry: &ExtractorRegistry,
    ) -> Result<Self, BindError> {
        let pattern = PathPattern::parse(action.path()).map_err(|source| BindError::Pattern {
            action: action.name().to_string(),
            source,
        })?;
        let extractors = registry.resolve(&action, &pattern)?;

        info!(
            action = %action.name(),
            path = %pattern,
            mechanism = %action.dispatch_mechanism(),
            parameters = extractors.len(),
            network = network.len(),
            application = application.len(),
            "Action bound"
        );

        Ok(Self {
            action,
            pattern: Arc::new(pattern),
            provider,
            network,
            application,
            extractors,
        })
    }

    #[inline]
    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }

    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    #[inline]
    #[must_use]
    pub fn dispatch_mechanism(&self) -> &DispatchMechanism {
        self.action.dispatch_mechanism()
    }

    /// Test this action against a request.
    ///
    /// `None` is the normal outcome for a non-matching action.
    #[must_use]
    pub fn match_request(
        &self,
        mechanism: &DispatchMechanism,
        content_type: Option<&MediaRange>,
        accepted: &[MediaRange],
        path: &str,
    ) -> Option<RequestMatch> {
        let path_match = self.pattern.matcher(path)?;

        if mechanism != self.action.dispatch_mechanism() {
            return None;
        }

        let declared = self.action.accepted_media_ranges();
        let (accepted_media_range, request_charset_match) = match content_type {
            Some(content_type) if !declared.is_empty() => {
                let found = closest_match(declared, content_type)?;
                (found.media_range, found.matches_charset)
            }
            _ => (MediaRange::any(), false),
        };

        let response_content_type = match self.action.response_content_type() {
            Some(produces) if accepted.is_empty() => {
                closest_match(&[MediaRange::any()], produces)?.media_range
            }
            Some(produces) => closest_match(accepted, produces)?.media_range,
            None => MediaRange::any(),
        };

        Some(RequestMatch {
            path_pattern: Arc::clone(&self.pattern),
            path_match,
            accepted_media_range,
            request_charset_match,
            response_content_type,
        })
    }

    /// Run the network chain, ending in the request bridge, for an HTTP or
    /// gRPC request.
    pub fn handle(
        &self,
        request: Request,
        path_match: &PathMatch,
    ) -> Result<Response, DispatchError> {
        let handler = self.provider.get();
        let bridge = RequestBridgeInterceptor::new(
            &self.extractors,
            path_match,
            &self.application,
            handler.as_ref(),
        );

        let mut links: Vec<&dyn NetworkInterceptor> = Vec::with_capacity(self.network.len() + 1);
        links.extend(self.network.iter().map(|i| i.as_ref() as &dyn NetworkInterceptor));
        links.push(&bridge);

        let mut response = NetworkChain::new(&self.action, &links)
            .proceed(request)
            .map_err(|e| DispatchError::from_chain(self.action.name(), e))
            .inspect_err(|e| {
                if e.is_fatal() {
                    error!(
                        action = %self.action.name(),
                        error = %e,
                        "Action produced an invalid reply"
                    );
                }
            })?;

        if *self.action.dispatch_mechanism() == DispatchMechanism::Grpc {
            response.set_trailer(GRPC_STATUS, "0");
            response.set_header(GRPC_ENCODING, "identity");
            response.set_header(GRPC_ACCEPT_ENCODING, "gzip");
        }
        Ok(response)
    }

    /// Run a WebSocket upgrade.
    ///
    /// Arguments are extracted up front, no network interceptors run and the
    /// application chain is empty; the handler must return a listener.
    pub fn handle_websocket(
        &self,
        request: &Request,
        path_match: &PathMatch,
    ) -> Result<Arc<dyn WebSocketListener>, DispatchError> {
        let args = extract_arguments(&self.extractors, request, path_match)?;
        let handler = self.provider.get();

        let reply = ApplicationChain::new(&self.action, request, args, &[], handler.as_ref())
            .proceed()
            .map_err(|e| DispatchError::from_chain(self.action.name(), e))?;

        reply.into_listener().map_err(|other| {
            let e = DispatchError::NotAWebSocketListener {
                action: self.action.name().to_string(),
                kind: other.kind(),
            };
            error!(
                action = %self.action.name(),
                error = %e,
                "WebSocket action returned no listener"
            );
            e
        })
    }

    /// Description suitable for listing routes
    #[must_use]
    pub fn metadata(&self) -> ActionMetadata {
        let access = allowed_callers(&self.application);
        let metadata = ActionMetadata {
            name: self.action.name().to_string(),
            path: self.pattern.as_str().to_string(),
            dispatch_mechanism: self.action.dispatch_mechanism().to_string(),
            request_media_types: self
                .action
                .accepted_media_ranges()
                .iter()
                .map(ToString::to_string)
                .collect(),
            response_media_type: self.action.response_content_type().map(ToString::to_string),
            parameters: self
                .action
                .parameters()
                .iter()
                .map(|p| ParameterMetadata {
                    name: p.name.clone(),
                    sources: p.sources(),
                    required: p.required && p.default.is_none(),
                })
                .collect(),
            network_interceptors: self.network.iter().map(|i| i.name().to_string()).collect(),
            application_interceptors: self
                .application
                .iter()
                .map(|i| i.name().to_string())
                .collect(),
            allowed_services: access.allowed_services.into_iter().collect(),
            allowed_roles: access.allowed_roles.into_iter().collect(),
        };
        debug!(action = %metadata.name, "Action metadata built");
        metadata
    }
}

impl fmt::Debug for BoundAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundAction")
            .field("action", &self.action.name())
            .field("pattern", &self.pattern.as_str())
            .field("mechanism", self.action.dispatch_mechanism())
            .field("network", &self.network.len())
            .field("application", &self.application.len())
            .field("extractors", &self.extractors.len())
            .finish()
    }
}
