//! Dispatcher core module - hot path for request dispatch.
//!
//! # JSF Compliance (Rule 206)
//!
//! Candidate selection runs on every request. The following clippy lints
//! are denied to keep allocation off that path:
//!
//! - `clippy::inefficient_to_string` - Catches unnecessary allocations
//! - `clippy::format_push_string` - Prevents format! string building
//! - `clippy::unnecessary_to_owned` - Prevents .to_owned() on borrowed data

// JSF Rule 206: Deny heap allocations in the hot path
// NOTE: error responses allocate; they are off the fast path
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::bound::{ActionMetadata, BoundAction};
use super::matching::RequestMatch;
use crate::action::{Action, DispatchMechanism};
use crate::error::{BindError, DispatchError};
use crate::extract::{ExtractorFactory, ExtractorRegistry};
use crate::handler::HandlerProvider;
use crate::ids::REQUEST_ID_HEADER;
use crate::interceptor::{ApplicationInterceptor, NetworkInterceptor};
use crate::runtime_config::DispatchConfig;
use crate::server::{Request, Response, WebSocketListener};

/// The winning candidate for a request
#[derive(Debug)]
pub struct ResolvedAction<'d> {
    pub action: &'d BoundAction,
    pub request_match: RequestMatch,
}

/// Routes requests to the most specific matching [`BoundAction`]
pub struct Dispatcher {
    actions: Vec<Arc<BoundAction>>,
    config: DispatchConfig,
}

impl Dispatcher {
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Bound actions in registration order
    #[must_use]
    pub fn actions(&self) -> &[Arc<BoundAction>] {
        &self.actions
    }

    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    #[must_use]
    pub fn metadata(&self) -> Vec<ActionMetadata> {
        self.actions.iter().map(|a| a.metadata()).collect()
    }

    /// Pick the best candidate for `request`.
    ///
    /// Every action is tested; the minimum [`RequestMatch`] wins. Candidates
    /// that compare equal resolve to the one registered first.
    pub fn resolve(&self, request: &Request) -> Result<ResolvedAction<'_>, DispatchError> {
        let start = Instant::now();
        let mechanism = DispatchMechanism::for_request(request);
        let content_type = request.content_type();
        let accepted = request.accepted_media_ranges();

        let best = self
            .actions
            .iter()
            .filter_map(|action| {
                action
                    .match_request(&mechanism, content_type.as_ref(), &accepted, &request.path)
                    .map(|m| (action.as_ref(), m))
            })
            .min_by(|(_, a), (_, b)| a.cmp(b));

        let elapsed = start.elapsed();
        let Some((action, request_match)) = best else {
            warn!(
                method = %request.method,
                path = %request.path,
                mechanism = %mechanism,
                duration_us = elapsed.as_micros(),
                "No action matched"
            );
            return Err(DispatchError::NoMatchingAction {
                method: mechanism.to_string(),
                path: request.path.clone(),
            });
        };

        if elapsed > self.config.slow_match_threshold {
            warn!(
                action = %action.action().name(),
                path = %request.path,
                candidates = self.actions.len(),
                duration_us = elapsed.as_micros(),
                "Slow action matching detected"
            );
        } else {
            debug!(
                action = %action.action().name(),
                path = %request.path,
                pattern = %request_match.path_pattern,
                accepted = %request_match.accepted_media_range,
                response = %request_match.response_content_type,
                duration_us = elapsed.as_micros(),
                "Action matched"
            );
        }

        Ok(ResolvedAction {
            action,
            request_match,
        })
    }

    /// Dispatch an HTTP or gRPC request.
    ///
    /// WebSocket upgrades go through [`Dispatcher::dispatch_websocket`]; a
    /// WebSocket action reached here fails with
    /// [`DispatchError::InvalidResponseBody`].
    pub fn try_dispatch(&self, request: Request) -> Result<Response, DispatchError> {
        let resolved = self.resolve(&request)?;
        resolved
            .action
            .handle(request, resolved.request_match.params())
    }

    /// Dispatch a request and render any failure as an error response.
    ///
    /// Every response carries the request id header.
    #[must_use]
    pub fn dispatch(&self, request: Request) -> Response {
        let request_id = request.request_id;
        let mut response = match self.try_dispatch(request) {
            Ok(response) => response,
            Err(e) => self.error_response(&e),
        };
        response.set_header(REQUEST_ID_HEADER, request_id.to_string());
        response
    }

    /// Dispatch a WebSocket upgrade, returning the listener for the socket.
    pub fn dispatch_websocket(
        &self,
        request: &Request,
    ) -> Result<Arc<dyn WebSocketListener>, DispatchError> {
        let resolved = self.resolve(request)?;
        resolved
            .action
            .handle_websocket(request, resolved.request_match.params())
    }

    fn error_response(&self, e: &DispatchError) -> Response {
        let status = e.status_code();
        if status >= 500 {
            error!(error = %e, status, "Dispatch failed");
            if !self.config.expose_internal_errors {
                return Response::error(status, "Internal Server Error");
            }
        } else {
            warn!(error = %e, status, "Request rejected");
        }
        Response::error(status, &e.to_string())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("actions", &self.actions)
            .field("config", &self.config)
            .finish()
    }
}

struct PendingAction {
    action: Action,
    provider: Arc<dyn HandlerProvider>,
    network: Vec<Arc<dyn NetworkInterceptor>>,
    application: Vec<Arc<dyn ApplicationInterceptor>>,
}

/// Collects actions and shared interceptors, then binds them all at once.
///
/// Interceptors registered on the builder run before each action's own
/// interceptors of the same phase.
pub struct DispatcherBuilder {
    registry: ExtractorRegistry,
    network: Vec<Arc<dyn NetworkInterceptor>>,
    application: Vec<Arc<dyn ApplicationInterceptor>>,
    config: DispatchConfig,
    pending: Vec<PendingAction>,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self {
            registry: ExtractorRegistry::with_defaults(),
            network: Vec::new(),
            application: Vec::new(),
            config: DispatchConfig::default(),
            pending: Vec::new(),
        }
    }
}

impl DispatcherBuilder {
    #[must_use]
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the extractor registry (defaults to the built-ins)
    #[must_use]
    pub fn extractors(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn extractor_factory(mut self, factory: Arc<dyn ExtractorFactory>) -> Self {
        self.registry.register(factory);
        self
    }

    #[must_use]
    pub fn network_interceptor(mut self, interceptor: Arc<dyn NetworkInterceptor>) -> Self {
        self.network.push(interceptor);
        self
    }

    #[must_use]
    pub fn application_interceptor(
        mut self,
        interceptor: Arc<dyn ApplicationInterceptor>,
    ) -> Self {
        self.application.push(interceptor);
        self
    }

    #[must_use]
    pub fn action(self, action: Action, provider: Arc<dyn HandlerProvider>) -> Self {
        self.action_with(action, provider, Vec::new(), Vec::new())
    }

    /// Register an action with its own interceptors
    #[must_use]
    pub fn action_with(
        mut self,
        action: Action,
        provider: Arc<dyn HandlerProvider>,
        network: Vec<Arc<dyn NetworkInterceptor>>,
        application: Vec<Arc<dyn ApplicationInterceptor>>,
    ) -> Self {
        self.pending.push(PendingAction {
            action,
            provider,
            network,
            application,
        });
        self
    }

    /// Bind every registered action. Any failure aborts the whole build.
    pub fn build(self) -> Result<Dispatcher, BindError> {
        let mut seen = HashSet::with_capacity(self.pending.len());
        let mut actions = Vec::with_capacity(self.pending.len());

        for pending in self.pending {
            if !seen.insert(pending.action.name().to_string()) {
                return Err(BindError::DuplicateAction(pending.action.name().to_string()));
            }
            let network = self.network.iter().map(Arc::clone).chain(pending.network).collect();
            let application = self
                .application
                .iter()
                .map(Arc::clone)
                .chain(pending.application)
                .collect();
            let bound = BoundAction::bind(
                pending.action,
                pending.provider,
                network,
                application,
                &self.registry,
            )?;
            actions.push(Arc::new(bound));
        }

        info!(
            actions_count = actions.len(),
            extractor_factories = self.registry.len(),
            slow_match_us = self.config.slow_match_threshold.as_micros(),
            "Dispatcher built"
        );

        Ok(Dispatcher {
            actions,
            config: self.config,
        })
    }
}
