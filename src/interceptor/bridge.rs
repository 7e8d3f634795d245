use std::sync::Arc;
use tracing::debug;

use super::core::{ApplicationChain, ApplicationInterceptor, NetworkChain, NetworkInterceptor};
use crate::error::DispatchError;
use crate::extract::{extract_arguments, ParameterExtractor};
use crate::handler::ActionHandler;
use crate::router::PathMatch;
use crate::server::{Request, Response};

/// Terminal network interceptor.
///
/// Always the last network link. Extracts arguments from the request as
/// modified by earlier network interceptors, runs the application chain and
/// turns the outcome into a [`Response`]. A handler that already returned a
/// `Response` gets it back unchanged; a bare value becomes a `200` JSON body.
pub struct RequestBridgeInterceptor<'a> {
    extractors: &'a [Box<dyn ParameterExtractor>],
    path_match: &'a PathMatch,
    application: &'a [Arc<dyn ApplicationInterceptor>],
    handler: &'a dyn ActionHandler,
}

impl<'a> RequestBridgeInterceptor<'a> {
    #[must_use]
    pub fn new(
        extractors: &'a [Box<dyn ParameterExtractor>],
        path_match: &'a PathMatch,
        application: &'a [Arc<dyn ApplicationInterceptor>],
        handler: &'a dyn ActionHandler,
    ) -> Self {
        Self {
            extractors,
            path_match,
            application,
            handler,
        }
    }
}

impl NetworkInterceptor for RequestBridgeInterceptor<'_> {
    fn name(&self) -> &str {
        "request_bridge"
    }

    fn intercept(&self, request: Request, chain: NetworkChain<'_>) -> anyhow::Result<Response> {
        let action = chain.action();
        let args = extract_arguments(self.extractors, &request, self.path_match)?;
        debug!(
            action = %action.name(),
            args = args.len(),
            interceptors = self.application.len(),
            "Invoking application chain"
        );

        let reply =
            ApplicationChain::new(action, &request, args, self.application, self.handler).proceed()?;

        reply.into_response().map_err(|other| {
            DispatchError::InvalidResponseBody {
                action: action.name().to_string(),
                kind: other.kind(),
            }
            .into()
        })
    }
}
