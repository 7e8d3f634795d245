use std::time::Instant;

use tracing::{error, field, info, info_span, warn};

use super::core::{NetworkChain, NetworkInterceptor};
use crate::server::{Request, Response};

/// Opens an `action` span around the rest of the chain and logs the outcome
/// with status and latency.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingInterceptor;

impl NetworkInterceptor for TracingInterceptor {
    fn name(&self) -> &str {
        "tracing"
    }

    fn intercept(&self, request: Request, chain: NetworkChain<'_>) -> anyhow::Result<Response> {
        let span = info_span!(
            "action",
            action = %chain.action().name(),
            method = %request.method,
            path = %request.path,
            request_id = %request.request_id,
            status = field::Empty,
            latency_ms = field::Empty,
        );
        let _entered = span.enter();
        let start = Instant::now();

        let result = chain.proceed(request);
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        span.record("latency_ms", latency_ms);

        match &result {
            Ok(response) => {
                span.record("status", response.status);
                if response.status >= 500 {
                    warn!(
                        status = response.status,
                        latency_ms,
                        "Action completed with server error"
                    );
                } else {
                    info!(status = response.status, latency_ms, "Action completed");
                }
            }
            Err(e) => error!(error = %e, latency_ms, "Action failed"),
        }
        result
    }
}
