use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use super::core::{NetworkChain, NetworkInterceptor};
use crate::error::ExtractError;
use crate::server::{Request, Response};

/// Request counters for the actions it wraps.
///
/// All counters are relaxed atomics; readings are eventually consistent.
/// Share one instance across actions with an `Arc` to get totals.
#[derive(Debug, Default)]
pub struct MetricsInterceptor {
    request_count: AtomicUsize,
    client_errors: AtomicUsize,
    server_errors: AtomicUsize,
    total_latency_ns: AtomicU64,
}

impl MetricsInterceptor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that reached this interceptor
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Responses with a 4xx status
    #[must_use]
    pub fn client_errors(&self) -> usize {
        self.client_errors.load(Ordering::Relaxed)
    }

    /// Responses with a 5xx status plus chains that failed outright
    #[must_use]
    pub fn server_errors(&self) -> usize {
        self.server_errors.load(Ordering::Relaxed)
    }

    /// Mean time spent in the downstream chain; zero before any request
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }
}

impl NetworkInterceptor for MetricsInterceptor {
    fn name(&self) -> &str {
        "metrics"
    }

    fn intercept(&self, request: Request, chain: NetworkChain<'_>) -> anyhow::Result<Response> {
        let start = Instant::now();
        let result = chain.proceed(request);
        let elapsed = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);

        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ns.fetch_add(elapsed, Ordering::Relaxed);
        match &result {
            Ok(response) if (400..500).contains(&response.status) => {
                self.client_errors.fetch_add(1, Ordering::Relaxed);
            }
            Ok(response) if response.status >= 500 => {
                self.server_errors.fetch_add(1, Ordering::Relaxed);
            }
            Ok(_) => {}
            // extraction failures are client errors
            Err(e) if e.downcast_ref::<ExtractError>().is_some() => {
                self.client_errors.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.server_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }
}
