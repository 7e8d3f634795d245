//! # Interceptor Module
//!
//! Two ordered middleware phases around every handler invocation.
//!
//! ## Overview
//!
//! ```text
//! request ─► network[0] ─► network[1] ─► … ─► RequestBridgeInterceptor
//!                                                │ extract arguments
//!                                                ▼
//!            handler ◄─ application[n] ◄─ … ◄─ application[0]
//! ```
//!
//! - **Network interceptors** ([`NetworkInterceptor`]) see the raw
//!   [`Request`](crate::server::Request) and produce a
//!   [`Response`](crate::server::Response). They run before arguments are
//!   extracted, so they can rewrite headers or the body that extraction
//!   will read, or short-circuit without paying for extraction at all.
//! - **Application interceptors** ([`ApplicationInterceptor`]) see the
//!   extracted arguments and the handler's [`Reply`](crate::server::Reply).
//!
//! Both phases compose by continuation passing: an interceptor receives
//! "the rest of the chain" and decides whether, and when, to call
//! `proceed`. Not calling it short-circuits.
//!
//! The [`RequestBridgeInterceptor`] is appended after all caller-supplied
//! network interceptors on every request. Nothing can be registered after
//! it.
//!
//! ## Errors
//!
//! Errors returned by interceptors propagate up the chain untouched. The
//! dispatcher translates whatever reaches the top into a
//! [`DispatchError`](crate::error::DispatchError); typed errors
//! (`ExtractError`, `DispatchError`) survive the `anyhow` boundary and keep
//! their status codes.
//!
//! ## Built-in interceptors
//!
//! | Interceptor              | Phase       | Purpose                                   |
//! |--------------------------|-------------|-------------------------------------------|
//! | [`TracingInterceptor`]   | network     | `action` span, status and latency logging |
//! | [`MetricsInterceptor`]   | network     | request, error and latency counters       |
//! | [`AccessInterceptor`]    | application | allowed services / roles, `403` otherwise |
//!
//! ## Access-control metadata
//!
//! An application interceptor may expose an [`AccessControl`] through
//! [`ApplicationInterceptor::access_control`]. [`allowed_callers`] reports
//! the policy of the **first** interceptor that does so. Later interceptors
//! exposing a policy are silently ignored for metadata purposes, although
//! they still enforce it at request time.

mod access;
mod bridge;
mod core;
mod metrics;
mod tracing;

pub use self::access::{
    allowed_callers, AccessControl, AccessInterceptor, CALLER_ROLES_HEADER, CALLER_SERVICE_HEADER,
};
pub use self::bridge::RequestBridgeInterceptor;
pub use self::core::{ApplicationChain, ApplicationInterceptor, NetworkChain, NetworkInterceptor};
pub use self::metrics::MetricsInterceptor;
pub use self::tracing::TracingInterceptor;
