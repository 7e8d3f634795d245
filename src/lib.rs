//! # brrtdispatch
//!
//! **brrtdispatch** selects and invokes request handlers ("actions") for
//! HTTP, gRPC and WebSocket requests. Every action is tested against each
//! request; the most specific candidate wins, and its handler runs at the
//! end of a two-phase interceptor chain.
//!
//! ## Overview
//!
//! An [`Action`](action::Action) declares a path template, a dispatch
//! mechanism, the media types it accepts and produces, and typed handler
//! parameters. Binding an action resolves one parameter extractor per
//! parameter and compiles the template, so every misconfiguration surfaces
//! before the first request.
//!
//! ## Architecture
//!
//! - **[`media`]** - media range parsing, specificity and closest-match
//! - **[`router`]** - path template compilation and matching
//! - **[`action`]** - action and parameter descriptors
//! - **[`extract`]** - pluggable parameter extractors (path, query, header, cookie, body)
//! - **[`interceptor`]** - network and application interceptor chains
//! - **[`handler`]** - handler traits and providers
//! - **[`dispatcher`]** - candidate matching, ranking and invocation
//! - **[`manifest`]** - declaring actions in YAML or JSON
//! - **[`server`]** - request, response and reply types
//! - **[`telemetry`]** - structured logging setup
//! - **[`cli`]** - manifest inspection tooling
//!
//! ### Request Flow
//!
//! ```text
//! Request
//!   │
//!   ├─▶ Dispatcher::resolve ── match every BoundAction ── min RequestMatch
//!   │
//!   ├─▶ network interceptors ─▶ RequestBridgeInterceptor
//!   │                               │
//!   │                               ├─▶ extract arguments
//!   │                               └─▶ application interceptors ─▶ handler
//!   │
//!   └─▶ Reply ─▶ Response (gRPC trailers stamped when applicable)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtdispatch::action::{Action, ParameterDescriptor, ParameterTag, TypeTag};
//! use brrtdispatch::dispatcher::Dispatcher;
//! use brrtdispatch::handler::SharedHandler;
//! use brrtdispatch::server::{Reply, Request};
//! use serde_json::{json, Value};
//! use std::sync::Arc;
//!
//! let get_user = Action::builder("get_user", "/users/{id}")
//!     .parameter(
//!         ParameterDescriptor::new("id", TypeTag::Integer).tag(ParameterTag::Path(None)),
//!     )
//!     .build();
//!
//! let handler = SharedHandler::new(|args: Vec<Value>| -> anyhow::Result<Reply> {
//!     Ok(Reply::Value(json!({ "id": args[0] })))
//! });
//!
//! let dispatcher = Dispatcher::builder()
//!     .action(get_user, Arc::new(handler))
//!     .build()
//!     .unwrap();
//!
//! let response = dispatcher.dispatch(Request::get("/users/42"));
//! assert_eq!(response.status, 200);
//! ```
//!
//! ## Configuration
//!
//! Runtime knobs come from `BRRTD_*` environment variables; see
//! [`runtime_config`] and [`telemetry`].

pub mod action;
pub mod cli;
pub mod dispatcher;
pub mod error;
pub mod extract;
pub mod handler;
pub mod ids;
pub mod interceptor;
pub mod manifest;
pub mod media;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod telemetry;

pub use action::{Action, DispatchMechanism, ParameterDescriptor, ParameterTag, TypeTag};
pub use dispatcher::{Dispatcher, DispatcherBuilder, RequestMatch};
pub use error::{BindError, DispatchError, ExtractError, ManifestError};
pub use media::MediaRange;
pub use router::PathPattern;
pub use server::{Reply, Request, Response};
