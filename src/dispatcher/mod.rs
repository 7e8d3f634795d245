//! # Dispatcher Module
//!
//! Selects the action for a request and runs it.
//!
//! ## Overview
//!
//! The dispatcher owns every [`BoundAction`], built once at startup by
//! [`DispatcherBuilder::build`]. For each request it:
//!
//! 1. classifies the request's dispatch mechanism (HTTP method, gRPC or
//!    WebSocket upgrade),
//! 2. asks every bound action for a [`RequestMatch`] via
//!    [`BoundAction::match_request`],
//! 3. picks the minimum match,
//! 4. runs the winner's interceptor chain via [`BoundAction::handle`] or
//!    [`BoundAction::handle_websocket`].
//!
//! ## Matching
//!
//! An action matches when all of these hold:
//!
//! - the path matches its compiled [`PathPattern`](crate::router::PathPattern)
//! - the mechanism equals its declared mechanism
//! - the request's `Content-Type`, **when present**, falls within one of its
//!   accepted media ranges (no `Content-Type` skips the check)
//! - its response type, when declared, is acceptable per the `Accept` header
//!
//! A mismatch is `None`, never an error.
//!
//! ## Ranking
//!
//! | Priority | Criterion                                | Better                |
//! |----------|------------------------------------------|-----------------------|
//! | 1        | path pattern specificity                 | literal over variable |
//! | 2        | matched request media range              | `a/b` > `a/*` > `*/*` |
//! | 3        | matched `Accept` range for the response  | `a/b` > `a/*` > `*/*` |
//! | 4        | request charset matched                  | yes over no           |
//!
//! There is no fifth criterion. Candidates equal on all four resolve to the
//! action registered first.
//!
//! ## gRPC
//!
//! Every response from a gRPC action, including ones produced by
//! short-circuiting interceptors, carries the `grpc-status: 0` trailer and
//! the `grpc-encoding: identity` / `grpc-accept-encoding: gzip` headers.
//! Non-zero gRPC statuses are not supported.
//!
//! ## Example
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
//!     .parameter(ParameterDescriptor::new("id", TypeTag::Integer).tag(ParameterTag::Path(None)))
//!     .build();
//!
//! let dispatcher = Dispatcher::builder()
//!     .action(
//!         get_user,
//!         Arc::new(SharedHandler::new(|args: Vec<Value>| -> anyhow::Result<Reply> {
//!             Ok(Reply::Value(json!({ "id": args[0] })))
//!         })),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let response = dispatcher.dispatch(Request::get("/users/42"));
//! assert_eq!(response.status, 200);
//! ```

mod bound;
mod core;
mod matching;

pub use bound::{
    ActionMetadata, BoundAction, ParameterMetadata, GRPC_ACCEPT_ENCODING, GRPC_ENCODING,
    GRPC_STATUS,
};
pub use core::{Dispatcher, DispatcherBuilder, ResolvedAction};
pub use matching::RequestMatch;
