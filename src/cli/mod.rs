//! # CLI Module
//!
//! Command-line tooling for inspecting route manifests and dispatch
//! decisions without running a server.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! List every declared action with its mechanism, template and parameters:
//!
//! ```bash
//! brrtdispatch routes --manifest actions.yaml
//! brrtdispatch routes --manifest actions.yaml --json
//! ```
//!
//! `--json` prints the full [`ActionMetadata`](crate::dispatcher::ActionMetadata)
//! of each action, including interceptor names and allowed callers.
//!
//! ### `resolve`
//!
//! Show which action a request would be dispatched to, and why:
//!
//! ```bash
//! brrtdispatch resolve --manifest actions.yaml --method POST --path /users/7 \
//!     --content-type 'application/json; charset=utf-8' --accept 'application/*'
//! brrtdispatch resolve --manifest actions.yaml --path /chat/lobby --websocket
//! ```
//!
//! Options:
//! - `--method <M>` - HTTP method (default: GET)
//! - `--content-type` / `--accept` - request media headers
//! - `--grpc` - send as a gRPC call (POST, `application/grpc`)
//! - `--websocket` - send as a WebSocket upgrade
//! - `--json` - print the match as JSON
//!
//! Handlers are never invoked; the manifest is bound to placeholders.
//!
//! The manifest path can also come from `BRRTD_MANIFEST`.

mod commands;


pub use commands::{run_cli, run_with, Cli, Commands};
