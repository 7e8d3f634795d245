//! Handler invocation.
//!
//! A handler receives the extracted arguments, index-aligned with the
//! action's declared parameters, and returns a [`Reply`]. Any closure of the
//! right shape is a handler:
//!
//! ```rust
//! use brrtdispatch::handler::{ActionHandler, SharedHandler, HandlerProvider};
//! use brrtdispatch::server::Reply;
//! use serde_json::{json, Value};
//!
//! let provider = SharedHandler::new(|args: Vec<Value>| -> anyhow::Result<Reply> {
//!     Ok(Reply::Value(json!({ "id": args[0] })))
//! });
//! let reply = provider.get().call(vec![json!(7)]).unwrap();
//! assert_eq!(reply.kind(), "value");
//! ```

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::server::Reply;

pub trait ActionHandler: Send + Sync {
    fn call(&self, args: Vec<Value>) -> anyhow::Result<Reply>;
}

impl<F> ActionHandler for F
where
    F: Fn(Vec<Value>) -> anyhow::Result<Reply> + Send + Sync,
{
    fn call(&self, args: Vec<Value>) -> anyhow::Result<Reply> {
        self(args)
    }
}

/// Supplies the handler instance for one request.
///
/// Called once per request, before the network chain starts, so requests
/// that an interceptor short-circuits still fetch a handler.
pub trait HandlerProvider: Send + Sync {
    fn get(&self) -> Arc<dyn ActionHandler>;
}

/// One handler instance shared by every request
#[derive(Clone)]
pub struct SharedHandler {
    handler: Arc<dyn ActionHandler>,
}

impl SharedHandler {
    pub fn new(handler: impl ActionHandler + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    #[must_use]
    pub fn from_arc(handler: Arc<dyn ActionHandler>) -> Self {
        Self { handler }
    }
}

impl HandlerProvider for SharedHandler {
    fn get(&self) -> Arc<dyn ActionHandler> {
        Arc::clone(&self.handler)
    }
}

impl fmt::Debug for SharedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHandler").finish_non_exhaustive()
    }
}

/// Builds a fresh handler for every request
pub struct PerRequestHandler<F> {
    factory: F,
}

impl<F> PerRequestHandler<F>
where
    F: Fn() -> Arc<dyn ActionHandler> + Send + Sync,
{
    pub fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<F> HandlerProvider for PerRequestHandler<F>
where
    F: Fn() -> Arc<dyn ActionHandler> + Send + Sync,
{
    fn get(&self) -> Arc<dyn ActionHandler> {
        (self.factory)()
    }
}
