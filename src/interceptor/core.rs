use serde_json::Value;
use std::sync::Arc;

use super::access::AccessControl;
use crate::action::Action;
use crate::handler::ActionHandler;
use crate::server::{Reply, Request, Response};

/// Middleware running closest to the transport.
///
/// Each interceptor decides whether to call [`NetworkChain::proceed`]; returning
/// without calling it short-circuits everything downstream, including
/// parameter extraction and the handler.
pub trait NetworkInterceptor: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn intercept(&self, request: Request, chain: NetworkChain<'_>) -> anyhow::Result<Response>;
}

/// Middleware running closest to the handler, after arguments are extracted
pub trait ApplicationInterceptor: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn intercept(&self, chain: ApplicationChain<'_>) -> anyhow::Result<Reply>;

    /// Allowed callers this interceptor enforces, if it enforces any
    fn access_control(&self) -> Option<&AccessControl> {
        None
    }
}

/// The remainder of a network interceptor chain
#[derive(Clone, Copy)]
pub struct NetworkChain<'a> {
    action: &'a Action,
    links: &'a [&'a dyn NetworkInterceptor],
}

impl<'a> NetworkChain<'a> {
    #[must_use]
    pub fn new(action: &'a Action, links: &'a [&'a dyn NetworkInterceptor]) -> Self {
        Self { action, links }
    }

    #[inline]
    #[must_use]
    pub fn action(&self) -> &'a Action {
        self.action
    }

    /// Links left to run, including the one `proceed` calls next
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.links.len()
    }

    /// Hand the request to the next link.
    pub fn proceed(self, request: Request) -> anyhow::Result<Response> {
        match self.links.split_first() {
            Some((next, rest)) => next.intercept(request, NetworkChain::new(self.action, rest)),
            None => anyhow::bail!(
                "network chain for `{}` ended without a terminal interceptor",
                self.action.name()
            ),
        }
    }
}

/// The remainder of an application interceptor chain, ending in the handler
pub struct ApplicationChain<'a> {
    action: &'a Action,
    request: &'a Request,
    args: Vec<Value>,
    links: &'a [Arc<dyn ApplicationInterceptor>],
    handler: &'a dyn ActionHandler,
}

impl<'a> ApplicationChain<'a> {
    #[must_use]
    pub fn new(
        action: &'a Action,
        request: &'a Request,
        args: Vec<Value>,
        links: &'a [Arc<dyn ApplicationInterceptor>],
        handler: &'a dyn ActionHandler,
    ) -> Self {
        Self {
            action,
            request,
            args,
            links,
            handler,
        }
    }

    #[inline]
    #[must_use]
    pub fn action(&self) -> &'a Action {
        self.action
    }

    #[inline]
    #[must_use]
    pub fn request(&self) -> &'a Request {
        self.request
    }

    /// Extracted arguments, index-aligned with the action's parameters
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut Vec<Value> {
        &mut self.args
    }

    /// Run the next interceptor, or the handler once none are left.
    pub fn proceed(self) -> anyhow::Result<Reply> {
        match self.links.split_first() {
            Some((next, rest)) => next.intercept(ApplicationChain {
                links: rest,
                ..self
            }),
            None => self.handler.call(self.args),
        }
    }
}
