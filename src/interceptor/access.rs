use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

use super::core::{ApplicationChain, ApplicationInterceptor};
use crate::server::{Reply, Response};

/// Header naming the calling service
pub const CALLER_SERVICE_HEADER: &str = "x-caller-service";
/// Header carrying the caller's roles, comma-separated
pub const CALLER_ROLES_HEADER: &str = "x-caller-roles";

/// Services and roles allowed to call an action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    #[serde(default)]
    pub allowed_services: BTreeSet<String>,
    #[serde(default)]
    pub allowed_roles: BTreeSet<String>,
}

impl AccessControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_services.extend(services.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_roles.extend(roles.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allowed_services.is_empty() && self.allowed_roles.is_empty()
    }

    /// An empty policy allows everyone; otherwise the caller needs an
    /// allowed service name or at least one allowed role.
    #[must_use]
    pub fn permits<'r>(
        &self,
        service: Option<&str>,
        roles: impl IntoIterator<Item = &'r str>,
    ) -> bool {
        if self.is_empty() {
            return true;
        }
        if service.is_some_and(|s| self.allowed_services.contains(s)) {
            return true;
        }
        roles.into_iter().any(|role| self.allowed_roles.contains(role))
    }
}

/// Rejects callers outside an [`AccessControl`] policy with `403 Forbidden`.
///
/// The caller identity is read from [`CALLER_SERVICE_HEADER`] and
/// [`CALLER_ROLES_HEADER`], which an upstream gateway is trusted to set.
#[derive(Debug, Clone)]
pub struct AccessInterceptor {
    access: AccessControl,
}

impl AccessInterceptor {
    #[must_use]
    pub fn new(access: AccessControl) -> Self {
        Self { access }
    }
}

impl ApplicationInterceptor for AccessInterceptor {
    fn name(&self) -> &str {
        "access"
    }

    fn intercept(&self, chain: ApplicationChain<'_>) -> anyhow::Result<Reply> {
        let request = chain.request();
        let service = request.get_header(CALLER_SERVICE_HEADER).map(str::trim);
        let roles = request
            .get_header(CALLER_ROLES_HEADER)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty());

        if self.access.permits(service, roles) {
            return chain.proceed();
        }

        warn!(
            action = %chain.action().name(),
            caller_service = service.unwrap_or("-"),
            request_id = %request.request_id,
            "Caller not permitted"
        );
        Ok(Reply::Response(Response::error(403, "Forbidden")))
    }

    fn access_control(&self) -> Option<&AccessControl> {
        Some(&self.access)
    }
}

/// Allowed callers advertised for an action.
///
/// Only the first interceptor exposing an [`AccessControl`] is consulted;
/// any later ones are ignored, even if they would narrow or widen the
/// policy. No such interceptor yields empty sets.
#[must_use]
pub fn allowed_callers(interceptors: &[Arc<dyn ApplicationInterceptor>]) -> AccessControl {
    interceptors
        .iter()
        .find_map(|interceptor| interceptor.access_control())
        .cloned()
        .unwrap_or_default()
}
