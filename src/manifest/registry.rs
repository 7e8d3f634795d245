use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::types::Manifest;
use crate::dispatcher::{Dispatcher, DispatcherBuilder};
use crate::error::ManifestError;
use crate::handler::{ActionHandler, HandlerProvider, SharedHandler};
use crate::interceptor::{AccessInterceptor, ApplicationInterceptor};

/// Named handler providers that manifest actions refer to
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn HandlerProvider>>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider; a later registration under the same name wins.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn HandlerProvider>) {
        let name = name.into();
        debug!(handler = %name, "Handler registered");
        self.handlers.insert(name, provider);
    }

    /// Register one shared handler instance
    pub fn register_handler(
        &mut self,
        name: impl Into<String>,
        handler: impl ActionHandler + 'static,
    ) {
        self.register(name, Arc::new(SharedHandler::new(handler)));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn HandlerProvider>> {
        self.handlers.get(name).map(Arc::clone)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Add every manifest action to `builder` and build the dispatcher.
    ///
    /// Actions declaring `access` get an [`AccessInterceptor`] as their
    /// first own application interceptor.
    pub fn bind(
        &self,
        manifest: &Manifest,
        mut builder: DispatcherBuilder,
    ) -> Result<Dispatcher, ManifestError> {
        for decl in &manifest.actions {
            let action = decl.to_action()?;
            let provider = self
                .get(decl.handler_name())
                .ok_or_else(|| ManifestError::UnknownHandler {
                    action: decl.name.clone(),
                    handler: decl.handler_name().to_string(),
                })?;
            let application: Vec<Arc<dyn ApplicationInterceptor>> = decl
                .access
                .iter()
                .map(|access| {
                    let interceptor = AccessInterceptor::new(access.clone());
                    Arc::new(interceptor) as Arc<dyn ApplicationInterceptor>
                })
                .collect();
            builder = builder.action_with(action, provider, Vec::new(), application);
        }
        Ok(builder.build()?)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}
