use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::builtin::{
    CookieFactory, HeaderFactory, PathParamFactory, QueryParamFactory, RequestBodyFactory,
    RequestPathFactory,
};
use crate::action::{Action, ParameterDescriptor};
use crate::error::{BindError, ExtractError};
use crate::router::{PathMatch, PathPattern};
use crate::server::Request;

/// Produces the argument for one declared parameter.
///
/// Extractors are bound to a single parameter when the action is bound and
/// are shared across concurrent requests, so they hold no per-request state.
pub trait ParameterExtractor: Send + Sync {
    fn extract(&self, request: &Request, path_match: &PathMatch) -> Result<Value, ExtractError>;
}

/// Decides at bind time whether it can supply a given parameter.
pub trait ExtractorFactory: Send + Sync {
    /// Short name used in ambiguity diagnostics
    fn name(&self) -> &'static str;

    /// Return an extractor when this factory applies to `parameter`.
    fn create(
        &self,
        action: &Action,
        parameter: &ParameterDescriptor,
        pattern: &PathPattern,
    ) -> Option<Box<dyn ParameterExtractor>>;
}

/// Ordered set of extractor factories consulted at bind time
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    factories: Vec<Arc<dyn ExtractorFactory>>,
}

impl ExtractorRegistry {
    /// A registry with no factories
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in path, query, header, cookie, body and
    /// request-path factories
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PathParamFactory));
        registry.register(Arc::new(QueryParamFactory));
        registry.register(Arc::new(HeaderFactory));
        registry.register(Arc::new(CookieFactory));
        registry.register(Arc::new(RequestBodyFactory));
        registry.register(Arc::new(RequestPathFactory));
        registry
    }

    pub fn register(&mut self, factory: Arc<dyn ExtractorFactory>) {
        self.factories.push(factory);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Resolve one extractor per parameter of `action`, index-aligned with
    /// [`Action::parameters`].
    pub fn resolve(
        &self,
        action: &Action,
        pattern: &PathPattern,
    ) -> Result<Vec<Box<dyn ParameterExtractor>>, BindError> {
        action
            .parameters()
            .iter()
            .map(|parameter| self.resolve_one(action, parameter, pattern))
            .collect()
    }

    fn resolve_one(
        &self,
        action: &Action,
        parameter: &ParameterDescriptor,
        pattern: &PathPattern,
    ) -> Result<Box<dyn ParameterExtractor>, BindError> {
        let mut claims = self.factories.iter().filter_map(|factory| {
            factory
                .create(action, parameter, pattern)
                .map(|extractor| (factory.name(), extractor))
        });

        match (claims.next(), claims.next()) {
            (Some((factory, extractor)), None) => {
                debug!(
                    action = %action.name(),
                    parameter = %parameter.name,
                    factory = factory,
                    "Parameter extractor resolved"
                );
                Ok(extractor)
            }
            (None, _) => Err(BindError::NoExtractor {
                action: action.name().to_string(),
                parameter: parameter.name.clone(),
            }),
            (Some((first, _)), Some((second, _))) => {
                let mut factories = vec![first, second];
                factories.extend(claims.map(|(name, _)| name));
                Err(BindError::AmbiguousExtractor {
                    action: action.name().to_string(),
                    parameter: parameter.name.clone(),
                    factories,
                })
            }
        }
    }
}

/// Run resolved extractors in parameter order.
pub fn extract_arguments(
    extractors: &[Box<dyn ParameterExtractor>],
    request: &Request,
    path_match: &PathMatch,
) -> Result<Vec<Value>, ExtractError> {
    extractors
        .iter()
        .map(|extractor| extractor.extract(request, path_match))
        .collect()
}
