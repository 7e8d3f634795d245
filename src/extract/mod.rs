//! # Extract Module
//!
//! Turning a request into handler arguments.
//!
//! ## Overview
//!
//! Each declared [`ParameterDescriptor`](crate::action::ParameterDescriptor)
//! is resolved once, at bind time, to exactly one [`ParameterExtractor`].
//! Resolution asks every [`ExtractorFactory`] in an [`ExtractorRegistry`]
//! whether it applies to the parameter:
//!
//! - no factory applies → [`BindError::NoExtractor`](crate::error::BindError::NoExtractor)
//! - more than one applies → [`BindError::AmbiguousExtractor`](crate::error::BindError::AmbiguousExtractor)
//!
//! Both abort startup. At request time the stored extractors run in
//! parameter order; nothing is re-resolved.
//!
//! ## Built-in factories
//!
//! | Factory               | Tag                        | Reads                           |
//! |-----------------------|----------------------------|---------------------------------|
//! | [`PathParamFactory`]  | `ParameterTag::Path`       | path template variable          |
//! | [`QueryParamFactory`] | `ParameterTag::Query`      | query string (lists: repeated)  |
//! | [`HeaderFactory`]     | `ParameterTag::Header`     | request header                  |
//! | [`CookieFactory`]     | `ParameterTag::Cookie`     | cookie                          |
//! | [`RequestBodyFactory`]| `ParameterTag::Body`       | body, JSON or UTF-8 text        |
//! | [`RequestPathFactory`]| `ParameterTag::RequestPath`| the request path itself         |
//!
//! Raw strings are decoded according to the parameter's
//! [`TypeTag`](crate::action::TypeTag); a value that does not decode is a
//! `400 Bad Request`.
//!
//! ## Custom factories
//!
//! ```rust
//! use brrtdispatch::action::{Action, ParameterDescriptor};
//! use brrtdispatch::error::ExtractError;
//! use brrtdispatch::extract::{ExtractorFactory, ExtractorRegistry, ParameterExtractor};
//! use brrtdispatch::router::{PathMatch, PathPattern};
//! use brrtdispatch::server::Request;
//! use serde_json::Value;
//! use std::sync::Arc;
//!
//! struct RequestIdExtractor;
//!
//! impl ParameterExtractor for RequestIdExtractor {
//!     fn extract(&self, request: &Request, _: &PathMatch) -> Result<Value, ExtractError> {
//!         Ok(Value::String(request.request_id.to_string()))
//!     }
//! }
//!
//! struct RequestIdFactory;
//!
//! impl ExtractorFactory for RequestIdFactory {
//!     fn name(&self) -> &'static str {
//!         "request_id"
//!     }
//!
//!     fn create(
//!         &self,
//!         _action: &Action,
//!         parameter: &ParameterDescriptor,
//!         _pattern: &PathPattern,
//!     ) -> Option<Box<dyn ParameterExtractor>> {
//!         parameter
//!             .has_custom_tag("request_id")
//!             .then(|| Box::new(RequestIdExtractor) as Box<dyn ParameterExtractor>)
//!     }
//! }
//!
//! let mut registry = ExtractorRegistry::with_defaults();
//! registry.register(Arc::new(RequestIdFactory));
//! ```

mod builtin;
mod core;
#[cfg(test)]
mod tests;

pub use builtin::{
    decode_value, CookieFactory, HeaderFactory, PathParamFactory, QueryParamFactory,
    RequestBodyFactory, RequestPathFactory,
};
pub use core::{extract_arguments, ExtractorFactory, ExtractorRegistry, ParameterExtractor};
