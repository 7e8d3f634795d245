//! # Action Module
//!
//! An [`Action`] is the immutable declaration of one dispatchable endpoint:
//! what path it serves, which dispatch mechanism (HTTP method, gRPC or
//! WebSocket), which request bodies it accepts, what it produces, and the
//! parameters its handler expects.
//!
//! Actions carry no behaviour. They are bound to a handler, interceptors and
//! parameter extractors by
//! [`BoundAction::bind`](crate::dispatcher::BoundAction::bind).
//!
//! ## Example
//!
//! ```rust
//! use brrtdispatch::action::{Action, DispatchMechanism, ParameterDescriptor, ParameterTag, TypeTag};
//! use brrtdispatch::media::MediaRange;
//! use http::Method;
//!
//! let action = Action::builder("get_user", "/users/{id}")
//!     .mechanism(DispatchMechanism::Http(Method::GET))
//!     .parameter(ParameterDescriptor::new("id", TypeTag::Integer).tag(ParameterTag::Path(None)))
//!     .produces(MediaRange::json())
//!     .build();
//!
//! assert_eq!(action.name(), "get_user");
//! assert_eq!(action.parameters().len(), 1);
//! ```

mod types;

pub use types::{
    Action, ActionBuilder, DispatchMechanism, ParameterDescriptor, ParameterSource, ParameterTag,
    TypeTag,
};
