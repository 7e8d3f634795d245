//! # Manifest Module
//!
//! Declaring actions in a YAML or JSON route manifest instead of code.
//!
//! ## Format
//!
//! ```yaml
//! actions:
//!   - name: get_user
//!     path: /users/{id}
//!     method: GET              # any HTTP method, GRPC or WEBSOCKET
//!     handler: users.get       # defaults to the action name
//!     produces: application/json
//!     parameters:
//!       - name: id
//!         in: path             # path, query, header, cookie, body, request_path
//!         type: integer        # string, integer, number, boolean, json, string_list
//!       - name: limit
//!         in: query
//!         rename: page_size
//!         type: integer
//!         default: 25
//!     access:
//!       allowed_services: [billing]
//!       allowed_roles: [admin]
//! ```
//!
//! Files ending in `.yaml` / `.yml` are read as YAML, anything else as JSON.
//!
//! ## Binding
//!
//! A [`HandlerRegistry`] maps handler names to
//! [`HandlerProvider`](crate::handler::HandlerProvider)s. Binding a manifest
//! fails on the first action whose handler is not registered, or whose
//! method, media types, template or parameters are invalid.
//!
//! ```rust
//! use brrtdispatch::dispatcher::Dispatcher;
//! use brrtdispatch::manifest::{parse_manifest, HandlerRegistry, ManifestFormat};
//! use brrtdispatch::server::{Reply, Request};
//! use serde_json::{json, Value};
//!
//! let manifest = parse_manifest(
//!     r#"{"actions": [{"name": "ping", "path": "/ping"}]}"#,
//!     ManifestFormat::Json,
//! )
//! .unwrap();
//!
//! let mut handlers = HandlerRegistry::new();
//! handlers.register_handler("ping", |_: Vec<Value>| -> anyhow::Result<Reply> {
//!     Ok(Reply::Value(json!("pong")))
//! });
//!
//! let dispatcher = handlers.bind(&manifest, Dispatcher::builder()).unwrap();
//! assert_eq!(dispatcher.dispatch(Request::get("/ping")).status, 200);
//! ```

mod load;
mod registry;
mod types;

pub use load::{load_manifest, parse_manifest, ManifestFormat};
pub use registry::HandlerRegistry;
pub use types::{ActionDecl, Manifest, ParameterDecl};
