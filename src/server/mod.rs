//! # Server Module
//!
//! Transport-facing value types: the inbound [`Request`], the outbound
//! [`Response`] and its [`Body`], the [`Reply`] an application chain
//! produces, and the [`WebSocketListener`] capability returned by WebSocket
//! actions.
//!
//! The dispatch core never touches a socket. An HTTP server, gRPC transport
//! or WebSocket upgrade handler builds a [`Request`], hands it to the
//! [`Dispatcher`](crate::dispatcher::Dispatcher) and writes back what it
//! gets.

mod request;
mod response;
mod websocket;

pub use request::{parse_cookies, parse_query_params, HeaderVec, Request, MAX_INLINE_HEADERS};
pub use response::{Body, Reply, Response};
pub use websocket::WebSocketListener;
