use brrtdispatch::action::{Action, DispatchMechanism, ParameterDescriptor, ParameterTag, TypeTag};
use brrtdispatch::dispatcher::{Dispatcher, GRPC_ACCEPT_ENCODING, GRPC_ENCODING, GRPC_STATUS};
use brrtdispatch::error::{BindError, DispatchError};
use brrtdispatch::extract::ExtractorFactory;
use brrtdispatch::extract::ParameterExtractor;
use brrtdispatch::handler::{HandlerProvider, PerRequestHandler, SharedHandler};
use brrtdispatch::media::MediaRange;
use brrtdispatch::router::{PathMatch, PathPattern};
use brrtdispatch::server::{Body, Reply, Request, Response, WebSocketListener};
use brrtdispatch::ExtractError;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod common;
use common::echo;

fn path_param(name: &str, type_tag: TypeTag) -> ParameterDescriptor {
    ParameterDescriptor::new(name, type_tag).tag(ParameterTag::Path(None))
}

fn named(name: &'static str) -> Arc<dyn HandlerProvider> {
    Arc::new(SharedHandler::new(move |_: Vec<Value>| -> anyhow::Result<Reply> {
        Ok(Reply::Value(json!(name)))
    }))
}

#[test]
fn test_literal_segment_beats_variable() {
    let dispatcher = Dispatcher::builder()
        .action(
            Action::builder("by_id", "/users/{id}")
                .parameter(path_param("id", TypeTag::String))
                .build(),
            named("by_id"),
        )
        .action(Action::builder("me", "/users/me").build(), named("me"))
        .build()
        .unwrap();

    let resolved = dispatcher.resolve(&Request::get("/users/me")).unwrap();
    assert_eq!(resolved.action.action().name(), "me");

    let response = dispatcher.dispatch(Request::get("/users/42"));
    assert_eq!(response.body, Body::Json(json!("by_id")));
}

#[test]
fn test_constrained_variable_beats_catch_all() {
    let dispatcher = Dispatcher::builder()
        .action(
            Action::builder("files", "/files/{rest:.*}")
                .parameter(path_param("rest", TypeTag::String))
                .build(),
            echo(),
        )
        .action(
            Action::builder("file_by_number", "/files/{n:[0-9]+}")
                .parameter(path_param("n", TypeTag::Integer))
                .build(),
            echo(),
        )
        .build()
        .unwrap();

    assert_eq!(
        dispatcher.dispatch(Request::get("/files/17")).body,
        Body::Json(json!([17]))
    );
    assert_eq!(
        dispatcher.dispatch(Request::get("/files/a/b.txt")).body,
        Body::Json(json!(["a/b.txt"]))
    );
}

#[test]
fn test_content_type_mismatch_is_not_a_candidate() {
    let dispatcher = Dispatcher::builder()
        .action(
            Action::builder("upload", "/upload")
                .method(http::Method::POST)
                .accepts(MediaRange::json())
                .build(),
            echo(),
        )
        .build()
        .unwrap();

    let request = Request::post("/upload").with_header("content-type", "text/plain");
    let err = dispatcher.try_dispatch(request).unwrap_err();
    assert!(matches!(err, DispatchError::NoMatchingAction { .. }));
    assert_eq!(err.status_code(), 404);

    // No content type at all skips the check
    let response = dispatcher.dispatch(Request::post("/upload"));
    assert_eq!(response.status, 200);
}

#[test]
fn test_more_specific_accepted_range_wins() {
    let dispatcher = Dispatcher::builder()
        .action(
            Action::builder("any_text", "/notes")
                .method(http::Method::POST)
                .accepts(MediaRange::new("text", "*"))
                .build(),
            named("any_text"),
        )
        .action(
            Action::builder("markdown", "/notes")
                .method(http::Method::POST)
                .accepts(MediaRange::new("text", "markdown"))
                .build(),
            named("markdown"),
        )
        .build()
        .unwrap();

    let markdown = Request::post("/notes").with_header("content-type", "text/markdown");
    assert_eq!(dispatcher.dispatch(markdown).body, Body::Json(json!("markdown")));

    let plain = Request::post("/notes").with_header("content-type", "text/plain");
    assert_eq!(dispatcher.dispatch(plain).body, Body::Json(json!("any_text")));
}

#[test]
fn test_charset_match_breaks_tie() {
    let dispatcher = Dispatcher::builder()
        .action(
            Action::builder("latin", "/text")
                .method(http::Method::POST)
                .accepts(MediaRange::new("text", "plain").with_charset("iso-8859-1"))
                .build(),
            named("latin"),
        )
        .action(
            Action::builder("utf8", "/text")
                .method(http::Method::POST)
                .accepts(MediaRange::new("text", "plain").with_charset("utf-8"))
                .build(),
            named("utf8"),
        )
        .build()
        .unwrap();

    let request =
        Request::post("/text").with_header("content-type", "text/plain; charset=utf-8");
    let resolved = dispatcher.resolve(&request).unwrap();
    assert_eq!(resolved.action.action().name(), "utf8");
    assert!(resolved.request_match.request_charset_match);
}

#[test]
fn test_equal_candidates_resolve_to_first_registered() {
    let dispatcher = Dispatcher::builder()
        .action(Action::builder("first", "/{a}").build(), named("first"))
        .action(Action::builder("second", "/{b}").build(), named("second"))
        .build()
        .unwrap();

    let resolved = dispatcher.resolve(&Request::get("/x")).unwrap();
    assert_eq!(resolved.action.action().name(), "first");
}

#[test]
fn test_decoded_argument_reaches_handler() {
    let dispatcher = Dispatcher::builder()
        .action(
            Action::builder("get_user", "/users/{id}")
                .parameter(path_param("id", TypeTag::Integer))
                .parameter(
                    ParameterDescriptor::new("verbose", TypeTag::Boolean)
                        .tag(ParameterTag::Query(None))
                        .default_value(json!(false)),
                )
                .build(),
            echo(),
        )
        .build()
        .unwrap();

    let response = dispatcher.dispatch(Request::get("/users/42?verbose=true"));
    assert_eq!(response.body, Body::Json(json!([42, true])));

    let response = dispatcher.dispatch(Request::get("/users/42"));
    assert_eq!(response.body, Body::Json(json!([42, false])));

    let response = dispatcher.dispatch(Request::get("/users/abc"));
    assert_eq!(response.status, 400);
}

#[test]
fn test_bind_fails_without_extractor() {
    let err = Dispatcher::builder()
        .action(
            Action::builder("orphan", "/orphans")
                .parameter(ParameterDescriptor::new("id", TypeTag::String))
                .build(),
            echo(),
        )
        .build()
        .unwrap_err();
    assert!(matches!(err, BindError::NoExtractor { ref parameter, .. } if parameter == "id"));
}

#[test]
fn test_bind_fails_with_two_extractors() {
    let err = Dispatcher::builder()
        .action(
            Action::builder("greedy", "/items/{id}")
                .parameter(
                    ParameterDescriptor::new("id", TypeTag::String)
                        .tag(ParameterTag::Path(None))
                        .tag(ParameterTag::Query(None)),
                )
                .build(),
            echo(),
        )
        .build()
        .unwrap_err();
    match err {
        BindError::AmbiguousExtractor { factories, .. } => {
            assert_eq!(factories, vec!["path", "query"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

struct TenantFactory;

struct TenantExtractor;

impl ParameterExtractor for TenantExtractor {
    fn extract(&self, request: &Request, _: &PathMatch) -> Result<Value, ExtractError> {
        request
            .get_header("x-tenant")
            .map(|t| json!(t))
            .ok_or(ExtractError::Missing {
                source_kind: "tenant",
                name: "tenant".to_string(),
            })
    }
}

impl ExtractorFactory for TenantFactory {
    fn name(&self) -> &'static str {
        "tenant"
    }

    fn create(
        &self,
        _: &Action,
        parameter: &ParameterDescriptor,
        _: &PathPattern,
    ) -> Option<Box<dyn ParameterExtractor>> {
        parameter
            .has_custom_tag("tenant")
            .then(|| Box::new(TenantExtractor) as Box<dyn ParameterExtractor>)
    }
}

#[test]
fn test_custom_extractor_factory() {
    let dispatcher = Dispatcher::builder()
        .extractor_factory(Arc::new(TenantFactory))
        .action(
            Action::builder("whoami", "/whoami")
                .parameter(
                    ParameterDescriptor::new("tenant", TypeTag::String)
                        .tag(ParameterTag::Custom("tenant".to_string())),
                )
                .build(),
            echo(),
        )
        .build()
        .unwrap();

    let response = dispatcher.dispatch(Request::get("/whoami").with_header("X-Tenant", "acme"));
    assert_eq!(response.body, Body::Json(json!(["acme"])));

    let response = dispatcher.dispatch(Request::get("/whoami"));
    assert_eq!(response.status, 400);
}

#[test]
fn test_grpc_response_is_stamped() {
    let dispatcher = Dispatcher::builder()
        .action(
            Action::builder("say_hello", "/helloworld.Greeter/SayHello")
                .mechanism(DispatchMechanism::Grpc)
                .build(),
            named("hello"),
        )
        .build()
        .unwrap();

    let request = Request::post("/helloworld.Greeter/SayHello")
        .with_header("content-type", "application/grpc");
    let response = dispatcher.try_dispatch(request).unwrap();
    assert_eq!(response.get_trailer(GRPC_STATUS), Some("0"));
    assert_eq!(response.get_header(GRPC_ENCODING), Some("identity"));
    assert_eq!(response.get_header(GRPC_ACCEPT_ENCODING), Some("gzip"));

    // A plain POST does not reach a gRPC action
    let err = dispatcher
        .try_dispatch(Request::post("/helloworld.Greeter/SayHello"))
        .unwrap_err();
    assert!(matches!(err, DispatchError::NoMatchingAction { .. }));
}

#[test]
fn test_grpc_codec_suffix_reaches_default_grpc_action() {
    let dispatcher = Dispatcher::builder()
        .action(
            Action::builder("say_hello", "/helloworld.Greeter/SayHello")
                .mechanism(DispatchMechanism::Grpc)
                .build(),
            named("hello"),
        )
        .build()
        .unwrap();

    for content_type in ["application/grpc+proto", "application/grpc+json"] {
        let request = Request::post("/helloworld.Greeter/SayHello")
            .with_header("content-type", content_type);
        let response = dispatcher.try_dispatch(request).unwrap();
        assert_eq!(response.status, 200, "{content_type}");
        assert_eq!(response.get_trailer(GRPC_STATUS), Some("0"));
    }
}

#[test]
fn test_prebuilt_response_is_not_wrapped_again() {
    let prebuilt = Response::json(201, json!({"created": true})).with_header("location", "/items/1");
    let expected = prebuilt.clone();
    let handler = SharedHandler::new(move |_: Vec<Value>| -> anyhow::Result<Reply> {
        Ok(Reply::Response(prebuilt.clone()))
    });
    let dispatcher = Dispatcher::builder()
        .action(
            Action::builder("create", "/items").method(http::Method::POST).build(),
            Arc::new(handler),
        )
        .build()
        .unwrap();

    let response = dispatcher.try_dispatch(Request::post("/items")).unwrap();
    assert_eq!(response, expected);
}

#[test]
fn test_listener_reply_on_http_action_is_fatal() {
    struct Silent;
    impl WebSocketListener for Silent {
        fn on_message(&self, _: &str) -> Option<String> {
            None
        }
    }

    let handler = SharedHandler::new(|_: Vec<Value>| -> anyhow::Result<Reply> {
        Ok(Reply::Listener(Arc::new(Silent)))
    });
    let dispatcher = Dispatcher::builder()
        .action(Action::builder("confused", "/confused").build(), Arc::new(handler))
        .build()
        .unwrap();

    let err = dispatcher.try_dispatch(Request::get("/confused")).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, DispatchError::InvalidResponseBody { kind: "websocket listener", .. }));
    assert_eq!(dispatcher.dispatch(Request::get("/confused")).status, 500);
}

struct Echoer {
    prefix: String,
}

impl WebSocketListener for Echoer {
    fn on_message(&self, text: &str) -> Option<String> {
        Some(format!("{}{text}", self.prefix))
    }
}

fn websocket_upgrade(target: &str) -> Request {
    Request::get(target)
        .with_header("connection", "Upgrade")
        .with_header("upgrade", "websocket")
}

#[test]
fn test_websocket_listener_is_returned() {
    let handler = SharedHandler::new(|args: Vec<Value>| -> anyhow::Result<Reply> {
        let room = args[0].as_str().unwrap_or_default().to_string();
        Ok(Reply::Listener(Arc::new(Echoer {
            prefix: format!("[{room}] "),
        })))
    });
    let dispatcher = Dispatcher::builder()
        .action(
            Action::builder("chat", "/chat/{room}")
                .mechanism(DispatchMechanism::WebSocket)
                .parameter(path_param("room", TypeTag::String))
                .build(),
            Arc::new(handler),
        )
        .build()
        .unwrap();

    let listener = dispatcher
        .dispatch_websocket(&websocket_upgrade("/chat/lobby"))
        .unwrap();
    assert_eq!(listener.on_message("hi").as_deref(), Some("[lobby] hi"));

    // A plain GET is not an upgrade
    assert!(dispatcher.dispatch_websocket(&Request::get("/chat/lobby")).is_err());
}

#[test]
fn test_websocket_without_listener_fails() {
    let dispatcher = Dispatcher::builder()
        .action(
            Action::builder("chat", "/chat")
                .mechanism(DispatchMechanism::WebSocket)
                .build(),
            named("not a listener"),
        )
        .build()
        .unwrap();

    let err = dispatcher
        .dispatch_websocket(&websocket_upgrade("/chat"))
        .err()
        .unwrap();
    assert!(matches!(err, DispatchError::NotAWebSocketListener { kind: "value", .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_per_request_handler_is_created_per_dispatch() {
    let created = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&created);
    let provider = PerRequestHandler::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Arc::new(|_: Vec<Value>| -> anyhow::Result<Reply> { Ok(Reply::Value(json!("ok"))) })
            as Arc<dyn brrtdispatch::handler::ActionHandler>
    });
    let dispatcher = Dispatcher::builder()
        .action(Action::builder("ping", "/ping").build(), Arc::new(provider))
        .build()
        .unwrap();

    for _ in 0..3 {
        assert_eq!(dispatcher.dispatch(Request::get("/ping")).status, 200);
    }
    assert_eq!(created.load(Ordering::SeqCst), 3);
}
