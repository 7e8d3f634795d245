use super::*;
use crate::action::{Action, ParameterDescriptor, ParameterTag, TypeTag};
use crate::error::{BindError, ExtractError};
use crate::router::{PathMatch, PathPattern};
use crate::server::Request;
use http::Method;
use serde_json::{json, Value};
use std::sync::Arc;

fn bind(action: &Action) -> Result<Vec<Box<dyn ParameterExtractor>>, BindError> {
    let pattern = PathPattern::parse(action.path()).expect("template compiles");
    ExtractorRegistry::with_defaults().resolve(action, &pattern)
}

fn run(action: &Action, request: &Request) -> Result<Vec<Value>, ExtractError> {
    let pattern = PathPattern::parse(action.path()).expect("template compiles");
    let extractors = bind(action).expect("bind");
    let path_match = pattern.matcher(&request.path).unwrap_or_default();
    extract_arguments(&extractors, request, &path_match)
}

#[test]
fn test_path_parameter_decoded_as_integer() {
    let action = Action::builder("get_user", "/users/{id}")
        .parameter(ParameterDescriptor::new("id", TypeTag::Integer).tag(ParameterTag::Path(None)))
        .build();
    let args = run(&action, &Request::get("/users/42")).expect("extract");
    assert_eq!(args, vec![json!(42)]);
}

#[test]
fn test_path_parameter_invalid_integer() {
    let action = Action::builder("get_user", "/users/{id}")
        .parameter(ParameterDescriptor::new("id", TypeTag::Integer).tag(ParameterTag::Path(None)))
        .build();
    let err = run(&action, &Request::get("/users/abc")).unwrap_err();
    assert_eq!(
        err,
        ExtractError::InvalidValue {
            source_kind: "path",
            name: "id".into(),
            expected: "an integer",
            value: "abc".into(),
        }
    );
}

#[test]
fn test_path_parameter_absent_from_template_fails_bind() {
    let action = Action::builder("get_user", "/users")
        .parameter(ParameterDescriptor::new("id", TypeTag::Integer).tag(ParameterTag::Path(None)))
        .build();
    assert!(matches!(
        bind(&action),
        Err(BindError::NoExtractor { ref parameter, .. }) if parameter == "id"
    ));
}

#[test]
fn test_untagged_parameter_fails_bind() {
    let action = Action::builder("get_user", "/users")
        .parameter(ParameterDescriptor::new("mystery", TypeTag::String))
        .build();
    assert!(matches!(bind(&action), Err(BindError::NoExtractor { .. })));
}

#[test]
fn test_two_tags_are_ambiguous() {
    let action = Action::builder("search", "/search/{q}")
        .parameter(
            ParameterDescriptor::new("q", TypeTag::String)
                .tag(ParameterTag::Path(None))
                .tag(ParameterTag::Query(None)),
        )
        .build();
    match bind(&action) {
        Err(BindError::AmbiguousExtractor { factories, .. }) => {
            assert_eq!(factories, vec!["path", "query"]);
        }
        other => panic!("expected ambiguity, got {:?}", other.err()),
    }
}

#[test]
fn test_query_parameters_with_rename_default_and_optional() {
    let action = Action::builder("list", "/items")
        .parameter(
            ParameterDescriptor::new("limit", TypeTag::Integer)
                .tag(ParameterTag::Query(Some("page_size".into())))
                .default_value(json!(25)),
        )
        .parameter(
            ParameterDescriptor::new("cursor", TypeTag::String)
                .tag(ParameterTag::Query(None))
                .optional(),
        )
        .parameter(ParameterDescriptor::new("active", TypeTag::Boolean).tag(ParameterTag::Query(None)))
        .build();

    let args = run(&action, &Request::get("/items?active=true")).expect("extract");
    assert_eq!(args, vec![json!(25), Value::Null, json!(true)]);

    let args = run(&action, &Request::get("/items?page_size=5&page_size=7&active=false"))
        .expect("extract");
    assert_eq!(args[0], json!(7));

    let err = run(&action, &Request::get("/items")).unwrap_err();
    assert!(matches!(err, ExtractError::Missing { source_kind: "query", .. }));
}

#[test]
fn test_query_string_list_collects_repeats_and_commas() {
    let action = Action::builder("tags", "/items")
        .parameter(ParameterDescriptor::new("tag", TypeTag::StringList).tag(ParameterTag::Query(None)))
        .build();
    let args = run(&action, &Request::get("/items?tag=a,b&tag=c")).expect("extract");
    assert_eq!(args, vec![json!(["a", "b", "c"])]);
}

#[test]
fn test_header_and_cookie_parameters() {
    let action = Action::builder("whoami", "/me")
        .parameter(
            ParameterDescriptor::new("tenant", TypeTag::String)
                .tag(ParameterTag::Header(Some("X-Tenant".into()))),
        )
        .parameter(ParameterDescriptor::new("session", TypeTag::String).tag(ParameterTag::Cookie(None)))
        .build();
    let request = Request::get("/me")
        .with_header("x-tenant", "acme")
        .with_header("Cookie", "theme=dark; session=abc123");
    let args = run(&action, &request).expect("extract");
    assert_eq!(args, vec![json!("acme"), json!("abc123")]);
}

#[test]
fn test_json_body_parameter() {
    let action = Action::builder("create", "/items")
        .method(Method::POST)
        .parameter(ParameterDescriptor::new("item", TypeTag::Json).tag(ParameterTag::Body))
        .build();
    let request = Request::post("/items").with_json(&json!({"name": "widget"}));
    let args = run(&action, &request).expect("extract");
    assert_eq!(args, vec![json!({"name": "widget"})]);

    let bad = Request::post("/items").with_body("{not json");
    assert!(matches!(
        run(&action, &bad),
        Err(ExtractError::InvalidBody { .. })
    ));

    assert!(matches!(
        run(&action, &Request::post("/items")),
        Err(ExtractError::Missing { source_kind: "body", .. })
    ));
}

#[test]
fn test_text_body_and_typed_body_mismatch() {
    let text = Action::builder("echo", "/echo")
        .method(Method::POST)
        .parameter(ParameterDescriptor::new("text", TypeTag::String).tag(ParameterTag::Body))
        .build();
    let args = run(&text, &Request::post("/echo").with_body("hello")).expect("extract");
    assert_eq!(args, vec![json!("hello")]);

    let count = Action::builder("count", "/count")
        .method(Method::POST)
        .parameter(ParameterDescriptor::new("n", TypeTag::Integer).tag(ParameterTag::Body))
        .build();
    assert!(run(&count, &Request::post("/count").with_body("\"seven\"")).is_err());
    assert_eq!(
        run(&count, &Request::post("/count").with_body("7")).expect("extract"),
        vec![json!(7)]
    );
}

#[test]
fn test_request_path_parameter() {
    let action = Action::builder("files", "/static/{rest:.*}")
        .parameter(ParameterDescriptor::new("path", TypeTag::String).tag(ParameterTag::RequestPath))
        .build();
    let args = run(&action, &Request::get("/static/css/site.css")).expect("extract");
    assert_eq!(args, vec![json!("/static/css/site.css")]);
}

#[test]
fn test_decode_value_types() {
    assert_eq!(decode_value("1.5", TypeTag::Number, "query", "x"), Ok(json!(1.5)));
    assert_eq!(decode_value(" 3 ", TypeTag::Integer, "query", "x"), Ok(json!(3)));
    assert_eq!(decode_value("[1]", TypeTag::Json, "query", "x"), Ok(json!([1])));
    assert_eq!(decode_value("a,,b", TypeTag::StringList, "query", "x"), Ok(json!(["a", "b"])));
    assert!(decode_value("NaN", TypeTag::Number, "query", "x").is_err());
    assert!(decode_value("yes", TypeTag::Boolean, "query", "x").is_err());
}

struct ConstantExtractor(Value);

impl ParameterExtractor for ConstantExtractor {
    fn extract(&self, _: &Request, _: &PathMatch) -> Result<Value, ExtractError> {
        Ok(self.0.clone())
    }
}

struct TenantFactory;

impl ExtractorFactory for TenantFactory {
    fn name(&self) -> &'static str {
        "tenant"
    }

    fn create(
        &self,
        _action: &Action,
        parameter: &ParameterDescriptor,
        _pattern: &PathPattern,
    ) -> Option<Box<dyn ParameterExtractor>> {
        parameter
            .has_custom_tag("tenant")
            .then(|| Box::new(ConstantExtractor(json!("acme"))) as Box<dyn ParameterExtractor>)
    }
}

#[test]
fn test_custom_factory_registration() {
    let action = Action::builder("t", "/t")
        .parameter(ParameterDescriptor::new("tenant", TypeTag::String).tag(ParameterTag::Custom("tenant".into())))
        .build();
    let pattern = PathPattern::parse("/t").expect("template compiles");

    assert!(ExtractorRegistry::with_defaults().resolve(&action, &pattern).is_err());

    let mut registry = ExtractorRegistry::with_defaults();
    registry.register(Arc::new(TenantFactory));
    assert_eq!(registry.len(), 7);
    let extractors = registry.resolve(&action, &pattern).expect("bind");
    let args = extract_arguments(&extractors, &Request::get("/t"), &PathMatch::default())
        .expect("extract");
    assert_eq!(args, vec![json!("acme")]);
}
