use serde_json::Value;
use tracing::warn;

use super::core::{ExtractorFactory, ParameterExtractor};
use crate::action::{Action, ParameterDescriptor, ParameterSource, TypeTag};
use crate::error::ExtractError;
use crate::router::{PathMatch, PathPattern};
use crate::server::Request;

/// Decode a raw string according to `type_tag`.
///
/// `StringList` splits on commas and drops empty items.
pub fn decode_value(
    raw: &str,
    type_tag: TypeTag,
    source_kind: &'static str,
    name: &str,
) -> Result<Value, ExtractError> {
    let invalid = |expected: &'static str| ExtractError::InvalidValue {
        source_kind,
        name: name.to_string(),
        expected,
        value: raw.to_string(),
    };

    match type_tag {
        TypeTag::String => Ok(Value::String(raw.to_string())),
        TypeTag::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid("an integer")),
        TypeTag::Number => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| invalid("a number")),
        TypeTag::Boolean => raw
            .trim()
            .parse::<bool>()
            .map(Value::from)
            .map_err(|_| invalid("a boolean")),
        TypeTag::Json => serde_json::from_str(raw).map_err(|_| invalid("JSON")),
        TypeTag::StringList => Ok(Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect(),
        )),
    }
}

/// Value for a parameter that is absent from the request
fn absent(
    parameter: &ParameterDescriptor,
    source_kind: &'static str,
    name: &str,
) -> Result<Value, ExtractError> {
    if let Some(default) = &parameter.default {
        return Ok(default.clone());
    }
    if parameter.required {
        Err(ExtractError::Missing {
            source_kind,
            name: name.to_string(),
        })
    } else {
        Ok(Value::Null)
    }
}

fn source_kind(source: ParameterSource) -> &'static str {
    match source {
        ParameterSource::Path => "path",
        ParameterSource::Query => "query",
        ParameterSource::Header => "header",
        ParameterSource::Cookie => "cookie",
        ParameterSource::Body => "body",
        ParameterSource::RequestPath => "request path",
    }
}

/// Reads one named value from the path, query, headers or cookies
struct NamedValueExtractor {
    source: ParameterSource,
    lookup: String,
    parameter: ParameterDescriptor,
}

impl NamedValueExtractor {
    fn boxed(
        parameter: &ParameterDescriptor,
        source: ParameterSource,
    ) -> Option<Box<dyn ParameterExtractor>> {
        let lookup = parameter.lookup_name(source)?.to_string();
        Some(Box::new(Self {
            source,
            lookup,
            parameter: parameter.clone(),
        }))
    }

    fn kind(&self) -> &'static str {
        source_kind(self.source)
    }

    fn decode(&self, raw: &str) -> Result<Value, ExtractError> {
        decode_value(raw, self.parameter.type_tag, self.kind(), &self.lookup)
    }

    fn extract_list(&self, request: &Request) -> Result<Value, ExtractError> {
        let items: Vec<Value> = request
            .get_query_params(&self.lookup)
            .flat_map(|raw| raw.split(','))
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| Value::String(item.to_string()))
            .collect();
        if items.is_empty() {
            absent(&self.parameter, self.kind(), &self.lookup)
        } else {
            Ok(Value::Array(items))
        }
    }
}

impl ParameterExtractor for NamedValueExtractor {
    fn extract(&self, request: &Request, path_match: &PathMatch) -> Result<Value, ExtractError> {
        if self.source == ParameterSource::Query && self.parameter.type_tag == TypeTag::StringList {
            return self.extract_list(request);
        }

        let raw = match self.source {
            ParameterSource::Path => path_match.get(&self.lookup),
            ParameterSource::Query => request.get_query_param(&self.lookup),
            ParameterSource::Header => request.get_header(&self.lookup),
            ParameterSource::Cookie => request.get_cookie(&self.lookup),
            ParameterSource::Body | ParameterSource::RequestPath => None,
        };

        match raw {
            Some(raw) => self.decode(raw),
            None => absent(&self.parameter, self.kind(), &self.lookup),
        }
    }
}

/// Path template variables. Applies only when the action's template
/// actually declares the variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathParamFactory;

impl ExtractorFactory for PathParamFactory {
    fn name(&self) -> &'static str {
        "path"
    }

    fn create(
        &self,
        action: &Action,
        parameter: &ParameterDescriptor,
        pattern: &PathPattern,
    ) -> Option<Box<dyn ParameterExtractor>> {
        let lookup = parameter.lookup_name(ParameterSource::Path)?;
        if !pattern.has_variable(lookup) {
            warn!(
                action = %action.name(),
                parameter = %parameter.name,
                variable = lookup,
                template = %pattern,
                "Path parameter not present in template"
            );
            return None;
        }
        NamedValueExtractor::boxed(parameter, ParameterSource::Path)
    }
}

/// Query string parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParamFactory;

impl ExtractorFactory for QueryParamFactory {
    fn name(&self) -> &'static str {
        "query"
    }

    fn create(
        &self,
        _action: &Action,
        parameter: &ParameterDescriptor,
        _pattern: &PathPattern,
    ) -> Option<Box<dyn ParameterExtractor>> {
        NamedValueExtractor::boxed(parameter, ParameterSource::Query)
    }
}

/// Request headers, matched case-insensitively
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderFactory;

impl ExtractorFactory for HeaderFactory {
    fn name(&self) -> &'static str {
        "header"
    }

    fn create(
        &self,
        _action: &Action,
        parameter: &ParameterDescriptor,
        _pattern: &PathPattern,
    ) -> Option<Box<dyn ParameterExtractor>> {
        NamedValueExtractor::boxed(parameter, ParameterSource::Header)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CookieFactory;

impl ExtractorFactory for CookieFactory {
    fn name(&self) -> &'static str {
        "cookie"
    }

    fn create(
        &self,
        _action: &Action,
        parameter: &ParameterDescriptor,
        _pattern: &PathPattern,
    ) -> Option<Box<dyn ParameterExtractor>> {
        NamedValueExtractor::boxed(parameter, ParameterSource::Cookie)
    }
}

struct BodyExtractor {
    parameter: ParameterDescriptor,
}

impl BodyExtractor {
    fn invalid(&self, reason: impl Into<String>) -> ExtractError {
        ExtractError::InvalidBody {
            name: self.parameter.name.clone(),
            reason: reason.into(),
        }
    }
}

impl ParameterExtractor for BodyExtractor {
    fn extract(&self, request: &Request, _path_match: &PathMatch) -> Result<Value, ExtractError> {
        if request.body.is_empty() {
            return absent(&self.parameter, "body", &self.parameter.name);
        }

        if self.parameter.type_tag == TypeTag::String {
            return std::str::from_utf8(&request.body)
                .map(|text| Value::String(text.to_string()))
                .map_err(|e| self.invalid(e.to_string()));
        }

        let value: Value =
            serde_json::from_slice(&request.body).map_err(|e| self.invalid(e.to_string()))?;

        let type_ok = match self.parameter.type_tag {
            TypeTag::Integer => value.is_i64() || value.is_u64(),
            TypeTag::Number => value.is_number(),
            TypeTag::Boolean => value.is_boolean(),
            TypeTag::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            TypeTag::Json | TypeTag::String => true,
        };
        if type_ok {
            Ok(value)
        } else {
            Err(self.invalid(format!("expected {:?}", self.parameter.type_tag)))
        }
    }
}

/// The request body: UTF-8 text for `String` parameters, JSON otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestBodyFactory;

impl ExtractorFactory for RequestBodyFactory {
    fn name(&self) -> &'static str {
        "body"
    }

    fn create(
        &self,
        _action: &Action,
        parameter: &ParameterDescriptor,
        _pattern: &PathPattern,
    ) -> Option<Box<dyn ParameterExtractor>> {
        parameter.tag_for(ParameterSource::Body)?;
        Some(Box::new(BodyExtractor {
            parameter: parameter.clone(),
        }))
    }
}

struct RequestPathExtractor;

impl ParameterExtractor for RequestPathExtractor {
    fn extract(&self, request: &Request, _path_match: &PathMatch) -> Result<Value, ExtractError> {
        Ok(Value::String(request.path.clone()))
    }
}

/// The full request path, for handlers serving catch-all templates
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestPathFactory;

impl ExtractorFactory for RequestPathFactory {
    fn name(&self) -> &'static str {
        "request_path"
    }

    fn create(
        &self,
        _action: &Action,
        parameter: &ParameterDescriptor,
        _pattern: &PathPattern,
    ) -> Option<Box<dyn ParameterExtractor>> {
        parameter.tag_for(ParameterSource::RequestPath)?;
        Some(Box::new(RequestPathExtractor))
    }
}
