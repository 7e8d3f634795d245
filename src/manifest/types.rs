use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::{
    Action, DispatchMechanism, ParameterDescriptor, ParameterSource, ParameterTag, TypeTag,
};
use crate::error::ManifestError;
use crate::interceptor::AccessControl;
use crate::media::MediaRange;

/// A route manifest: the declared actions of a service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub actions: Vec<ActionDecl>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// One declared action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionDecl {
    pub name: String,
    pub path: String,
    /// An HTTP method, or `GRPC` / `WEBSOCKET`
    #[serde(default = "default_method")]
    pub method: String,
    /// Registered handler name; defaults to the action name
    #[serde(default)]
    pub handler: Option<String>,
    #[serde(default)]
    pub accepts: Vec<String>,
    #[serde(default)]
    pub produces: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    #[serde(default)]
    pub access: Option<AccessControl>,
}

impl ActionDecl {
    #[must_use]
    pub fn handler_name(&self) -> &str {
        self.handler.as_deref().unwrap_or(&self.name)
    }

    pub fn mechanism(&self) -> Result<DispatchMechanism, ManifestError> {
        let upper = self.method.trim().to_ascii_uppercase();
        match upper.as_str() {
            "GRPC" => Ok(DispatchMechanism::Grpc),
            "WEBSOCKET" | "WS" => Ok(DispatchMechanism::WebSocket),
            other => Method::from_bytes(other.as_bytes())
                .ok()
                .map(DispatchMechanism::Http)
                .ok_or_else(|| ManifestError::InvalidMethod {
                    action: self.name.clone(),
                    method: self.method.clone(),
                }),
        }
    }

    fn media_range(&self, value: &str) -> Result<MediaRange, ManifestError> {
        MediaRange::parse(value).map_err(|source| ManifestError::InvalidMediaType {
            action: self.name.clone(),
            value: value.to_string(),
            source,
        })
    }

    pub fn to_action(&self) -> Result<Action, ManifestError> {
        let mut builder = Action::builder(&self.name, &self.path).mechanism(self.mechanism()?);
        for value in &self.accepts {
            builder = builder.accepts(self.media_range(value)?);
        }
        if let Some(value) = &self.produces {
            builder = builder.produces(self.media_range(value)?);
        }
        for parameter in &self.parameters {
            builder = builder.parameter(parameter.to_descriptor());
        }
        Ok(builder.build())
    }
}

fn default_type() -> TypeTag {
    TypeTag::String
}

fn default_required() -> bool {
    true
}

/// One declared handler parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDecl {
    pub name: String,
    #[serde(rename = "type", default = "default_type")]
    pub type_tag: TypeTag,
    #[serde(rename = "in")]
    pub source: ParameterSource,
    /// Lookup name when it differs from `name`
    #[serde(default)]
    pub rename: Option<String>,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub default: Option<Value>,
}

impl ParameterDecl {
    #[must_use]
    pub fn to_descriptor(&self) -> ParameterDescriptor {
        let rename = self.rename.clone();
        let tag = match self.source {
            ParameterSource::Path => ParameterTag::Path(rename),
            ParameterSource::Query => ParameterTag::Query(rename),
            ParameterSource::Header => ParameterTag::Header(rename),
            ParameterSource::Cookie => ParameterTag::Cookie(rename),
            ParameterSource::Body => ParameterTag::Body,
            ParameterSource::RequestPath => ParameterTag::RequestPath,
        };
        let mut descriptor = ParameterDescriptor::new(&self.name, self.type_tag).tag(tag);
        if !self.required {
            descriptor = descriptor.optional();
        }
        if let Some(default) = &self.default {
            descriptor = descriptor.default_value(default.clone());
        }
        descriptor
    }
}
