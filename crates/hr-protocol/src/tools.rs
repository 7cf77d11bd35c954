//! Tool schemas and the function calls made against them.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Primitive argument types a tool parameter may declare.
///
/// Closed on purpose: a schema declaring any other type fails to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    #[serde(rename = "type")]
    pub kind: ParamType,
    #[serde(default)]
    pub description: String,
}

/// The `parameters` object of a tool schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameters {
    /// Always `"object"` for well-formed schemas.
    #[serde(rename = "type", default = "object_kind")]
    pub kind: String,
    /// Declared parameters, in declaration order.
    #[serde(default)]
    pub properties: IndexMap<String, ParamSpec>,
    /// Required argument names, in declaration order.
    #[serde(default)]
    pub required: Vec<String>,
}

fn object_kind() -> String {
    "object".into()
}

impl Default for ToolParameters {
    fn default() -> Self {
        Self {
            kind: object_kind(),
            properties: IndexMap::new(),
            required: Vec::new(),
        }
    }
}

/// Declarative description of a callable action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: ToolParameters,
}

impl ToolSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: ToolParameters::default(),
        }
    }

    /// Builder-style parameter declaration.
    pub fn param(
        mut self,
        name: impl Into<String>,
        kind: ParamType,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let name = name.into();
        if required && !self.parameters.required.contains(&name) {
            self.parameters.required.push(name.clone());
        }
        self.parameters.properties.insert(
            name,
            ParamSpec {
                kind,
                description: description.into(),
            },
        );
        self
    }

    /// Declared type of a parameter, if any.
    pub fn param_type(&self, name: &str) -> Option<ParamType> {
        self.parameters.properties.get(name).map(|p| p.kind)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.parameters.properties.contains_key(name)
    }

    /// Structural check used by boundary layers before handing a tool set to the router.
    pub fn check(&self) -> Result<(), SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }
        if self.parameters.kind != "object" {
            return Err(SchemaError::NotAnObject {
                tool: self.name.clone(),
                kind: self.parameters.kind.clone(),
            });
        }
        if let Some(missing) = self
            .parameters
            .required
            .iter()
            .find(|r| !self.parameters.properties.contains_key(*r))
        {
            return Err(SchemaError::UndeclaredRequired {
                tool: self.name.clone(),
                param: missing.clone(),
            });
        }
        Ok(())
    }
}

/// Check every schema in a request's tool set, plus name uniqueness.
pub fn check_tool_set(tools: &[ToolSchema]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for tool in tools {
        tool.check()?;
        if !seen.insert(tool.name.as_str()) {
            return Err(SchemaError::DuplicateName(tool.name.clone()));
        }
    }
    Ok(())
}

/// Structurally invalid tool schemas.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("tool name must not be empty")]
    EmptyName,

    #[error("duplicate tool name: {0}")]
    DuplicateName(String),

    #[error("tool '{tool}' parameters must be of type object, got '{kind}'")]
    NotAnObject { tool: String, kind: String },

    #[error("tool '{tool}' requires undeclared parameter '{param}'")]
    UndeclaredRequired { tool: String, param: String },
}

/// A structured call to one of the request's tools.
///
/// Equality is structural: same name and same argument mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Map::new(),
        }
    }

    /// Builder-style argument insertion.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// String value of an argument, if it holds one.
    pub fn str_arg(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).and_then(Value::as_str)
    }
}

/// Drop structurally identical calls, keeping the first occurrence.
pub fn dedup_calls(calls: Vec<FunctionCall>) -> Vec<FunctionCall> {
    let mut unique: Vec<FunctionCall> = Vec::with_capacity(calls.len());
    for call in calls {
        if !unique.contains(&call) {
            unique.push(call);
        }
    }
    unique
}
