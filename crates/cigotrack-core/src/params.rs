//! Per-item parameter resolution.
//!
//! The automation host evaluates node parameters against each input item
//! before the connector sees them. [`ParameterSource`] is that seam: a fixed
//! [`NodeCall`] yields the same call for every item, while an
//! [`ItemTemplate`] substitutes `{{ $json.<key> }}` expressions from the item.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fields::NodeCall;
use crate::{ConnectorError, ValidationError};

/// Opaque record from the previous pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputItem {
    pub json: Value,
}

impl InputItem {
    pub fn new(json: Value) -> Self {
        Self { json }
    }

    /// The implicit item used when a run receives no input.
    pub fn empty() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

pub trait ParameterSource: Send + Sync {
    fn resolve(&self, item: &InputItem, item_index: usize) -> Result<NodeCall, ConnectorError>;
}

impl ParameterSource for NodeCall {
    fn resolve(&self, _item: &InputItem, _item_index: usize) -> Result<NodeCall, ConnectorError> {
        Ok(self.clone())
    }
}

/// Node parameters with `{{ $json.<key> }}` placeholders.
///
/// A string value that is exactly one placeholder is replaced by the item's
/// value at that (dot-separated) key, keeping its JSON type. Placeholders
/// embedded in longer strings are substituted textually.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemTemplate {
    parameters: Value,
}

impl ItemTemplate {
    pub fn new(parameters: Value) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    pub fn has_placeholders(&self) -> bool {
        contains_placeholder(&self.parameters)
    }

    fn render(&self, item: &InputItem) -> Result<Value, ConnectorError> {
        render_value(&self.parameters, &item.json)
    }
}

impl ParameterSource for ItemTemplate {
    fn resolve(&self, item: &InputItem, _item_index: usize) -> Result<NodeCall, ConnectorError> {
        NodeCall::from_value(self.render(item)?)
    }
}

/// Node configuration document: the call plus run options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeConfig {
    #[serde(default, alias = "continueOnFail")]
    pub continue_on_fail: bool,
    #[serde(default, alias = "strictFields")]
    pub strict_fields: bool,
    #[serde(flatten)]
    pub parameters: Map<String, Value>,
}

impl NodeConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConnectorError> {
        serde_json::from_str(raw).map_err(|error| {
            ConnectorError::configuration(ValidationError::InvalidNodeConfig {
                message: error.to_string(),
            })
        })
    }

    /// Template over the call parameters; validated once up front.
    pub fn template(&self) -> Result<ItemTemplate, ConnectorError> {
        let template = ItemTemplate::new(Value::Object(self.parameters.clone()));
        if !template.has_placeholders() {
            NodeCall::from_value(template.parameters.clone())?;
        }
        Ok(template)
    }
}

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const ITEM_PREFIX: &str = "$json.";

fn contains_placeholder(value: &Value) -> bool {
    match value {
        Value::String(raw) => raw.contains(OPEN),
        Value::Array(values) => values.iter().any(contains_placeholder),
        Value::Object(entries) => entries.values().any(contains_placeholder),
        _ => false,
    }
}

fn render_value(template: &Value, item: &Value) -> Result<Value, ConnectorError> {
    match template {
        Value::String(raw) => render_string(raw, item),
        Value::Array(values) => values
            .iter()
            .map(|value| render_value(value, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(entries) => entries
            .iter()
            .map(|(key, value)| Ok((key.clone(), render_value(value, item)?)))
            .collect::<Result<Map<_, _>, ConnectorError>>()
            .map(Value::Object),
        other => Ok(other.clone()),
    }
}

fn render_string(raw: &str, item: &Value) -> Result<Value, ConnectorError> {
    let trimmed = raw.trim();
    if let Some(expression) = whole_expression(trimmed) {
        return lookup(item, expression).map(Value::clone);
    }

    let mut rendered = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find(OPEN) {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + OPEN.len()..];
        let close = after.find(CLOSE).ok_or_else(|| invalid_expression(raw))?;
        match lookup(item, after[..close].trim())? {
            Value::String(text) => rendered.push_str(text),
            Value::Null => {}
            other => rendered.push_str(&other.to_string()),
        }
        rest = &after[close + CLOSE.len()..];
    }
    rendered.push_str(rest);

    Ok(Value::String(rendered))
}

fn whole_expression(raw: &str) -> Option<&str> {
    let inner = raw.strip_prefix(OPEN)?.strip_suffix(CLOSE)?;
    (!inner.contains(OPEN) && !inner.contains(CLOSE)).then_some(inner.trim())
}

fn lookup<'a>(item: &'a Value, expression: &str) -> Result<&'a Value, ConnectorError> {
    let path = expression
        .strip_prefix(ITEM_PREFIX)
        .filter(|path| !path.is_empty())
        .ok_or_else(|| invalid_expression(expression))?;

    path.split('.')
        .try_fold(item, |current, key| current.get(key))
        .ok_or_else(|| {
            ConnectorError::configuration(ValidationError::InvalidNodeConfig {
                message: format!("input item has no value at '{path}'"),
            })
        })
}

fn invalid_expression(expression: &str) -> ConnectorError {
    ConnectorError::configuration(ValidationError::InvalidNodeConfig {
        message: format!("unsupported expression '{expression}', expected {{{{ $json.<key> }}}}"),
    })
}
