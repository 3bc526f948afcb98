//! Value expressions evaluated against a message context.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::core::message_context::MessageContext;
use crate::core::property_store::{PropertyScope, PropertyValue};
use crate::error::MediatorError;
use crate::selector::{first_match, SelectionExpression, SelectorError};

/// A property lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PropertyRef {
    pub name: String,
    #[serde(default)]
    pub scope: PropertyScope,
}

/// A path expression, parsed on first use and reused afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub struct PathExpr {
    source: String,
    parsed: OnceLock<Result<SelectionExpression, SelectorError>>,
}

impl PathExpr {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            parsed: OnceLock::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> Result<&SelectionExpression, SelectorError> {
        self.parsed
            .get_or_init(|| SelectionExpression::parse(&self.source))
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl PartialEq for PathExpr {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for PathExpr {}

impl From<String> for PathExpr {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl From<&str> for PathExpr {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<PathExpr> for String {
    fn from(path: PathExpr) -> Self {
        path.source
    }
}

/// How a mediator computes a value.
///
/// ```yaml
/// concat:
///   - property: { name: group, scope: message }
///   - literal: "_"
///   - path: "//m0:code"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueExpr {
    Literal(String),
    Property(PropertyRef),
    /// Text of the first selected element, or the element itself when it
    /// has element children.
    Path(PathExpr),
    Concat(Vec<ValueExpr>),
}

impl ValueExpr {
    pub fn property(name: impl Into<String>, scope: PropertyScope) -> Self {
        ValueExpr::Property(PropertyRef {
            name: name.into(),
            scope,
        })
    }

    /// Check every path expression parses.
    pub fn validate(&self) -> Result<(), MediatorError> {
        match self {
            ValueExpr::Path(path) => {
                path.expression()?;
                Ok(())
            }
            ValueExpr::Concat(parts) => parts.iter().try_for_each(ValueExpr::validate),
            ValueExpr::Literal(_) | ValueExpr::Property(_) => Ok(()),
        }
    }

    /// `None` when a property is unset or a path selects nothing.
    pub fn evaluate(&self, ctx: &MessageContext) -> Result<Option<PropertyValue>, MediatorError> {
        match self {
            ValueExpr::Literal(s) => Ok(Some(PropertyValue::String(s.clone()))),
            ValueExpr::Property(r) => Ok(ctx.get_property(r.scope, &r.name).cloned()),
            ValueExpr::Path(path) => {
                let expression = path.expression()?;
                let body = ctx.body().ok_or(MediatorError::MissingBody)?;
                Ok(first_match(body, expression).map(|e| {
                    if e.has_element_children() {
                        PropertyValue::Xml(e.clone())
                    } else {
                        PropertyValue::String(e.text())
                    }
                }))
            }
            ValueExpr::Concat(parts) => {
                let mut out = String::new();
                for part in parts {
                    out.push_str(&part.evaluate_string(ctx)?);
                }
                Ok(Some(PropertyValue::String(out)))
            }
        }
    }

    /// Display form, empty when the value is absent.
    pub fn evaluate_string(&self, ctx: &MessageContext) -> Result<String, MediatorError> {
        Ok(self
            .evaluate(ctx)?
            .map(|v| v.to_display_string())
            .unwrap_or_default())
    }
}
