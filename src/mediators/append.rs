//! Append mediator: adds a child element to the body.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::value::ValueExpr;
use super::Mediator;
use crate::core::body::Element;
use crate::core::message_context::MessageContext;
use crate::core::property_store::PropertyValue;
use crate::core::runtime_context::RuntimeContext;
use crate::error::MediatorError;
use crate::selector::{select, SelectionExpression};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppendConfig {
    /// Parent of the new element; the body root when absent.
    ///
    /// When the expression matches nothing in the body the mediator does
    /// nothing and the body is left unchanged.
    #[serde(default)]
    pub target: Option<String>,
    pub element: String,
    pub value: ValueExpr,
}

pub struct AppendMediator {
    config: AppendConfig,
    target: Option<SelectionExpression>,
}

impl AppendMediator {
    pub fn new(config: AppendConfig) -> Result<Self, MediatorError> {
        if config.element.trim().is_empty() {
            return Err(MediatorError::ConfigError(
                "append needs an element name".to_string(),
            ));
        }
        config.value.validate()?;
        let target = config
            .target
            .as_deref()
            .map(SelectionExpression::parse)
            .transpose()?;
        Ok(Self { config, target })
    }
}

#[async_trait]
impl Mediator for AppendMediator {
    fn kind(&self) -> &'static str {
        "append"
    }

    async fn mediate(
        &self,
        ctx: &mut MessageContext,
        _runtime: &RuntimeContext,
    ) -> Result<(), MediatorError> {
        let child = match self.config.value.evaluate(ctx)? {
            Some(PropertyValue::Xml(inner)) => Element::new(&self.config.element).with_child(inner),
            Some(other) => Element::with_text(&self.config.element, other.to_display_string()),
            None => Element::new(&self.config.element),
        };

        let body = ctx.body_mut().ok_or(MediatorError::MissingBody)?;
        let path = match &self.target {
            Some(expr) => match select(body, expr).into_iter().next() {
                Some(handle) => handle.path,
                None => {
                    tracing::debug!(element = %self.config.element, "append target not found");
                    return Ok(());
                }
            },
            None => Vec::new(),
        };
        if let Some(parent) = body.at_path_mut(&path) {
            parent.push_child(child);
        }
        Ok(())
    }
}
