//! Property mediator: set or remove a property at a scope.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::value::ValueExpr;
use super::Mediator;
use crate::core::message_context::MessageContext;
use crate::core::property_store::PropertyScope;
use crate::core::runtime_context::RuntimeContext;
use crate::error::MediatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyAction {
    #[default]
    Set,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PropertyConfig {
    pub name: String,
    #[serde(default)]
    pub scope: PropertyScope,
    #[serde(default)]
    pub value: Option<ValueExpr>,
    #[serde(default)]
    pub action: PropertyAction,
}

pub struct PropertyMediator {
    config: PropertyConfig,
}

impl PropertyMediator {
    pub fn new(config: PropertyConfig) -> Result<Self, MediatorError> {
        if config.name.trim().is_empty() {
            return Err(MediatorError::ConfigError(
                "property name is required".to_string(),
            ));
        }
        match (&config.action, &config.value) {
            (PropertyAction::Set, None) => {
                return Err(MediatorError::ConfigError(format!(
                    "property '{}' needs a value",
                    config.name
                )))
            }
            (PropertyAction::Set, Some(value)) => value.validate()?,
            (PropertyAction::Remove, _) => {}
        }
        Ok(Self { config })
    }
}

#[async_trait]
impl Mediator for PropertyMediator {
    fn kind(&self) -> &'static str {
        "property"
    }

    async fn mediate(
        &self,
        ctx: &mut MessageContext,
        _runtime: &RuntimeContext,
    ) -> Result<(), MediatorError> {
        let config = &self.config;
        match (config.action, &config.value) {
            (PropertyAction::Set, Some(expr)) => match expr.evaluate(ctx)? {
                Some(value) => ctx.set_property(config.scope, config.name.clone(), value)?,
                None => {
                    tracing::debug!(property = %config.name, scope = %config.scope, "value absent; property left unset");
                }
            },
            (PropertyAction::Set, None) => {}
            (PropertyAction::Remove, _) => {
                ctx.remove_property(config.scope, &config.name)?;
            }
        }
        Ok(())
    }
}
