//! Log mediator: renders selected properties through `tracing`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::value::ValueExpr;
use super::Mediator;
use crate::core::message_context::MessageContext;
use crate::core::runtime_context::RuntimeContext;
use crate::error::MediatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogProperty {
    pub name: String,
    pub value: ValueExpr,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub properties: Vec<LogProperty>,
    /// Append the serialized body.
    #[serde(default)]
    pub full: bool,
}

pub struct LogMediator {
    config: LogConfig,
}

impl LogMediator {
    pub fn new(config: LogConfig) -> Result<Self, MediatorError> {
        for property in &config.properties {
            property.value.validate()?;
        }
        Ok(Self { config })
    }

    /// `name = value` pairs joined by `, `.
    pub fn render(&self, ctx: &MessageContext) -> Result<String, MediatorError> {
        let mut parts = Vec::with_capacity(self.config.properties.len() + 1);
        for property in &self.config.properties {
            parts.push(format!(
                "{} = {}",
                property.name,
                property.value.evaluate_string(ctx)?
            ));
        }
        if self.config.full {
            let body = ctx.body().map(|b| b.to_xml()).unwrap_or_default();
            parts.push(format!("Envelope: {}", body));
        }
        Ok(parts.join(", "))
    }
}

#[async_trait]
impl Mediator for LogMediator {
    fn kind(&self) -> &'static str {
        "log"
    }

    async fn mediate(
        &self,
        ctx: &mut MessageContext,
        _runtime: &RuntimeContext,
    ) -> Result<(), MediatorError> {
        let line = self.render(ctx)?;
        let category = self.config.category.as_deref().unwrap_or("mediation");
        let correlation_id = ctx.correlation_id();
        match self.config.level {
            LogLevel::Trace => tracing::trace!(%correlation_id, category, "{}", line),
            LogLevel::Debug => tracing::debug!(%correlation_id, category, "{}", line),
            LogLevel::Info => tracing::info!(%correlation_id, category, "{}", line),
            LogLevel::Warn => tracing::warn!(%correlation_id, category, "{}", line),
            LogLevel::Error => tracing::error!(%correlation_id, category, "{}", line),
        }
        Ok(())
    }
}
