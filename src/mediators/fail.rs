//! Fail mediator: raises a mediation fault, optionally on a condition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::value::ValueExpr;
use super::Mediator;
use crate::core::message_context::MessageContext;
use crate::core::runtime_context::RuntimeContext;
use crate::error::MediatorError;

/// Fault only when `value` renders to `equals`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FailCondition {
    pub value: ValueExpr,
    pub equals: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FailConfig {
    pub message: String,
    #[serde(default)]
    pub when: Option<FailCondition>,
}

pub struct FailMediator {
    config: FailConfig,
}

impl FailMediator {
    pub fn new(config: FailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mediator for FailMediator {
    fn kind(&self) -> &'static str {
        "fail"
    }

    async fn mediate(
        &self,
        ctx: &mut MessageContext,
        _runtime: &RuntimeContext,
    ) -> Result<(), MediatorError> {
        if let Some(condition) = &self.config.when {
            if condition.value.evaluate_string(ctx)? != condition.equals {
                return Ok(());
            }
        }
        Err(MediatorError::Fault(self.config.message.clone()))
    }
}
