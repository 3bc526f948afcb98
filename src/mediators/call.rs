//! Call mediator: runs a named sequence in place.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Mediator;
use crate::core::message_context::MessageContext;
use crate::core::runtime_context::RuntimeContext;
use crate::error::MediatorError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CallConfig {
    pub sequence: String,
}

pub struct CallMediator {
    config: CallConfig,
}

impl CallMediator {
    pub fn new(config: CallConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mediator for CallMediator {
    fn kind(&self) -> &'static str {
        "call"
    }

    async fn mediate(
        &self,
        ctx: &mut MessageContext,
        runtime: &RuntimeContext,
    ) -> Result<(), MediatorError> {
        let sequence = runtime
            .sequences()
            .get(&self.config.sequence)
            .ok_or_else(|| MediatorError::SequenceNotFound(self.config.sequence.clone()))?;
        tracing::debug!(sequence = %self.config.sequence, "calling named sequence");
        sequence.mediate(ctx, runtime).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::body::Element;
    use crate::core::property_store::{PropertyScope, PropertyValue};
    use crate::mediators::{
        PropertyAction, PropertyConfig, PropertyMediator, Sequence, SequenceRegistry, ValueExpr,
    };
    use crate::scope::NamingPolicy;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_call_named_sequence() {
        let mark = PropertyMediator::new(PropertyConfig {
            name: "marked".into(),
            scope: PropertyScope::Message,
            value: Some(ValueExpr::Literal("yes".into())),
            action: PropertyAction::Set,
        })
        .unwrap();
        let mut registry = SequenceRegistry::new();
        registry.register(
            "mark",
            Arc::new(Sequence::named("mark", vec![Arc::new(mark)])),
        );
        let runtime = RuntimeContext::default().with_sequences(Arc::new(registry));
        let mut ctx =
            MessageContext::from_parts("t", Some(Element::new("r")), NamingPolicy::default());

        CallMediator::new(CallConfig {
            sequence: "mark".into(),
        })
        .mediate(&mut ctx, &runtime)
        .await
        .unwrap();
        assert_eq!(
            ctx.get_property(PropertyScope::Message, "marked"),
            Some(&PropertyValue::from("yes"))
        );

        let missing = CallMediator::new(CallConfig {
            sequence: "nope".into(),
        })
        .mediate(&mut ctx, &runtime)
        .await;
        assert!(matches!(missing, Err(MediatorError::SequenceNotFound(n)) if n == "nope"));
    }
}
