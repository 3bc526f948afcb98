//! Mediation primitives.
//!
//! Every primitive implements [`Mediator`]; a [`Sequence`] runs mediators in
//! order and is itself a mediator, so sequences nest and the foreach
//! construct can run any of them as its inner pipeline.

pub mod append;
pub mod call;
pub mod fail;
pub mod log;
pub mod payload;
pub mod property;
pub mod value;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::message_context::MessageContext;
use crate::core::runtime_context::RuntimeContext;
use crate::error::MediatorError;

pub use append::{AppendConfig, AppendMediator};
pub use call::{CallConfig, CallMediator};
pub use fail::{FailCondition, FailConfig, FailMediator};
pub use log::{LogConfig, LogLevel, LogMediator, LogProperty};
pub use payload::{PayloadConfig, PayloadMediator};
pub use property::{PropertyAction, PropertyConfig, PropertyMediator};
pub use value::{PathExpr, PropertyRef, ValueExpr};

/// Trait for mediation. Each primitive implements this.
#[async_trait]
pub trait Mediator: Send + Sync {
    /// Short type tag used in logs.
    fn kind(&self) -> &'static str;

    async fn mediate(
        &self,
        ctx: &mut MessageContext,
        runtime: &RuntimeContext,
    ) -> Result<(), MediatorError>;
}

/// An ordered list of mediators run one after another.
#[derive(Clone, Default)]
pub struct Sequence {
    name: Option<String>,
    mediators: Vec<Arc<dyn Mediator>>,
}

impl Sequence {
    pub fn new(mediators: Vec<Arc<dyn Mediator>>) -> Self {
        Self {
            name: None,
            mediators,
        }
    }

    pub fn named(name: impl Into<String>, mediators: Vec<Arc<dyn Mediator>>) -> Self {
        Self {
            name: Some(name.into()),
            mediators,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.mediators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mediators.is_empty()
    }
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("name", &self.name)
            .field(
                "mediators",
                &self.mediators.iter().map(|m| m.kind()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[async_trait]
impl Mediator for Sequence {
    fn kind(&self) -> &'static str {
        "sequence"
    }

    async fn mediate(
        &self,
        ctx: &mut MessageContext,
        runtime: &RuntimeContext,
    ) -> Result<(), MediatorError> {
        for mediator in &self.mediators {
            tracing::trace!(
                sequence = self.name.as_deref().unwrap_or("<inline>"),
                mediator = mediator.kind(),
                "mediating"
            );
            mediator.mediate(ctx, runtime).await?;
        }
        Ok(())
    }
}

/// Named sequences addressable by key.
#[derive(Debug, Default)]
pub struct SequenceRegistry {
    sequences: HashMap<String, Arc<Sequence>>,
}

impl SequenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: impl Into<String>, sequence: Arc<Sequence>) {
        self.sequences.insert(key.into(), sequence);
    }

    pub fn get(&self, key: &str) -> Option<Arc<Sequence>> {
        self.sequences.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sequences.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::body::Element;
    use crate::core::property_store::{PropertyScope, PropertyValue};
    use crate::scope::NamingPolicy;

    fn ctx() -> MessageContext {
        MessageContext::from_parts("t", Some(Element::new("root")), NamingPolicy::default())
    }

    fn set(name: &str, value: &str) -> Arc<dyn Mediator> {
        Arc::new(
            PropertyMediator::new(PropertyConfig {
                name: name.into(),
                scope: PropertyScope::Message,
                value: Some(ValueExpr::Literal(value.into())),
                action: PropertyAction::Set,
            })
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_sequence_runs_in_order() {
        let sequence = Sequence::new(vec![set("k", "first"), set("k", "second")]);
        let mut ctx = ctx();
        sequence
            .mediate(&mut ctx, &RuntimeContext::default())
            .await
            .unwrap();
        assert_eq!(
            ctx.get_property(PropertyScope::Message, "k"),
            Some(&PropertyValue::from("second"))
        );
    }

    #[tokio::test]
    async fn test_sequence_stops_at_first_fault() {
        let fail: Arc<dyn Mediator> = Arc::new(FailMediator::new(FailConfig {
            message: "stop".into(),
            when: None,
        }));
        let sequence = Sequence::new(vec![set("a", "1"), fail, set("b", "2")]);
        let mut ctx = ctx();
        let result = sequence.mediate(&mut ctx, &RuntimeContext::default()).await;
        assert!(matches!(result, Err(MediatorError::Fault(m)) if m == "stop"));
        assert!(ctx.get_property(PropertyScope::Message, "a").is_some());
        assert!(ctx.get_property(PropertyScope::Message, "b").is_none());
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = SequenceRegistry::new();
        registry.register("s", Arc::new(Sequence::named("s", vec![])));
        assert!(registry.contains("s"));
        assert_eq!(registry.get("s").unwrap().name(), Some("s"));
        assert!(registry.get("missing").is_none());
        assert_eq!(format!("{:?}", Sequence::new(vec![set("a", "b")])), "Sequence { name: None, mediators: [\"property\"] }");
    }
}
