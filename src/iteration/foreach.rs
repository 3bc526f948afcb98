//! The foreach construct as a [`Mediator`], so it can be nested inside any
//! sequence, including another foreach's inner sequence.

use async_trait::async_trait;

use super::config::ForEachConfig;
use super::engine::{IterationEngine, IterationReport};
use crate::core::message_context::MessageContext;
use crate::core::runtime_context::RuntimeContext;
use crate::error::MediatorError;
use crate::mediators::Mediator;
use crate::scope::SiteId;

pub struct ForEachMediator {
    config: ForEachConfig,
    site: SiteId,
}

impl ForEachMediator {
    pub fn new(config: ForEachConfig, site: SiteId) -> Self {
        Self { config, site }
    }

    /// Run once and return the engine's report.
    pub async fn run(
        &self,
        ctx: &mut MessageContext,
        runtime: &RuntimeContext,
    ) -> Result<IterationReport, MediatorError> {
        IterationEngine::new(&self.config, self.site)
            .run(ctx, runtime)
            .await
    }
}

#[async_trait]
impl Mediator for ForEachMediator {
    fn kind(&self) -> &'static str {
        "foreach"
    }

    async fn mediate(
        &self,
        ctx: &mut MessageContext,
        runtime: &RuntimeContext,
    ) -> Result<(), MediatorError> {
        self.run(ctx, runtime).await.map(|_| ())
    }
}
