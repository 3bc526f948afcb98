//! Turns a [`PipelineSchema`] into runnable sequences.
//!
//! Every `foreach` receives a [`SiteId`] in pre-order: the main pipeline
//! first, then named sequences in key order. Inline inner sequences are
//! numbered right after the construct that owns them.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::schema::{
    ForEachSchema, MediatorConfig, PipelineSchema, SequenceRefSchema, SUPPORTED_DSL_VERSIONS,
};
use crate::core::runtime_context::EngineConfig;
use crate::error::{MediationError, MediatorError};
use crate::iteration::{ForEachConfig, ForEachMediator, InnerSequence};
use crate::mediators::{
    AppendMediator, CallMediator, FailMediator, LogMediator, Mediator, PayloadMediator,
    PropertyMediator, Sequence, SequenceRegistry,
};
use crate::scope::SiteId;

/// Output of [`build_pipeline`].
#[derive(Debug, Clone)]
pub struct CompiledPipeline {
    pub main: Arc<Sequence>,
    pub sequences: Arc<SequenceRegistry>,
    pub config: EngineConfig,
    /// Number of foreach definition sites.
    pub sites: usize,
}

struct Builder<'a> {
    named: &'a BTreeMap<String, Vec<MediatorConfig>>,
    next_site: usize,
}

pub fn build_pipeline(schema: &PipelineSchema) -> Result<CompiledPipeline, MediationError> {
    if !SUPPORTED_DSL_VERSIONS.contains(&schema.version.as_str()) {
        return Err(MediationError::BuildError(format!(
            "unsupported DSL version '{}'",
            schema.version
        )));
    }

    let mut builder = Builder {
        named: &schema.sequences,
        next_site: 0,
    };
    let main = builder.sequence(None, &schema.pipeline)?;

    let mut registry = SequenceRegistry::new();
    for (key, mediators) in &schema.sequences {
        let sequence = builder.sequence(Some(key), mediators)?;
        registry.register(key.clone(), Arc::new(sequence));
    }

    tracing::debug!(
        mediators = main.len(),
        sequences = registry.len(),
        sites = builder.next_site,
        "pipeline built"
    );
    Ok(CompiledPipeline {
        main: Arc::new(main),
        sequences: Arc::new(registry),
        config: schema.config.clone(),
        sites: builder.next_site,
    })
}

impl Builder<'_> {
    fn sequence(
        &mut self,
        name: Option<&str>,
        configs: &[MediatorConfig],
    ) -> Result<Sequence, MediationError> {
        let mut mediators = Vec::with_capacity(configs.len());
        for config in configs {
            mediators.push(self.mediator(config)?);
        }
        Ok(match name {
            Some(name) => Sequence::named(name, mediators),
            None => Sequence::new(mediators),
        })
    }

    fn mediator(&mut self, config: &MediatorConfig) -> Result<Arc<dyn Mediator>, MediationError> {
        let wrap = |e: MediatorError| {
            MediationError::BuildError(format!("{} mediator: {}", config.type_name(), e))
        };
        let mediator: Arc<dyn Mediator> = match config {
            MediatorConfig::Property(c) => Arc::new(PropertyMediator::new(c.clone()).map_err(wrap)?),
            MediatorConfig::Log(c) => Arc::new(LogMediator::new(c.clone()).map_err(wrap)?),
            MediatorConfig::Append(c) => Arc::new(AppendMediator::new(c.clone()).map_err(wrap)?),
            MediatorConfig::Payload(c) => Arc::new(PayloadMediator::new(c.clone()).map_err(wrap)?),
            MediatorConfig::Call(c) => {
                self.check_reference(&c.sequence);
                Arc::new(CallMediator::new(c.clone()))
            }
            MediatorConfig::Fail(c) => Arc::new(FailMediator::new(c.clone())),
            MediatorConfig::Foreach(c) => Arc::new(self.foreach(c)?),
        };
        Ok(mediator)
    }

    fn foreach(&mut self, schema: &ForEachSchema) -> Result<ForEachMediator, MediationError> {
        let site = SiteId(self.next_site);
        self.next_site += 1;

        let sequence = match &schema.sequence {
            SequenceRefSchema::Named(key) => {
                self.check_reference(key);
                InnerSequence::Named(key.clone())
            }
            SequenceRefSchema::Inline(configs) => {
                InnerSequence::Inline(Arc::new(self.sequence(None, configs)?))
            }
        };
        let config = ForEachConfig {
            id: schema.id.clone(),
            expression: schema.expression.clone(),
            group: schema.group.clone(),
            sequence,
        };
        Ok(ForEachMediator::new(config, site))
    }

    // Unknown keys fault at run time, when the reference is followed.
    fn check_reference(&self, key: &str) {
        if !self.named.contains_key(key) {
            tracing::warn!(sequence = key, "reference to undefined named sequence");
        }
    }
}
