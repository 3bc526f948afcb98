//! High-level pipeline runner and builder.
//!
//! [`PipelineRunner`] (constructed via [`PipelineRunnerBuilder`]) is the main
//! entry point for executing a parsed pipeline schema. It owns the compiled
//! sequences and the runtime context shared by every message it mediates.

use std::sync::Arc;

use crate::core::body::{parse_payload, Element};
use crate::core::message_context::MessageContext;
use crate::core::pipeline_invoker::InnerPipelineInvoker;
use crate::core::runtime_context::{EngineConfig, IdGenerator, RuntimeContext};
use crate::dsl::{build_pipeline, parse_dsl, DslFormat, PipelineSchema};
use crate::error::MediationError;
use crate::mediators::{Mediator, Sequence};

/// Pipeline runner with builder-based configuration.
///
/// Use [`PipelineRunner::builder(schema)`](Self::builder) to obtain a
/// [`PipelineRunnerBuilder`]. A runner can be shared between tasks; each
/// call to [`run`](Self::run) works on its own [`MessageContext`].
pub struct PipelineRunner {
    main: Arc<Sequence>,
    runtime: RuntimeContext,
}

impl PipelineRunner {
    /// Create a new builder from a parsed pipeline schema.
    pub fn builder(schema: PipelineSchema) -> PipelineRunnerBuilder {
        PipelineRunnerBuilder {
            schema,
            config: None,
            id_generator: None,
            pipeline_invoker: None,
        }
    }

    /// Parse and build in one step with default runtime providers.
    pub fn from_dsl(content: &str, format: DslFormat) -> Result<Self, MediationError> {
        Self::builder(parse_dsl(content, format)?).build()
    }

    pub fn runtime(&self) -> &RuntimeContext {
        &self.runtime
    }

    /// A fresh message context for `body`, with its own naming state.
    pub fn new_context(&self, body: Element) -> MessageContext {
        MessageContext::new(body, &self.runtime)
    }

    /// Mediate `body` through the main pipeline.
    pub async fn run(&self, body: Element) -> Result<MessageContext, MediationError> {
        let mut ctx = self.new_context(body);
        self.run_with_context(&mut ctx).await?;
        Ok(ctx)
    }

    /// Decode an XML payload (bare or SOAP envelope) and mediate it.
    pub async fn run_xml(&self, xml: &str) -> Result<MessageContext, MediationError> {
        let body =
            parse_payload(xml).map_err(|e| MediationError::InvalidPayload(e.to_string()))?;
        self.run(body).await
    }

    pub async fn run_with_context(&self, ctx: &mut MessageContext) -> Result<(), MediationError> {
        tracing::debug!(correlation_id = ctx.correlation_id(), "mediation started");
        match self.main.mediate(ctx, &self.runtime).await {
            Ok(()) => {
                tracing::debug!(correlation_id = ctx.correlation_id(), "mediation completed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(correlation_id = ctx.correlation_id(), error = %e, "mediation failed");
                Err(e.into())
            }
        }
    }
}

/// Builder for configuring a [`PipelineRunner`].
pub struct PipelineRunnerBuilder {
    schema: PipelineSchema,
    config: Option<EngineConfig>,
    id_generator: Option<Arc<dyn IdGenerator>>,
    pipeline_invoker: Option<Arc<dyn InnerPipelineInvoker>>,
}

impl PipelineRunnerBuilder {
    /// Override the engine configuration declared in the schema.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the correlation id generator.
    pub fn id_generator(mut self, generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(generator);
        self
    }

    /// Set a custom invoker for foreach inner sequences.
    pub fn pipeline_invoker(mut self, invoker: Arc<dyn InnerPipelineInvoker>) -> Self {
        self.pipeline_invoker = Some(invoker);
        self
    }

    pub fn build(self) -> Result<PipelineRunner, MediationError> {
        let compiled = build_pipeline(&self.schema)?;
        let mut runtime = RuntimeContext::default()
            .with_config(self.config.unwrap_or(compiled.config))
            .with_sequences(compiled.sequences);
        if let Some(generator) = self.id_generator {
            runtime = runtime.with_id_generator(generator);
        }
        if let Some(invoker) = self.pipeline_invoker {
            runtime = runtime.with_pipeline_invoker(invoker);
        }
        Ok(PipelineRunner {
            main: compiled.main,
            runtime,
        })
    }
}
