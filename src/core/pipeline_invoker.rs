//! Inner-pipeline invoker for the foreach construct.
//!
//! The [`InnerPipelineInvoker`] trait abstracts how a per-fragment sequence is
//! run so that tests and hosts can substitute custom implementations.

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::message_context::MessageContext;
use crate::core::runtime_context::RuntimeContext;
use crate::error::MediatorError;
use crate::mediators::{Mediator, Sequence};

/// Runs an inner sequence against a fragment view of the message.
///
/// The view's body holds the fragment on entry; whatever body it holds when
/// the call returns `Ok` becomes the fragment's replacement.
#[async_trait]
pub trait InnerPipelineInvoker: Send + Sync {
    async fn invoke(
        &self,
        sequence: &Sequence,
        view: &mut MessageContext,
        runtime: &RuntimeContext,
    ) -> Result<(), MediatorError>;
}

/// Default [`InnerPipelineInvoker`] that mediates the sequence in place.
pub struct DefaultPipelineInvoker;

#[async_trait]
impl InnerPipelineInvoker for DefaultPipelineInvoker {
    async fn invoke(
        &self,
        sequence: &Sequence,
        view: &mut MessageContext,
        runtime: &RuntimeContext,
    ) -> Result<(), MediatorError> {
        sequence.mediate(view, runtime).await
    }
}

pub(crate) fn resolve_pipeline_invoker(runtime: &RuntimeContext) -> Arc<dyn InnerPipelineInvoker> {
    runtime
        .pipeline_invoker()
        .cloned()
        .unwrap_or_else(|| Arc::new(DefaultPipelineInvoker))
}
