//! State machine driving one foreach construct instance.

use std::sync::Arc;

use super::config::{ForEachConfig, InnerSequence};
use super::keys;
use super::promotion::promote;
use super::writeback::merge;
use crate::core::body::{BodyError, Element};
use crate::core::message_context::{ConstructFrame, MessageContext};
use crate::core::pipeline_invoker::{resolve_pipeline_invoker, InnerPipelineInvoker};
use crate::core::property_store::{PropertyStore, PropertyValue};
use crate::core::runtime_context::RuntimeContext;
use crate::error::MediatorError;
use crate::mediators::Sequence;
use crate::scope::{ResolvedName, SiteId};
use crate::selector::{select, FragmentHandle, SelectionExpression};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationState {
    Idle,
    Selecting,
    Preparing(usize),
    Invoking(usize),
    Collecting(usize),
    Merging,
    Promoting,
    Done,
    Failed,
}

/// Outcome of a completed construct instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationReport {
    pub name: ResolvedName,
    pub iterations: usize,
    pub state: IterationState,
}

/// Everything fixed at `Selecting`.
struct Selection {
    sequence: Arc<Sequence>,
    snapshot: Element,
    handles: Vec<FragmentHandle>,
    group: Option<PropertyValue>,
}

pub struct IterationEngine<'a> {
    config: &'a ForEachConfig,
    site: SiteId,
    state: IterationState,
}

impl<'a> IterationEngine<'a> {
    pub fn new(config: &'a ForEachConfig, site: SiteId) -> Self {
        Self {
            config,
            site,
            state: IterationState::Idle,
        }
    }

    pub fn state(&self) -> IterationState {
        self.state
    }

    fn transition(&mut self, name: &ResolvedName, next: IterationState) {
        tracing::trace!(construct = %name, from = ?self.state, to = ?next, "foreach transition");
        self.state = next;
    }

    /// Run the construct against `ctx`.
    ///
    /// On failure the message body and message-scope properties are left as
    /// they were on entry, including writes made by completed iterations and
    /// by nested constructs.
    pub async fn run(
        &mut self,
        ctx: &mut MessageContext,
        runtime: &RuntimeContext,
    ) -> Result<IterationReport, MediatorError> {
        let name = ctx
            .namer_mut()
            .resolve(self.config.id.as_deref(), self.site);
        self.transition(&name, IterationState::Selecting);

        let selection = match self.select(ctx, runtime) {
            Ok(selection) => selection,
            Err(e) => {
                tracing::warn!(construct = %name, error = %e, "foreach configuration fault");
                self.transition(&name, IterationState::Failed);
                return Err(e);
            }
        };
        tracing::debug!(
            construct = %name,
            correlation_id = ctx.correlation_id(),
            fragments = selection.handles.len(),
            "foreach selected fragments"
        );

        let mut frame = ConstructFrame::new(name.clone());
        let store = frame.construct_mut();
        store.set(keys::COUNT, 0i64);
        store.set(keys::ORIGINAL_PAYLOAD, selection.snapshot.clone());
        if let Some(group) = &selection.group {
            store.set(keys::GROUP, group.clone());
        }
        let entry_properties = ctx.message_properties().clone();
        ctx.push_frame(frame);

        let outcome = self.iterate(&name, &selection, ctx, runtime).await;
        let construct = ctx
            .pop_frame()
            .map(ConstructFrame::into_construct)
            .unwrap_or_default();

        let replacements = match outcome {
            Ok(replacements) => replacements,
            Err(e) => {
                tracing::warn!(construct = %name, error = %e, "foreach aborted");
                ctx.replace_message_properties(entry_properties);
                self.transition(&name, IterationState::Failed);
                return Err(e);
            }
        };

        self.transition(&name, IterationState::Merging);
        let iterations = replacements.len();
        let merged = match merge(selection.snapshot, &selection.handles, replacements) {
            Ok(merged) => merged,
            Err(e) => {
                ctx.replace_message_properties(entry_properties);
                self.transition(&name, IterationState::Failed);
                return Err(e.into());
            }
        };

        self.transition(&name, IterationState::Promoting);
        if let Err(e) = promote(ctx, &name, &construct) {
            ctx.replace_message_properties(entry_properties);
            self.transition(&name, IterationState::Failed);
            return Err(e);
        }
        ctx.replace_body(Some(merged));

        self.transition(&name, IterationState::Done);
        tracing::debug!(construct = %name, iterations, "foreach completed");
        Ok(IterationReport {
            name,
            iterations,
            state: self.state,
        })
    }

    fn select(
        &self,
        ctx: &MessageContext,
        runtime: &RuntimeContext,
    ) -> Result<Selection, MediatorError> {
        let sequence = match &self.config.sequence {
            InnerSequence::Inline(sequence) => sequence.clone(),
            InnerSequence::Named(key) => runtime
                .sequences()
                .get(key)
                .ok_or_else(|| MediatorError::SequenceNotFound(key.clone()))?,
        };
        let expression = SelectionExpression::parse(&self.config.expression)?;
        let snapshot = ctx.body().ok_or(MediatorError::MissingBody)?.clone();
        let handles = select(&snapshot, &expression);
        let group = match &self.config.group {
            Some(expr) => expr.evaluate(ctx)?,
            None => None,
        };
        Ok(Selection {
            sequence,
            snapshot,
            handles,
            group,
        })
    }

    async fn iterate(
        &mut self,
        name: &ResolvedName,
        selection: &Selection,
        ctx: &mut MessageContext,
        runtime: &RuntimeContext,
    ) -> Result<Vec<Element>, MediatorError> {
        let invoker = resolve_pipeline_invoker(runtime);
        let mut replacements = Vec::with_capacity(selection.handles.len());

        for handle in &selection.handles {
            let index = handle.ordinal;
            self.transition(name, IterationState::Preparing(index));
            let fragment = selection
                .snapshot
                .at_path(&handle.path)
                .cloned()
                .ok_or_else(|| BodyError::InvalidPath(handle.path.clone()))?;

            let mut iteration = PropertyStore::new();
            iteration.set(keys::INDEX, index as i64);
            iteration.set(keys::ORIGINAL_FRAGMENT, fragment.clone());
            if let Some(frame) = ctx.active_frame_mut() {
                if let Some(group) = frame.construct().get(keys::GROUP).cloned() {
                    iteration.set(keys::GROUP, group);
                }
                frame
                    .construct_mut()
                    .set(keys::ORIGINAL_FRAGMENT, fragment.clone());
                frame.begin_iteration(iteration);
            }

            self.transition(name, IterationState::Invoking(index));
            let produced = invoke_on_fragment(
                invoker.as_ref(),
                &selection.sequence,
                fragment,
                ctx,
                runtime,
            )
            .await;
            if let Some(frame) = ctx.active_frame_mut() {
                frame.end_iteration();
            }

            let replacement = match produced {
                Ok(Some(body)) => body,
                Ok(None) => {
                    return Err(MediatorError::FragmentMissing {
                        construct: name.to_string(),
                        index,
                    })
                }
                Err(source) => {
                    return Err(MediatorError::IterationFault {
                        construct: name.to_string(),
                        index,
                        source: Box::new(source),
                    })
                }
            };

            self.transition(name, IterationState::Collecting(index));
            replacements.push(replacement);
            if let Some(frame) = ctx.active_frame_mut() {
                frame.construct_mut().increment(keys::COUNT, 1);
            }
        }
        Ok(replacements)
    }
}

/// Swap `fragment` in as the body, run the sequence and swap the enclosing
/// body back, returning whatever body the sequence left behind.
async fn invoke_on_fragment(
    invoker: &dyn InnerPipelineInvoker,
    sequence: &Sequence,
    fragment: Element,
    ctx: &mut MessageContext,
    runtime: &RuntimeContext,
) -> Result<Option<Element>, MediatorError> {
    let enclosing = ctx.replace_body(Some(fragment));
    let result = invoker.invoke(sequence, ctx, runtime).await;
    let produced = ctx.replace_body(enclosing);
    result.map(|_| produced)
}
