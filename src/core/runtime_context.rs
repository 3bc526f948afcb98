use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::core::pipeline_invoker::InnerPipelineInvoker;
use crate::mediators::SequenceRegistry;
use crate::scope::NamingPolicy;

/// Engine-wide settings read when a message context is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub naming_policy: NamingPolicy,
}

/// Runtime context providing ID generation, named sequences and the
/// inner-pipeline invoker shared by every execution of a pipeline.
#[derive(Clone)]
pub struct RuntimeContext {
    pub id_generator: Arc<dyn IdGenerator>,
    pub config: EngineConfig,
    sequences: Arc<SequenceRegistry>,
    pipeline_invoker: Option<Arc<dyn InnerPipelineInvoker>>,
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self {
            id_generator: Arc::new(RealIdGenerator),
            config: EngineConfig::default(),
            sequences: Arc::new(SequenceRegistry::new()),
            pipeline_invoker: None,
        }
    }
}

impl RuntimeContext {
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = id_generator;
        self
    }

    pub fn with_sequences(mut self, sequences: Arc<SequenceRegistry>) -> Self {
        self.sequences = sequences;
        self
    }

    pub fn with_pipeline_invoker(mut self, invoker: Arc<dyn InnerPipelineInvoker>) -> Self {
        self.pipeline_invoker = Some(invoker);
        self
    }

    pub fn sequences(&self) -> &SequenceRegistry {
        &self.sequences
    }

    pub fn pipeline_invoker(&self) -> Option<&Arc<dyn InnerPipelineInvoker>> {
        self.pipeline_invoker.as_ref()
    }
}

pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

pub struct RealIdGenerator;

impl IdGenerator for RealIdGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

pub struct FakeIdGenerator {
    pub prefix: String,
    pub counter: AtomicU64,
}

impl FakeIdGenerator {
    pub fn new(prefix: String) -> Self {
        Self {
            prefix,
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for FakeIdGenerator {
    fn next_id(&self) -> String {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, id)
    }
}
