use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::runtime_context::EngineConfig;
use crate::mediators::{
    AppendConfig, CallConfig, FailConfig, LogConfig, PayloadConfig, PropertyConfig, ValueExpr,
};

// ================================
// Pipeline DSL Schema
// ================================

/// Current supported DSL version
pub const CURRENT_DSL_VERSION: &str = "0.1.0";

/// All supported DSL versions
pub const SUPPORTED_DSL_VERSIONS: &[&str] = &["0.1.0"];

fn default_version() -> String {
    CURRENT_DSL_VERSION.to_string()
}

/// A mediation pipeline: the main sequence plus named sequences it (or a
/// foreach) can refer to.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PipelineSchema {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub config: EngineConfig,
    #[serde(default)]
    pub sequences: BTreeMap<String, Vec<MediatorConfig>>,
    pub pipeline: Vec<MediatorConfig>,
}

/// One mediator in a sequence. The `type` field selects the variant.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MediatorConfig {
    Property(PropertyConfig),
    Log(LogConfig),
    Append(AppendConfig),
    Payload(PayloadConfig),
    Call(CallConfig),
    Fail(FailConfig),
    Foreach(ForEachSchema),
}

impl MediatorConfig {
    pub fn type_name(&self) -> &'static str {
        match self {
            MediatorConfig::Property(_) => "property",
            MediatorConfig::Log(_) => "log",
            MediatorConfig::Append(_) => "append",
            MediatorConfig::Payload(_) => "payload",
            MediatorConfig::Call(_) => "call",
            MediatorConfig::Fail(_) => "fail",
            MediatorConfig::Foreach(_) => "foreach",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ForEachSchema {
    #[serde(default)]
    pub id: Option<String>,
    pub expression: String,
    #[serde(default)]
    pub group: Option<ValueExpr>,
    pub sequence: SequenceRefSchema,
}

/// Either a named sequence key or an inline mediator list.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum SequenceRefSchema {
    Named(String),
    Inline(Vec<MediatorConfig>),
}
