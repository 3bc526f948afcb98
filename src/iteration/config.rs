use std::sync::Arc;

use crate::mediators::{Sequence, ValueExpr};

/// The sequence run once per fragment.
#[derive(Debug, Clone)]
pub enum InnerSequence {
    Inline(Arc<Sequence>),
    /// Key into the runtime's sequence registry, resolved when the construct
    /// starts.
    Named(String),
}

/// Static configuration of one foreach definition site.
#[derive(Debug, Clone)]
pub struct ForEachConfig {
    /// Explicit id. Blank ids are treated as absent.
    pub id: Option<String>,
    /// Selection expression naming the repeating fragments.
    pub expression: String,
    /// Evaluated once on entry and stored under `group`.
    pub group: Option<ValueExpr>,
    pub sequence: InnerSequence,
}

impl ForEachConfig {
    pub fn new(expression: impl Into<String>, sequence: InnerSequence) -> Self {
        Self {
            id: None,
            expression: expression.into(),
            group: None,
            sequence,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_group(mut self, group: ValueExpr) -> Self {
        self.group = Some(group);
        self
    }
}
