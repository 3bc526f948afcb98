use thiserror::Error;

use crate::core::body::BodyError;
use crate::core::property_store::PropertyScope;
use crate::selector::SelectorError;

/// Mediator-level faults
#[derive(Debug, Error)]
pub enum MediatorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid selection expression: {0}")]
    Selection(#[from] SelectorError),
    #[error("Sequence not found: {0}")]
    SequenceNotFound(String),
    #[error("Message has no body")]
    MissingBody,
    #[error("No active construct for {0} scope")]
    NoActiveScope(PropertyScope),
    #[error("Iteration fault in construct '{construct}' at fragment {index}: {source}")]
    IterationFault {
        construct: String,
        index: usize,
        #[source]
        source: Box<MediatorError>,
    },
    #[error("Fragment {index} of construct '{construct}' was dropped by the inner pipeline")]
    FragmentMissing { construct: String, index: usize },
    #[error("Body error: {0}")]
    Body(#[from] BodyError),
    #[error("Mediation fault: {0}")]
    Fault(String),
}

impl MediatorError {
    /// Configuration faults are reported before any fragment is processed.
    pub fn is_configuration_fault(&self) -> bool {
        matches!(
            self,
            MediatorError::ConfigError(_)
                | MediatorError::Selection(_)
                | MediatorError::SequenceNotFound(_)
                | MediatorError::MissingBody
        )
    }

    /// Index of the failing fragment for iteration faults.
    pub fn failed_index(&self) -> Option<usize> {
        match self {
            MediatorError::IterationFault { index, .. }
            | MediatorError::FragmentMissing { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The innermost cause, unwrapping nested iteration faults.
    pub fn root_cause(&self) -> &MediatorError {
        match self {
            MediatorError::IterationFault { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
