//! Pipeline-level error types.

use super::MediatorError;
use thiserror::Error;

/// Pipeline-level errors
#[derive(Debug, Error)]
pub enum MediationError {
    #[error("DSL parse error: {0}")]
    DslParseError(String),
    #[error("Pipeline build error: {0}")]
    BuildError(String),
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("Mediation failed: {0}")]
    MediatorError(Box<MediatorError>),
}

impl MediationError {
    /// The mediator fault behind a failed run, if any.
    pub fn as_mediator_error(&self) -> Option<&MediatorError> {
        match self {
            MediationError::MediatorError(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<MediatorError> for MediationError {
    fn from(value: MediatorError) -> Self {
        MediationError::MediatorError(Box::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mediation_error_display() {
        assert_eq!(
            MediationError::DslParseError("x".into()).to_string(),
            "DSL parse error: x"
        );
        assert_eq!(
            MediationError::BuildError("b".into()).to_string(),
            "Pipeline build error: b"
        );
        assert_eq!(
            MediationError::InvalidPayload("p".into()).to_string(),
            "Invalid payload: p"
        );
    }

    #[test]
    fn test_mediation_error_from_mediator_error() {
        let err: MediationError = MediatorError::Fault("boom".into()).into();
        assert!(matches!(err, MediationError::MediatorError(_)));
        assert!(err.to_string().contains("boom"));
        assert!(err.as_mediator_error().is_some());
    }
}
