//! Error types for the mediation engine.
//!
//! - [`MediatorError`]: faults raised while a single mediator runs, including
//!   configuration and iteration faults of the foreach construct.
//! - [`MediationError`]: top-level errors for parsing, building and running
//!   a pipeline.

pub mod mediation_error;
pub mod mediator_error;

pub use mediation_error::MediationError;
pub use mediator_error::MediatorError;

/// Convenience alias for pipeline-level results.
pub type MediationResult<T> = Result<T, MediationError>;
/// Convenience alias for mediator-level results.
pub type MediatorResult<T> = Result<T, MediatorError>;
