//! The foreach construct: split a body into fragments, run an inner
//! sequence per fragment and merge the results back in place.
//!
//! The construct pushes a [`ConstructFrame`](crate::core::ConstructFrame) for
//! its lifetime. Inner mediators see the current fragment as the message
//! body, share the construct scope with sibling iterations and get a fresh
//! iteration scope each time. Once every fragment succeeds, the merged body
//! replaces the original and the construct scope is promoted into message
//! scope under `<resolved-name>_<key>`.

pub mod config;
pub mod engine;
pub mod foreach;
pub mod promotion;
pub mod writeback;

pub use config::{ForEachConfig, InnerSequence};
pub use engine::{IterationEngine, IterationReport, IterationState};
pub use foreach::ForEachMediator;
pub use promotion::promote;
pub use writeback::merge;

/// Property keys the construct maintains.
pub mod keys {
    /// Fragments processed so far (construct scope).
    pub const COUNT: &str = "count";
    /// Value of the group expression (construct and iteration scope).
    pub const GROUP: &str = "group";
    /// Body as it was when the construct started (construct scope).
    pub const ORIGINAL_PAYLOAD: &str = "original_payload";
    /// Fragment currently, or most recently, being processed.
    pub const ORIGINAL_FRAGMENT: &str = "original_fragment";
    /// 0-based ordinal of the current fragment (iteration scope).
    pub const INDEX: &str = "index";
}
