//! # XMediation: split, process and merge for XML message mediation
//!
//! `xmediation` runs messages through pipelines of mediators defined in a
//! YAML, JSON or TOML DSL. Its centrepiece is the `foreach` construct:
//!
//! - **Selection**: an XPath-style expression picks the repeating fragments
//!   of the message body.
//! - **Per-fragment sequences**: each fragment runs through an inner
//!   sequence (inline or named), strictly in document order.
//! - **Merge**: processed fragments replace the originals in place; all
//!   other nodes stay untouched. A fault in any fragment aborts the whole
//!   construct and leaves the body as it was.
//! - **Scoped properties**: message, construct and iteration scopes. On
//!   success the construct scope is promoted into message scope under
//!   `<resolved-name>_<key>`, e.g. `1_count`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xmediation::{DslFormat, PipelineRunner};
//!
//! #[tokio::main]
//! async fn main() {
//!     let yaml = std::fs::read_to_string("pipeline.yaml").unwrap();
//!     let runner = PipelineRunner::from_dsl(&yaml, DslFormat::Yaml).unwrap();
//!     let ctx = runner.run_xml("<list><item>a</item></list>").await.unwrap();
//!     println!("{}", ctx.body().unwrap());
//! }
//! ```

pub mod api;
pub mod core;
pub mod dsl;
pub mod error;
pub mod iteration;
pub mod mediators;
pub mod scope;
pub mod selector;

pub use api::{PipelineRunner, PipelineRunnerBuilder};
pub use core::{
    parse_payload, parse_xml, Element, EngineConfig, MessageContext, PropertyScope,
    PropertyValue, RuntimeContext,
};
pub use dsl::{parse_dsl, DslFormat, PipelineSchema};
pub use error::{MediationError, MediationResult, MediatorError, MediatorResult};
pub use iteration::{ForEachConfig, ForEachMediator, InnerSequence, IterationReport};
pub use mediators::{Mediator, Sequence};
pub use scope::{NamingPolicy, ResolvedName};
