pub mod builder;
pub mod parser;
pub mod schema;

pub use builder::{build_pipeline, CompiledPipeline};
pub use parser::{parse_dsl, DslFormat};
pub use schema::*;
