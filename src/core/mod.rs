pub mod body;
pub mod message_context;
pub mod pipeline_invoker;
pub mod property_store;
pub mod runtime_context;

pub use body::{parse_payload, parse_xml, BodyError, Element, Node};
pub use message_context::{ConstructFrame, MessageContext};
pub use pipeline_invoker::{DefaultPipelineInvoker, InnerPipelineInvoker};
pub use property_store::{PropertyScope, PropertyStore, PropertyValue};
pub use runtime_context::{
    EngineConfig, FakeIdGenerator, IdGenerator, RealIdGenerator, RuntimeContext,
};
