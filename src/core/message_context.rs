//! The mutable envelope a pipeline execution works on.

use crate::core::body::Element;
use crate::core::property_store::{PropertyScope, PropertyStore, PropertyValue};
use crate::core::runtime_context::RuntimeContext;
use crate::error::MediatorError;
use crate::scope::{NamingPolicy, ResolvedName, ScopeNamer};

/// Properties of one live construct instance.
#[derive(Debug, Clone)]
pub struct ConstructFrame {
    name: ResolvedName,
    construct: PropertyStore,
    iteration: Option<PropertyStore>,
}

impl ConstructFrame {
    pub fn new(name: ResolvedName) -> Self {
        Self {
            name,
            construct: PropertyStore::new(),
            iteration: None,
        }
    }

    pub fn name(&self) -> &ResolvedName {
        &self.name
    }

    pub fn construct(&self) -> &PropertyStore {
        &self.construct
    }

    pub fn construct_mut(&mut self) -> &mut PropertyStore {
        &mut self.construct
    }

    pub(crate) fn begin_iteration(&mut self, store: PropertyStore) {
        self.iteration = Some(store);
    }

    pub(crate) fn end_iteration(&mut self) -> Option<PropertyStore> {
        self.iteration.take()
    }

    pub(crate) fn into_construct(self) -> PropertyStore {
        self.construct
    }
}

/// Message body, three-tier properties and per-execution naming state.
///
/// Construct and iteration scope resolve against the innermost active
/// construct instance.
#[derive(Debug, Clone)]
pub struct MessageContext {
    correlation_id: String,
    body: Option<Element>,
    properties: PropertyStore,
    frames: Vec<ConstructFrame>,
    namer: ScopeNamer,
}

impl MessageContext {
    pub fn new(body: Element, runtime: &RuntimeContext) -> Self {
        Self::from_parts(
            runtime.id_generator.next_id(),
            Some(body),
            runtime.config.naming_policy,
        )
    }

    pub fn from_parts(
        correlation_id: impl Into<String>,
        body: Option<Element>,
        naming_policy: NamingPolicy,
    ) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            body,
            properties: PropertyStore::new(),
            frames: Vec::new(),
            namer: ScopeNamer::new(naming_policy),
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn body(&self) -> Option<&Element> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> Option<&mut Element> {
        self.body.as_mut()
    }

    /// Swap the body, returning the previous one.
    pub fn replace_body(&mut self, body: Option<Element>) -> Option<Element> {
        std::mem::replace(&mut self.body, body)
    }

    pub fn message_properties(&self) -> &PropertyStore {
        &self.properties
    }

    /// Swap the message-scope store, returning the previous one.
    pub(crate) fn replace_message_properties(&mut self, properties: PropertyStore) -> PropertyStore {
        std::mem::replace(&mut self.properties, properties)
    }

    pub fn get_property(&self, scope: PropertyScope, key: &str) -> Option<&PropertyValue> {
        match scope {
            PropertyScope::Message => self.properties.get(key),
            PropertyScope::Construct => self.frames.last()?.construct.get(key),
            PropertyScope::Iteration => self.frames.last()?.iteration.as_ref()?.get(key),
        }
    }

    pub fn set_property(
        &mut self,
        scope: PropertyScope,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Result<(), MediatorError> {
        self.store_mut(scope)?.set(key, value);
        Ok(())
    }

    pub fn remove_property(
        &mut self,
        scope: PropertyScope,
        key: &str,
    ) -> Result<Option<PropertyValue>, MediatorError> {
        Ok(self.store_mut(scope)?.remove(key))
    }

    fn store_mut(&mut self, scope: PropertyScope) -> Result<&mut PropertyStore, MediatorError> {
        match scope {
            PropertyScope::Message => Ok(&mut self.properties),
            PropertyScope::Construct => self
                .frames
                .last_mut()
                .map(|f| &mut f.construct)
                .ok_or(MediatorError::NoActiveScope(scope)),
            PropertyScope::Iteration => self
                .frames
                .last_mut()
                .and_then(|f| f.iteration.as_mut())
                .ok_or(MediatorError::NoActiveScope(scope)),
        }
    }

    pub fn active_construct(&self) -> Option<&ConstructFrame> {
        self.frames.last()
    }

    pub fn construct_depth(&self) -> usize {
        self.frames.len()
    }

    pub fn namer(&self) -> &ScopeNamer {
        &self.namer
    }

    pub(crate) fn namer_mut(&mut self) -> &mut ScopeNamer {
        &mut self.namer
    }

    pub(crate) fn push_frame(&mut self, frame: ConstructFrame) {
        self.frames.push(frame);
    }

    pub(crate) fn pop_frame(&mut self) -> Option<ConstructFrame> {
        self.frames.pop()
    }

    pub(crate) fn active_frame_mut(&mut self) -> Option<&mut ConstructFrame> {
        self.frames.last_mut()
    }
}
