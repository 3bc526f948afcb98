use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::body::Element;

// ================================
// PropertyScope
// ================================

/// The three tiers a property can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyScope {
    /// Visible pipeline-wide.
    #[default]
    Message,
    /// Visible while the innermost construct instance is active.
    Construct,
    /// Visible during a single fragment's inner-pipeline run.
    Iteration,
}

impl std::fmt::Display for PropertyScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PropertyScope::Message => "message",
            PropertyScope::Construct => "construct",
            PropertyScope::Iteration => "iteration",
        };
        f.write_str(name)
    }
}

// ================================
// PropertyValue
// ================================

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Xml(Element),
}

impl PropertyValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            PropertyValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            PropertyValue::Xml(e) => Some(e),
            _ => None,
        }
    }

    pub fn to_display_string(&self) -> String {
        match self {
            PropertyValue::String(s) => s.clone(),
            PropertyValue::Integer(i) => i.to_string(),
            PropertyValue::Boolean(b) => b.to_string(),
            PropertyValue::Xml(e) => e.to_xml(),
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<Element> for PropertyValue {
    fn from(value: Element) -> Self {
        PropertyValue::Xml(value)
    }
}

// ================================
// PropertyStore: one scope tier
// ================================

#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    entries: HashMap<String, PropertyValue>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Add `delta` to an integer property, treating a missing one as zero.
    pub fn increment(&mut self, key: &str, delta: i64) -> i64 {
        let next = self.get(key).and_then(|v| v.as_i64()).unwrap_or(0) + delta;
        self.set(key, next);
        next
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.entries.iter()
    }

    /// Entries sorted by key, for stable rendering.
    pub fn sorted(&self) -> Vec<(&String, &PropertyValue)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_basic() {
        let mut store = PropertyStore::new();
        store.set("group", "Group1");
        assert_eq!(store.get("group"), Some(&PropertyValue::from("Group1")));
        assert!(store.contains("group"));
        assert_eq!(store.remove("group"), Some(PropertyValue::from("Group1")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_increment_from_missing_and_string() {
        let mut store = PropertyStore::new();
        assert_eq!(store.increment("count", 1), 1);
        assert_eq!(store.increment("count", 1), 2);
        store.set("n", "41");
        assert_eq!(store.increment("n", 1), 42);
        assert_eq!(store.get("n"), Some(&PropertyValue::Integer(42)));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(PropertyValue::Integer(3).to_string(), "3");
        assert_eq!(PropertyValue::Boolean(true).to_string(), "true");
        assert_eq!(
            PropertyValue::Xml(Element::with_text("a", "b")).to_string(),
            "<a>b</a>"
        );
    }

    #[test]
    fn test_scope_serde() {
        let scope: PropertyScope = serde_json::from_value(serde_json::json!("construct")).unwrap();
        assert_eq!(scope, PropertyScope::Construct);
        assert_eq!(PropertyScope::default(), PropertyScope::Message);
    }
}
