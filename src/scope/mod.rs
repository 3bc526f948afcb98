//! Resolved names for foreach construct instances.
//!
//! Every property a construct promotes into message scope is keyed
//! `<resolved-name>_<suffix>`, so two constructs never collide as long as
//! their resolved names differ.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Separator between a resolved name and a property suffix.
pub const KEY_DELIMITER: char = '_';

/// Identifies where a construct is declared in a pipeline definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteId(pub usize);

/// The disambiguating prefix of one construct instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedName(String);

impl ResolvedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<name>_<suffix>`
    pub fn property_key(&self, suffix: &str) -> String {
        let mut key = String::with_capacity(self.0.len() + 1 + suffix.len());
        key.push_str(&self.0);
        key.push(KEY_DELIMITER);
        key.push_str(suffix);
        key
    }
}

impl std::fmt::Display for ResolvedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How id-less constructs are numbered when a definition site starts more
/// than once in the same execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// Every start takes the next ordinal.
    #[default]
    PerInvocation,
    /// A site keeps the ordinal it received on its first start.
    PerDefinitionSite,
}

/// Per-execution registry of constructs started so far.
///
/// Lives on the message context; never shared between executions.
#[derive(Debug, Clone, Default)]
pub struct ScopeNamer {
    policy: NamingPolicy,
    ordinal: usize,
    site_ordinals: HashMap<SiteId, usize>,
}

impl ScopeNamer {
    pub fn new(policy: NamingPolicy) -> Self {
        Self {
            policy,
            ordinal: 0,
            site_ordinals: HashMap::new(),
        }
    }

    /// Ordinals handed out so far.
    pub fn started(&self) -> usize {
        self.ordinal
    }

    /// Register a construct start and produce its resolved name.
    ///
    /// Constructs with an explicit id still take an ordinal, so an id-less
    /// construct's name reflects its position among all constructs started.
    pub fn resolve(&mut self, explicit_id: Option<&str>, site: SiteId) -> ResolvedName {
        let ordinal = match self.policy {
            NamingPolicy::PerInvocation => {
                self.ordinal += 1;
                self.ordinal
            }
            NamingPolicy::PerDefinitionSite => {
                let ordinal = &mut self.ordinal;
                *self.site_ordinals.entry(site).or_insert_with(|| {
                    *ordinal += 1;
                    *ordinal
                })
            }
        };

        match explicit_id.map(str::trim) {
            Some(id) if !id.is_empty() => ResolvedName::new(id),
            _ => ResolvedName::new(ordinal.to_string()),
        }
    }
}
