//! Attribute contracts: the check a generator runs before acting on a definition.

use std::collections::{BTreeMap, HashMap};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Accepts any value; for attributes that only need to be present.
pub fn always_allow(_value: &str) -> bool {
    true
}

/// Attribute name → predicate over its value.
#[derive(Default)]
pub struct Preconditions {
    entries: HashMap<String, Predicate>,
}

impl Preconditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.insert(name, predicate);
        self
    }

    pub fn insert<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Box::new(predicate));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for Preconditions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Preconditions").field("names", &names).finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ContractResult {
    pub attributes: BTreeMap<String, String>,
    pub valid: bool,
}

/// Copies every attribute whose precondition holds. A missing attribute or a failed predicate
/// makes the result invalid; attributes without a precondition are ignored.
pub fn attribute_contract(
    attributes: &BTreeMap<String, String>,
    preconditions: &Preconditions,
) -> ContractResult {
    let mut accepted = BTreeMap::new();
    let mut valid = true;

    for (name, predicate) in &preconditions.entries {
        match attributes.get(name) {
            Some(value) if predicate(value.as_str()) => {
                accepted.insert(name.clone(), value.clone());
            }
            _ => valid = false,
        }
    }

    ContractResult {
        attributes: accepted,
        valid,
    }
}
