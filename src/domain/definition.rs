use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Value assigned to a key written without `=`.
pub const IMPLICIT_TRUE: &str = "TRUE";

/// A parsed directive, e.g. `chariot.route{path=/home}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Definition {
    pub identifier: String,
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
}

impl Definition {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            arguments: BTreeMap::new(),
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).map(String::as_str)
    }

    /// True for a bare key, i.e. one that was set without an explicit value.
    pub fn is_flag_set(&self, key: &str) -> bool {
        self.argument(key) == Some(IMPLICIT_TRUE)
    }
}

pub type DefinitionList = Vec<Definition>;

/// Why a documentation line could not be read as a directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Odd number of `{` / `}` on the line.
    BracketMismatch,
    /// Line does not have the `identifier{body}` shape.
    FormatMismatch { line: String },
    /// Body has characters left over after every argument token was consumed.
    AttributeResidue { body: String },
}

impl Warning {
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::BracketMismatch => "bracket_mismatch",
            Warning::FormatMismatch { .. } => "format_mismatch",
            Warning::AttributeResidue { .. } => "attribute_residue",
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::BracketMismatch => write!(f, "bracket structure doesn't match"),
            Warning::FormatMismatch { line } => write!(
                f,
                "comment '{line}' doesn't match the required definition format"
            ),
            Warning::AttributeResidue { body } => write!(
                f,
                "attributes '{body}' don't match fully the required attribute format"
            ),
        }
    }
}
