use std::collections::BTreeMap;

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::adapters::precondition::PreconditionSpec;
use crate::domain::definition::{Definition, Warning};
use crate::domain::entity::{EntityKind, Function, Type};
use crate::domain::reader::ReadPolicy;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    pub source: String,
    pub separator: char,
    pub type_count: usize,
    pub field_count: usize,
    pub function_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReadRequest {
    #[serde(default)]
    pub policy: ReadPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractRequest {
    pub lines: Vec<String>,
    /// Scan prose lines too, reporting them as format mismatches.
    #[serde(default)]
    pub all_lines: bool,
    /// Overrides the engine's argument separator for this request.
    pub separator: Option<char>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractResponse {
    pub definitions: Vec<Definition>,
    pub warnings: Vec<WarningDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WarningDto {
    pub kind: String,
    pub message: String,
}

impl From<&Warning> for WarningDto {
    fn from(w: &Warning) -> Self {
        Self {
            kind: w.kind().to_string(),
            message: w.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ValidateRequest {
    pub attributes: BTreeMap<String, String>,
    pub preconditions: BTreeMap<String, PreconditionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ValidateResponse {
    pub attributes: BTreeMap<String, String>,
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CheckRequest {
    /// Directive identifier to check, e.g. `chariot.route`.
    pub identifier: String,
    pub preconditions: BTreeMap<String, PreconditionSpec>,
    #[serde(default)]
    pub policy: ReadPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CheckResponse {
    pub identifier: String,
    pub valid: bool,
    pub items: Vec<CheckItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CheckItem {
    pub entity_kind: EntityKind,
    pub entity: String,
    pub valid: bool,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LookupResponse {
    pub name: String,
    pub types: Vec<Type>,
    pub functions: Vec<Function>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RoutesResponse {
    pub routes: Vec<String>,
    pub file: String,
}
