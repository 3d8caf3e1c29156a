//! Reads the directives of a whole inspection into an annotation tree.
//!
//! Traversal order is fixed: each type, then that type's fields, then all functions. Any
//! warning on any entity fails the read; a partially annotated tree is never returned.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::definition::{DefinitionList, Warning};
use crate::domain::entity::{DocumentedEntity, EntityKind, Field, Function, Inspection, Type};
use crate::domain::extraction::extract_definitions;
use crate::domain::grammar::Grammar;
use crate::domain::scanner::directive_lines_only;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnnotatedField {
    pub field: Field,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: DefinitionList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnnotatedType {
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: DefinitionList,
    #[serde(default)]
    pub fields: Vec<AnnotatedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnnotatedFunction {
    pub function: Function,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: DefinitionList,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnnotationResult {
    #[serde(default)]
    pub types: Vec<AnnotatedType>,
    #[serde(default)]
    pub functions: Vec<AnnotatedFunction>,
}

impl AnnotationResult {
    pub fn definition_count(&self) -> usize {
        let types: usize = self
            .types
            .iter()
            .map(|t| {
                t.annotations.len() + t.fields.iter().map(|f| f.annotations.len()).sum::<usize>()
            })
            .sum();
        let functions: usize = self.functions.iter().map(|f| f.annotations.len()).sum();
        types + functions
    }
}

/// What to do after the first entity with warnings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReadPolicy {
    /// Stop at the first offending entity; later entities are not scanned.
    #[default]
    FailFast,
    /// Scan every entity and report all offenders together.
    CollectAll,
}

/// Warnings of one entity that failed to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EntityFailure {
    pub kind: EntityKind,
    pub name: String,
    pub warnings: Vec<Warning>,
}

impl std::fmt::Display for EntityFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let warnings: Vec<String> = self.warnings.iter().map(ToString::to_string).collect();
        write!(f, "{} '{}': {}", self.kind, self.name, warnings.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadError {
    pub failures: Vec<EntityFailure>,
}

impl ReadError {
    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.failures.iter().flat_map(|f| f.warnings.iter())
    }
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let failures: Vec<String> = self.failures.iter().map(ToString::to_string).collect();
        write!(f, "warnings occurred: {}", failures.join("; "))
    }
}

impl std::error::Error for ReadError {}

pub struct Reader {
    grammar: Grammar,
    policy: ReadPolicy,
}

impl Default for Reader {
    fn default() -> Self {
        Self::new(Grammar::default())
    }
}

impl Reader {
    pub fn new(grammar: Grammar) -> Self {
        Self {
            grammar,
            policy: ReadPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReadPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn read_inspection(&self, inspection: &Inspection) -> Result<AnnotationResult, ReadError> {
        self.read(&inspection.types, &inspection.functions)
    }

    pub fn read(
        &self,
        types: &[Type],
        functions: &[Function],
    ) -> Result<AnnotationResult, ReadError> {
        let mut failures = Vec::new();
        let mut result = AnnotationResult::default();

        for t in types {
            let type_name = t.qualified_name();
            let annotations = self.annotations(t, EntityKind::Type, &type_name, &mut failures)?;

            let mut fields = Vec::with_capacity(t.fields.len());
            for field in &t.fields {
                let name = format!("{type_name}.{}", field.name);
                if let Some(annotations) =
                    self.annotations(field, EntityKind::Field, &name, &mut failures)?
                {
                    fields.push(AnnotatedField {
                        field: field.clone(),
                        annotations,
                    });
                }
            }

            if let Some(annotations) = annotations {
                result.types.push(AnnotatedType {
                    ty: t.clone(),
                    annotations,
                    fields,
                });
            }
        }

        for function in functions {
            if let Some(annotations) = self.annotations(
                function,
                EntityKind::Function,
                &function.qualified_name(),
                &mut failures,
            )? {
                result.functions.push(AnnotatedFunction {
                    function: function.clone(),
                    annotations,
                });
            }
        }

        if !failures.is_empty() {
            return Err(ReadError { failures });
        }

        info!(
            types = result.types.len(),
            functions = result.functions.len(),
            definitions = result.definition_count(),
            "read annotations"
        );
        Ok(result)
    }

    /// `Ok(None)` records a failure and lets the caller keep going; `Err` ends the read.
    fn annotations<E>(
        &self,
        entity: &E,
        kind: EntityKind,
        name: &str,
        failures: &mut Vec<EntityFailure>,
    ) -> Result<Option<DefinitionList>, ReadError>
    where
        E: DocumentedEntity + ?Sized,
    {
        let extraction = extract_definitions(entity, &self.grammar, Some(&directive_lines_only));
        if extraction.is_clean() {
            return Ok(Some(extraction.definitions));
        }

        warn!(%kind, entity = name, warnings = extraction.warnings.len(), "malformed directives");
        failures.push(EntityFailure {
            kind,
            name: name.to_string(),
            warnings: extraction.warnings,
        });

        match self.policy {
            ReadPolicy::FailFast => Err(ReadError {
                failures: std::mem::take(failures),
            }),
            ReadPolicy::CollectAll => Ok(None),
        }
    }
}
