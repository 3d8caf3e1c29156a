//! Documented entities: declarations handed over by a source inspector.
//!
//! The extraction core only ever needs [`DocumentedEntity::comment_lines`]. The concrete
//! [`Type`], [`Field`] and [`Function`] records carry the identifying metadata that generators
//! use once directives have been read. Comments are accepted on input but never serialized back
//! out, so a printed annotation tree only shows declarations and their definitions.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Anything that exposes an ordered sequence of raw documentation lines.
pub trait DocumentedEntity {
    fn comment_lines(&self) -> &[String];
}

impl DocumentedEntity for [String] {
    fn comment_lines(&self) -> &[String] {
        self
    }
}

impl DocumentedEntity for Vec<String> {
    fn comment_lines(&self) -> &[String] {
        self
    }
}

/// Kind of declaration, used when naming an entity in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Type,
    Field,
    Function,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EntityKind::Type => "type",
            EntityKind::Field => "field",
            EntityKind::Function => "function",
        })
    }
}

/// Method receiver of a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Receiver {
    pub receiver_type: String,
    #[serde(default)]
    pub is_pointer: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Receiver>,
    #[serde(default, skip_serializing)]
    pub comments: Vec<String>,
}

impl Function {
    /// `package.Name`, or `package.Receiver.Name` for methods.
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if !self.package.is_empty() {
            parts.push(&self.package);
        }
        if let Some(receiver) = &self.receiver {
            parts.push(&receiver.receiver_type);
        }
        parts.push(&self.name);
        parts.join(".")
    }
}

impl DocumentedEntity for Function {
    fn comment_lines(&self) -> &[String] {
        &self.comments
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing)]
    pub comments: Vec<String>,
}

impl DocumentedEntity for Field {
    fn comment_lines(&self) -> &[String] {
        &self.comments
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Type {
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing)]
    pub comments: Vec<String>,
}

impl Type {
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

impl DocumentedEntity for Type {
    fn comment_lines(&self) -> &[String] {
        &self.comments
    }
}

/// Everything an inspector found in one source tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Inspection {
    #[serde(default)]
    pub types: Vec<Type>,
    #[serde(default)]
    pub functions: Vec<Function>,
}

impl Inspection {
    pub fn find_type(&self, name: &str) -> Option<&Type> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn find_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn field_count(&self) -> usize {
        self.types.iter().map(|t| t.fields.len()).sum()
    }
}
