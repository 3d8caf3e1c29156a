//! Serializable precondition descriptions.
//!
//! Closures cannot cross a process boundary, so the CLI, HTTP and MCP surfaces describe
//! preconditions as data and compile them into [`Preconditions`] right before validation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::contract::{Preconditions, always_allow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreconditionSpec {
    /// Present with any value.
    Any,
    NonEmpty,
    Equals { value: String },
    OneOf { values: Vec<String> },
    /// Whole value must match the regular expression.
    Pattern { regex: String },
}

impl PreconditionSpec {
    fn install(&self, name: &str, preconditions: &mut Preconditions) -> Result<()> {
        match self {
            PreconditionSpec::Any => preconditions.insert(name, always_allow),
            PreconditionSpec::NonEmpty => preconditions.insert(name, |v: &str| !v.is_empty()),
            PreconditionSpec::Equals { value } => {
                let expected = value.clone();
                preconditions.insert(name, move |v: &str| v == expected);
            }
            PreconditionSpec::OneOf { values } => {
                let allowed = values.clone();
                preconditions.insert(name, move |v: &str| allowed.iter().any(|a| a == v));
            }
            PreconditionSpec::Pattern { regex } => {
                let re = Regex::new(&format!("^(?:{regex})$"))
                    .with_context(|| format!("Invalid pattern for attribute '{name}': {regex}"))?;
                preconditions.insert(name, move |v: &str| re.is_match(v));
            }
        }
        Ok(())
    }
}

pub fn compile_preconditions(specs: &BTreeMap<String, PreconditionSpec>) -> Result<Preconditions> {
    let mut preconditions = Preconditions::new();
    for (name, spec) in specs {
        spec.install(name, &mut preconditions)?;
    }
    Ok(preconditions)
}
