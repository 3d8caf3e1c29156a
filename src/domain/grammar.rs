//! Directive grammar.
//!
//! A directive line has the shape `identifier{body}` where `identifier` is made of letters,
//! `.` and `_`, with at most one whitespace character before the opening brace. The body is a
//! list of `key`, `key=value` or `key="value"` tokens joined by a single separator character.
//! Unquoted values run to the next separator not preceded by `\`; quoted values may contain it
//! and escape only `"`. Every other backslash is kept as written. Empty tokens are skipped.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::definition::IMPLICIT_TRUE;

pub const DEFAULT_SEPARATOR: char = ',';

fn shape_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z._]+)\s?\{(.*)\}$").expect("directive shape regex"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidSeparator(char),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidSeparator(c) => {
                write!(f, "'{c}' cannot be used as an argument separator")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Scanner settings shared by every line of a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScanConfig {
    separator: char,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl ScanConfig {
    /// Rejects separators that would be ambiguous with keys, quoting, escapes or braces.
    pub fn new(separator: char) -> Result<Self, ConfigError> {
        let reserved = matches!(separator, '"' | '=' | '\\' | '{' | '}')
            || separator.is_whitespace()
            || separator.is_ascii_alphanumeric()
            || separator == '_';
        if reserved {
            return Err(ConfigError::InvalidSeparator(separator));
        }
        Ok(Self { separator })
    }

    pub fn separator(&self) -> char {
        self.separator
    }
}

/// Odd brace counts can never form a directive.
pub fn brackets_balanced(line: &str) -> bool {
    line.chars().filter(|c| matches!(c, '{' | '}')).count() % 2 == 0
}

/// Arguments recovered from a body, plus whatever no token accounted for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedArguments {
    pub arguments: BTreeMap<String, String>,
    pub residue: String,
}

impl ParsedArguments {
    pub fn is_complete(&self) -> bool {
        self.residue.is_empty()
    }
}

/// Compiled patterns for one separator.
#[derive(Debug, Clone)]
pub struct Grammar {
    config: ScanConfig,
    argument: Regex,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl Grammar {
    pub fn new(config: &ScanConfig) -> Self {
        let sep = regex::escape(&config.separator().to_string());
        let pattern = format!(
            r#"(?P<key>[A-Za-z_][A-Za-z0-9_]*)(?:=(?:"(?P<quoted>(?:\\"|[^"])*)"|(?P<plain>(?:\\{sep}|[^{sep}])*)))?(?:{sep}|$)|{sep}"#
        );
        let argument =
            Regex::new(&pattern).expect("argument regex built from an escaped separator");
        Self {
            config: *config,
            argument,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn matches_shape(&self, line: &str) -> bool {
        shape_regex().is_match(line)
    }

    /// Splits a directive line into identifier and body.
    pub fn capture<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        let caps = shape_regex().captures(line)?;
        let identifier = caps.get(1)?.as_str();
        let body = caps.get(2)?.as_str();
        Some((identifier, body))
    }

    /// Consumes every argument token of `body`. Later duplicates of a key overwrite earlier ones.
    pub fn parse_arguments(&self, body: &str) -> ParsedArguments {
        let mut arguments = BTreeMap::new();
        let mut residue = String::new();
        let mut cursor = 0;

        for caps in self.argument.captures_iter(body) {
            let Some(whole) = caps.get(0) else { continue };
            residue.push_str(&body[cursor..whole.start()]);
            cursor = whole.end();

            // A lone separator is an empty token.
            let Some(key) = caps.name("key") else { continue };
            let key = key.as_str().to_string();
            let value = if let Some(quoted) = caps.name("quoted") {
                unescape(quoted.as_str(), '"')
            } else if let Some(plain) = caps.name("plain") {
                unescape(plain.as_str(), self.config.separator())
            } else {
                IMPLICIT_TRUE.to_string()
            };
            arguments.insert(key, value);
        }
        residue.push_str(&body[cursor..]);

        ParsedArguments { arguments, residue }
    }
}

/// Drops the backslash in front of `escaped`; any other backslash is part of the value.
fn unescape(raw: &str, escaped: char) -> String {
    raw.replace(&format!("\\{escaped}"), &escaped.to_string())
}
