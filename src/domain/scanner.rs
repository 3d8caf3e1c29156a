//! Classifies a single documentation line.

use crate::domain::definition::{Definition, Warning};
use crate::domain::grammar::{Grammar, brackets_balanced};

/// Decides, from whether a line has the directive shape, if it should be scanned at all.
/// Returning `false` drops the line without a definition or a warning.
pub type SkipFilter = dyn Fn(bool) -> bool + Send + Sync;

/// Standard filter: only lines shaped like a directive are scanned, so ordinary prose never
/// produces a format warning.
pub fn directive_lines_only(matches_shape: bool) -> bool {
    matches_shape
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Definition(Definition),
    Warning(Warning),
    Skip,
}

pub fn scan_line(grammar: &Grammar, line: &str, filter: Option<&SkipFilter>) -> LineOutcome {
    if !brackets_balanced(line) {
        return LineOutcome::Warning(Warning::BracketMismatch);
    }

    if let Some(filter) = filter
        && !filter(grammar.matches_shape(line))
    {
        return LineOutcome::Skip;
    }

    let Some((identifier, body)) = grammar.capture(line) else {
        return LineOutcome::Warning(Warning::FormatMismatch {
            line: line.to_string(),
        });
    };

    let parsed = grammar.parse_arguments(body);
    if !parsed.is_complete() {
        return LineOutcome::Warning(Warning::AttributeResidue {
            body: body.to_string(),
        });
    }

    LineOutcome::Definition(Definition {
        identifier: identifier.to_string(),
        arguments: parsed.arguments,
    })
}
