use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use tracing::debug;

use crate::domain::definition::{DefinitionList, Warning};
use crate::domain::entity::DocumentedEntity;
use crate::domain::grammar::Grammar;
use crate::domain::scanner::{LineOutcome, SkipFilter, scan_line};

/// Definitions and warnings of one entity. Neither list has a meaningful order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub definitions: DefinitionList,
    pub warnings: Vec<Warning>,
}

impl Extraction {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Scans every comment line of `entity` in parallel and returns once all lines are done.
///
/// A bad line never stops the others: all warnings of the entity are collected alongside the
/// definitions found on well-formed lines.
pub fn extract_definitions<E>(
    entity: &E,
    grammar: &Grammar,
    filter: Option<&SkipFilter>,
) -> Extraction
where
    E: DocumentedEntity + ?Sized,
{
    let lines = entity.comment_lines();
    if lines.is_empty() {
        return Extraction::default();
    }

    let definitions = Mutex::new(DefinitionList::new());
    let warnings = Mutex::new(Vec::new());

    lines
        .par_iter()
        .for_each(|line| match scan_line(grammar, line, filter) {
            LineOutcome::Definition(d) => definitions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(d),
            LineOutcome::Warning(w) => warnings
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(w),
            LineOutcome::Skip => {}
        });

    let extraction = Extraction {
        definitions: definitions
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner),
        warnings: warnings.into_inner().unwrap_or_else(PoisonError::into_inner),
    };
    debug!(
        lines = lines.len(),
        definitions = extraction.definitions.len(),
        warnings = extraction.warnings.len(),
        "extracted directives"
    );
    extraction
}
