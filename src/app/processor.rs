use std::collections::HashMap;

use anyhow::{Result, anyhow};
use rayon::prelude::*;

use crate::domain::definition::Definition;
use crate::domain::ports::Processor;
use crate::domain::reader::{AnnotatedFunction, AnnotationResult};

/// Routes function definitions to the processor registered for their identifier.
#[derive(Default)]
pub struct ProcessorRegistry {
    processors: HashMap<String, Box<dyn Processor>>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `processor` under its identifier, replacing any earlier one.
    pub fn register(mut self, processor: Box<dyn Processor>) -> Self {
        self.processors
            .insert(processor.identifier().to_string(), processor);
        self
    }

    pub fn get(&self, identifier: &str) -> Option<&dyn Processor> {
        self.processors.get(identifier).map(|p| p.as_ref())
    }

    /// Runs every function definition of `result` through its processor.
    ///
    /// Output follows function order; definitions of one function are processed sorted by
    /// identifier. A definition without a registered processor fails the whole dispatch.
    pub fn dispatch(&self, result: &AnnotationResult) -> Result<Vec<String>> {
        let per_function: Vec<Vec<String>> = result
            .functions
            .par_iter()
            .map(|f| self.dispatch_function(f))
            .collect::<Result<_>>()?;
        Ok(per_function.into_iter().flatten().collect())
    }

    fn dispatch_function(&self, annotated: &AnnotatedFunction) -> Result<Vec<String>> {
        let mut definitions: Vec<&Definition> = annotated.annotations.iter().collect();
        definitions.sort_by(|a, b| {
            a.identifier
                .cmp(&b.identifier)
                .then_with(|| a.arguments.cmp(&b.arguments))
        });

        definitions
            .into_iter()
            .map(|d| {
                let processor = self.get(&d.identifier).ok_or_else(|| {
                    anyhow!(
                        "no processor registered for directive '{}' on {}",
                        d.identifier,
                        annotated.function.qualified_name()
                    )
                })?;
                processor.process(d, &annotated.function)
            })
            .collect()
    }
}
