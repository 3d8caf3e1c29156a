use crate::domain::contract::{Preconditions, attribute_contract};
use crate::domain::definition::Definition;
use crate::domain::entity::Function;
use crate::domain::ports::Processor;
use anyhow::{Result, bail};
use tracing::warn;

pub const ROUTE_DIRECTIVE: &str = "chariot.route";

const METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Turns `chariot.route{path=...}` on a handler function into an `http.Handle` registration.
///
/// `path` is required and must be non-empty; `method` is optional and restricts the route to
/// one HTTP verb.
pub struct RouteProcessor;

impl RouteProcessor {
    fn required() -> Preconditions {
        Preconditions::new().require("path", |v: &str| !v.is_empty())
    }

    fn optional() -> Preconditions {
        Preconditions::new().require("method", |v: &str| METHODS.iter().any(|m| *m == v))
    }
}

impl Processor for RouteProcessor {
    fn identifier(&self) -> &str {
        ROUTE_DIRECTIVE
    }

    fn process(&self, definition: &Definition, function: &Function) -> Result<String> {
        let contract = attribute_contract(&definition.arguments, &Self::required());
        if !contract.valid {
            warn!(function = %function.qualified_name(), "route directive without a usable path");
            bail!(
                "failed to execute {} on {}: attribute 'path' is required",
                ROUTE_DIRECTIVE,
                function.qualified_name()
            );
        }
        let path = &contract.attributes["path"];

        let pattern = match definition.argument("method") {
            None => path.clone(),
            Some(_) => {
                let method = attribute_contract(&definition.arguments, &Self::optional());
                if !method.valid {
                    bail!(
                        "failed to execute {} on {}: attribute 'method' must be one of {}",
                        ROUTE_DIRECTIVE,
                        function.qualified_name(),
                        METHODS.join("|")
                    );
                }
                format!("{} {}", method.attributes["method"], path)
            }
        };

        let handler = if function.package.is_empty() {
            function.name.clone()
        } else {
            format!("{}.{}", function.package, function.name)
        };
        Ok(format!(
            "http.Handle(\"{pattern}\", chariot.HTTPHandler({handler}))"
        ))
    }
}

/// Wraps route registrations into the body of a `routing()` function.
pub fn render_routing_file(routes: &[String]) -> String {
    let mut out = String::from("package main\n\nfunc routing() {\n");
    for route in routes {
        out.push('\t');
        out.push_str(route);
        out.push('\n');
    }
    out.push_str("}\n");
    out
}
