use crate::adapters::precondition::PreconditionSpec;
use crate::app::dto::{CheckRequest, ExtractRequest, ReadRequest};
use crate::app::engine::AnnotationEngine;
use crate::domain::reader::ReadPolicy;
use anyhow::{Context as _, Result, bail};
use std::collections::BTreeMap;
use std::io::Read as _;
use std::path::Path;

/// Parse a `key=regex` pair for `check --match`.
pub fn parse_key_pattern(s: &str) -> Result<(String, String)> {
    let Some((key, pattern)) = s.split_once('=') else {
        bail!("expected KEY=REGEX, got '{s}'");
    };
    if key.is_empty() {
        bail!("empty attribute name in '{s}'");
    }
    Ok((key.to_string(), pattern.to_string()))
}

/// Print the directive tree of the loaded inspection as JSON.
pub fn print_annotations(engine: &AnnotationEngine, policy: ReadPolicy, compact: bool) -> Result<()> {
    let result = engine.read(ReadRequest { policy })?;
    let out = if compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{out}");
    Ok(())
}

/// Collects comment lines from `file`, else from `lines`, else from stdin.
pub fn collect_lines(file: Option<&Path>, lines: &[String]) -> Result<Vec<String>> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read comment file: {}", path.display()))?;
        return Ok(content.lines().map(String::from).collect());
    }
    if !lines.is_empty() {
        return Ok(lines.to_vec());
    }
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read comment lines from stdin")?;
    Ok(content.lines().map(String::from).collect())
}

/// Extract directives from loose lines. Returns `false` when any warning was produced.
pub fn extract_lines(engine: &AnnotationEngine, lines: Vec<String>, all_lines: bool) -> Result<bool> {
    let res = engine.extract(ExtractRequest {
        lines,
        all_lines,
        separator: None,
    })?;

    for d in &res.definitions {
        let args: Vec<String> = d
            .arguments
            .iter()
            .map(|(k, v)| format!("{k}={v:?}"))
            .collect();
        println!("{} {{{}}}", d.identifier, args.join(", "));
    }
    for w in &res.warnings {
        eprintln!("warning: {}", w.message);
    }
    Ok(res.warnings.is_empty())
}

/// Check every `identifier` directive against the given preconditions.
/// Returns `false` when at least one directive is rejected.
pub fn check_directives(
    engine: &AnnotationEngine,
    identifier: &str,
    required: &[String],
    patterns: &[(String, String)],
    policy: ReadPolicy,
) -> Result<bool> {
    let mut preconditions: BTreeMap<String, PreconditionSpec> = required
        .iter()
        .map(|k| (k.clone(), PreconditionSpec::Any))
        .collect();
    for (key, regex) in patterns {
        preconditions.insert(
            key.clone(),
            PreconditionSpec::Pattern {
                regex: regex.clone(),
            },
        );
    }

    let res = engine.check(CheckRequest {
        identifier: identifier.to_string(),
        preconditions,
        policy,
    })?;

    if res.items.is_empty() {
        println!("No '{identifier}' directives found.");
        return Ok(true);
    }

    println!("Checking '{}' ({} directive(s))", identifier, res.items.len());
    println!("{}", "=".repeat(60));
    for item in &res.items {
        let mark = if item.valid { "ok  " } else { "FAIL" };
        println!("{} [{}] {}", mark, item.entity_kind, item.entity);
        if !item.valid {
            let accepted: Vec<&str> = item.attributes.keys().map(String::as_str).collect();
            println!("     accepted: {}", accepted.join(", "));
        }
    }
    let failed = res.items.iter().filter(|i| !i.valid).count();
    println!("{}", "=".repeat(60));
    println!("{} passed, {} failed", res.items.len() - failed, failed);

    Ok(res.valid)
}

/// Print the generated `routing()` file.
pub fn print_routes(engine: &AnnotationEngine) -> Result<()> {
    let res = engine.routes()?;
    print!("{}", res.file);
    Ok(())
}

pub fn lookup_entity(engine: &AnnotationEngine, name: &str) -> Result<()> {
    let res = engine.lookup(name);
    if res.types.is_empty() && res.functions.is_empty() {
        bail!("no type or function named '{name}'");
    }
    println!("{}", serde_json::to_string_pretty(&res)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_pattern() {
        assert_eq!(
            parse_key_pattern("path=/[a-z]+").unwrap(),
            ("path".to_string(), "/[a-z]+".to_string())
        );
        // Only the first '=' separates the key.
        assert_eq!(parse_key_pattern("k=a=b").unwrap().1, "a=b");
        assert!(parse_key_pattern("novalue").is_err());
        assert!(parse_key_pattern("=x").is_err());
    }

    #[test]
    fn test_collect_lines_prefers_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comments.txt");
        std::fs::write(&path, "a{b}\nprose\n").unwrap();
        let lines = collect_lines(Some(&path), &["ignored{}".to_string()]).unwrap();
        assert_eq!(lines, ["a{b}", "prose"]);

        let lines = collect_lines(None, &["x{}".to_string()]).unwrap();
        assert_eq!(lines, ["x{}"]);
    }
}
