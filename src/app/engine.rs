use crate::adapters::fs::reader::JsonInspectionSource;
use crate::adapters::generator::{RouteProcessor, render_routing_file};
use crate::adapters::precondition::compile_preconditions;
use crate::app::dto::*;
use crate::app::processor::ProcessorRegistry;
use crate::domain::contract::attribute_contract;
use crate::domain::definition::Definition;
use crate::domain::entity::{EntityKind, Inspection};
use crate::domain::extraction::extract_definitions;
use crate::domain::grammar::{Grammar, ScanConfig};
use crate::domain::ports::InspectionSource;
use crate::domain::reader::{AnnotationResult, Reader};
use crate::domain::scanner::{SkipFilter, directive_lines_only};
use anyhow::{Result, bail};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use tracing::info;

const IN_MEMORY: &str = "<memory>";

/// Shared, reloadable view over one inspection.
#[derive(Clone)]
pub struct AnnotationEngine {
    inner: Arc<RwLock<EngineData>>,
}

struct EngineData {
    source: Option<Arc<dyn InspectionSource>>,
    inspection: Arc<Inspection>,
    config: ScanConfig,
}

impl AnnotationEngine {
    /// Construct an engine from an inspection that is already in memory.
    ///
    /// Used for testing or when entities come from an inspector running in-process.
    pub fn from_inspection(inspection: Inspection, config: ScanConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(EngineData {
                source: None,
                inspection: Arc::new(inspection),
                config,
            })),
        }
    }

    pub fn load(source: Arc<dyn InspectionSource>, config: ScanConfig) -> Result<Self> {
        let inspection = source.load()?;
        Ok(Self {
            inner: Arc::new(RwLock::new(EngineData {
                source: Some(source),
                inspection: Arc::new(inspection),
                config,
            })),
        })
    }

    pub fn load_from_json(json_path: &Path, config: ScanConfig) -> Result<Self> {
        Self::load(Arc::new(JsonInspectionSource::new(json_path)), config)
    }

    fn data(&self) -> RwLockReadGuard<'_, EngineData> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inspection and settings at the time of the call; later reloads do not affect them.
    fn snapshot(&self) -> (Arc<Inspection>, ScanConfig) {
        let data = self.data();
        (data.inspection.clone(), data.config)
    }

    pub fn reload(&self) -> Result<HealthResponse> {
        let source = match &self.data().source {
            Some(source) => source.clone(),
            None => bail!("engine was built from an in-memory inspection and cannot be reloaded"),
        };
        let inspection = source.load()?;

        {
            let mut data = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            data.inspection = Arc::new(inspection);
        }
        info!(source = %source.describe(), "reloaded inspection");
        Ok(self.health())
    }

    pub fn health(&self) -> HealthResponse {
        let data = self.data();
        HealthResponse {
            source: data
                .source
                .as_ref()
                .map(|s| s.describe())
                .unwrap_or_else(|| IN_MEMORY.to_string()),
            separator: data.config.separator(),
            type_count: data.inspection.types.len(),
            field_count: data.inspection.field_count(),
            function_count: data.inspection.functions.len(),
        }
    }

    pub fn read(&self, req: ReadRequest) -> Result<AnnotationResult> {
        let (inspection, config) = self.snapshot();
        let reader = Reader::new(Grammar::new(&config)).with_policy(req.policy);
        Ok(reader.read_inspection(&inspection)?)
    }

    /// Scans ad-hoc lines as if they were the comments of a single entity.
    pub fn extract(&self, req: ExtractRequest) -> Result<ExtractResponse> {
        let config = match req.separator {
            Some(separator) => ScanConfig::new(separator)?,
            None => self.data().config,
        };
        let grammar = Grammar::new(&config);
        let filter: Option<&SkipFilter> = if req.all_lines {
            None
        } else {
            Some(&directive_lines_only)
        };

        let extraction = extract_definitions(&req.lines, &grammar, filter);

        let mut definitions = extraction.definitions;
        sort_definitions(&mut definitions);
        let mut warnings: Vec<WarningDto> =
            extraction.warnings.iter().map(WarningDto::from).collect();
        warnings.sort_by(|a, b| a.message.cmp(&b.message));

        Ok(ExtractResponse {
            definitions,
            warnings,
        })
    }

    pub fn validate(&self, req: ValidateRequest) -> Result<ValidateResponse> {
        let preconditions = compile_preconditions(&req.preconditions)?;
        let result = attribute_contract(&req.attributes, &preconditions);
        Ok(ValidateResponse {
            attributes: result.attributes,
            valid: result.valid,
        })
    }

    /// Validates every definition named `req.identifier` anywhere in the inspection.
    pub fn check(&self, req: CheckRequest) -> Result<CheckResponse> {
        let preconditions = compile_preconditions(&req.preconditions)?;
        let result = self.read(ReadRequest { policy: req.policy })?;

        let mut targets: Vec<(EntityKind, String, &Definition)> = Vec::new();
        for t in &result.types {
            let type_name = t.ty.qualified_name();
            for d in &t.annotations {
                targets.push((EntityKind::Type, type_name.clone(), d));
            }
            for f in &t.fields {
                for d in &f.annotations {
                    targets.push((EntityKind::Field, format!("{type_name}.{}", f.field.name), d));
                }
            }
        }
        for f in &result.functions {
            for d in &f.annotations {
                targets.push((EntityKind::Function, f.function.qualified_name(), d));
            }
        }

        let items: Vec<CheckItem> = targets
            .into_iter()
            .filter(|(_, _, d)| d.identifier == req.identifier)
            .map(|(entity_kind, entity, d)| {
                let contract = attribute_contract(&d.arguments, &preconditions);
                CheckItem {
                    entity_kind,
                    entity,
                    valid: contract.valid,
                    attributes: contract.attributes,
                }
            })
            .collect();

        Ok(CheckResponse {
            identifier: req.identifier,
            valid: items.iter().all(|i| i.valid),
            items,
        })
    }

    pub fn lookup(&self, name: &str) -> LookupResponse {
        let data = self.data();
        LookupResponse {
            name: name.to_string(),
            types: data.inspection.find_type(name).cloned().into_iter().collect(),
            functions: data
                .inspection
                .find_function(name)
                .cloned()
                .into_iter()
                .collect(),
        }
    }

    pub fn routes(&self) -> Result<RoutesResponse> {
        let result = self.read(ReadRequest::default())?;
        let registry = ProcessorRegistry::new().register(Box::new(RouteProcessor));
        let routes = registry.dispatch(&result)?;
        let file = render_routing_file(&routes);
        Ok(RoutesResponse { routes, file })
    }
}

fn sort_definitions(definitions: &mut [Definition]) {
    definitions.sort_by(|a, b| {
        a.identifier
            .cmp(&b.identifier)
            .then_with(|| a.arguments.cmp(&b.arguments))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::precondition::PreconditionSpec;
    use crate::domain::entity::{Field, Function, Type};
    use crate::domain::reader::ReadPolicy;
    use std::collections::BTreeMap;

    fn comments(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    fn test_inspection() -> Inspection {
        Inspection {
            types: vec![Type {
                name: "User".into(),
                package: "complex".into(),
                comments: comments(&["crud.model{name=users}"]),
                fields: vec![Field {
                    name: "ID".into(),
                    type_name: "*string".into(),
                    comments: comments(&["crud.field{name=id}"]),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            functions: vec![
                Function {
                    name: "Home".into(),
                    package: "home".into(),
                    comments: comments(&[
                        "Home is the default route, triggered when root is called",
                        "chariot.route{path=/{name}}",
                    ]),
                    ..Default::default()
                },
                Function {
                    name: "Another".into(),
                    package: "home".into(),
                    comments: comments(&["chariot.route{path=/special/{param}/name}"]),
                    ..Default::default()
                },
            ],
        }
    }

    fn engine() -> AnnotationEngine {
        AnnotationEngine::from_inspection(test_inspection(), ScanConfig::default())
    }

    #[test]
    fn test_engine_health_and_read() {
        let engine = engine();
        let health = engine.health();
        assert_eq!(health.source, IN_MEMORY);
        assert_eq!(health.type_count, 1);
        assert_eq!(health.field_count, 1);
        assert_eq!(health.function_count, 2);

        let result = engine.read(ReadRequest::default()).unwrap();
        assert_eq!(result.definition_count(), 4);
    }

    #[test]
    fn test_engine_reload_requires_source() {
        assert!(engine().reload().is_err());
    }

    #[test]
    fn test_engine_extract_with_separator_override() {
        let res = engine()
            .extract(ExtractRequest {
                lines: comments(&["id{a=1;a=2}", "plain prose", "x{b"]),
                all_lines: false,
                separator: Some(';'),
            })
            .unwrap();
        assert_eq!(res.definitions, vec![Definition::new("id").with_argument("a", "2")]);
        assert_eq!(res.warnings.len(), 1);
        assert_eq!(res.warnings[0].kind, "bracket_mismatch");

        let err = engine().extract(ExtractRequest {
            lines: vec![],
            all_lines: false,
            separator: Some('='),
        });
        assert!(err.is_err());
    }

    #[test]
    fn test_engine_extract_all_lines_reports_prose() {
        let res = engine()
            .extract(ExtractRequest {
                lines: comments(&["plain prose"]),
                all_lines: true,
                separator: None,
            })
            .unwrap();
        assert_eq!(res.warnings[0].kind, "format_mismatch");
    }

    #[test]
    fn test_engine_validate() {
        let mut preconditions = BTreeMap::new();
        preconditions.insert("test".to_string(), PreconditionSpec::Any);
        preconditions.insert(
            "fails".to_string(),
            PreconditionSpec::Equals {
                value: "never".into(),
            },
        );
        let mut attributes = BTreeMap::new();
        attributes.insert("test".to_string(), "a".to_string());
        attributes.insert("fails".to_string(), "x".to_string());

        let res = engine()
            .validate(ValidateRequest {
                attributes,
                preconditions,
            })
            .unwrap();
        assert!(!res.valid);
        assert_eq!(res.attributes.len(), 1);
        assert_eq!(res.attributes["test"], "a");
    }

    #[test]
    fn test_engine_check_by_identifier() {
        let mut preconditions = BTreeMap::new();
        preconditions.insert(
            "path".to_string(),
            PreconditionSpec::Pattern {
                regex: "/[a-z]+/.*".into(),
            },
        );
        let res = engine()
            .check(CheckRequest {
                identifier: "chariot.route".into(),
                preconditions,
                policy: ReadPolicy::FailFast,
            })
            .unwrap();
        assert_eq!(res.items.len(), 2);
        assert!(!res.valid);
        let valid: Vec<&str> = res
            .items
            .iter()
            .filter(|i| i.valid)
            .map(|i| i.entity.as_str())
            .collect();
        assert_eq!(valid, ["home.Another"]);
    }

    #[test]
    fn test_engine_lookup_and_routes() {
        let engine = engine();
        let found = engine.lookup("Home");
        assert_eq!(found.functions.len(), 1);
        assert!(found.types.is_empty());

        let routes = engine.routes().unwrap();
        assert_eq!(
            routes.routes,
            [
                r#"http.Handle("/{name}", chariot.HTTPHandler(home.Home))"#,
                r#"http.Handle("/special/{param}/name", chariot.HTTPHandler(home.Another))"#,
            ]
        );
        assert!(routes.file.contains("func routing()"));
    }
}
