//! Engine lifecycle: loading from sources, reloading, and the read-derived operations.

mod common;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use common::fixtures::{CHARIOT_JSON, MALFORMED_JSON, clean_inspection, function};
use common::mock::{FailingInspectionSource, MockInspectionSource};
use doc_directives::adapters::precondition::PreconditionSpec;
use doc_directives::app::dto::{CheckRequest, ReadRequest};
use doc_directives::app::engine::AnnotationEngine;
use doc_directives::domain::entity::{EntityKind, Inspection};
use doc_directives::domain::grammar::ScanConfig;
use doc_directives::domain::reader::ReadPolicy;

#[test]
fn test_reload_picks_up_new_inspection() {
    let next = Inspection {
        types: vec![],
        functions: vec![function("home", "Only", &["chariot.route{path=/only}"])],
    };
    let source = Arc::new(MockInspectionSource::new(clean_inspection()).then(next));
    let engine = AnnotationEngine::load(source.clone(), ScanConfig::default()).unwrap();
    assert_eq!(engine.health().function_count, 3);
    assert_eq!(engine.health().source, "mock");

    let health = engine.reload().unwrap();
    assert_eq!(health.function_count, 1);
    assert_eq!(health.type_count, 0);
    assert_eq!(source.load_count(), 2);

    let routes = engine.routes().unwrap();
    assert_eq!(
        routes.routes,
        [r#"http.Handle("/only", chariot.HTTPHandler(home.Only))"#]
    );
}

#[test]
fn test_failing_source_is_an_error() {
    let err = AnnotationEngine::load(Arc::new(FailingInspectionSource), ScanConfig::default())
        .err()
        .unwrap();
    assert!(err.to_string().contains("inspector crashed"));
}

#[test]
fn test_load_from_json_fixture() {
    let engine =
        AnnotationEngine::load_from_json(Path::new(CHARIOT_JSON), ScanConfig::default()).unwrap();
    let health = engine.health();
    assert_eq!(health.type_count, 1);
    assert_eq!(health.field_count, 2);
    assert_eq!(health.function_count, 2);

    let routes = engine.routes().unwrap();
    assert_eq!(
        routes.routes,
        [
            r#"http.Handle("/{name}", chariot.HTTPHandler(home.Home))"#,
            r#"http.Handle("GET /special/{param}/name", chariot.HTTPHandler(home.Another))"#,
        ]
    );

    let lookup = engine.lookup("User");
    assert_eq!(lookup.types[0].fields[0].tags["json"], "id");
}

#[test]
fn test_malformed_fixture_fails_read_and_routes() {
    let engine =
        AnnotationEngine::load_from_json(Path::new(MALFORMED_JSON), ScanConfig::default())
            .unwrap();
    let err = engine.read(ReadRequest::default()).unwrap_err();
    assert!(err.to_string().contains("complex.User.ID"));
    assert!(engine.routes().is_err());

    let err = engine
        .read(ReadRequest {
            policy: ReadPolicy::CollectAll,
        })
        .unwrap_err();
    assert!(err.to_string().contains("home.Home"));
}

#[test]
fn test_missing_json_is_an_error() {
    let err = AnnotationEngine::load_from_json(
        Path::new("tests/fixtures/does_not_exist.json"),
        ScanConfig::default(),
    )
    .err()
    .unwrap();
    assert!(format!("{err:#}").contains("Failed to read inspection file"));
}

#[test]
fn test_check_field_directives() {
    let engine = AnnotationEngine::from_inspection(clean_inspection(), ScanConfig::default());
    let mut preconditions = BTreeMap::new();
    preconditions.insert("pk".to_string(), PreconditionSpec::Any);

    let res = engine
        .check(CheckRequest {
            identifier: "crud.field".into(),
            preconditions,
            policy: ReadPolicy::FailFast,
        })
        .unwrap();
    assert!(!res.valid);
    assert_eq!(res.items.len(), 2);
    assert!(res.items.iter().all(|i| i.entity_kind == EntityKind::Field));
    assert_eq!(res.items[0].entity, "complex.User.ID");
    assert!(res.items[0].valid);
    assert!(!res.items[1].valid);
}
