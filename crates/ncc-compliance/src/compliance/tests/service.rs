use super::common::*;
use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};

use crate::compliance::domain::{Project, ProjectId, ValidationError};
use crate::compliance::fabric::{CheckStatus, ProvidedFabric};
use crate::compliance::repository::{ProjectRepository, RepositoryError};
use crate::compliance::resolver::{ResolveError, SectionStatus};
use crate::compliance::table::{ConfigurationError, RuleTableCache, TableDescriptor};
use crate::compliance::{ComplianceService, ComplianceServiceError};

#[test]
fn register_assigns_sequential_ids() {
    let (service, repository) = build_service();

    let first = service.register(apartment()).expect("first project stored");
    let second = service.register(project("Class_5")).expect("second project stored");

    assert_eq!(first.project_id, ProjectId("proj-000001".to_string()));
    assert_eq!(second.project_id, ProjectId("proj-000002".to_string()));
    assert_eq!(repository.list().expect("list succeeds").len(), 2);
    assert_eq!(service.list().expect("list succeeds").len(), 2);
}

#[test]
fn register_rejects_invalid_projects() {
    let (service, repository) = build_service();

    match service.register(with_floor_area(f64::NAN)) {
        Err(ComplianceServiceError::Validation(ValidationError::InvalidArea { field, .. })) => {
            assert_eq!(field, "floorArea")
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    match service.register(project("Class_12")) {
        Err(ComplianceServiceError::Validation(ValidationError::UnknownClass(code))) => {
            assert_eq!(code, "Class_12")
        }
        other => panic!("expected unknown class, got {other:?}"),
    }

    assert!(repository.list().expect("list succeeds").is_empty());
}

#[test]
fn register_accepts_projects_without_classification() {
    let (service, _) = build_service();
    let project = Project {
        building_classification: None,
        ..apartment()
    };

    assert!(service.register(project).is_ok());
}

#[test]
fn register_propagates_repository_conflicts() {
    let service = ComplianceService::new(Arc::new(ConflictRepository), rule_cache());

    assert!(matches!(
        service.register(apartment()),
        Err(ComplianceServiceError::Repository(RepositoryError::Conflict))
    ));
}

#[test]
fn check_produces_a_dated_report() {
    let (service, _) = build_service();
    let record = service.register(apartment()).expect("project stored");
    let checked_at = Utc
        .with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid timestamp");

    let report = service
        .check_at(&record.project_id, checked_at)
        .expect("check succeeds");

    assert_eq!(report.project_id, record.project_id);
    assert_eq!(report.checked_at, checked_at);
    assert_eq!(
        report.next_review_on,
        NaiveDate::from_ymd_opt(2025, 4, 13).expect("valid date")
    );
    assert_eq!(report.result.status, SectionStatus::Applicable);
}

#[test]
fn check_reports_the_declared_fabric_verdict() {
    let (service, _) = build_service();
    let compliant = Project {
        building_fabric: Some(ProvidedFabric {
            wall_r_value: Some(3.3),
            roof_r_value: Some(3.2),
            ..ProvidedFabric::default()
        }),
        ..apartment()
    };
    let record = service.register(compliant).expect("project stored");

    let report = service.check(&record.project_id).expect("check succeeds");

    assert_eq!(report.fabric_status, Some(CheckStatus::Compliant));
}

#[test]
fn register_rejects_negative_fabric_values() {
    let (service, _) = build_service();
    let project = Project {
        building_fabric: Some(ProvidedFabric {
            glazing_u_value: Some(-1.0),
            ..ProvidedFabric::default()
        }),
        ..apartment()
    };

    match service.register(project) {
        Err(ComplianceServiceError::Validation(ValidationError::InvalidFabricValue {
            field, ..
        })) => assert_eq!(field, "glazingUValue"),
        other => panic!("expected fabric validation error, got {other:?}"),
    }
}

#[test]
fn check_matches_direct_resolution() {
    let (service, _) = build_service();
    let record = service.register(apartment()).expect("project stored");

    let report = service.check(&record.project_id).expect("check succeeds");
    let direct = service.resolve(&apartment()).expect("resolves");

    assert_eq!(report.result, direct);
}

#[test]
fn get_and_check_propagate_not_found() {
    let (service, _) = build_service();
    let missing = ProjectId("proj-404".to_string());

    assert!(matches!(
        service.get(&missing),
        Err(ComplianceServiceError::Repository(RepositoryError::NotFound))
    ));
    assert!(matches!(
        service.check(&missing),
        Err(ComplianceServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn check_propagates_repository_outages() {
    let service = ComplianceService::new(Arc::new(UnavailableRepository), rule_cache());

    match service.check(&ProjectId("proj-000001".to_string())) {
        Err(ComplianceServiceError::Repository(RepositoryError::Unavailable(reason))) => {
            assert!(reason.contains("offline"))
        }
        other => panic!("expected repository outage, got {other:?}"),
    }
}

#[test]
fn resolve_surfaces_rule_table_errors() {
    let dir = tempfile::tempdir().expect("temp dir");
    let rules = Arc::new(RuleTableCache::new(TableDescriptor::new(dir.path())));
    let service = ComplianceService::new(Arc::new(MemoryRepository::default()), rules);

    match service.resolve(&apartment()) {
        Err(ComplianceServiceError::Rules(ConfigurationError::Missing { section, .. })) => {
            assert_eq!(section, "exemptions")
        }
        other => panic!("expected missing rule file, got {other:?}"),
    }
}

#[test]
fn resolve_surfaces_missing_sections() {
    let rules = Arc::new(RuleTableCache::with_table(
        TableDescriptor::default(),
        without("climate-zones"),
    ));
    let service = ComplianceService::new(Arc::new(MemoryRepository::default()), rules);

    assert!(matches!(
        service.resolve(&apartment()),
        Err(ComplianceServiceError::Resolve(ResolveError::MissingSection { .. }))
    ));
}

#[test]
fn failed_reload_keeps_serving_the_previous_table() {
    let dir = tempfile::tempdir().expect("temp dir");
    let rules = Arc::new(RuleTableCache::with_table(
        TableDescriptor::new(dir.path()),
        rule_table(),
    ));
    let service = ComplianceService::new(Arc::new(MemoryRepository::default()), rules);

    assert!(matches!(
        service.reload_rules(),
        Err(ComplianceServiceError::Rules(_))
    ));
    assert!(service.resolve(&apartment()).is_ok());
}
