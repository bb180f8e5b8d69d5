use super::common::*;
use std::fs;
use std::path::Path;

use serde_json::json;

use crate::compliance::table::{
    load, ConfigurationError, InvalidSection, SectionKind, TableDescriptor,
};

fn write_sections(dir: &Path) -> TableDescriptor {
    let mut names = Vec::new();
    for (name, body) in sections() {
        fs::write(
            dir.join(format!("{name}.json")),
            serde_json::to_vec_pretty(&body).expect("section serializes"),
        )
        .expect("write section");
        names.push(name.to_string());
    }

    TableDescriptor {
        base_path: dir.to_path_buf(),
        file_extension: ".json".to_string(),
        sections: names,
    }
}

#[test]
fn load_preserves_declared_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut descriptor = write_sections(dir.path());
    descriptor.sections.reverse();

    let table = load(&descriptor).expect("table loads");

    let names: Vec<&str> = table.names().collect();
    assert_eq!(names, descriptor.sections.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(table.len(), 11);
    assert_eq!(
        table.get("energy-monitoring").map(|document| document.kind()),
        Some(SectionKind::Thresholds)
    );
}

#[test]
fn loaded_table_matches_in_memory_fixture() {
    let dir = tempfile::tempdir().expect("temp dir");
    let descriptor = write_sections(dir.path());

    assert_eq!(load(&descriptor).expect("table loads"), rule_table());
}

#[test]
fn missing_file_names_the_section() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut descriptor = write_sections(dir.path());
    descriptor.sections.push("lighting".to_string());

    let error = load(&descriptor).expect_err("missing section fails the load");

    assert!(matches!(error, ConfigurationError::Missing { .. }));
    assert_eq!(error.section(), "lighting");
    assert!(error.to_string().contains("lighting"));
}

#[test]
fn file_extension_is_part_of_the_lookup() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut descriptor = write_sections(dir.path());
    descriptor.file_extension = ".yaml".to_string();

    let error = load(&descriptor).expect_err("no yaml files exist");
    assert_eq!(error.section(), descriptor.sections[0]);
}

#[test]
fn malformed_json_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let descriptor = write_sections(dir.path());
    fs::write(dir.path().join("climate-zones.json"), "{ \"kind\": ").expect("write section");

    let error = load(&descriptor).expect_err("malformed section fails the load");

    assert!(matches!(error, ConfigurationError::Malformed { .. }));
    assert_eq!(error.section(), "climate-zones");
}

#[test]
fn unknown_section_kind_is_rejected_at_load() {
    let dir = tempfile::tempdir().expect("temp dir");
    let descriptor = write_sections(dir.path());
    fs::write(
        dir.path().join("energy-use.json"),
        json!({ "kind": "lighting_power", "limit": 4.5 }).to_string(),
    )
    .expect("write section");

    let error = load(&descriptor).expect_err("unknown kind fails the load");

    assert!(matches!(error, ConfigurationError::Malformed { .. }));
    assert_eq!(error.section(), "energy-use");
}

#[test]
fn misspelled_section_fields_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let descriptor = write_sections(dir.path());
    fs::write(
        dir.path().join("energy-use.json"),
        json!({
            "kind": "calculation",
            "calculation": "total_heating_load",
            "clases": ["Class_2"]
        })
        .to_string(),
    )
    .expect("write section");

    match load(&descriptor) {
        Err(ConfigurationError::Malformed { section, source }) => {
            assert_eq!(section, "energy-use");
            assert!(source.to_string().contains("clases"));
        }
        other => panic!("expected malformed section, got {other:?}"),
    }
}

#[test]
fn misspelled_catalog_fields_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let descriptor = write_sections(dir.path());
    let mut catalog = full_catalog();
    catalog["classes"][1]["climateZones"][1]["wallRvalue"] = json!("R3.3");
    fs::write(
        dir.path().join("building-classifications.json"),
        catalog.to_string(),
    )
    .expect("write section");

    let error = load(&descriptor).expect_err("unknown catalog field fails the load");

    assert!(matches!(error, ConfigurationError::Malformed { .. }));
    assert_eq!(error.section(), "building-classifications");
}

#[test]
fn malformed_r_values_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let descriptor = write_sections(dir.path());
    let mut catalog = full_catalog();
    catalog["classes"][1]["climateZones"][0]["wallRValue"] = json!("R2.8-R1.4");
    fs::write(
        dir.path().join("building-classifications.json"),
        catalog.to_string(),
    )
    .expect("write section");

    let error = load(&descriptor).expect_err("backwards range fails the load");

    assert!(matches!(error, ConfigurationError::Malformed { .. }));
    assert_eq!(error.section(), "building-classifications");
}

#[test]
fn unordered_tiers_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let descriptor = write_sections(dir.path());
    fs::write(
        dir.path().join("energy-monitoring.json"),
        json!({
            "kind": "thresholds",
            "attribute": "floor_area",
            "tiers": [
                { "label": "required", "from": 2500 },
                { "label": "suggested", "from": 500 }
            ]
        })
        .to_string(),
    )
    .expect("write section");

    match load(&descriptor) {
        Err(ConfigurationError::Invalid { section, source }) => {
            assert_eq!(section, "energy-monitoring");
            assert!(matches!(source, InvalidSection::UnorderedTiers { .. }));
        }
        other => panic!("expected invalid section, got {other:?}"),
    }
}

#[test]
fn overlapping_size_provisions_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let descriptor = write_sections(dir.path());
    let mut catalog = full_catalog();
    catalog["classes"][1]["sizeBasedProvisions"]["small"]["maxArea"] = json!(800);
    fs::write(
        dir.path().join("building-classifications.json"),
        catalog.to_string(),
    )
    .expect("write section");

    match load(&descriptor) {
        Err(ConfigurationError::Invalid { section, source }) => {
            assert_eq!(section, "building-classifications");
            assert!(matches!(
                source,
                InvalidSection::OverlappingSizeProvisions { small_max, large_min, .. }
                    if small_max == 800.0 && large_min == 500.0
            ));
        }
        other => panic!("expected invalid section, got {other:?}"),
    }
}

#[test]
fn duplicate_section_names_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut descriptor = write_sections(dir.path());
    descriptor.sections.push("exemptions".to_string());

    match load(&descriptor) {
        Err(ConfigurationError::DuplicateSection(section)) => assert_eq!(section, "exemptions"),
        other => panic!("expected duplicate section, got {other:?}"),
    }
}
