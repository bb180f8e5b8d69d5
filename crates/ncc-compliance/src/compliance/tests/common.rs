use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::{json, Value};

use crate::compliance::domain::{ClassType, ClassificationRef, Project, ProjectId};
use crate::compliance::repository::{ProjectRecord, ProjectRepository, RepositoryError};
use crate::compliance::table::{RuleTable, RuleTableCache, SectionDocument, TableDescriptor};
use crate::compliance::{compliance_router, ComplianceService};

pub(super) fn project(class: &str) -> Project {
    Project {
        name: Some("Harbour Apartments".to_string()),
        building_type: "apartment".to_string(),
        building_classification: Some(ClassificationRef {
            class_type: class.to_string(),
        }),
        location: Some("Sydney".to_string()),
        floor_area: Some(1_200.0),
        total_area_of_habitable_rooms: Some(100.0),
        building_fabric: None,
    }
}

pub(super) fn apartment() -> Project {
    project("Class_2")
}

pub(super) fn with_floor_area(area: f64) -> Project {
    Project {
        floor_area: Some(area),
        ..apartment()
    }
}

pub(super) fn classification(class: ClassType) -> Value {
    json!({
        "classType": class.code(),
        "description": format!("{} buildings", class.label()),
        "compliancePathways": ["DTS", "JV3"],
        "applicableClauses": ["J1P1", "J1P2"],
    })
}

pub(super) fn catalog(classes: &[ClassType]) -> Value {
    json!({
        "kind": "catalog",
        "classes": classes.iter().map(|class| classification(*class)).collect::<Vec<_>>(),
    })
}

pub(super) fn full_catalog() -> Value {
    let mut apartment = classification(ClassType::Class2);
    apartment["subtypes"] = json!([{
        "name": "sole-occupancy unit",
        "requirements": ["J1P2 heating and cooling load limits"],
        "thermalPerformance": true,
        "energyUsage": true,
        "specialRequirements": { "fireSafety": true, "minorUseRule": false }
    }]);
    apartment["climateZones"] = json!([
        {
            "zoneRange": "Zones_1_3",
            "insulation": "R1.4",
            "wallRValue": "R2.8",
            "roofRValue": "R3.7",
            "glazing": { "shgc": 0.25, "uValue": 4.0 }
        },
        {
            "zoneRange": "Zones_4_6",
            "insulation": "R1.4",
            "wallRValue": "R2.8",
            "roofRValue": "R3.2"
        }
    ]);
    apartment["sizeBasedProvisions"] = json!({
        "small": { "maxArea": 500, "provisions": "J9D3 energy monitoring not required" },
        "mediumLarge": { "minArea": 500, "provisions": "J9D3 energy monitoring applies" }
    });

    let mut office = classification(ClassType::Class5);
    office["compliancePathways"] = json!(["DTS", "JV3", "NABERS"]);
    office["sizeBasedProvisions"] = json!({
        "small": { "maxArea": 300, "provisions": "simplified J6 lighting" },
        "mediumLarge": { "minArea": 500, "provisions": "full J6 lighting" }
    });

    json!({
        "kind": "catalog",
        "classes": [classification(ClassType::Class1), apartment, office],
    })
}

pub(super) fn climate_zones() -> Value {
    json!({
        "kind": "climate_zones",
        "locations": [
            {
                "id": "Sydney",
                "name": "Sydney (Observatory Hill)",
                "state": "NSW",
                "zone": 5,
                "annualHeatingDegreeHours": 12000,
                "annualCoolingDegreeHours": 4000,
                "annualDehumidificationGramHours": 800
            },
            { "id": "Hobart", "state": "TAS", "zone": 7 }
        ]
    })
}

pub(super) fn energy_monitoring() -> Value {
    json!({
        "kind": "thresholds",
        "attribute": "floor_area",
        "tiers": [
            { "label": "not_required", "from": 0 },
            { "label": "suggested", "from": 500, "requirement": "J9D3 recommended" },
            { "label": "required", "from": 2500, "requirement": "J9D3(1) energy monitoring required" }
        ]
    })
}

pub(super) fn ceiling_fans() -> Value {
    json!({
        "kind": "provisions",
        "title": "J3D4 Ceiling fans",
        "displayOrder": 12,
        "overallApplicability": { "buildingClasses": ["Class_2", "Class_4"] },
        "contentBlocks": [
            {
                "blockId": "J3D4-warm",
                "contentType": "paragraph",
                "blockApplicability": { "climateZones": [1, 2, 3] },
                "text": "Ceiling fans are required in habitable rooms."
            },
            {
                "blockId": "J3D4-temperate",
                "contentType": "paragraph",
                "blockApplicability": { "climateZones": [4, 5, 6] },
                "text": "Ceiling fans are recommended in living areas."
            },
            {
                "blockId": "J3D4-large",
                "contentType": "note",
                "blockApplicability": { "minFloorArea": 2000 },
                "text": "Large buildings may use a whole-of-building approach."
            }
        ]
    })
}

pub(super) fn sections() -> Vec<(&'static str, Value)> {
    vec![
        (
            "exemptions",
            json!({
                "kind": "exemptions",
                "minorUseRule": {
                    "threshold": "Parts of a building under 10% of the floor area may follow the main use",
                    "excludedClasses": ["Class_1"]
                },
                "heritageBuildings": {
                    "conditions": ["Listed on a heritage register"],
                    "limitations": ["Exemption limited to affected elements"]
                }
            }),
        ),
        ("building-classifications", full_catalog()),
        ("climate-zones", climate_zones()),
        (
            "special-requirements",
            json!({ "kind": "classification_lookup", "field": "subtypes" }),
        ),
        (
            "building-fabric",
            json!({ "kind": "classification_lookup", "field": "climate_zone" }),
        ),
        (
            "size-provisions",
            json!({ "kind": "classification_lookup", "field": "size_provisions" }),
        ),
        (
            "compliance-pathways",
            json!({ "kind": "classification_lookup", "field": "pathways" }),
        ),
        (
            "energy-use",
            json!({
                "kind": "calculation",
                "calculation": "total_heating_load",
                "classes": ["Class_2", "Class_4"]
            }),
        ),
        (
            "thermal-energy-load",
            json!({ "kind": "calculation", "calculation": "thermal_energy_load" }),
        ),
        ("energy-monitoring", energy_monitoring()),
        ("ceilingfan-elemental-provisions-j3", ceiling_fans()),
    ]
}

pub(super) fn table_from(sections: Vec<(&'static str, Value)>) -> RuleTable {
    let parsed = sections.into_iter().map(|(name, body)| {
        let document: SectionDocument = serde_json::from_value(body).expect("section parses");
        (name, document)
    });
    RuleTable::from_sections(parsed).expect("table is valid")
}

pub(super) fn rule_table() -> RuleTable {
    table_from(sections())
}

pub(super) fn without(name: &str) -> RuleTable {
    table_from(
        sections()
            .into_iter()
            .filter(|(section, _)| *section != name)
            .collect(),
    )
}

pub(super) fn rule_cache() -> Arc<RuleTableCache> {
    Arc::new(RuleTableCache::with_table(
        TableDescriptor::default(),
        rule_table(),
    ))
}

pub(super) fn build_service() -> (ComplianceService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = ComplianceService::new(repository.clone(), rule_cache());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<BTreeMap<ProjectId, ProjectRecord>>>,
}

impl ProjectRepository for MemoryRepository {
    fn insert(&self, record: ProjectRecord) -> Result<ProjectRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.project_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.project_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ProjectId) -> Result<Option<ProjectRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<ProjectRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct ConflictRepository;

impl ProjectRepository for ConflictRepository {
    fn insert(&self, _record: ProjectRecord) -> Result<ProjectRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &ProjectId) -> Result<Option<ProjectRecord>, RepositoryError> {
        Ok(None)
    }

    fn list(&self) -> Result<Vec<ProjectRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl ProjectRepository for UnavailableRepository {
    fn insert(&self, _record: ProjectRecord) -> Result<ProjectRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ProjectId) -> Result<Option<ProjectRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<ProjectRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn compliance_router_with_service(
    service: ComplianceService<MemoryRepository>,
) -> axum::Router {
    compliance_router(Arc::new(service))
}
