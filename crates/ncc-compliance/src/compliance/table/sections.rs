use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::compliance::calculations::CalculationKind;
use crate::compliance::domain::{BuildingClassification, ClassType, MAX_CLIMATE_ZONE};

/// Parsed content of one rule section, tagged by its `kind` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionDocument {
    Catalog(CatalogSection),
    ClimateZones(ClimateZoneSection),
    ClassificationLookup(ClassificationLookupSection),
    Thresholds(ThresholdSection),
    Calculation(CalculationSection),
    Exemptions(ExemptionSection),
    Provisions(ProvisionSection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Catalog,
    ClimateZones,
    ClassificationLookup,
    Thresholds,
    Calculation,
    Exemptions,
    Provisions,
}

impl SectionKind {
    pub fn label(self) -> &'static str {
        match self {
            SectionKind::Catalog => "catalog",
            SectionKind::ClimateZones => "climate_zones",
            SectionKind::ClassificationLookup => "classification_lookup",
            SectionKind::Thresholds => "thresholds",
            SectionKind::Calculation => "calculation",
            SectionKind::Exemptions => "exemptions",
            SectionKind::Provisions => "provisions",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl SectionDocument {
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionDocument::Catalog(_) => SectionKind::Catalog,
            SectionDocument::ClimateZones(_) => SectionKind::ClimateZones,
            SectionDocument::ClassificationLookup(_) => SectionKind::ClassificationLookup,
            SectionDocument::Thresholds(_) => SectionKind::Thresholds,
            SectionDocument::Calculation(_) => SectionKind::Calculation,
            SectionDocument::Exemptions(_) => SectionKind::Exemptions,
            SectionDocument::Provisions(_) => SectionKind::Provisions,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), InvalidSection> {
        match self {
            SectionDocument::Catalog(catalog) => catalog.validate(),
            SectionDocument::ClimateZones(climate) => climate.validate(),
            SectionDocument::Thresholds(thresholds) => thresholds.validate(),
            SectionDocument::Provisions(provisions) => provisions.validate(),
            SectionDocument::ClassificationLookup(_)
            | SectionDocument::Calculation(_)
            | SectionDocument::Exemptions(_) => Ok(()),
        }
    }
}

/// Structural defects caught when a section is loaded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidSection {
    #[error("threshold section declares no tiers")]
    NoTiers,
    #[error("tier `{label}` starts at a non-finite breakpoint")]
    NonFiniteBreakpoint { label: String },
    #[error("tier `{next}` must start above tier `{previous}`")]
    UnorderedTiers { previous: String, next: String },
    #[error("{0} appears more than once in the catalog")]
    DuplicateClass(ClassType),
    #[error(
        "{class} size provisions overlap: small.maxArea {small_max} exceeds mediumLarge.minArea {large_min}"
    )]
    OverlappingSizeProvisions {
        class: ClassType,
        small_max: f64,
        large_min: f64,
    },
    #[error("location `{0}` appears more than once")]
    DuplicateLocation(String),
    #[error("location `{location}` names climate zone {zone}, expected 1-8")]
    InvalidZone { location: String, zone: u8 },
    #[error("applicability for `{scope}` has minFloorArea {min} above maxFloorArea {max}")]
    InvertedAreaRange { scope: String, min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CatalogSection {
    pub classes: Vec<BuildingClassification>,
}

impl CatalogSection {
    pub fn find(&self, class: ClassType) -> Option<&BuildingClassification> {
        self.classes.iter().find(|entry| entry.class_type == class)
    }

    fn validate(&self) -> Result<(), InvalidSection> {
        let mut seen = BTreeSet::new();
        for entry in &self.classes {
            if !seen.insert(entry.class_type) {
                return Err(InvalidSection::DuplicateClass(entry.class_type));
            }

            let Some(provisions) = &entry.size_based_provisions else {
                continue;
            };
            if let (Some(small), Some(large)) = (&provisions.small, &provisions.medium_large) {
                if small.max_area > large.min_area {
                    return Err(InvalidSection::OverlappingSizeProvisions {
                        class: entry.class_type,
                        small_max: small.max_area,
                        large_min: large.min_area,
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClimateZoneSection {
    pub locations: Vec<LocationClimate>,
}

/// Climate record for one location, keyed by the project's `location` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LocationClimate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub zone: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_heating_degree_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_cooling_degree_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_dehumidification_gram_hours: Option<f64>,
}

impl ClimateZoneSection {
    pub fn find(&self, location: &str) -> Option<&LocationClimate> {
        self.locations.iter().find(|entry| entry.id == location)
    }

    fn validate(&self) -> Result<(), InvalidSection> {
        let mut seen = BTreeSet::new();
        for entry in &self.locations {
            if !seen.insert(entry.id.as_str()) {
                return Err(InvalidSection::DuplicateLocation(entry.id.clone()));
            }
            if !(1..=MAX_CLIMATE_ZONE).contains(&entry.zone) {
                return Err(InvalidSection::InvalidZone {
                    location: entry.id.clone(),
                    zone: entry.zone,
                });
            }
        }
        Ok(())
    }
}

/// Nested catalog field a classification lookup extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationField {
    ClimateZone,
    Subtypes,
    SizeProvisions,
    Pathways,
    Clauses,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClassificationLookupSection {
    pub field: ClassificationField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericAttribute {
    FloorArea,
    HabitableArea,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ThresholdTier {
    pub label: String,
    pub from: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,
}

/// Ordered breakpoints; each tier runs from its `from` up to the next tier's `from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ThresholdSection {
    pub attribute: NumericAttribute,
    pub tiers: Vec<ThresholdTier>,
}

impl ThresholdSection {
    /// Tier whose half-open interval `[from, next.from)` holds `value`.
    pub fn tier_for(&self, value: f64) -> Option<&ThresholdTier> {
        self.tiers.iter().rev().find(|tier| value >= tier.from)
    }

    fn validate(&self) -> Result<(), InvalidSection> {
        if self.tiers.is_empty() {
            return Err(InvalidSection::NoTiers);
        }
        if let Some(tier) = self.tiers.iter().find(|tier| !tier.from.is_finite()) {
            return Err(InvalidSection::NonFiniteBreakpoint {
                label: tier.label.clone(),
            });
        }
        for pair in self.tiers.windows(2) {
            if pair[1].from <= pair[0].from {
                return Err(InvalidSection::UnorderedTiers {
                    previous: pair[0].label.clone(),
                    next: pair[1].label.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CalculationSection {
    pub calculation: CalculationKind,
    /// Classes the calculation applies to; empty means every class.
    #[serde(default)]
    pub classes: Vec<ClassType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExemptionSection {
    pub minor_use_rule: MinorUseRule,
    pub heritage_buildings: HeritageBuildings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MinorUseRule {
    pub threshold: String,
    #[serde(default)]
    pub excluded_classes: Vec<ClassType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HeritageBuildings {
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub limitations: Vec<String>,
}

/// Filters on class, climate zone and floor area. Empty rules always match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApplicabilityRules {
    #[serde(default)]
    pub building_classes: Vec<ClassType>,
    #[serde(default)]
    pub climate_zones: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_floor_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_floor_area: Option<f64>,
}

impl ApplicabilityRules {
    fn validate(&self, scope: &str) -> Result<(), InvalidSection> {
        match (self.min_floor_area, self.max_floor_area) {
            (Some(min), Some(max)) if min > max => Err(InvalidSection::InvertedAreaRange {
                scope: scope.to_string(),
                min,
                max,
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    pub block_id: String,
    pub content_type: String,
    #[serde(default)]
    pub block_applicability: ApplicabilityRules,
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

fn default_display_order() -> u32 {
    999
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProvisionSection {
    pub title: String,
    #[serde(default = "default_display_order")]
    pub display_order: u32,
    #[serde(default)]
    pub overall_applicability: ApplicabilityRules,
    #[serde(default)]
    pub content_blocks: Vec<ContentBlock>,
}

impl ProvisionSection {
    fn validate(&self) -> Result<(), InvalidSection> {
        self.overall_applicability.validate(&self.title)?;
        for block in &self.content_blocks {
            block.block_applicability.validate(&block.block_id)?;
        }
        Ok(())
    }
}
