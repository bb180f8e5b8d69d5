use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::fabric::ProvidedFabric;

/// NCC building classes known to the classification catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClassType {
    #[serde(rename = "Class_1")]
    Class1,
    #[serde(rename = "Class_2")]
    Class2,
    #[serde(rename = "Class_3")]
    Class3,
    #[serde(rename = "Class_4")]
    Class4,
    #[serde(rename = "Class_5")]
    Class5,
    #[serde(rename = "Class_6")]
    Class6,
    #[serde(rename = "Class_7")]
    Class7,
    #[serde(rename = "Class_8")]
    Class8,
    #[serde(rename = "Class_9a")]
    Class9a,
    #[serde(rename = "Class_9b")]
    Class9b,
    #[serde(rename = "Class_9c")]
    Class9c,
}

impl ClassType {
    pub const ALL: [ClassType; 11] = [
        ClassType::Class1,
        ClassType::Class2,
        ClassType::Class3,
        ClassType::Class4,
        ClassType::Class5,
        ClassType::Class6,
        ClassType::Class7,
        ClassType::Class8,
        ClassType::Class9a,
        ClassType::Class9b,
        ClassType::Class9c,
    ];

    /// Catalog code as stored in rule tables and project records.
    pub fn code(self) -> &'static str {
        match self {
            ClassType::Class1 => "Class_1",
            ClassType::Class2 => "Class_2",
            ClassType::Class3 => "Class_3",
            ClassType::Class4 => "Class_4",
            ClassType::Class5 => "Class_5",
            ClassType::Class6 => "Class_6",
            ClassType::Class7 => "Class_7",
            ClassType::Class8 => "Class_8",
            ClassType::Class9a => "Class_9a",
            ClassType::Class9b => "Class_9b",
            ClassType::Class9c => "Class_9c",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ClassType::Class1 => "Class 1",
            ClassType::Class2 => "Class 2",
            ClassType::Class3 => "Class 3",
            ClassType::Class4 => "Class 4",
            ClassType::Class5 => "Class 5",
            ClassType::Class6 => "Class 6",
            ClassType::Class7 => "Class 7",
            ClassType::Class8 => "Class 8",
            ClassType::Class9a => "Class 9a",
            ClassType::Class9b => "Class 9b",
            ClassType::Class9c => "Class 9c",
        }
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ClassType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        ClassType::ALL
            .into_iter()
            .find(|class| class.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownClass(trimmed.to_string()))
    }
}

/// Compliance pathways a building class may follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompliancePathwayKind {
    #[serde(rename = "DTS")]
    DeemedToSatisfy,
    #[serde(rename = "JV3")]
    VerificationJv3,
    #[serde(rename = "NABERS")]
    Nabers,
}

/// Inclusive range of NCC climate zones, written `Zones_1_3` or `Zone_5` in rule tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZoneRange {
    pub from: u8,
    pub to: u8,
}

pub const MAX_CLIMATE_ZONE: u8 = 8;

impl ZoneRange {
    pub fn contains(&self, zone: u8) -> bool {
        self.from <= zone && zone <= self.to
    }
}

impl TryFrom<String> for ZoneRange {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let parse_zone = |raw: &str| {
            raw.parse::<u8>()
                .ok()
                .filter(|zone| (1..=MAX_CLIMATE_ZONE).contains(zone))
                .ok_or_else(|| format!("`{raw}` is not a climate zone in {value}"))
        };

        let range = if let Some(rest) = value.strip_prefix("Zones_") {
            let (from, to) = rest
                .split_once('_')
                .ok_or_else(|| format!("expected Zones_<from>_<to>, found {value}"))?;
            ZoneRange {
                from: parse_zone(from)?,
                to: parse_zone(to)?,
            }
        } else if let Some(zone) = value.strip_prefix("Zone_") {
            let zone = parse_zone(zone)?;
            ZoneRange { from: zone, to: zone }
        } else {
            return Err(format!("expected Zones_<from>_<to> or Zone_<n>, found {value}"));
        };

        if range.from > range.to {
            return Err(format!("zone range {value} runs backwards"));
        }
        Ok(range)
    }
}

impl From<ZoneRange> for String {
    fn from(range: ZoneRange) -> Self {
        if range.from == range.to {
            format!("Zone_{}", range.from)
        } else {
            format!("Zones_{}_{}", range.from, range.to)
        }
    }
}

/// Catalog entry describing one NCC building class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildingClassification {
    pub class_type: ClassType,
    pub description: String,
    #[serde(default)]
    pub subtypes: Vec<ClassSubtype>,
    #[serde(default)]
    pub climate_zones: Vec<ClimateZoneParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_based_provisions: Option<SizeBasedProvisions>,
    #[serde(default)]
    pub compliance_pathways: Vec<CompliancePathwayKind>,
    #[serde(default)]
    pub applicable_clauses: Vec<String>,
}

impl BuildingClassification {
    pub fn climate_zone(&self, zone: u8) -> Option<&ClimateZoneParameters> {
        self.climate_zones
            .iter()
            .find(|entry| entry.zone_range.contains(zone))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClassSubtype {
    pub name: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub thermal_performance: bool,
    #[serde(default)]
    pub energy_usage: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requirements: Option<SpecialRequirementFlags>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpecialRequirementFlags {
    #[serde(default)]
    pub fire_safety: bool,
    #[serde(default)]
    pub minor_use_rule: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glazing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hvac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighting: Option<String>,
}

/// Insulation and glazing parameters for one band of climate zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClimateZoneParameters {
    pub zone_range: ZoneRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insulation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_r_value: Option<RValueRequirement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roof_r_value: Option<RValueRequirement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glazing: Option<GlazingLimits>,
}

/// Total R-value requirement, written `R2.8` (minimum) or `R1.4-R2.8` (inclusive range).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RValueRequirement {
    pub min: f64,
    pub max: Option<f64>,
}

impl RValueRequirement {
    pub fn admits(&self, provided: f64) -> bool {
        provided >= self.min && self.max.map_or(true, |max| provided <= max)
    }
}

impl TryFrom<String> for RValueRequirement {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let parse_r = |raw: &str| {
            raw.trim()
                .strip_prefix('R')
                .and_then(|number| number.parse::<f64>().ok())
                .filter(|number| number.is_finite() && *number >= 0.0)
                .ok_or_else(|| format!("`{raw}` is not an R-value in {value}"))
        };

        let requirement = match value.split_once('-') {
            Some((min, max)) => RValueRequirement {
                min: parse_r(min)?,
                max: Some(parse_r(max)?),
            },
            None => RValueRequirement {
                min: parse_r(&value)?,
                max: None,
            },
        };

        if requirement.max.is_some_and(|max| max < requirement.min) {
            return Err(format!("R-value range {value} runs backwards"));
        }
        Ok(requirement)
    }
}

impl From<RValueRequirement> for String {
    fn from(requirement: RValueRequirement) -> Self {
        requirement.to_string()
    }
}

impl fmt::Display for RValueRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_r_value(f, self.min)?;
        if let Some(max) = self.max {
            f.write_str("-")?;
            write_r_value(f, max)?;
        }
        Ok(())
    }
}

fn write_r_value(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.fract() == 0.0 {
        write!(f, "R{value:.1}")
    } else {
        write!(f, "R{value}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GlazingLimits {
    pub shgc: f64,
    pub u_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SizeBasedProvisions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small: Option<SmallBuildingProvision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium_large: Option<LargeBuildingProvision>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SmallBuildingProvision {
    pub max_area: f64,
    pub provisions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LargeBuildingProvision {
    pub min_area: f64,
    pub provisions: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeTier {
    Small,
    MediumLarge,
}

impl SizeBasedProvisions {
    /// `small` covers `area < maxArea`, `mediumLarge` covers `area >= minArea`.
    pub fn select(&self, area: f64) -> Option<(SizeTier, &str)> {
        if let Some(small) = &self.small {
            if area < small.max_area {
                return Some((SizeTier::Small, small.provisions.as_str()));
            }
        }
        match &self.medium_large {
            Some(large) if area >= large.min_area => {
                Some((SizeTier::MediumLarge, large.provisions.as_str()))
            }
            _ => None,
        }
    }
}

/// Identifier assigned to a project by the project store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRef {
    pub class_type: String,
}

/// Building under assessment, as read from the project store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub building_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_classification: Option<ClassificationRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_area_of_habitable_rooms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_fabric: Option<ProvidedFabric>,
}

impl Project {
    pub fn class_type(&self) -> Result<ClassType, ValidationError> {
        let reference = self
            .building_classification
            .as_ref()
            .ok_or(ValidationError::MissingField("buildingClassification"))?;
        reference.class_type.parse()
    }

    pub fn location(&self) -> Result<&str, ValidationError> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|location| !location.is_empty())
            .ok_or(ValidationError::MissingField("location"))
    }

    pub fn floor_area(&self) -> Result<f64, ValidationError> {
        self.optional_floor_area()?
            .ok_or(ValidationError::MissingField("floorArea"))
    }

    pub fn optional_floor_area(&self) -> Result<Option<f64>, ValidationError> {
        checked_area("floorArea", self.floor_area)
    }

    pub fn habitable_area(&self) -> Result<Option<f64>, ValidationError> {
        checked_area("totalAreaOfHabitableRooms", self.total_area_of_habitable_rooms)
    }

    /// Record-level invariants enforced before a project enters the store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.floor_area()?;
        self.habitable_area()?;
        if self.building_classification.is_some() {
            self.class_type()?;
        }
        if let Some(fabric) = &self.building_fabric {
            fabric.validate()?;
        }
        Ok(())
    }
}

fn checked_area(field: &'static str, value: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match value {
        Some(area) if !area.is_finite() || area < 0.0 => {
            Err(ValidationError::InvalidArea { field, value: area })
        }
        other => Ok(other),
    }
}

/// Project attributes that cannot support a lookup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("project is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("unknown building class `{0}`")]
    UnknownClass(String),
    #[error("`{field}` must be a finite, non-negative area in square metres (found {value})")]
    InvalidArea { field: &'static str, value: f64 },
    #[error("building fabric `{field}` must be finite and non-negative (found {value})")]
    InvalidFabricValue { field: &'static str, value: f64 },
}
