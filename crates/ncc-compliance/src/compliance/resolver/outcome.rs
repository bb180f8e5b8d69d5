use std::collections::BTreeMap;

use serde::Serialize;

use crate::compliance::calculations::{CalculationKind, CalculationOutput};
use crate::compliance::domain::{
    ClassSubtype, ClassType, ClimateZoneParameters, CompliancePathwayKind, SizeTier,
};
use crate::compliance::fabric::{CheckStatus, FabricAssessment};
use crate::compliance::table::{ContentBlock, NumericAttribute, SectionKind};

/// Verdict for one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Applicable,
    NotApplicable,
    RequiresReview,
}

impl SectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            SectionStatus::Applicable => "applicable",
            SectionStatus::NotApplicable => "not applicable",
            SectionStatus::RequiresReview => "requires review",
        }
    }
}

/// Section-specific payload of an outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum OutcomeDetail {
    Classification {
        class_type: ClassType,
        description: String,
        compliance_pathways: Vec<CompliancePathwayKind>,
        applicable_clauses: Vec<String>,
    },
    ClimateZone {
        location: String,
        zone: u8,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        annual_heating_degree_hours: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        annual_cooling_degree_hours: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        annual_dehumidification_gram_hours: Option<f64>,
    },
    ZoneRequirements {
        class_type: ClassType,
        zone: u8,
        parameters: ClimateZoneParameters,
        fabric: FabricAssessment,
    },
    Subtypes {
        class_type: ClassType,
        subtypes: Vec<ClassSubtype>,
    },
    SizeProvision {
        class_type: ClassType,
        floor_area: f64,
        tier: SizeTier,
        provisions: String,
    },
    Pathways {
        class_type: ClassType,
        pathways: Vec<CompliancePathwayKind>,
    },
    Clauses {
        class_type: ClassType,
        clauses: Vec<String>,
    },
    Tier {
        attribute: NumericAttribute,
        value: f64,
        tier: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        requirement: Option<String>,
    },
    Calculation {
        calculation: CalculationKind,
        #[serde(flatten)]
        output: CalculationOutput,
    },
    Exemptions {
        exemptions: Vec<Exemption>,
    },
    Provisions {
        title: String,
        display_order: u32,
        content_blocks: Vec<ContentBlock>,
    },
    Reason {
        reason: String,
    },
}

impl OutcomeDetail {
    pub fn reason(&self) -> Option<&str> {
        match self {
            OutcomeDetail::Reason { reason } => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exemption {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub limitations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionOutcome {
    pub kind: SectionKind,
    pub status: SectionStatus,
    pub detail: OutcomeDetail,
}

impl SectionOutcome {
    pub(crate) fn applicable(kind: SectionKind, detail: OutcomeDetail) -> Self {
        Self {
            kind,
            status: SectionStatus::Applicable,
            detail,
        }
    }

    pub(crate) fn with_reason(kind: SectionKind, status: SectionStatus, reason: String) -> Self {
        Self {
            kind,
            status,
            detail: OutcomeDetail::Reason { reason },
        }
    }
}

/// Per-section verdicts for one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
    pub status: SectionStatus,
    pub sections: BTreeMap<String, SectionOutcome>,
    /// Applicable provision sections by display order, then name.
    pub provision_order: Vec<String>,
}

impl ComplianceResult {
    pub(crate) fn from_sections(sections: BTreeMap<String, SectionOutcome>) -> Self {
        let status = overall_status(sections.values().map(|outcome| outcome.status));
        let provision_order = provision_order(&sections);
        Self {
            status,
            sections,
            provision_order,
        }
    }

    /// Combined fabric verdict across every zone-requirement section, if any resolved.
    pub fn fabric_status(&self) -> Option<CheckStatus> {
        let mut checks = self
            .sections
            .values()
            .filter_map(|outcome| match &outcome.detail {
                OutcomeDetail::ZoneRequirements { fabric, .. } => Some(fabric),
                _ => None,
            })
            .flat_map(|fabric| fabric.checks.iter().map(|check| check.status))
            .peekable();
        checks.peek()?;
        Some(CheckStatus::overall(checks))
    }

    pub fn section(&self, name: &str) -> Option<&SectionOutcome> {
        self.sections.get(name)
    }

    pub fn count(&self, status: SectionStatus) -> usize {
        self.sections
            .values()
            .filter(|outcome| outcome.status == status)
            .count()
    }
}

fn provision_order(sections: &BTreeMap<String, SectionOutcome>) -> Vec<String> {
    let mut ordered: Vec<(u32, &String)> = sections
        .iter()
        .filter_map(|(name, outcome)| match &outcome.detail {
            OutcomeDetail::Provisions { display_order, .. } => Some((*display_order, name)),
            _ => None,
        })
        .collect();
    ordered.sort();
    ordered.into_iter().map(|(_, name)| name.clone()).collect()
}

fn overall_status(statuses: impl Iterator<Item = SectionStatus>) -> SectionStatus {
    let mut overall = SectionStatus::NotApplicable;
    for status in statuses {
        match status {
            SectionStatus::RequiresReview => return SectionStatus::RequiresReview,
            SectionStatus::Applicable => overall = SectionStatus::Applicable,
            SectionStatus::NotApplicable => {}
        }
    }
    overall
}

/// Rule-table defects found while resolving; these fail the whole resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("rule table has no `{section}` section, which `{required_by}` depends on")]
    MissingSection {
        section: String,
        required_by: String,
    },
    #[error("rule section `{section}` is a {found} section, `{required_by}` needs a {expected} section")]
    WrongSectionKind {
        section: String,
        required_by: String,
        expected: SectionKind,
        found: SectionKind,
    },
}
