//! Building fabric verification.
//!
//! Compares the wall, roof and glazing values a project declares against the
//! climate-zone parameters of its building class. R-values must fall inside the
//! required range (bounds inclusive); glazing SHGC and U-value must not exceed the
//! required maximum. A requirement with no declared value stays `pending`.

use serde::{Deserialize, Serialize};

use super::domain::{ClimateZoneParameters, RValueRequirement, ValidationError};

/// Fabric values declared for a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidedFabric {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_r_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roof_r_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glazing_shgc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glazing_u_value: Option<f64>,
}

impl ProvidedFabric {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let values = [
            ("wallRValue", self.wall_r_value),
            ("roofRValue", self.roof_r_value),
            ("glazingShgc", self.glazing_shgc),
            ("glazingUValue", self.glazing_u_value),
        ];

        for (field, value) in values {
            if let Some(value) = value.filter(|value| !value.is_finite() || *value < 0.0) {
                return Err(ValidationError::InvalidFabricValue { field, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FabricElement {
    WallRValue,
    RoofRValue,
    GlazingShgc,
    GlazingUValue,
}

impl FabricElement {
    pub fn label(self) -> &'static str {
        match self {
            FabricElement::WallRValue => "wall R-value",
            FabricElement::RoofRValue => "roof R-value",
            FabricElement::GlazingShgc => "glazing SHGC",
            FabricElement::GlazingUValue => "glazing U-value",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Compliant,
    NonCompliant,
    Pending,
}

impl CheckStatus {
    pub fn label(self) -> &'static str {
        match self {
            CheckStatus::Compliant => "compliant",
            CheckStatus::NonCompliant => "non-compliant",
            CheckStatus::Pending => "pending",
        }
    }

    /// Any failure wins, then any pending check; otherwise compliant.
    pub fn overall(statuses: impl IntoIterator<Item = CheckStatus>) -> CheckStatus {
        let mut overall = CheckStatus::Compliant;
        for status in statuses {
            match status {
                CheckStatus::NonCompliant => return CheckStatus::NonCompliant,
                CheckStatus::Pending => overall = CheckStatus::Pending,
                CheckStatus::Compliant => {}
            }
        }
        overall
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricCheck {
    pub element: FabricElement,
    pub required: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provided: Option<f64>,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricAssessment {
    pub status: CheckStatus,
    pub checks: Vec<FabricCheck>,
}

pub fn assess(
    required: &ClimateZoneParameters,
    provided: Option<&ProvidedFabric>,
) -> FabricAssessment {
    let provided = provided.copied().unwrap_or_default();
    let mut checks = Vec::with_capacity(4);

    if let Some(requirement) = required.wall_r_value {
        checks.push(r_value_check(FabricElement::WallRValue, requirement, provided.wall_r_value));
    }
    if let Some(requirement) = required.roof_r_value {
        checks.push(r_value_check(FabricElement::RoofRValue, requirement, provided.roof_r_value));
    }
    if let Some(glazing) = required.glazing {
        checks.push(glazing_check(
            FabricElement::GlazingShgc,
            glazing.shgc,
            provided.glazing_shgc,
        ));
        checks.push(glazing_check(
            FabricElement::GlazingUValue,
            glazing.u_value,
            provided.glazing_u_value,
        ));
    }

    FabricAssessment {
        status: CheckStatus::overall(checks.iter().map(|check| check.status)),
        checks,
    }
}

fn r_value_check(
    element: FabricElement,
    requirement: RValueRequirement,
    provided: Option<f64>,
) -> FabricCheck {
    let status = match provided {
        None => CheckStatus::Pending,
        Some(value) if requirement.admits(value) => CheckStatus::Compliant,
        Some(_) => CheckStatus::NonCompliant,
    };

    FabricCheck {
        element,
        required: requirement.to_string(),
        provided,
        status,
    }
}

fn glazing_check(element: FabricElement, maximum: f64, provided: Option<f64>) -> FabricCheck {
    let status = match provided {
        None => CheckStatus::Pending,
        Some(value) if value <= maximum => CheckStatus::Compliant,
        Some(_) => CheckStatus::NonCompliant,
    };

    FabricCheck {
        element,
        required: format!("<= {maximum}"),
        provided,
        status,
    }
}
