//! Rule resolution: decides, for one project, which sections of a rule table
//! apply and what they require.

mod applicability;
mod derived;
mod lookup;
mod outcome;

pub use outcome::{
    ComplianceResult, Exemption, OutcomeDetail, ResolveError, SectionOutcome, SectionStatus,
};

use std::collections::BTreeMap;

use tracing::debug;

use crate::compliance::domain::{Project, ValidationError};
use crate::compliance::table::{
    CatalogSection, ClimateZoneSection, RuleTable, SectionDocument, SectionKind, ThresholdSection,
};

pub const DEFAULT_CATALOG_SECTION: &str = "building-classifications";
pub const DEFAULT_CLIMATE_SECTION: &str = "climate-zones";

/// Names of the sections other sections consult during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    pub catalog_section: String,
    pub climate_section: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            catalog_section: DEFAULT_CATALOG_SECTION.to_string(),
            climate_section: DEFAULT_CLIMATE_SECTION.to_string(),
        }
    }
}

/// Stateless resolver applying a rule table to a project.
#[derive(Debug, Clone, Default)]
pub struct RuleResolver {
    settings: ResolverSettings,
}

impl RuleResolver {
    pub fn new(settings: ResolverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn resolve(
        &self,
        project: &Project,
        table: &RuleTable,
    ) -> Result<ComplianceResult, ResolveError> {
        let context = Context {
            project,
            table,
            settings: &self.settings,
        };

        let mut sections = BTreeMap::new();
        for section in table.sections() {
            let outcome = resolve_section(&context, &section.name, &section.document)?;
            debug!(
                section = %section.name,
                kind = %outcome.kind,
                status = outcome.status.label(),
                "resolved rule section"
            );
            sections.insert(section.name.clone(), outcome);
        }

        Ok(ComplianceResult::from_sections(sections))
    }
}

/// Resolve a project against a table with the default section names.
pub fn resolve(project: &Project, table: &RuleTable) -> Result<ComplianceResult, ResolveError> {
    RuleResolver::default().resolve(project, table)
}

/// Reasons a single section could not be resolved to `Applicable`.
pub(crate) enum SectionFault {
    Table(ResolveError),
    Review(String),
    NotApplicable(String),
}

impl From<ResolveError> for SectionFault {
    fn from(value: ResolveError) -> Self {
        SectionFault::Table(value)
    }
}

impl From<ValidationError> for SectionFault {
    fn from(value: ValidationError) -> Self {
        SectionFault::Review(value.to_string())
    }
}

pub(crate) struct Context<'a> {
    pub(crate) project: &'a Project,
    pub(crate) table: &'a RuleTable,
    pub(crate) settings: &'a ResolverSettings,
}

impl<'a> Context<'a> {
    fn section(&self, name: &str, required_by: &str) -> Result<&'a SectionDocument, ResolveError> {
        self.table
            .get(name)
            .ok_or_else(|| ResolveError::MissingSection {
                section: name.to_string(),
                required_by: required_by.to_string(),
            })
    }

    pub(crate) fn catalog(&self, required_by: &str) -> Result<&'a CatalogSection, ResolveError> {
        let name = &self.settings.catalog_section;
        match self.section(name, required_by)? {
            SectionDocument::Catalog(catalog) => Ok(catalog),
            other => Err(wrong_kind(name, required_by, SectionKind::Catalog, other)),
        }
    }

    pub(crate) fn climate(
        &self,
        required_by: &str,
    ) -> Result<&'a ClimateZoneSection, ResolveError> {
        let name = &self.settings.climate_section;
        match self.section(name, required_by)? {
            SectionDocument::ClimateZones(climate) => Ok(climate),
            other => Err(wrong_kind(name, required_by, SectionKind::ClimateZones, other)),
        }
    }
}

fn wrong_kind(
    section: &str,
    required_by: &str,
    expected: SectionKind,
    found: &SectionDocument,
) -> ResolveError {
    ResolveError::WrongSectionKind {
        section: section.to_string(),
        required_by: required_by.to_string(),
        expected,
        found: found.kind(),
    }
}

fn resolve_section(
    context: &Context<'_>,
    name: &str,
    document: &SectionDocument,
) -> Result<SectionOutcome, ResolveError> {
    let kind = document.kind();
    let resolved = match document {
        SectionDocument::Catalog(catalog) => lookup::classification_summary(context, catalog),
        SectionDocument::ClimateZones(climate) => lookup::location_zone(context, climate),
        SectionDocument::ClassificationLookup(section) => {
            lookup::classification_field(context, name, section.field)
        }
        SectionDocument::Thresholds(section) => threshold_tier(context, section),
        SectionDocument::Calculation(section) => derived::calculation(context, name, section),
        SectionDocument::Exemptions(section) => applicability::exemptions(context, section),
        SectionDocument::Provisions(section) => applicability::provisions(context, name, section),
    };

    match resolved {
        Ok(detail) => Ok(SectionOutcome::applicable(kind, detail)),
        Err(SectionFault::Review(reason)) => Ok(SectionOutcome::with_reason(
            kind,
            SectionStatus::RequiresReview,
            reason,
        )),
        Err(SectionFault::NotApplicable(reason)) => Ok(SectionOutcome::with_reason(
            kind,
            SectionStatus::NotApplicable,
            reason,
        )),
        Err(SectionFault::Table(err)) => Err(err),
    }
}

fn threshold_tier(
    context: &Context<'_>,
    section: &ThresholdSection,
) -> Result<OutcomeDetail, SectionFault> {
    use crate::compliance::table::NumericAttribute;

    let value = match section.attribute {
        NumericAttribute::FloorArea => context.project.floor_area()?,
        NumericAttribute::HabitableArea => context
            .project
            .habitable_area()?
            .ok_or(ValidationError::MissingField("totalAreaOfHabitableRooms"))?,
    };

    let tier = section.tier_for(value).ok_or_else(|| {
        let first = section.tiers.first().map(|tier| tier.from).unwrap_or_default();
        SectionFault::NotApplicable(format!("{value} is below the first breakpoint {first}"))
    })?;

    Ok(OutcomeDetail::Tier {
        attribute: section.attribute,
        value,
        tier: tier.label.clone(),
        requirement: tier.requirement.clone(),
    })
}
