//! NCC Section J compliance: building catalog types, the rule table loader, load
//! calculations, and the resolver that decides which rule sections apply to a project.
//!
//! The resolver is pure. Everything stateful (the cached rule table and the project
//! store) is constructed by the caller and injected into [`ComplianceService`].

pub mod calculations;
pub mod domain;
pub mod fabric;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod service;
pub mod table;

#[cfg(test)]
mod tests;

pub use calculations::{
    thermal_energy_load, total_cooling_load, total_heating_load, CalculationKind,
    CalculationOutput, CoolingLoadOptions, HeatingLoadOptions, ThermalEnergyLoadOptions,
};
pub use domain::{
    BuildingClassification, ClassType, ClassificationRef, CompliancePathwayKind, Project,
    ProjectId, RValueRequirement, SizeTier, ValidationError, ZoneRange,
};
pub use fabric::{CheckStatus, FabricAssessment, FabricCheck, FabricElement, ProvidedFabric};
pub use repository::{ProjectRecord, ProjectRepository, RepositoryError};
pub use resolver::{
    resolve, ComplianceResult, OutcomeDetail, ResolveError, ResolverSettings, RuleResolver,
    SectionOutcome, SectionStatus,
};
pub use router::compliance_router;
pub use service::{ComplianceReport, ComplianceService, ComplianceServiceError};
pub use table::{
    load, ConfigurationError, RuleTable, RuleTableCache, SectionDocument, SectionKind,
    TableDescriptor,
};
