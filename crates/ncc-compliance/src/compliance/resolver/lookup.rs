use super::{Context, OutcomeDetail, SectionFault};
use crate::compliance::domain::BuildingClassification;
use crate::compliance::fabric;
use crate::compliance::table::{
    CatalogSection, ClassificationField, ClimateZoneSection, LocationClimate,
};

pub(crate) fn find_class<'a>(
    context: &Context<'_>,
    catalog: &'a CatalogSection,
) -> Result<&'a BuildingClassification, SectionFault> {
    let class = context.project.class_type()?;
    catalog.find(class).ok_or_else(|| {
        SectionFault::NotApplicable(format!("{class} has no entry in the classification catalog"))
    })
}

pub(crate) fn find_location<'a>(
    context: &Context<'_>,
    climate: &'a ClimateZoneSection,
) -> Result<&'a LocationClimate, SectionFault> {
    let location = context.project.location()?;
    climate.find(location).ok_or_else(|| {
        SectionFault::NotApplicable(format!("no climate zone is recorded for `{location}`"))
    })
}

pub(super) fn classification_summary(
    context: &Context<'_>,
    catalog: &CatalogSection,
) -> Result<OutcomeDetail, SectionFault> {
    let entry = find_class(context, catalog)?;

    Ok(OutcomeDetail::Classification {
        class_type: entry.class_type,
        description: entry.description.clone(),
        compliance_pathways: entry.compliance_pathways.clone(),
        applicable_clauses: entry.applicable_clauses.clone(),
    })
}

pub(super) fn location_zone(
    context: &Context<'_>,
    climate: &ClimateZoneSection,
) -> Result<OutcomeDetail, SectionFault> {
    let entry = find_location(context, climate)?;

    Ok(OutcomeDetail::ClimateZone {
        location: entry.id.clone(),
        zone: entry.zone,
        name: entry.name.clone(),
        annual_heating_degree_hours: entry.annual_heating_degree_hours,
        annual_cooling_degree_hours: entry.annual_cooling_degree_hours,
        annual_dehumidification_gram_hours: entry.annual_dehumidification_gram_hours,
    })
}

pub(super) fn classification_field(
    context: &Context<'_>,
    section: &str,
    field: ClassificationField,
) -> Result<OutcomeDetail, SectionFault> {
    let catalog = context.catalog(section)?;
    let entry = find_class(context, catalog)?;
    let class_type = entry.class_type;

    match field {
        ClassificationField::ClimateZone => {
            let climate = context.climate(section)?;
            let zone = find_location(context, climate)?.zone;
            let parameters = entry.climate_zone(zone).ok_or_else(|| {
                SectionFault::NotApplicable(format!(
                    "{class_type} has no parameters for climate zone {zone}"
                ))
            })?;

            Ok(OutcomeDetail::ZoneRequirements {
                class_type,
                zone,
                parameters: parameters.clone(),
                fabric: fabric::assess(parameters, context.project.building_fabric.as_ref()),
            })
        }
        ClassificationField::Subtypes => {
            if entry.subtypes.is_empty() {
                return Err(SectionFault::NotApplicable(format!(
                    "{class_type} defines no subtypes"
                )));
            }
            Ok(OutcomeDetail::Subtypes {
                class_type,
                subtypes: entry.subtypes.clone(),
            })
        }
        ClassificationField::SizeProvisions => {
            let provisions = entry.size_based_provisions.as_ref().ok_or_else(|| {
                SectionFault::NotApplicable(format!("{class_type} has no size-based provisions"))
            })?;
            let floor_area = context.project.floor_area()?;
            let (tier, text) = provisions.select(floor_area).ok_or_else(|| {
                SectionFault::NotApplicable(format!(
                    "no {class_type} size provision covers {floor_area} m²"
                ))
            })?;

            Ok(OutcomeDetail::SizeProvision {
                class_type,
                floor_area,
                tier,
                provisions: text.to_string(),
            })
        }
        ClassificationField::Pathways => {
            if entry.compliance_pathways.is_empty() {
                return Err(SectionFault::NotApplicable(format!(
                    "{class_type} lists no compliance pathways"
                )));
            }
            Ok(OutcomeDetail::Pathways {
                class_type,
                pathways: entry.compliance_pathways.clone(),
            })
        }
        ClassificationField::Clauses => {
            if entry.applicable_clauses.is_empty() {
                return Err(SectionFault::NotApplicable(format!(
                    "{class_type} lists no applicable clauses"
                )));
            }
            Ok(OutcomeDetail::Clauses {
                class_type,
                clauses: entry.applicable_clauses.clone(),
            })
        }
    }
}
