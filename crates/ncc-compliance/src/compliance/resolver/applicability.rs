use super::{Context, Exemption, OutcomeDetail, SectionFault};
use crate::compliance::domain::ClassType;
use crate::compliance::table::{ApplicabilityRules, ExemptionSection, ProvisionSection};

const MINOR_USE_EXEMPTION: &str = "minor_use";
const HERITAGE_EXEMPTION: &str = "heritage_building";

pub(super) fn exemptions(
    context: &Context<'_>,
    section: &ExemptionSection,
) -> Result<OutcomeDetail, SectionFault> {
    let class = context.project.class_type()?;
    let mut exemptions = Vec::with_capacity(2);

    let minor_use = &section.minor_use_rule;
    if !minor_use.excluded_classes.contains(&class) {
        exemptions.push(Exemption {
            name: MINOR_USE_EXEMPTION.to_string(),
            description: Some(minor_use.threshold.clone()),
            conditions: Vec::new(),
            limitations: Vec::new(),
        });
    }

    let heritage = &section.heritage_buildings;
    exemptions.push(Exemption {
        name: HERITAGE_EXEMPTION.to_string(),
        description: None,
        conditions: heritage.conditions.clone(),
        limitations: heritage.limitations.clone(),
    });

    Ok(OutcomeDetail::Exemptions { exemptions })
}

/// Project attributes the applicability rules are evaluated against.
#[derive(Debug, Default, Clone, Copy)]
struct Facts {
    class: Option<ClassType>,
    zone: Option<u8>,
    floor_area: Option<f64>,
}

impl Facts {
    fn matches(&self, rules: &ApplicabilityRules) -> bool {
        let class_ok = match self.class {
            Some(class) if !rules.building_classes.is_empty() => {
                rules.building_classes.contains(&class)
            }
            _ => true,
        };
        let zone_ok = match self.zone {
            Some(zone) if !rules.climate_zones.is_empty() => rules.climate_zones.contains(&zone),
            _ => true,
        };
        let area_ok = if rules.min_floor_area.is_none() && rules.max_floor_area.is_none() {
            true
        } else {
            self.floor_area.is_some_and(|area| {
                rules.min_floor_area.map_or(true, |min| area >= min)
                    && rules.max_floor_area.map_or(true, |max| area < max)
            })
        };

        class_ok && zone_ok && area_ok
    }
}

pub(super) fn provisions(
    context: &Context<'_>,
    name: &str,
    section: &ProvisionSection,
) -> Result<OutcomeDetail, SectionFault> {
    let all_rules = || {
        std::iter::once(&section.overall_applicability)
            .chain(section.content_blocks.iter().map(|block| &block.block_applicability))
    };

    let zone = if all_rules().any(|rules| !rules.climate_zones.is_empty()) {
        let climate = context.climate(name)?;
        context
            .project
            .location()
            .ok()
            .and_then(|location| climate.find(location))
            .map(|entry| entry.zone)
    } else {
        None
    };

    let facts = Facts {
        class: context.project.class_type().ok(),
        zone,
        floor_area: context.project.optional_floor_area()?,
    };

    if !facts.matches(&section.overall_applicability) {
        return Err(SectionFault::NotApplicable(format!(
            "{} does not apply to this project",
            section.title
        )));
    }

    let content_blocks: Vec<_> = section
        .content_blocks
        .iter()
        .filter(|block| facts.matches(&block.block_applicability))
        .cloned()
        .collect();
    if content_blocks.is_empty() {
        return Err(SectionFault::NotApplicable(format!(
            "no content of {} applies to this project",
            section.title
        )));
    }

    Ok(OutcomeDetail::Provisions {
        title: section.title.clone(),
        display_order: section.display_order,
        content_blocks,
    })
}
