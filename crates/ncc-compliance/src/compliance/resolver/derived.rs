use super::{Context, OutcomeDetail, SectionFault};
use crate::compliance::calculations::{
    thermal_energy_load, total_cooling_load, total_heating_load, CalculationKind,
    CoolingLoadOptions, HeatingLoadOptions, ThermalEnergyLoadOptions,
};
use crate::compliance::table::{CalculationSection, LocationClimate};

pub(super) fn calculation(
    context: &Context<'_>,
    name: &str,
    section: &CalculationSection,
) -> Result<OutcomeDetail, SectionFault> {
    if !section.classes.is_empty() {
        let class = context.project.class_type()?;
        if !section.classes.contains(&class) {
            return Err(SectionFault::NotApplicable(format!(
                "{} does not apply to {class}",
                section.calculation
            )));
        }
    }

    let climate = context.climate(name)?;
    // An unlisted or absent location falls back to the default degree hours.
    let location = context
        .project
        .location()
        .ok()
        .and_then(|location| climate.find(location));
    let habitable_area = context.project.habitable_area()?;

    let heating = heating_options(location, habitable_area);
    let cooling = cooling_options(location, habitable_area);

    let output = match section.calculation {
        CalculationKind::TotalHeatingLoad => total_heating_load(&heating),
        CalculationKind::TotalCoolingLoad => total_cooling_load(&cooling),
        CalculationKind::ThermalEnergyLoad => thermal_energy_load(&ThermalEnergyLoadOptions {
            heating_load_limit: Some(total_heating_load(&heating).value),
            cooling_load_limit: Some(total_cooling_load(&cooling).value),
        }),
    };

    Ok(OutcomeDetail::Calculation {
        calculation: section.calculation,
        output,
    })
}

fn heating_options(
    location: Option<&LocationClimate>,
    habitable_area: Option<f64>,
) -> HeatingLoadOptions {
    HeatingLoadOptions {
        heating_degree_hours: location.and_then(|entry| entry.annual_heating_degree_hours),
        habitable_area,
    }
}

fn cooling_options(
    location: Option<&LocationClimate>,
    habitable_area: Option<f64>,
) -> CoolingLoadOptions {
    CoolingLoadOptions {
        cooling_degree_hours: location.and_then(|entry| entry.annual_cooling_degree_hours),
        dehumidification_gram_hours: location
            .and_then(|entry| entry.annual_dehumidification_gram_hours),
        habitable_area,
    }
}
