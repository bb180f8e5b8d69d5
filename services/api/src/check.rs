use clap::Args;
use ncc_compliance::compliance::table::{load, RuleTable};
use ncc_compliance::compliance::{ComplianceResult, OutcomeDetail, Project, RuleResolver};
use ncc_compliance::config::AppConfig;
use ncc_compliance::error::AppError;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Project JSON file (buildingClassification, location, floorArea, ...)
    #[arg(long)]
    pub(crate) project: PathBuf,
    /// Print the full compliance result as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

fn configured_table() -> Result<RuleTable, AppError> {
    let config = AppConfig::load()?;
    Ok(load(&config.rules.descriptor())?)
}

pub(crate) fn run_sections() -> Result<(), AppError> {
    let table = configured_table()?;

    println!("Rule table ({} sections)", table.len());
    for section in table.sections() {
        println!("- {} [{}]", section.name, section.document.kind());
    }
    Ok(())
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.project)?;
    let project: Project = serde_json::from_str(&raw)?;
    let table = configured_table()?;
    let result = RuleResolver::default().resolve(&project, &table)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_summary(&project, &result));
    }
    Ok(())
}

pub(crate) fn render_summary(project: &Project, result: &ComplianceResult) -> String {
    let mut out = String::new();
    let name = project.name.as_deref().unwrap_or("Unnamed project");
    out.push_str(&format!(
        "{name}: {} ({} sections)\n",
        result.status.label(),
        result.sections.len()
    ));

    // Lookups and calculations first, then provisions in display order.
    let provisions = &result.provision_order;
    let ordered = result
        .sections
        .keys()
        .filter(|section| !provisions.contains(section))
        .chain(provisions.iter());

    for section in ordered {
        let Some(outcome) = result.sections.get(section) else {
            continue;
        };
        out.push_str(&format!(
            "- {section}: {}{}\n",
            outcome.status.label(),
            describe(&outcome.detail)
                .map(|text| format!(" | {text}"))
                .unwrap_or_default()
        ));
    }
    out
}

fn describe(detail: &OutcomeDetail) -> Option<String> {
    match detail {
        OutcomeDetail::Reason { reason } => Some(reason.clone()),
        OutcomeDetail::ClimateZone { location, zone, .. } => {
            Some(format!("{location} is climate zone {zone}"))
        }
        OutcomeDetail::Tier {
            tier, requirement, ..
        } => Some(match requirement {
            Some(requirement) => format!("{tier}: {requirement}"),
            None => tier.clone(),
        }),
        OutcomeDetail::SizeProvision { provisions, .. } => Some(provisions.clone()),
        OutcomeDetail::ZoneRequirements { zone, fabric, .. } => {
            Some(format!("zone {zone} fabric {}", fabric.status.label()))
        }
        OutcomeDetail::Calculation { output, .. } => Some(output.description_value.clone()),
        OutcomeDetail::Provisions { content_blocks, .. } => {
            Some(format!("{} content blocks", content_blocks.len()))
        }
        OutcomeDetail::Exemptions { exemptions } => Some(
            exemptions
                .iter()
                .map(|exemption| exemption.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ),
        OutcomeDetail::Classification { .. }
        | OutcomeDetail::Subtypes { .. }
        | OutcomeDetail::Pathways { .. }
        | OutcomeDetail::Clauses { .. } => None,
    }
}
