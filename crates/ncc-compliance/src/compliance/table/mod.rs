//! Rule table loading.
//!
//! A [`TableDescriptor`] names a directory, a file extension and an ordered list of
//! section names; [`load`] reads `<basePath>/<section><fileExtension>` for each name
//! and parses it into a typed [`SectionDocument`]. Any unreadable, malformed or
//! structurally invalid section fails the whole load.

mod cache;
pub mod sections;

pub use cache::RuleTableCache;
pub use sections::{
    ApplicabilityRules, CalculationSection, CatalogSection, ClassificationField,
    ClassificationLookupSection, ClimateZoneSection, ContentBlock, ExemptionSection,
    HeritageBuildings, InvalidSection, LocationClimate, MinorUseRule, NumericAttribute,
    ProvisionSection, SectionDocument, SectionKind, ThresholdSection, ThresholdTier,
};

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_RULES_PATH: &str = "data/decision-trees";
pub const DEFAULT_FILE_EXTENSION: &str = ".json";

/// Sections shipped under `data/decision-trees`, in display order.
pub const DEFAULT_SECTIONS: &[&str] = &[
    "exemptions",
    "building-classifications",
    "climate-zones",
    "compliance-pathways",
    "special-requirements",
    "building-fabric",
    "size-provisions",
    "energy-use",
    "cooling-load",
    "thermal-energy-load",
    "verification-methods",
    "energy-monitoring",
    "ceilingfan-elemental-provisions-j3",
];

/// Where the rule sections live and which ones to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDescriptor {
    pub base_path: PathBuf,
    pub file_extension: String,
    pub sections: Vec<String>,
}

impl TableDescriptor {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Self::default()
        }
    }

    pub fn section_path(&self, section: &str) -> PathBuf {
        self.base_path.join(format!("{section}{}", self.file_extension))
    }
}

impl Default for TableDescriptor {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from(DEFAULT_RULES_PATH),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            sections: DEFAULT_SECTIONS.iter().map(|name| name.to_string()).collect(),
        }
    }
}

/// A named section of a loaded rule table.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub document: SectionDocument,
}

/// Immutable rule table, keeping sections in declared order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleTable {
    sections: Vec<Section>,
}

impl RuleTable {
    /// Build a table from already-parsed sections, applying the same checks as [`load`].
    pub fn from_sections<I, S>(sections: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (S, SectionDocument)>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();

        for (name, document) in sections {
            let name = name.into();
            if !seen.insert(name.clone()) {
                return Err(ConfigurationError::DuplicateSection(name));
            }
            document
                .validate()
                .map_err(|source| ConfigurationError::Invalid {
                    section: name.clone(),
                    source,
                })?;
            collected.push(Section { name, document });
        }

        Ok(Self {
            sections: collected,
        })
    }

    pub fn get(&self, name: &str) -> Option<&SectionDocument> {
        self.sections
            .iter()
            .find(|section| section.name == name)
            .map(|section| &section.document)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|section| section.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Failure to load a rule table; always names the offending section.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("rule section `{section}` not found at {}", path.display())]
    Missing { section: String, path: PathBuf },
    #[error("rule section `{section}` could not be read from {}: {source}", path.display())]
    Unreadable {
        section: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("rule section `{section}` is malformed: {source}")]
    Malformed {
        section: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("rule section `{section}` is invalid: {source}")]
    Invalid {
        section: String,
        #[source]
        source: InvalidSection,
    },
    #[error("rule section `{0}` is declared more than once")]
    DuplicateSection(String),
}

impl ConfigurationError {
    pub fn section(&self) -> &str {
        match self {
            ConfigurationError::Missing { section, .. }
            | ConfigurationError::Unreadable { section, .. }
            | ConfigurationError::Malformed { section, .. }
            | ConfigurationError::Invalid { section, .. } => section,
            ConfigurationError::DuplicateSection(section) => section,
        }
    }
}

/// Load every section named by the descriptor.
pub fn load(descriptor: &TableDescriptor) -> Result<RuleTable, ConfigurationError> {
    let mut parsed = Vec::with_capacity(descriptor.sections.len());
    for section in &descriptor.sections {
        let path = descriptor.section_path(section);
        let document = read_section(section, &path)?;
        debug!(section = %section, kind = %document.kind(), "parsed rule section");
        parsed.push((section.clone(), document));
    }

    let table = RuleTable::from_sections(parsed)?;
    info!(
        sections = table.len(),
        base_path = %descriptor.base_path.display(),
        "rule table loaded"
    );
    Ok(table)
}

fn read_section(section: &str, path: &Path) -> Result<SectionDocument, ConfigurationError> {
    let raw = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigurationError::Missing {
            section: section.to_string(),
            path: path.to_path_buf(),
        },
        _ => ConfigurationError::Unreadable {
            section: section.to_string(),
            path: path.to_path_buf(),
            source,
        },
    })?;

    serde_json::from_str(&raw).map_err(|source| ConfigurationError::Malformed {
        section: section.to_string(),
        source,
    })
}
