use std::path::{Path, PathBuf};

use matricula_roster::RosterColumns;
use serde::{Deserialize, Serialize};

use crate::substitution::DEFAULT_INSTITUTION_MIN_LEN;
use crate::{CertificateError, LiteralSamples, SubstitutionStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Literal,
    Pattern,
}

/// Certificate generation settings, usually read from a JSON file.
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CertificateConfig {
    pub template: Option<PathBuf>,
    pub roster: Option<PathBuf>,
    /// Worksheet to read from an `.xlsx` roster; the first one when unset.
    pub sheet: Option<String>,
    pub strategy: StrategyKind,
    pub literal_samples: LiteralSamples,
    pub institution_min_len: usize,
    pub columns: RosterColumns,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            template: None,
            roster: None,
            sheet: None,
            strategy: StrategyKind::default(),
            literal_samples: LiteralSamples::default(),
            institution_min_len: DEFAULT_INSTITUTION_MIN_LEN,
            columns: RosterColumns::default(),
        }
    }
}

impl CertificateConfig {
    pub fn from_json(json: &str) -> Result<Self, CertificateError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CertificateError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
            .map_err(|err| CertificateError::Config(format!("{}: {err}", path.display())))
    }

    pub fn substitution_strategy(&self) -> SubstitutionStrategy {
        match self.strategy {
            StrategyKind::Literal => SubstitutionStrategy::Literal(self.literal_samples.clone()),
            StrategyKind::Pattern => SubstitutionStrategy::Pattern {
                institution_min_len: self.institution_min_len,
            },
        }
    }
}
