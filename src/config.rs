//! Dashboard configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is a
//! valid configuration. The binary layers CLI flags on top of the file.
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DataLoadError;
use crate::record::NgramKind;

/// Default half-width of the word-cloud frequency band, as a fraction of the
/// clicked count. Earlier dashboards used 0.3.
pub const DEFAULT_WIDTH_FRACTION: f64 = 0.2;

/// How repeated `(term, date)` records are resolved at load time.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep every record; a repeated pair becomes several chart points.
    KeepAll,
    /// Drop rows identical in `(term, counts, date)`.
    #[default]
    DropExact,
    /// Fold all records of a pair into one whose count is the sum.
    Sum,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "keep_all" | "keep" => Ok(Self::KeepAll),
            "drop_exact" | "drop" => Ok(Self::DropExact),
            "sum" => Ok(Self::Sum),
            other => Err(format!("Unknown duplicate policy: {}", other)),
        }
    }
}

/// File names of the six input tables, relative to `data_dir`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TableFiles {
    pub daily_terms: String,
    pub daily_bigrams: String,
    pub daily_trigrams: String,
    pub frequent_terms: String,
    pub frequent_bigrams: String,
    pub frequent_trigrams: String,
}

impl Default for TableFiles {
    fn default() -> Self {
        TableFiles {
            daily_terms: "all_terms.csv".into(),
            daily_bigrams: "all_bigrams.csv".into(),
            daily_trigrams: "all_trigrams.csv".into(),
            frequent_terms: "frequent_terms.csv".into(),
            frequent_bigrams: "frequent_bigrams.csv".into(),
            frequent_trigrams: "frequent_trigrams.csv".into(),
        }
    }
}

/// Resolved absolute-or-relative paths of every input table.
#[derive(Clone, Debug)]
pub struct StorePaths {
    pub daily: [(NgramKind, PathBuf); 3],
    pub frequent: [(NgramKind, PathBuf); 3],
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub files: TableFiles,
    pub width_fraction: f64,
    pub duplicate_policy: DuplicatePolicy,
    /// Add submitted free text to the pinned list instead of using it once.
    pub pin_free_text: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_dir: PathBuf::from("db"),
            files: TableFiles::default(),
            width_fraction: DEFAULT_WIDTH_FRACTION,
            duplicate_policy: DuplicatePolicy::default(),
            pin_free_text: true,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, DataLoadError> {
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => DataLoadError::Missing { path: path.to_path_buf() },
            _ => DataLoadError::Io { path: path.to_path_buf(), source },
        })?;
        let cfg: DashboardConfig = serde_json::from_str(&text)
            .map_err(|source| DataLoadError::Json { path: path.to_path_buf(), source })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), DataLoadError> {
        if !self.width_fraction.is_finite() || self.width_fraction < 0.0 {
            return Err(DataLoadError::InvalidConfig(format!(
                "width_fraction must be a finite number >= 0, got {}",
                self.width_fraction
            )));
        }
        Ok(())
    }

    pub fn paths(&self) -> StorePaths {
        let d = &self.data_dir;
        let f = &self.files;
        StorePaths {
            daily: [
                (NgramKind::Unigram, d.join(&f.daily_terms)),
                (NgramKind::Bigram, d.join(&f.daily_bigrams)),
                (NgramKind::Trigram, d.join(&f.daily_trigrams)),
            ],
            frequent: [
                (NgramKind::Unigram, d.join(&f.frequent_terms)),
                (NgramKind::Bigram, d.join(&f.frequent_bigrams)),
                (NgramKind::Trigram, d.join(&f.frequent_trigrams)),
            ],
        }
    }
}
