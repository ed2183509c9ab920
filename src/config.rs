//! Source manifest and report defaults.
//!
//! The manifest is a TOML file listing the per-genre exports to merge, with
//! optional default filters and report options. Relative source paths are
//! resolved against the manifest's own directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::data::aggregate::SummaryOptions;
use crate::data::filter::FilterSpec;
use crate::data::merge::SourceKey;

/// Default manifest file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "movie-insights.toml";

/// One declared export: its genre label and file location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub label: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Rows in the top-movies view.
    pub top_n: usize,
    /// Buckets in the rating histogram.
    pub histogram_bins: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let defaults = SummaryOptions::default();
        Self {
            top_n: defaults.top_n,
            histogram_bins: defaults.histogram_bins,
        }
    }
}

impl From<ReportConfig> for SummaryOptions {
    fn from(cfg: ReportConfig) -> Self {
        SummaryOptions {
            top_n: cfg.top_n,
            histogram_bins: cfg.histogram_bins,
        }
    }
}

/// Complete manifest as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    #[serde(default)]
    pub filters: FilterSpec,
    #[serde(default)]
    pub report: ReportConfig,
}

impl Default for AppConfig {
    /// The six 2024 genre exports, expected under `data/`.
    fn default() -> Self {
        let sources = [
            ("Adventure", "adventure_2024_raw.csv"),
            ("Animation", "animation_2024_raw.csv"),
            ("Family", "family_2024_raw.csv"),
            ("Fantasy", "fantasy_2024_raw.csv"),
            ("Horror", "horror_2024_raw.csv"),
            ("All Genres", "all_genres_2024_raw.csv"),
        ]
        .into_iter()
        .map(|(label, file)| SourceEntry {
            label: label.to_string(),
            path: Path::new("data").join(file),
        })
        .collect();

        Self {
            sources,
            filters: FilterSpec::default(),
            report: ReportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a manifest from TOML text. Relative paths are joined onto `base_dir`.
    pub fn from_toml_str(text: &str, base_dir: &Path) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(text).context("parsing manifest TOML")?;
        for source in &mut config.sources {
            if source.path.is_relative() {
                source.path = base_dir.join(&source.path);
            }
        }
        Ok(config)
    }

    /// Read a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::from_toml_str(&text, base_dir)?;
        info!(
            "Loaded manifest {} ({} source(s))",
            path.display(),
            config.sources.len()
        );
        Ok(config)
    }

    /// Load the given manifest, or `movie-insights.toml` if present, or the
    /// built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    debug!("no {DEFAULT_CONFIG_FILE} found, using built-in sources");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialising manifest")
    }

    /// Cache identities of the declared sources, in declaration order.
    pub fn source_keys(&self) -> Vec<SourceKey> {
        self.sources
            .iter()
            .map(|s| SourceKey::new(&s.label, s.path.to_string_lossy()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::DurationBucket;

    #[test]
    fn parses_full_manifest() {
        let text = r#"
            [[sources]]
            label = "Horror"
            path = "horror.csv"

            [[sources]]
            label = "All Genres"
            path = "/abs/all.parquet"

            [filters]
            genres = ["Horror"]
            min_rating = 6.5
            duration = "90to120"

            [report]
            top_n = 5
        "#;
        let cfg = AppConfig::from_toml_str(text, Path::new("/data")).unwrap();
        assert_eq!(cfg.sources[0].path, PathBuf::from("/data/horror.csv"));
        assert_eq!(cfg.sources[1].path, PathBuf::from("/abs/all.parquet"));
        assert_eq!(cfg.filters.min_rating, Some(6.5));
        assert_eq!(cfg.filters.min_votes, None);
        assert_eq!(cfg.filters.duration, DurationBucket::From90To120);
        assert!(cfg.filters.genres.contains("Horror"));
        assert_eq!(cfg.report.top_n, 5);
        assert_eq!(cfg.report.histogram_bins, 10);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg = AppConfig::from_toml_str("", Path::new(".")).unwrap();
        assert!(cfg.sources.is_empty());
        assert_eq!(cfg.filters, FilterSpec::default());
        assert_eq!(cfg.report, ReportConfig::default());
    }

    #[test]
    fn default_lists_six_genre_exports() {
        let cfg = AppConfig::default();
        let labels: Vec<&str> = cfg.sources.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Adventure", "Animation", "Family", "Fantasy", "Horror", "All Genres"]
        );
        assert_eq!(cfg.source_keys().len(), 6);
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = AppConfig::default();
        let text = cfg.to_toml_string().unwrap();
        let back = AppConfig::from_toml_str(&text, Path::new("")).unwrap();
        assert_eq!(back, cfg);
    }
}
