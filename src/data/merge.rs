use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};

use super::model::{MovieRecord, MovieTable, RawTable};
use super::parse::{parse_duration, parse_votes};
use crate::errors::DatasetError;

// ---------------------------------------------------------------------------
// Merge inputs
// ---------------------------------------------------------------------------

/// What the caller managed to obtain for one declared category.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceData {
    Loaded(RawTable),
    /// The data could not be obtained; the string says why.
    Unavailable(String),
}

/// One declared category and its data.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySource {
    pub label: String,
    pub data: SourceData,
}

impl CategorySource {
    pub fn loaded(label: impl Into<String>, table: RawTable) -> Self {
        CategorySource {
            label: label.into(),
            data: SourceData::Loaded(table),
        }
    }

    pub fn unavailable(label: impl Into<String>, reason: impl Into<String>) -> Self {
        CategorySource {
            label: label.into(),
            data: SourceData::Unavailable(reason.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Merge outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SourceStatus {
    Loaded { rows: usize },
    Unavailable { reason: String },
}

/// Manifest entry: what happened to one declared category.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceOutcome {
    pub label: String,
    pub status: SourceStatus,
}

/// The unified table plus a manifest of which categories made it in.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    pub table: MovieTable,
    pub manifest: Vec<SourceOutcome>,
}

impl MergeReport {
    /// `(label, reason)` for every category that could not be loaded.
    pub fn unavailable(&self) -> impl Iterator<Item = (&str, &str)> {
        self.manifest.iter().filter_map(|o| match &o.status {
            SourceStatus::Unavailable { reason } => Some((o.label.as_str(), reason.as_str())),
            SourceStatus::Loaded { .. } => None,
        })
    }

    /// Labels of the categories whose rows are in the table.
    pub fn loaded_labels(&self) -> impl Iterator<Item = &str> {
        self.manifest.iter().filter_map(|o| match o.status {
            SourceStatus::Loaded { .. } => Some(o.label.as_str()),
            SourceStatus::Unavailable { .. } => None,
        })
    }

    pub fn is_partial(&self) -> bool {
        self.unavailable().next().is_some()
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Combine per-category exports into one [`MovieTable`].
///
/// Rows keep source order then row order. A source without a Genre column
/// has every row labelled with its category; a source with one keeps its
/// per-row values (an empty cell still falls back to the category label).
/// Unavailable sources are skipped and recorded in the manifest. Fails with
/// [`DatasetError::EmptyDataset`] when no source could be loaded at all.
pub fn merge<I>(sources: I) -> Result<MergeReport, DatasetError>
where
    I: IntoIterator<Item = CategorySource>,
{
    let mut records = Vec::new();
    let mut manifest = Vec::new();

    for source in sources {
        let status = match source.data {
            SourceData::Loaded(raw) => {
                let rows = raw.len();
                debug!("merging {rows} row(s) from '{}'", source.label);
                append_source(&source.label, raw, &mut records);
                SourceStatus::Loaded { rows }
            }
            SourceData::Unavailable(reason) => {
                warn!("skipping '{}': {reason}", source.label);
                SourceStatus::Unavailable { reason }
            }
        };
        manifest.push(SourceOutcome {
            label: source.label,
            status,
        });
    }

    let loaded = manifest
        .iter()
        .filter(|o| matches!(o.status, SourceStatus::Loaded { .. }))
        .count();
    if loaded == 0 {
        return Err(DatasetError::EmptyDataset {
            declared: manifest.len(),
        });
    }

    info!(
        "merged {} movie(s) from {loaded}/{} source(s)",
        records.len(),
        manifest.len()
    );
    Ok(MergeReport {
        table: MovieTable::from_records(records),
        manifest,
    })
}

fn append_source(label: &str, raw: RawTable, out: &mut Vec<MovieRecord>) {
    let has_genre = raw.has_genre_column;
    out.extend(raw.records.into_iter().map(|rec| {
        let genre = match rec.genre {
            Some(g) if has_genre && !g.trim().is_empty() => g,
            _ => label.to_string(),
        };
        MovieRecord {
            votes: parse_votes(&rec.votes),
            duration_min: parse_duration(rec.duration.as_deref()),
            title: rec.title,
            genre,
            rating: rec.rating,
            duration: rec.duration,
        }
    }));
}

// ---------------------------------------------------------------------------
// Merge cache
// ---------------------------------------------------------------------------

/// Identity of one declared source: its category and where it lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceKey {
    pub label: String,
    pub location: String,
}

impl SourceKey {
    pub fn new(label: impl Into<String>, location: impl Into<String>) -> Self {
        SourceKey {
            label: label.into(),
            location: location.into(),
        }
    }
}

/// Memoises merge results by the list of source identities.
///
/// Entries live as long as the cache. Failed merges are not stored.
#[derive(Debug, Default)]
pub struct MergeCache {
    entries: HashMap<Vec<SourceKey>, Arc<MergeReport>>,
}

impl MergeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached merge for `keys`, or run `load` and merge its output.
    ///
    /// With `bypass` set the cache is neither read nor written.
    pub fn get_or_merge<F>(
        &mut self,
        keys: &[SourceKey],
        bypass: bool,
        load: F,
    ) -> Result<Arc<MergeReport>, DatasetError>
    where
        F: FnOnce(&[SourceKey]) -> Vec<CategorySource>,
    {
        if bypass {
            return merge(load(keys)).map(Arc::new);
        }
        if let Some(hit) = self.entries.get(keys) {
            debug!("merge cache hit for {} source(s)", keys.len());
            return Ok(Arc::clone(hit));
        }
        let report = Arc::new(merge(load(keys))?);
        self.entries.insert(keys.to_vec(), Arc::clone(&report));
        Ok(report)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
