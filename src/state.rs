use std::sync::Arc;

use crate::data::aggregate::{Summaries, SummaryOptions, summarize};
use crate::data::filter::{DurationBucket, FilterSpec, apply};
use crate::data::merge::MergeReport;
use crate::data::model::MovieTable;
use crate::errors::{AggregateError, FilterError};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Everything a front end needs between interactions, independent of rendering.
///
/// The merged dataset is shared and never mutated; every filter change
/// produces a fresh filtered table.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Merged dataset plus its source manifest.
    dataset: Arc<MergeReport>,

    /// Current filter selections.
    filter: FilterSpec,

    /// Movies passing the current filter (cached).
    visible: MovieTable,
}

impl DashboardState {
    /// Start with no filter applied.
    pub fn new(dataset: Arc<MergeReport>) -> Self {
        let visible = dataset.table.clone();
        Self {
            dataset,
            filter: FilterSpec::default(),
            visible,
        }
    }

    pub fn dataset(&self) -> &MovieTable {
        &self.dataset.table
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn visible(&self) -> &MovieTable {
        &self.visible
    }

    /// `(label, reason)` of every source that could not be loaded.
    pub fn warnings(&self) -> Vec<(String, String)> {
        self.dataset
            .unavailable()
            .map(|(label, reason)| (label.to_string(), reason.to_string()))
            .collect()
    }

    /// Replace the whole filter. On error the previous filter stays in effect.
    pub fn set_filter(&mut self, filter: FilterSpec) -> Result<(), FilterError> {
        self.visible = apply(&self.dataset.table, &filter)?;
        self.filter = filter;
        Ok(())
    }

    /// Recompute `visible` after a filter change.
    pub fn refilter(&mut self) -> Result<(), FilterError> {
        self.visible = apply(&self.dataset.table, &self.filter)?;
        Ok(())
    }

    /// Toggle a single genre in the genre selection.
    pub fn toggle_genre(&mut self, genre: &str) -> Result<(), FilterError> {
        let mut filter = self.filter.clone();
        if !filter.genres.remove(genre) {
            filter.genres.insert(genre.to_string());
        }
        self.set_filter(filter)
    }

    /// Clear the genre selection (show every genre).
    pub fn select_all_genres(&mut self) -> Result<(), FilterError> {
        let mut filter = self.filter.clone();
        filter.genres.clear();
        self.set_filter(filter)
    }

    pub fn set_min_rating(&mut self, rating: f64) -> Result<(), FilterError> {
        self.set_filter(self.filter.clone().with_min_rating(rating))
    }

    pub fn set_min_votes(&mut self, votes: u64) -> Result<(), FilterError> {
        self.set_filter(self.filter.clone().with_min_votes(votes))
    }

    pub fn set_duration(&mut self, bucket: DurationBucket) -> Result<(), FilterError> {
        self.set_filter(self.filter.clone().with_duration(bucket))
    }

    /// Summary views of the currently visible movies.
    pub fn summaries(&self, options: &SummaryOptions) -> Result<Summaries, AggregateError> {
        summarize(&self.visible, options)
    }
}
