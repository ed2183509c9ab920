//! Error types for the merge / filter / aggregate core.
//!
//! Parse failures of single fields never show up here: the value parsers
//! fall back to zero. Unavailable sources are not errors either, they are
//! recorded in the merge manifest (see [`crate::data::merge::SourceStatus`]).

use thiserror::Error;

/// Failures of the Dataset Merger.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    /// None of the declared sources produced any data.
    #[error("no movie data available: {declared} source(s) declared, none could be loaded")]
    EmptyDataset { declared: usize },
}

/// Failures of the Filter Engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// A threshold is negative or not a finite number.
    #[error("invalid filter specification: {reason}")]
    InvalidFilterSpec { reason: String },
}

/// Failures of the Aggregation Engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    /// A histogram needs at least one bucket.
    #[error("rating histogram requires at least one bin")]
    ZeroBins,
}
