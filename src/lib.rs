//! Movie listing insights.
//!
//! Merges per-genre movie exports into one table, normalising loosely
//! formatted vote counts and runtimes, then filters that table and derives
//! the summary views a dashboard displays.
//!
//! ```no_run
//! use movie_insights::config::AppConfig;
//! use movie_insights::data::{aggregate, filter, loader, merge};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = AppConfig::default();
//! let report = merge::merge(loader::load_sources(&config.source_keys()))?;
//! let spec = filter::FilterSpec::new().with_min_rating(7.5);
//! let visible = filter::apply(&report.table, &spec)?;
//! for movie in aggregate::top_by_rating_then_votes(&visible, 10) {
//!     println!("{} ({})", movie.title, movie.genre);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod errors;
pub mod report;
pub mod state;

pub use data::aggregate::{Summaries, SummaryOptions, summarize};
pub use data::filter::{DurationBucket, FilterSpec};
pub use data::merge::{CategorySource, MergeCache, MergeReport, SourceKey, merge};
pub use data::model::{MovieRecord, MovieTable, RawRecord, RawTable};
pub use data::parse::{parse_duration, parse_votes};
pub use errors::{AggregateError, DatasetError, FilterError};
pub use state::DashboardState;
