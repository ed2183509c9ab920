use std::collections::BTreeSet;

use serde::Serialize;

// ---------------------------------------------------------------------------
// RawRecord / RawTable – one export file as read
// ---------------------------------------------------------------------------

/// A single row of a per-genre export, before any normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub title: String,
    /// `None` when the export has no Genre column or the cell is empty.
    pub genre: Option<String>,
    /// `None` for an empty or non-numeric Rating cell.
    pub rating: Option<f64>,
    /// Loosely formatted vote count, e.g. `"12,345"`, `"(1.2K)"`, `"3M"`.
    pub votes: String,
    /// Loosely formatted runtime, e.g. `"2h 15m"`, `"95m"`, `"2h"`.
    pub duration: Option<String>,
}

/// All rows of one export file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Whether the export carried its own Genre column.
    pub has_genre_column: bool,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(has_genre_column: bool, records: Vec<RawRecord>) -> Self {
        RawTable {
            has_genre_column,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// MovieRecord – one row of the unified table
// ---------------------------------------------------------------------------

/// A normalised movie row: genre always present, votes and runtime numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecord {
    pub title: String,
    pub genre: String,
    pub rating: Option<f64>,
    pub votes: u64,
    /// Original runtime text, kept for display.
    pub duration: Option<String>,
    /// Runtime in minutes, `0` when the text could not be parsed.
    pub duration_min: u64,
}

// ---------------------------------------------------------------------------
// MovieTable – merged or filtered dataset
// ---------------------------------------------------------------------------

/// An ordered set of movie rows with a pre-computed genre index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieTable {
    pub records: Vec<MovieRecord>,
    /// Sorted distinct genres present in `records`.
    pub genres: BTreeSet<String>,
}

impl MovieTable {
    /// Build the genre index from the given rows.
    pub fn from_records(records: Vec<MovieRecord>) -> Self {
        let genres = records.iter().map(|r| r.genre.clone()).collect();
        MovieTable { records, genres }
    }

    /// Number of movies.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Largest vote count in the table (upper bound for a votes slider).
    pub fn max_votes(&self) -> u64 {
        self.records.iter().map(|r| r.votes).max().unwrap_or(0)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MovieRecord> {
        self.records.iter()
    }
}
