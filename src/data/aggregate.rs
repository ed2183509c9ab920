use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::model::{MovieRecord, MovieTable};
use crate::errors::AggregateError;

// ---------------------------------------------------------------------------
// Summary view rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

/// A per-genre mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreMean {
    pub genre: String,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreTotal {
    pub genre: String,
    pub votes: u64,
}

/// One histogram bucket. `upper` is exclusive except for the last bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// Descending rating, unrated movies last. A non-finite rating counts as
/// unrated.
fn rating_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    let finite = |r: Option<f64>| r.filter(|r| r.is_finite());
    match (finite(a), finite(b)) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The `n` best movies by rating, ties broken by more votes.
///
/// Asking for more rows than the table has returns the whole table sorted.
pub fn top_by_rating_then_votes(table: &MovieTable, n: usize) -> Vec<MovieRecord> {
    let mut rows: Vec<&MovieRecord> = table.iter().collect();
    rows.sort_by(|a, b| rating_desc(a.rating, b.rating).then_with(|| b.votes.cmp(&a.votes)));
    rows.into_iter().take(n).cloned().collect()
}

/// Number of movies per genre, most common first (ties by genre name).
pub fn count_by_genre(table: &MovieTable) -> Vec<GenreCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for movie in table.iter() {
        *counts.entry(movie.genre.as_str()).or_default() += 1;
    }
    let mut out: Vec<GenreCount> = counts
        .into_iter()
        .map(|(genre, count)| GenreCount {
            genre: genre.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

fn mean_by_genre<F>(table: &MovieTable, value: F) -> Vec<GenreMean>
where
    F: Fn(&MovieRecord) -> f64,
{
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for movie in table.iter() {
        let entry = sums.entry(movie.genre.as_str()).or_default();
        entry.0 += value(movie);
        entry.1 += 1;
    }
    let mut out: Vec<GenreMean> = sums
        .into_iter()
        .map(|(genre, (sum, n))| GenreMean {
            genre: genre.to_string(),
            mean: sum / n as f64,
        })
        .collect();
    out.sort_by(|a, b| a.mean.total_cmp(&b.mean));
    out
}

/// Mean runtime in minutes per genre, shortest first.
pub fn mean_duration_by_genre(table: &MovieTable) -> Vec<GenreMean> {
    mean_by_genre(table, |m| m.duration_min as f64)
}

/// Mean vote count per genre, least voted first.
pub fn mean_votes_by_genre(table: &MovieTable) -> Vec<GenreMean> {
    mean_by_genre(table, |m| m.votes as f64)
}

/// Split the observed rating range into `bins` equal-width buckets.
///
/// Unrated movies are not counted. When every rating is the same value a
/// single bucket holds them all.
pub fn rating_histogram(
    table: &MovieTable,
    bins: usize,
) -> Result<Vec<HistogramBin>, AggregateError> {
    if bins == 0 {
        return Err(AggregateError::ZeroBins);
    }
    let ratings: Vec<f64> = table
        .iter()
        .filter_map(|m| m.rating)
        .filter(|r| r.is_finite())
        .collect();
    if ratings.is_empty() {
        return Ok(Vec::new());
    }

    let min = ratings.iter().copied().fold(f64::INFINITY, f64::min);
    let max = ratings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range <= 0.0 {
        return Ok(vec![HistogramBin {
            lower: min,
            upper: max,
            count: ratings.len(),
        }]);
    }

    let width = range / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + i as f64 * width,
            upper: if i + 1 == bins {
                max
            } else {
                min + (i + 1) as f64 * width
            },
            count: 0,
        })
        .collect();
    for r in ratings {
        let idx = (((r - min) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    Ok(out)
}

/// For every genre, the movie with the highest rating (first one wins ties).
/// Genres with no rated movie are left out. Ordered by genre name.
pub fn top_rated_per_genre(table: &MovieTable) -> Vec<MovieRecord> {
    let mut best: BTreeMap<&str, (f64, &MovieRecord)> = BTreeMap::new();
    for movie in table.iter() {
        let Some(rating) = movie.rating.filter(|r| r.is_finite()) else {
            continue;
        };
        let improves = best
            .get(movie.genre.as_str())
            .map_or(true, |(current, _)| rating > *current);
        if improves {
            best.insert(movie.genre.as_str(), (rating, movie));
        }
    }
    best.into_values().map(|(_, movie)| movie.clone()).collect()
}

/// Sum of votes per genre, ordered by genre name. Totals saturate at
/// `u64::MAX`.
pub fn total_votes_by_genre(table: &MovieTable) -> Vec<GenreTotal> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for movie in table.iter() {
        let total = totals.entry(movie.genre.as_str()).or_default();
        *total = total.saturating_add(movie.votes);
    }
    totals
        .into_iter()
        .map(|(genre, votes)| GenreTotal {
            genre: genre.to_string(),
            votes,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Summary bundle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    pub top_n: usize,
    pub histogram_bins: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        SummaryOptions {
            top_n: 10,
            histogram_bins: 10,
        }
    }
}

/// Every named view derived from one (filtered) table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summaries {
    pub top_movies: Vec<MovieRecord>,
    pub genre_counts: Vec<GenreCount>,
    pub mean_duration: Vec<GenreMean>,
    pub mean_votes: Vec<GenreMean>,
    pub rating_histogram: Vec<HistogramBin>,
    pub top_rated_per_genre: Vec<MovieRecord>,
    pub total_votes: Vec<GenreTotal>,
}

pub fn summarize(
    table: &MovieTable,
    options: &SummaryOptions,
) -> Result<Summaries, AggregateError> {
    Ok(Summaries {
        top_movies: top_by_rating_then_votes(table, options.top_n),
        genre_counts: count_by_genre(table),
        mean_duration: mean_duration_by_genre(table),
        mean_votes: mean_votes_by_genre(table),
        rating_histogram: rating_histogram(table, options.histogram_bins)?,
        top_rated_per_genre: top_rated_per_genre(table),
        total_votes: total_votes_by_genre(table),
    })
}
