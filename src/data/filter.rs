use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::model::{MovieRecord, MovieTable};
use crate::errors::FilterError;

// ---------------------------------------------------------------------------
// Duration buckets
// ---------------------------------------------------------------------------

/// Runtime ranges offered by the duration picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DurationBucket {
    #[default]
    #[serde(rename = "all")]
    All,
    /// Strictly under 90 minutes.
    #[serde(rename = "under90")]
    Under90,
    /// 90 to 120 minutes, both ends included.
    #[serde(rename = "90to120")]
    From90To120,
    /// Strictly over 120 minutes.
    #[serde(rename = "over120")]
    Over120,
}

impl DurationBucket {
    pub fn contains(self, minutes: u64) -> bool {
        match self {
            DurationBucket::All => true,
            DurationBucket::Under90 => minutes < 90,
            DurationBucket::From90To120 => (90..=120).contains(&minutes),
            DurationBucket::Over120 => minutes > 120,
        }
    }
}

impl fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DurationBucket::All => "all",
            DurationBucket::Under90 => "under90",
            DurationBucket::From90To120 => "90to120",
            DurationBucket::Over120 => "over120",
        };
        f.write_str(s)
    }
}

impl FromStr for DurationBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(DurationBucket::All),
            "under90" | "<90" => Ok(DurationBucket::Under90),
            "90to120" | "90-120" => Ok(DurationBucket::From90To120),
            "over120" | ">120" => Ok(DurationBucket::Over120),
            other => Err(format!(
                "unknown duration bucket '{other}' (expected all, under90, 90to120 or over120)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter specification
// ---------------------------------------------------------------------------

/// The predicates applied together (logical AND) to produce a filtered view.
///
/// Each predicate can be inactive:
/// * an empty `genres` set shows every genre,
/// * a `min_rating` / `min_votes` of `None` or zero is no restriction,
/// * [`DurationBucket::All`] accepts every runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub genres: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_votes: Option<u64>,
    pub duration: DurationBucket,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn with_min_votes(mut self, votes: u64) -> Self {
        self.min_votes = Some(votes);
        self
    }

    pub fn with_duration(mut self, bucket: DurationBucket) -> Self {
        self.duration = bucket;
        self
    }

    /// Reject thresholds that cannot be compared against ratings.
    pub fn validate(&self) -> Result<(), FilterError> {
        if let Some(rating) = self.min_rating {
            if !rating.is_finite() {
                return Err(FilterError::InvalidFilterSpec {
                    reason: format!("minimum rating must be a finite number, got {rating}"),
                });
            }
            if rating < 0.0 {
                return Err(FilterError::InvalidFilterSpec {
                    reason: format!("minimum rating must not be negative, got {rating}"),
                });
            }
        }
        Ok(())
    }

    /// Rating threshold in effect; zero counts as unset.
    pub fn active_min_rating(&self) -> Option<f64> {
        self.min_rating.filter(|r| *r > 0.0)
    }

    /// Votes threshold in effect; zero counts as unset.
    pub fn active_min_votes(&self) -> Option<u64> {
        self.min_votes.filter(|v| *v > 0)
    }

    /// Whether a single movie passes every active predicate.
    pub fn matches(&self, movie: &MovieRecord) -> bool {
        if !self.genres.is_empty() && !self.genres.contains(&movie.genre) {
            return false;
        }
        if let Some(threshold) = self.active_min_rating() {
            // A missing rating never meets a threshold.
            match movie.rating {
                Some(rating) if rating >= threshold => {}
                _ => return false,
            }
        }
        if let Some(threshold) = self.active_min_votes() {
            if movie.votes < threshold {
                return false;
            }
        }
        self.duration.contains(movie.duration_min)
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Return indices of movies that pass all active filters, in table order.
pub fn filtered_indices(table: &MovieTable, spec: &FilterSpec) -> Result<Vec<usize>, FilterError> {
    spec.validate()?;
    Ok(table
        .records
        .iter()
        .enumerate()
        .filter(|(_, movie)| spec.matches(movie))
        .map(|(i, _)| i)
        .collect())
}

/// Produce a new table holding the movies that pass all active filters.
pub fn apply(table: &MovieTable, spec: &FilterSpec) -> Result<MovieTable, FilterError> {
    let records = filtered_indices(table, spec)?
        .into_iter()
        .map(|i| table.records[i].clone())
        .collect();
    Ok(MovieTable::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(
        title: &str,
        genre: &str,
        rating: Option<f64>,
        votes: u64,
        minutes: u64,
    ) -> MovieRecord {
        MovieRecord {
            title: title.to_string(),
            genre: genre.to_string(),
            rating,
            votes,
            duration: None,
            duration_min: minutes,
        }
    }

    fn sample() -> MovieTable {
        MovieTable::from_records(vec![
            movie("short", "Animation", Some(6.5), 900, 85),
            movie("edge90", "Family", Some(7.0), 5_000, 90),
            movie("edge120", "Family", Some(8.1), 12_000, 120),
            movie("long", "Fantasy", Some(8.8), 250_000, 150),
            movie("unrated", "Horror", None, 0, 0),
        ])
    }

    fn titles(table: &MovieTable) -> Vec<&str> {
        table.iter().map(|m| m.title.as_str()).collect()
    }

    #[test]
    fn default_spec_keeps_everything() {
        let table = sample();
        let out = apply(&table, &FilterSpec::default()).unwrap();
        assert_eq!(out, table);
    }

    #[test]
    fn genre_membership() {
        let spec = FilterSpec::new().with_genres(["Family", "Horror"]);
        let out = apply(&sample(), &spec).unwrap();
        assert_eq!(titles(&out), vec!["edge90", "edge120", "unrated"]);
    }

    #[test]
    fn zero_thresholds_are_no_restriction() {
        let spec = FilterSpec::new().with_min_rating(0.0).with_min_votes(0);
        assert_eq!(apply(&sample(), &spec).unwrap().len(), 5);
    }

    #[test]
    fn rating_threshold_is_inclusive_and_drops_unrated() {
        let spec = FilterSpec::new().with_min_rating(8.1);
        let out = apply(&sample(), &spec).unwrap();
        assert_eq!(titles(&out), vec!["edge120", "long"]);
    }

    #[test]
    fn votes_threshold() {
        let spec = FilterSpec::new().with_min_votes(5_000);
        let out = apply(&sample(), &spec).unwrap();
        assert_eq!(titles(&out), vec!["edge90", "edge120", "long"]);
    }

    #[test]
    fn duration_buckets_respect_edges() {
        let table = sample();
        let pick = |bucket| {
            let spec = FilterSpec::new().with_duration(bucket);
            titles(&apply(&table, &spec).unwrap())
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(pick(DurationBucket::Under90), vec!["short", "unrated"]);
        assert_eq!(pick(DurationBucket::From90To120), vec!["edge90", "edge120"]);
        assert_eq!(pick(DurationBucket::Over120), vec!["long"]);
    }

    #[test]
    fn adding_predicates_never_grows_the_result() {
        let table = sample();
        let base = FilterSpec::new().with_genres(["Family", "Fantasy"]);
        let narrower = base.clone().with_min_rating(8.0);
        let narrowest = narrower.clone().with_duration(DurationBucket::Over120);
        let sizes: Vec<usize> = [base, narrower, narrowest]
            .iter()
            .map(|s| apply(&table, s).unwrap().len())
            .collect();
        assert_eq!(sizes, vec![3, 2, 1]);
    }

    #[test]
    fn negative_or_nan_rating_is_rejected() {
        let table = sample();
        assert!(matches!(
            apply(&table, &FilterSpec::new().with_min_rating(-1.0)),
            Err(FilterError::InvalidFilterSpec { .. })
        ));
        assert!(matches!(
            apply(&table, &FilterSpec::new().with_min_rating(f64::NAN)),
            Err(FilterError::InvalidFilterSpec { .. })
        ));
    }

    #[test]
    fn bucket_parses_from_text() {
        assert_eq!("90to120".parse::<DurationBucket>(), Ok(DurationBucket::From90To120));
        assert_eq!(">120".parse::<DurationBucket>(), Ok(DurationBucket::Over120));
        assert!("forever".parse::<DurationBucket>().is_err());
    }
}
