//! Text and JSON rendering of the filtered listing and its summary views.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use serde::Serialize;

use crate::data::aggregate::{GenreMean, Summaries};
use crate::data::model::{MovieRecord, MovieTable};

/// Everything the CLI prints for one run.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub warnings: Vec<(String, String)>,
    pub movies: &'a [MovieRecord],
    pub summaries: &'a Summaries,
}

impl<'a> Report<'a> {
    pub fn new(
        warnings: Vec<(String, String)>,
        movies: &'a MovieTable,
        summaries: &'a Summaries,
    ) -> Self {
        Report {
            warnings,
            movies: &movies.records,
            summaries,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialising report")
    }

    pub fn to_text(&self) -> Result<String> {
        let s = self.summaries;
        let mut out = String::new();

        for (label, reason) in &self.warnings {
            writeln!(out, "warning: source '{label}' unavailable: {reason}")?;
        }

        section(&mut out, "Filtered Movies", movies_batch(self.movies, true)?)?;
        section(
            &mut out,
            "Top Movies by Rating & Votes",
            movies_batch(&s.top_movies, false)?,
        )?;

        let genre_counts = batch(vec![
            ("Genre", strings(s.genre_counts.iter().map(|c| c.genre.as_str()))),
            ("Count", counts(s.genre_counts.iter().map(|c| c.count as u64))),
        ])?;
        section(&mut out, "Genre Distribution", genre_counts)?;

        section(
            &mut out,
            "Average Duration by Genre (mins)",
            means_batch(&s.mean_duration, "Average Duration")?,
        )?;
        section(
            &mut out,
            "Average Votes by Genre",
            means_batch(&s.mean_votes, "Average Votes")?,
        )?;

        let histogram = batch(vec![
            (
                "Rating Range",
                strings(
                    s.rating_histogram
                        .iter()
                        .map(|b| format!("{:.2} - {:.2}", b.lower, b.upper)),
                ),
            ),
            ("Movies", counts(s.rating_histogram.iter().map(|b| b.count as u64))),
        ])?;
        section(&mut out, "Rating Distribution", histogram)?;

        if s.top_rated_per_genre.is_empty() {
            writeln!(out, "\nNo data to display top-rated movies.")?;
        } else {
            let best = batch(vec![
                ("Genre", strings(s.top_rated_per_genre.iter().map(|m| m.genre.as_str()))),
                ("Title", strings(s.top_rated_per_genre.iter().map(|m| m.title.as_str()))),
                ("Rating", ratings(&s.top_rated_per_genre)),
            ])?;
            section(&mut out, "Top-Rated Movies by Genre", best)?;
        }

        if !s.total_votes.is_empty() {
            let totals = batch(vec![
                ("Genre", strings(s.total_votes.iter().map(|t| t.genre.as_str()))),
                ("Votes", counts(s.total_votes.iter().map(|t| t.votes))),
            ])?;
            section(&mut out, "Total Votes per Genre", totals)?;
        }

        Ok(out)
    }
}

fn section(out: &mut String, title: &str, batch: RecordBatch) -> Result<()> {
    let table = pretty_format_batches(&[batch]).context("formatting table")?;
    writeln!(out, "\n{title}\n{table}")?;
    Ok(())
}

fn batch(columns: Vec<(&str, ArrayRef)>) -> Result<RecordBatch> {
    RecordBatch::try_from_iter(columns).context("building summary table")
}

fn strings<I, S>(values: I) -> ArrayRef
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let values: Vec<S> = values.into_iter().collect();
    Arc::new(StringArray::from_iter_values(values.iter().map(|v| v.as_ref())))
}

fn counts(values: impl IntoIterator<Item = u64>) -> ArrayRef {
    Arc::new(UInt64Array::from_iter_values(values))
}

fn ratings(movies: &[MovieRecord]) -> ArrayRef {
    Arc::new(movies.iter().map(|m| m.rating).collect::<Float64Array>())
}

fn movies_batch(movies: &[MovieRecord], with_duration: bool) -> Result<RecordBatch> {
    let mut columns = vec![
        ("Title", strings(movies.iter().map(|m| m.title.as_str()))),
        ("Genre", strings(movies.iter().map(|m| m.genre.as_str()))),
        ("Rating", ratings(movies)),
        ("Votes", counts(movies.iter().map(|m| m.votes))),
    ];
    if with_duration {
        columns.push((
            "Duration",
            strings(movies.iter().map(|m| m.duration.as_deref().unwrap_or(""))),
        ));
    }
    batch(columns)
}

fn means_batch(means: &[GenreMean], label: &str) -> Result<RecordBatch> {
    batch(vec![
        ("Genre", strings(means.iter().map(|g| g.genre.as_str()))),
        (
            label,
            Arc::new(Float64Array::from_iter_values(means.iter().map(|g| g.mean))) as ArrayRef,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::{SummaryOptions, summarize};

    fn table() -> MovieTable {
        MovieTable::from_records(vec![MovieRecord {
            title: "Inside Out 2".to_string(),
            genre: "Animation".to_string(),
            rating: Some(7.6),
            votes: 151_000,
            duration: Some("1h 36m".to_string()),
            duration_min: 96,
        }])
    }

    #[test]
    fn text_report_lists_every_view() {
        let table = table();
        let summaries = summarize(&table, &SummaryOptions::default()).unwrap();
        let warnings = vec![("Horror".into(), "file not found".into())];
        let report = Report::new(warnings, &table, &summaries);
        let text = report.to_text().unwrap();
        for heading in [
            "warning: source 'Horror' unavailable",
            "Filtered Movies",
            "Top Movies by Rating & Votes",
            "Genre Distribution",
            "Average Duration by Genre (mins)",
            "Average Votes by Genre",
            "Rating Distribution",
            "Top-Rated Movies by Genre",
            "Total Votes per Genre",
            "Inside Out 2",
        ] {
            assert!(text.contains(heading), "missing {heading}");
        }
    }

    #[test]
    fn empty_table_still_renders() {
        let table = MovieTable::default();
        let summaries = summarize(&table, &SummaryOptions::default()).unwrap();
        let text = Report::new(Vec::new(), &table, &summaries).to_text().unwrap();
        assert!(text.contains("No data to display top-rated movies."));
        assert!(!text.contains("Total Votes per Genre"));
    }

    #[test]
    fn json_report_is_structured() {
        let table = table();
        let summaries = summarize(&table, &SummaryOptions::default()).unwrap();
        let json = Report::new(Vec::new(), &table, &summaries).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["movies"][0]["duration_min"], 96);
        assert_eq!(value["summaries"]["genre_counts"][0]["count"], 1);
        assert_eq!(value["summaries"]["total_votes"][0]["votes"], 151_000);
    }
}
