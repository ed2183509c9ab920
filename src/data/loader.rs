use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
    StringViewArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::{debug, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::merge::{CategorySource, SourceKey};
use super::model::{RawRecord, RawTable};

pub const TITLE: &str = "Title";
pub const GENRE: &str = "Genre";
pub const RATING: &str = "Rating";
pub const VOTES: &str = "Votes";
pub const DURATION: &str = "Duration";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one movie export.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with Title, Rating, Votes, Duration and optional Genre
/// * `.json`    – `[{ "Title": ..., "Rating": ..., "Votes": ..., ... }, ...]`
/// * `.parquet` – the same columns as Utf8 / integer / float arrays
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;
    debug!("loaded {} row(s) from {}", table.len(), path.display());
    Ok(table)
}

/// Load every declared source. A source that cannot be read becomes an
/// unavailable entry instead of aborting the whole load.
pub fn load_sources(keys: &[SourceKey]) -> Vec<CategorySource> {
    keys.iter()
        .map(|key| {
            let path = Path::new(&key.location);
            if !path.exists() {
                warn!("File not found: {}", path.display());
                return CategorySource::unavailable(
                    &key.label,
                    format!("file not found: {}", key.location),
                );
            }
            match load_file(path) {
                Ok(table) => CategorySource::loaded(&key.label, table),
                Err(e) => {
                    warn!("Could not load {}: {e:#}", path.display());
                    CategorySource::unavailable(&key.label, format!("{e:#}"))
                }
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one movie per row.
/// Empty cells are treated as missing values.
fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("CSV missing '{name}' column"))
    };
    let title_idx = column(TITLE)?;
    let rating_idx = column(RATING)?;
    let votes_idx = column(VOTES)?;
    let duration_idx = column(DURATION)?;
    let genre_idx = headers.iter().position(|h| h == GENRE);

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize| record.get(idx).map(str::trim).filter(|s| !s.is_empty());

        records.push(RawRecord {
            title: cell(title_idx).unwrap_or_default().to_string(),
            genre: genre_idx.and_then(cell).map(str::to_string),
            rating: cell(rating_idx).and_then(parse_rating),
            votes: cell(votes_idx).unwrap_or_default().to_string(),
            duration: cell(duration_idx).map(str::to_string),
        });
    }

    Ok(RawTable::new(genre_idx.is_some(), records))
}

fn parse_rating(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|r| r.is_finite())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Title": "Dune: Part Two", "Rating": 8.5, "Votes": "(620K)", "Duration": "2h 46m" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut has_genre_column = false;
    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        has_genre_column |= obj.contains_key(GENRE);

        records.push(RawRecord {
            title: json_text(obj.get(TITLE)).unwrap_or_default(),
            genre: json_text(obj.get(GENRE)).filter(|g| !g.is_empty()),
            rating: obj.get(RATING).and_then(json_rating),
            votes: json_text(obj.get(VOTES)).unwrap_or_default(),
            duration: json_text(obj.get(DURATION)).filter(|d| !d.is_empty()),
        });
    }

    Ok(RawTable::new(has_genre_column, records))
}

/// Strings as-is, numbers stringified, null/absent as `None`.
fn json_text(val: Option<&JsonValue>) -> Option<String> {
    match val? {
        JsonValue::String(s) => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    }
}

fn json_rating(val: &JsonValue) -> Option<f64> {
    match val {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => parse_rating(s.trim()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export.
///
/// Title, Votes and Duration may be string or numeric columns (numbers are
/// stringified and go through the usual text parsers). Rating may be any
/// numeric column or a string column.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let has_genre_column = builder.schema().index_of(GENRE).is_ok();
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let title_col = required_column(&batch, TITLE)?;
        let rating_col = required_column(&batch, RATING)?;
        let votes_col = required_column(&batch, VOTES)?;
        let duration_col = required_column(&batch, DURATION)?;
        let genre_col = batch.column_by_name(GENRE);

        for row in 0..batch.num_rows() {
            records.push(RawRecord {
                title: arrow_text(title_col, row).unwrap_or_default(),
                genre: genre_col
                    .and_then(|col| arrow_text(col, row))
                    .filter(|g| !g.is_empty()),
                rating: arrow_f64(rating_col, row),
                votes: arrow_text(votes_col, row).unwrap_or_default(),
                duration: arrow_text(duration_col, row).filter(|d| !d.is_empty()),
            });
        }
    }

    Ok(RawTable::new(has_genre_column, records))
}

// -- Arrow helpers --

fn required_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Arc<dyn Array>> {
    batch
        .column_by_name(name)
        .with_context(|| format!("Parquet file missing '{name}' column"))
}

/// Read a cell as text. Numeric columns are formatted, nulls are `None`.
fn arrow_text(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(row).trim().to_string()),
        DataType::LargeUtf8 => col
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .map(|a| a.value(row).trim().to_string()),
        DataType::Utf8View => col
            .as_any()
            .downcast_ref::<StringViewArray>()
            .map(|a| a.value(row).trim().to_string()),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row).to_string()),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row).to_string()),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row).to_string()),
        other => {
            debug!("unsupported text column type {other:?}");
            None
        }
    }
}

/// Read a cell as a float; non-finite or unsupported values are `None`.
fn arrow_f64(col: &Arc<dyn Array>, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    let value = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            arrow_text(col, row).and_then(|s| parse_rating(&s))
        }
        _ => None,
    }?;
    value.is_finite().then_some(value)
}
