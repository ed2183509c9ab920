use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

use movie_insights::config::{AppConfig, SourceEntry};

/// Write deterministic sample movie exports and a matching manifest
#[derive(Parser, Debug)]
struct Args {
    /// Output directory
    #[arg(long, default_value = "data")]
    out: PathBuf,

    /// Movies per genre export
    #[arg(long, default_value = "40")]
    per_genre: usize,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const ADJECTIVES: &[&str] = &[
    "Silent", "Last", "Hidden", "Broken", "Golden", "Lost", "Crimson", "Wild", "Midnight", "Little",
];
const NOUNS: &[&str] = &[
    "Kingdom", "Voyage", "House", "Garden", "Signal", "Forest", "Dragon", "Harbor", "Echo",
    "Lantern",
];
const GENRES: &[(&str, &str, f64)] = &[
    ("Adventure", "adventure_2024_raw.csv", 6.6),
    ("Animation", "animation_2024_raw.csv", 7.0),
    ("Family", "family_2024_raw.csv", 6.4),
    ("Fantasy", "fantasy_2024_raw.csv", 6.2),
    ("Horror", "horror_2024_raw.csv", 5.6),
];
const ALL_GENRES_FILE: &str = "all_genres_2024_raw.parquet";

struct SampleMovie {
    title: String,
    genre: String,
    rating: Option<f64>,
    votes: String,
    duration: String,
}

/// Vote counts in the styles seen in real exports: `"(12K)"`, `"1.4M"`, `"987"`.
fn vote_text(rng: &mut SimpleRng) -> String {
    let votes = (10f64.powf(2.0 + rng.next_f64() * 4.5)) as u64;
    match votes {
        v if v >= 1_000_000 => format!("({:.1}M)", v as f64 / 1e6),
        v if v >= 1_000 => format!("({:.1}K)", v as f64 / 1e3),
        v => format!("({v})"),
    }
}

fn duration_text(rng: &mut SimpleRng) -> String {
    let minutes = rng.range(70, 170);
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

fn generate(rng: &mut SimpleRng, genre: &str, base_rating: f64, n: usize) -> Vec<SampleMovie> {
    (0..n)
        .map(|i| {
            let rating = (base_rating + (rng.next_f64() - 0.5) * 4.0).clamp(1.0, 9.8);
            SampleMovie {
                title: format!("{} {} {}", rng.pick(ADJECTIVES), rng.pick(NOUNS), i + 1),
                genre: genre.to_string(),
                // A few unrated entries, as in the scraped listings.
                rating: (rng.next_u64() % 25 != 0).then(|| (rating * 10.0).round() / 10.0),
                votes: vote_text(rng),
                duration: duration_text(rng),
            }
        })
        .collect()
}

/// Per-genre export: no Genre column, the label comes from the manifest.
fn write_csv(path: &Path, movies: &[SampleMovie]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(["Title", "Rating", "Votes", "Duration"])?;
    for m in movies {
        let rating = m.rating.map(|r| r.to_string()).unwrap_or_default();
        writer.write_record([
            m.title.as_str(),
            rating.as_str(),
            m.votes.as_str(),
            m.duration.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Mixed-genre export carrying its own Genre column.
fn write_parquet(path: &Path, movies: &[SampleMovie]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Title", DataType::Utf8, false),
        Field::new("Genre", DataType::Utf8, false),
        Field::new("Rating", DataType::Float64, true),
        Field::new("Votes", DataType::Utf8, false),
        Field::new("Duration", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(movies.iter().map(|m| m.title.as_str()))),
            Arc::new(StringArray::from_iter_values(movies.iter().map(|m| m.genre.as_str()))),
            Arc::new(movies.iter().map(|m| m.rating).collect::<Float64Array>()),
            Arc::new(StringArray::from_iter_values(movies.iter().map(|m| m.votes.as_str()))),
            Arc::new(StringArray::from_iter_values(movies.iter().map(|m| m.duration.as_str()))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let mut rng = SimpleRng::new(42);
    let mut sources = Vec::new();
    let mut mixed = Vec::new();

    for &(genre, file, base_rating) in GENRES {
        let movies = generate(&mut rng, genre, base_rating, args.per_genre);
        write_csv(&args.out.join(file), &movies)?;
        println!("Wrote {} {genre} movie(s) to {file}", movies.len());
        sources.push(SourceEntry {
            label: genre.to_string(),
            path: PathBuf::from(file),
        });
        mixed.extend(movies.into_iter().take(args.per_genre / 4));
    }

    write_parquet(&args.out.join(ALL_GENRES_FILE), &mixed)?;
    println!("Wrote {} mixed-genre movie(s) to {ALL_GENRES_FILE}", mixed.len());
    sources.push(SourceEntry {
        label: "All Genres".to_string(),
        path: PathBuf::from(ALL_GENRES_FILE),
    });

    let config = AppConfig {
        sources,
        ..AppConfig::default()
    };
    let manifest = args.out.join(movie_insights::config::DEFAULT_CONFIG_FILE);
    std::fs::write(&manifest, config.to_toml_string()?)
        .with_context(|| format!("writing {}", manifest.display()))?;
    println!("Wrote manifest {}", manifest.display());
    Ok(())
}
