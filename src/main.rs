use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::info;

use movie_insights::config::AppConfig;
use movie_insights::data::filter::{DurationBucket, FilterSpec};
use movie_insights::data::loader::load_sources;
use movie_insights::report::Report;
use movie_insights::{merge, DashboardState, SummaryOptions};

/// Movie Insights - merge per-genre movie exports, filter them and summarise
#[derive(Parser, Debug)]
#[command(name = "movie-insights", version, about)]
struct Cli {
    /// Source manifest (defaults to ./movie-insights.toml, then built-in sources)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only show these genres (repeatable)
    #[arg(short, long = "genre", value_name = "GENRE")]
    genres: Vec<String>,

    /// Minimum rating; 0 means no restriction
    #[arg(long)]
    min_rating: Option<f64>,

    /// Minimum number of votes; 0 means no restriction
    #[arg(long)]
    min_votes: Option<u64>,

    /// Runtime bucket: all, under90, 90to120 or over120
    #[arg(long)]
    duration: Option<DurationBucket>,

    /// Rows in the top-movies view
    #[arg(long)]
    top: Option<usize>,

    /// Buckets in the rating histogram
    #[arg(long)]
    bins: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Manifest filters with command-line overrides applied.
    fn filter_spec(&self, base: &FilterSpec) -> FilterSpec {
        let mut spec = base.clone();
        if !self.genres.is_empty() {
            spec = spec.with_genres(self.genres.iter().cloned());
        }
        if let Some(rating) = self.min_rating {
            spec = spec.with_min_rating(rating);
        }
        if let Some(votes) = self.min_votes {
            spec = spec.with_min_votes(votes);
        }
        if let Some(bucket) = self.duration {
            spec = spec.with_duration(bucket);
        }
        spec
    }

    fn summary_options(&self, config: &AppConfig) -> SummaryOptions {
        let mut options = SummaryOptions::from(config.report);
        if let Some(top) = self.top {
            options.top_n = top;
        }
        if let Some(bins) = self.bins {
            options.histogram_bins = bins;
        }
        options
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    info!("Movie Insights v{} starting", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    let keys = config.source_keys();

    let dataset = merge(load_sources(&keys))?;

    let mut state = DashboardState::new(Arc::new(dataset));
    state.set_filter(cli.filter_spec(&config.filters))?;
    info!(
        "{} of {} movie(s) pass the current filter",
        state.visible().len(),
        state.dataset().len()
    );

    let summaries = state.summaries(&cli.summary_options(&config))?;
    let report = Report::new(state.warnings(), state.visible(), &summaries);
    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.to_text()?);
    }
    Ok(())
}
