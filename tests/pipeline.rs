use std::sync::Arc;

use tempfile::TempDir;

use movie_insights::config::AppConfig;
use movie_insights::data::aggregate::{
    count_by_genre, top_by_rating_then_votes, total_votes_by_genre, GenreCount,
};
use movie_insights::data::filter::apply;
use movie_insights::data::loader::load_sources;
use movie_insights::{
    merge, CategorySource, DashboardState, DatasetError, FilterSpec, MergeCache, RawRecord,
    RawTable, SummaryOptions,
};

fn raw(title: &str, genre: Option<&str>, rating: f64, votes: &str, duration: &str) -> RawRecord {
    RawRecord {
        title: title.to_string(),
        genre: genre.map(str::to_string),
        rating: Some(rating),
        votes: votes.to_string(),
        duration: Some(duration.to_string()),
    }
}

#[test]
fn two_source_scenario() {
    let report = merge(vec![
        CategorySource::loaded(
            "A",
            RawTable::new(false, vec![raw("X", None, 8.0, "1.5K", "1h 30m")]),
        ),
        CategorySource::loaded(
            "B",
            RawTable::new(true, vec![raw("Y", Some("B"), 9.0, "2M", "95m")]),
        ),
    ])
    .unwrap();

    let table = &report.table;
    assert_eq!(table.len(), 2);
    let votes: Vec<u64> = table.iter().map(|m| m.votes).collect();
    let minutes: Vec<u64> = table.iter().map(|m| m.duration_min).collect();
    assert_eq!(votes, vec![1_500, 2_000_000]);
    assert_eq!(minutes, vec![90, 95]);

    let filtered = apply(table, &FilterSpec::new().with_min_rating(8.5)).unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.records[0].title, "Y");

    assert_eq!(
        count_by_genre(table),
        vec![
            GenreCount { genre: "A".into(), count: 1 },
            GenreCount { genre: "B".into(), count: 1 },
        ]
    );
}

#[test]
fn oversized_vote_text_does_not_break_totals() {
    let report = merge(vec![CategorySource::loaded(
        "Horror",
        RawTable::new(
            false,
            vec![
                raw("Too Many", None, 6.0, "1e20K", "90m"),
                raw("Modest", None, 7.0, "5", "95m"),
            ],
        ),
    )])
    .unwrap();
    let votes: Vec<u64> = report.table.iter().map(|m| m.votes).collect();
    assert_eq!(votes, vec![0, 5]);

    let totals = total_votes_by_genre(&report.table);
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].votes, 5);
}

#[test]
fn merging_nothing_is_an_explicit_failure() {
    let err = merge(Vec::<CategorySource>::new()).unwrap_err();
    assert_eq!(err, DatasetError::EmptyDataset { declared: 0 });
}

#[test]
fn top_n_is_sorted_prefix() {
    let report = merge(vec![CategorySource::loaded(
        "Fantasy",
        RawTable::new(
            false,
            vec![
                raw("a", None, 7.0, "100", "90m"),
                raw("b", None, 9.0, "10", "90m"),
                raw("c", None, 7.0, "500", "90m"),
            ],
        ),
    )])
    .unwrap();
    let all = top_by_rating_then_votes(&report.table, 10);
    let titles: Vec<&str> = all.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["b", "c", "a"]);
    assert_eq!(top_by_rating_then_votes(&report.table, 2), all[..2].to_vec());
}

#[test]
fn manifest_to_summaries_with_a_missing_source() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("horror.csv"),
        "Title,Rating,Votes,Duration\n\
         Night Shift,6.1,(4.2K),1h 28m\n\
         The Well,7.4,(31K),1h 52m\n\
         Static,5.0,garbage,\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("all.json"),
        r#"[
            {"Title":"Skyward","Genre":"Adventure","Rating":8.3,
             "Votes":"1.1M","Duration":"2h 21m"},
            {"Title":"Paper Moon","Genre":"Family","Rating":7.4,
             "Votes":"(880)","Duration":"95m"}
        ]"#,
    )
    .unwrap();
    let manifest = dir.path().join("movie-insights.toml");
    std::fs::write(
        &manifest,
        r#"
        [[sources]]
        label = "Horror"
        path = "horror.csv"

        [[sources]]
        label = "Fantasy"
        path = "fantasy.csv"

        [[sources]]
        label = "All Genres"
        path = "all.json"

        [report]
        top_n = 3
        histogram_bins = 4
        "#,
    )
    .unwrap();

    let config = AppConfig::load(&manifest).unwrap();
    let mut cache = MergeCache::new();
    let dataset = cache
        .get_or_merge(&config.source_keys(), false, load_sources)
        .unwrap();
    assert_eq!(dataset.table.len(), 5);
    assert_eq!(dataset.loaded_labels().collect::<Vec<_>>(), vec!["Horror", "All Genres"]);

    let static_row = dataset.table.iter().find(|m| m.title == "Static").unwrap();
    assert_eq!((static_row.votes, static_row.duration_min), (0, 0));

    let again = cache
        .get_or_merge(&config.source_keys(), false, |_| panic!("cache should be used"))
        .unwrap();
    assert!(Arc::ptr_eq(&dataset, &again));

    let mut state = DashboardState::new(dataset);
    assert_eq!(state.warnings().len(), 1);
    assert_eq!(state.warnings()[0].0, "Fantasy");

    state.set_min_rating(7.0).unwrap();
    let options = SummaryOptions::from(config.report);
    let summaries = state.summaries(&options).unwrap();

    let top: Vec<&str> = summaries.top_movies.iter().map(|m| m.title.as_str()).collect();
    // The Well and Paper Moon tie on rating; more votes wins.
    assert_eq!(top, vec!["Skyward", "The Well", "Paper Moon"]);
    assert_eq!(summaries.rating_histogram.len(), 4);
    assert_eq!(
        summaries.rating_histogram.iter().map(|b| b.count).sum::<usize>(),
        3
    );
    assert_eq!(
        summaries.genre_counts.iter().map(|c| c.count).sum::<usize>(),
        state.visible().len()
    );
    let best: Vec<(&str, &str)> = summaries
        .top_rated_per_genre
        .iter()
        .map(|m| (m.genre.as_str(), m.title.as_str()))
        .collect();
    assert_eq!(
        best,
        vec![("Adventure", "Skyward"), ("Family", "Paper Moon"), ("Horror", "The Well")]
    );
}
