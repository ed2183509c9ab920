/// Data layer: core types, parsing, merging, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet  (one export per genre)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  merge    │  label genres, parse votes/duration → MovieTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  genre / rating / votes / duration predicates → MovieTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  top-N, per-genre counts / means / sums, histogram
///   └───────────┘
/// ```
///
/// Only `loader` touches the file system; everything below it is a pure
/// function of in-memory tables.

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod merge;
pub mod model;
pub mod parse;
