/// Data layer: core types, loading, filtering, and derived metrics.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → MatchTable (wide: match × team)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  team projection + match-range window → MatchTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  metrics  │  pure transforms → tidy views, leaderboard, transfer table
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
pub mod metrics;
