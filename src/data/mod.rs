/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read raw cells → clean → ProjectTable (cached)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ ProjectTable  │  Vec<ProjectRecord>, present columns, schema gaps
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  reconcile selections → row mask → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  counts, crosstabs, credits, vintage series
///   └───────────┘
/// ```

pub mod aggregate;
pub mod country;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
