/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ComplaintDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ ComplaintDataset │  Vec<Complaint>, column domains
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  AND of all selections → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  metrics, grouped counts, histogram
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
