/// Data layer: core types, loading, and descriptive statistics.
///
/// Architecture:
/// ```text
///  <name>.tsv.gz          summary_stats.csv
///        │                       │
///        ▼                       ▼
///   ┌──────────┐          ┌──────────────┐
///   │  loader   │          │    loader     │
///   └──────────┘          └──────────────┘
///        │                       │
///        ▼                       ▼
///   ┌──────────┐          ┌──────────────┐
///   │ DataTable │          │ SummaryStats  │
///   └──────────┘          └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  describe, pearson, row sampling
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod stats;
