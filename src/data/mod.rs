/// Data layer: record types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  local .csv / remote URL (cp1252, `;`)
///        │
///        ▼
///   ┌──────────────┐
///   │ source/loader │  fetch once → decode → EnrollmentTable (cached)
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  student / period / shift selection → Subset
///   └──────────┘
///        │
///        ▼
///   ┌────────────────────┐
///   │ metrics / series    │  per-shift and per-student summaries, chart series
///   └────────────────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ dashboard │  one render pass worth of results (or EmptySelection)
///   └───────────┘
/// ```

pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod series;
pub mod source;
