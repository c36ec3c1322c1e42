/// Data layer: raw-table types, loading, extraction, and reconciliation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ extract   │  walk section headers → MeasurementDict
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ reconcile │  pair alone/combined entries → Vec<Experiment>
///   └──────────┘
/// ```
pub mod extract;
pub mod loader;
pub mod model;
pub mod reconcile;
