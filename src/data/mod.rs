/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///  .dat / .txt / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Spectrum / TimeSeries
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  Spectrum, Signal, TimeSeries, SpectrumError
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
