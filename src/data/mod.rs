//! Data layer: core types, loading, normalization, filtering, aggregation
//! and export.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → RawTable → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ normalize │  lower/trim months, title-case categoricals
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  city → year → month equality → FilteredView
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate │  category totals, payment counts, monthly revenue, KPIs
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  CSV bytes for each table
//!   └──────────┘
//! ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;

use thiserror::Error;

/// Schema problems found while turning a raw table into a [`model::Dataset`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    #[error("missing required column '{column}' (available: {})", .available.join(", "))]
    MissingColumn {
        column: &'static str,
        available: Vec<String>,
    },
    #[error("row {row}: column '{column}' has non-numeric value '{value}'")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
}
