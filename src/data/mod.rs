/// Data layer: table model, loading and cleaning.
///
/// Architecture:
/// ```text
///  .csv / .tbl / .xlsx / .xls
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  dispatch by extension → ObservationTable
///   └──────────┘
///        │  (clean = true)
///        ▼
///   ┌──────────┐
///   │  clean    │  drop rows with missing cells
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ ObservationTable  │  named columns of CellValue
///   └──────────────────┘
/// ```

pub mod clean;
pub mod error;
pub mod loader;
pub mod model;

pub use error::{LoadError, SchemaError};
pub use model::{CellValue, Column, ObservationTable};
