use std::collections::BTreeMap;
use std::fmt;

use super::error::SchemaError;

/// Barycentric Julian Date of each observation.
pub const TIMESTAMP_COLUMN: &str = "BJD_TDB";
/// Calibrated source magnitude.
pub const MAGNITUDE_COLUMN: &str = "Source_AMag_T1";
/// One-sigma uncertainty of [`MAGNITUDE_COLUMN`].
pub const UNCERTAINTY_COLUMN: &str = "Source_AMag_Err_T1";
/// Derived column written by the phase normalizer.
pub const PHASE_COLUMN: &str = "BJD_normalized";

// ---------------------------------------------------------------------------
// CellValue – a single cell of an observation table
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell, as read from a CSV, TBL or spreadsheet file.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Missing,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Shortest round-trip form: Julian dates need every digit.
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            CellValue::Missing => Ok(()),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64`. Text, booleans and missing cells yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Missing cells and float NaN both count as "no value".
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Missing => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Column / ObservationTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

/// Column-oriented observation table. Every column has the same number of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    columns: Vec<Column>,
    rows: usize,
}

impl ObservationTable {
    /// Build a table from a header and row-major cells.
    ///
    /// Short rows are padded with [`CellValue::Missing`]; extra cells are dropped
    /// (the loaders reject over-long rows before they get here).
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let n_rows = rows.len();
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column {
                name,
                values: Vec::with_capacity(n_rows),
            })
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for col in &mut columns {
                col.values.push(cells.next().unwrap_or(CellValue::Missing));
            }
        }

        ObservationTable {
            columns,
            rows: n_rows,
        }
    }

    /// Build a table from whole columns. All columns must have equal length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, SchemaError> {
        let rows = columns.first().map(|c| c.values.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.values.len() != rows) {
            return Err(SchemaError::LengthMismatch {
                column: bad.name.clone(),
                expected: rows,
                found: bad.values.len(),
            });
        }
        Ok(ObservationTable { columns, rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Like [`column`](Self::column) but turns absence into a typed error.
    pub fn require_column(&self, name: &str) -> Result<&[CellValue], SchemaError> {
        self.column(name).ok_or_else(|| SchemaError::MissingColumn {
            column: name.to_string(),
        })
    }

    /// Insert a column, replacing any existing column with the same name in place.
    pub fn set_column(&mut self, name: &str, values: Vec<CellValue>) -> Result<(), SchemaError> {
        if !self.columns.is_empty() && values.len() != self.rows {
            return Err(SchemaError::LengthMismatch {
                column: name.to_string(),
                expected: self.rows,
                found: values.len(),
            });
        }
        if self.columns.is_empty() {
            self.rows = values.len();
        }
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(col) => col.values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
        Ok(())
    }

    /// Rename every column listed in `mapping` (old name → new name).
    pub fn rename_columns(&mut self, mapping: &[(&str, &str)]) {
        for col in &mut self.columns {
            if let Some((_, new)) = mapping.iter().find(|(old, _)| *old == col.name) {
                col.name = new.to_string();
            }
        }
    }

    /// Keep only the rows for which `keep(row_index)` returns true.
    pub fn retain_rows<F>(&mut self, keep: F)
    where
        F: Fn(usize) -> bool,
    {
        let kept: Vec<usize> = (0..self.rows).filter(|&i| keep(i)).collect();
        for col in &mut self.columns {
            let old = std::mem::take(&mut col.values);
            col.values = kept.iter().map(|&i| old[i].clone()).collect();
        }
        self.rows = kept.len();
    }

    /// Whether any cell of row `index` is missing.
    pub fn row_has_missing(&self, index: usize) -> bool {
        self.columns.iter().any(|c| c.values[index].is_missing())
    }

    /// Column name → ordered value list, for ad-hoc access by callers.
    pub fn column_lists(&self) -> BTreeMap<String, Vec<CellValue>> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.values.clone()))
            .collect()
    }
}
