use thiserror::Error;

use crate::data::model::{CellValue, ObservationTable, PHASE_COLUMN, TIMESTAMP_COLUMN};
use crate::data::SchemaError;

/// How the folded timestamp is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseMode {
    /// Fraction of a cycle, in `[0, 1)`.
    #[default]
    Fraction,
    /// Time since the start of the cycle, in `[0, period)`.
    Period,
}

impl PhaseMode {
    /// `div = true` divides the remainder by the period.
    pub fn from_div(div: bool) -> Self {
        if div {
            PhaseMode::Fraction
        } else {
            PhaseMode::Period
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhaseError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("'{label}' has no rows to fold")]
    EmptyTable { label: String },

    #[error("'{label}' row {row}: timestamp '{value}' is not a number")]
    Arithmetic {
        label: String,
        row: usize,
        value: String,
    },
}

impl PhaseError {
    /// Schema errors stop the call outright; the others are per-table data problems.
    pub fn is_schema(&self) -> bool {
        matches!(self, PhaseError::Schema(_))
    }
}

/// First and last value of the derived phase column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSpan {
    pub first: Option<f64>,
    pub last: Option<f64>,
}

/// Floor modulo: the result takes the sign of `period`.
fn floor_mod(value: f64, period: f64) -> f64 {
    let r = value % period;
    if r != 0.0 && (r < 0.0) != (period < 0.0) {
        r + period
    } else {
        r
    }
}

/// Fold one timestamp onto the cycle.
///
/// Rounding can push a value a hair below zero up to exactly one full cycle;
/// that lands back on 0.0 so the result stays half-open.
pub fn fold(timestamp: f64, period: f64, mode: PhaseMode) -> f64 {
    let remainder = floor_mod(timestamp, period);
    let (phase, cycle) = match mode {
        PhaseMode::Fraction => (remainder / period, 1.0),
        PhaseMode::Period => (remainder, period),
    };
    if phase == cycle {
        0.0
    } else {
        phase
    }
}

/// Append (or overwrite) the `BJD_normalized` column of `table`.
///
/// Missing timestamps give missing phases. Re-applying with the same period and
/// mode reproduces the same column.
pub fn normalize_table(
    table: &mut ObservationTable,
    label: &str,
    period: f64,
    mode: PhaseMode,
) -> Result<PhaseSpan, PhaseError> {
    let timestamps = table.require_column(TIMESTAMP_COLUMN)?;

    if timestamps.is_empty() {
        log::warn!("Error processing '{label}': no rows to fold");
        return Err(PhaseError::EmptyTable {
            label: label.to_string(),
        });
    }

    let mut phases = Vec::with_capacity(timestamps.len());
    for (row, cell) in timestamps.iter().enumerate() {
        if cell.is_missing() {
            phases.push(CellValue::Missing);
            continue;
        }
        match cell.as_f64() {
            Some(t) => phases.push(CellValue::Float(fold(t, period, mode))),
            None => {
                log::warn!("Error processing '{label}': non-numeric timestamp in row {row}");
                return Err(PhaseError::Arithmetic {
                    label: label.to_string(),
                    row,
                    value: cell.to_string(),
                });
            }
        }
    }

    let span = PhaseSpan {
        first: phases.first().and_then(CellValue::as_f64),
        last: phases.last().and_then(CellValue::as_f64),
    };
    table.set_column(PHASE_COLUMN, phases)?;
    Ok(span)
}
