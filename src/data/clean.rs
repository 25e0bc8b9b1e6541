use super::error::SchemaError;
use super::model::{ObservationTable, TIMESTAMP_COLUMN};

/// What [`clean_table`] did to a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanSummary {
    pub removed_rows: usize,
    /// Informational note, set when nothing had to be removed.
    pub notice: Option<String>,
}

/// Drop every row that has a missing value in any column.
///
/// The timestamp column must be present; otherwise the table is left untouched
/// and a [`SchemaError::MissingColumn`] is returned. `name` only feeds the notice.
pub fn clean_table(table: &mut ObservationTable, name: &str) -> Result<CleanSummary, SchemaError> {
    table.require_column(TIMESTAMP_COLUMN)?;

    let before = table.len();
    let complete: Vec<bool> = (0..before).map(|i| !table.row_has_missing(i)).collect();
    table.retain_rows(|i| complete[i]);
    let removed_rows = before - table.len();

    let notice = if removed_rows == 0 {
        let msg = format!("No missing values found in {name}.");
        log::info!("{msg}");
        Some(msg)
    } else {
        log::info!("Removed {removed_rows} of {before} rows with missing values from {name}");
        None
    };

    Ok(CleanSummary {
        removed_rows,
        notice,
    })
}
