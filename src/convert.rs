//! Export of photometry tables in the AAVSO VStar tab-delimited layout.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::data::loader::read_table;
use crate::data::model::{CellValue, Column, ObservationTable};
use crate::data::{LoadError, SchemaError};

/// AstroImageJ column → AAVSO column.
const COLUMN_MAPPING: &[(&str, &str)] = &[
    ("J.D.-2400000", "JD"),
    ("Source_AMag_T1", "Magnitude"),
    ("Source_AMag_Err_T1", "Uncertainty"),
    ("Band", "Band"),
    ("AIRMASS", "Airmass"),
];

/// Output columns, in file order.
pub const AAVSO_COLUMNS: [&str; 24] = [
    "JD",
    "Magnitude",
    "Uncertainty",
    "HQuncertainty",
    "Band",
    "Observer Code",
    "Comment Code(s)",
    "Comp Star 1",
    "Comp Star 2",
    "Charts",
    "Comments",
    "Transformed",
    "Airmass",
    "Validation Flag",
    "Cmag",
    "Kmag",
    "HJD",
    "Star Name",
    "Observer Affiliation",
    "Measurement Method",
    "Grouping Method",
    "ADS Reference",
    "Digitizer",
    "Credit",
];

pub const DEFAULT_BAND: &str = "Vis.";
const OUTPUT_SUFFIX: &str = "_aavso_converted.txt";

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("writing '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// `<dir>/<stem>_aavso_converted.txt` next to the input file.
pub fn output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// Rename known columns, fill the fixed fields and reorder to [`AAVSO_COLUMNS`].
pub fn to_aavso_table(
    mut table: ObservationTable,
    star_name: &str,
    band: &str,
) -> Result<ObservationTable, SchemaError> {
    table.rename_columns(COLUMN_MAPPING);

    let rows = table.len();
    let constant = |value: &str| vec![CellValue::Text(value.to_string()); rows];

    let columns = AAVSO_COLUMNS
        .iter()
        .map(|&name| {
            let values = match name {
                "Band" => constant(band),
                "Validation Flag" => constant("V"),
                "Star Name" => constant(star_name),
                _ => table
                    .column(name)
                    .map(<[CellValue]>::to_vec)
                    .unwrap_or_else(|| vec![CellValue::Missing; rows]),
            };
            Column {
                name: name.to_string(),
                values,
            }
        })
        .collect();

    ObservationTable::from_columns(columns)
}

/// Convert one photometry file and write the result beside it.
pub fn convert_file(input: &Path, star_name: &str, band: &str) -> Result<PathBuf, ConvertError> {
    let table = read_table(input)?;
    let converted = to_aavso_table(table, star_name, band)?;
    let output = output_path(input);
    write_tab_delimited(&converted, &output)?;

    log::info!(
        "Converted {} rows from {} to {}",
        converted.len(),
        input.display(),
        output.display()
    );
    Ok(output)
}

/// Missing cells are written as empty fields.
fn write_tab_delimited(table: &ObservationTable, path: &Path) -> Result<(), ConvertError> {
    let write_err = |source: csv::Error| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(write_err)?;

    writer
        .write_record(table.column_names())
        .map_err(write_err)?;

    let columns = table.columns();
    for row in 0..table.len() {
        writer
            .write_record(columns.iter().map(|c| c.values[row].to_string()))
            .map_err(write_err)?;
    }

    writer
        .flush()
        .map_err(|e| write_err(csv::Error::from(e)))?;
    Ok(())
}
