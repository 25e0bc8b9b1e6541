use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::data::loader::load_table;
use crate::data::{LoadError, ObservationTable};
use crate::phase::{normalize_table, PhaseError, PhaseMode};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// One file of a batch together with its legend label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    pub path: PathBuf,
    pub label: String,
}

/// Rejected before any file is opened.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("no input files given")]
    NoFiles,

    #[error("number of labels ({labels}) must match the number of files ({files})")]
    LabelCountMismatch { files: usize, labels: usize },

    #[error("period must be a positive number, got {0}")]
    InvalidPeriod(f64),
}

/// Zip files with labels one-to-one.
pub fn pair_inputs<P: AsRef<Path>>(
    files: &[P],
    labels: &[String],
) -> Result<Vec<BatchInput>, InputError> {
    if files.is_empty() {
        return Err(InputError::NoFiles);
    }
    if files.len() != labels.len() {
        return Err(InputError::LabelCountMismatch {
            files: files.len(),
            labels: labels.len(),
        });
    }
    Ok(files
        .iter()
        .zip(labels)
        .map(|(path, label)| BatchInput {
            path: path.as_ref().to_path_buf(),
            label: label.clone(),
        })
        .collect())
}

/// Periods must be finite and strictly positive.
pub fn validate_period(period: f64) -> Result<f64, InputError> {
    if period.is_finite() && period > 0.0 {
        Ok(period)
    } else {
        Err(InputError::InvalidPeriod(period))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchOptions {
    pub period: f64,
    pub clean: bool,
    pub mode: PhaseMode,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            period: 1.0,
            clean: false,
            mode: PhaseMode::Fraction,
        }
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// A folded table ready for plotting.
#[derive(Debug, Clone)]
pub struct ProcessedRecord {
    pub table: ObservationTable,
    pub first_phase: Option<f64>,
    pub last_phase: Option<f64>,
    pub label: String,
    pub source: PathBuf,
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Phase(#[from] PhaseError),
}

#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub label: String,
    pub error: ProcessError,
}

/// Everything a batch produced: the folded records plus one entry per skipped file.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<ProcessedRecord>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// One line per skipped file, for display.
    pub fn failure_messages(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|f| format!("Error processing {}: {}", f.path.display(), f.error))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

/// Load, optionally clean, and fold a single file.
pub fn process_file(input: &BatchInput, options: &BatchOptions) -> Result<ProcessedRecord, ProcessError> {
    let loaded = load_table(&input.path, options.clean)?;
    let mut table = loaded.table;
    let span = normalize_table(&mut table, &input.label, options.period, options.mode)?;

    Ok(ProcessedRecord {
        table,
        first_phase: span.first,
        last_phase: span.last,
        label: input.label.clone(),
        source: input.path.clone(),
    })
}

/// Process every input independently. A failing file is recorded and skipped;
/// it never stops the rest of the batch.
pub fn process_batch(inputs: &[BatchInput], options: &BatchOptions) -> BatchReport {
    let mut report = BatchReport::default();

    for input in inputs {
        match process_file(input, options) {
            Ok(record) => {
                log::info!(
                    "Folded {} rows from {} ('{}'), phase {:?} .. {:?}",
                    record.table.len(),
                    input.path.display(),
                    record.label,
                    record.first_phase,
                    record.last_phase
                );
                report.records.push(record);
            }
            Err(error) => {
                log::warn!("Error processing {}: {error}", input.path.display());
                report.failures.push(FileFailure {
                    path: input.path.clone(),
                    label: input.label.clone(),
                    error,
                });
            }
        }
    }

    log::info!(
        "Batch finished: {} of {} files processed",
        report.records.len(),
        inputs.len()
    );
    report
}
