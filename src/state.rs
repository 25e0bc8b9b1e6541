use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::batch::{pair_inputs, process_batch, validate_period, BatchInput, BatchOptions, InputError};
use crate::config::{parse_pair, parse_size, PairParseError, PlotConfig};
use crate::figure::{build_figure, LightCurveFigure};
use crate::phase::PhaseMode;

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

/// One data set row of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRow {
    pub path: String,
    pub label: String,
}

/// Why the form could not be turned into a plot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("period '{0}' is not a number")]
    PeriodNotANumber(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("x tick decimals '{0}' is not a whole number")]
    Decimals(String),

    #[error("{field}: {source}")]
    Pair {
        field: &'static str,
        #[source]
        source: PairParseError,
    },

    #[error(transparent)]
    Input(#[from] InputError),
}

/// Everything the batch and the renderer need, parsed from the form.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub inputs: Vec<BatchInput>,
    pub options: BatchOptions,
    pub config: PlotConfig,
}

/// The full UI state, independent of rendering. Numeric and tuple fields are
/// kept as the text the user typed and parsed when Plot is pressed.
pub struct FormState {
    /// Comma-separated paths waiting to be added as rows.
    pub files_entry: String,
    pub rows: Vec<FileRow>,
    pub period: String,
    pub clean: bool,
    pub raw_phase: bool,
    pub title: String,
    pub figsize: String,
    pub invert_yaxis: bool,
    pub ylabel: String,
    pub xlabel: String,
    pub xlim: String,
    pub x_tick_decimals: String,
    pub grid: bool,
    pub error_bars: bool,

    /// Most recent successful render.
    pub figure: Option<LightCurveFigure>,
    /// Per-file and per-series problems from the last plot.
    pub diagnostics: Vec<String>,
    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        let config = PlotConfig::default();
        Self {
            files_entry: String::new(),
            rows: Vec::new(),
            period: "0.0".to_string(),
            clean: false,
            raw_phase: false,
            title: config.title,
            figsize: format!("{}, {}", config.figsize.0, config.figsize.1),
            invert_yaxis: config.invert_yaxis,
            ylabel: config.ylabel,
            xlabel: config.xlabel,
            xlim: format!("{:.1}, {:.1}", config.xlim.0, config.xlim.1),
            x_tick_decimals: config.x_tick_decimals.to_string(),
            grid: config.grid,
            error_bars: config.error_bars,
            figure: None,
            diagnostics: Vec::new(),
            status_message: None,
        }
    }
}

impl FormState {
    pub fn add_file(&mut self, path: impl Into<String>) {
        self.rows.push(FileRow {
            path: path.into(),
            label: String::new(),
        });
    }

    pub fn add_files<I: IntoIterator<Item = PathBuf>>(&mut self, paths: I) {
        for path in paths {
            self.add_file(path.display().to_string());
        }
    }

    /// Move the comma-separated entry into rows. Every path must name an existing
    /// file; otherwise nothing is added and the entry is kept for correction.
    pub fn add_from_entry(&mut self) -> Result<(), FormError> {
        let paths: Vec<String> = self
            .files_entry
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        if paths.is_empty() {
            return Ok(());
        }
        if let Some(bad) = paths.iter().find(|p| !Path::new(p).is_file()) {
            return Err(FormError::InvalidPath(bad.clone()));
        }

        for path in paths {
            self.add_file(path);
        }
        self.files_entry.clear();
        // Blank row for further input.
        self.add_file(String::new());
        Ok(())
    }

    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }

    /// Parse the form. Rows with an empty path are ignored; an empty label
    /// falls back to the file name.
    pub fn plot_request(&self) -> Result<PlotRequest, FormError> {
        let period_text = self.period.trim();
        let period: f64 = period_text
            .parse()
            .map_err(|_| FormError::PeriodNotANumber(period_text.to_string()))?;
        let period = validate_period(period)?;

        let figsize = parse_size(&self.figsize).map_err(|source| FormError::Pair {
            field: "figure size",
            source,
        })?;
        let xlim = parse_pair(&self.xlim).map_err(|source| FormError::Pair {
            field: "x limits",
            source,
        })?;
        let x_tick_decimals = self
            .x_tick_decimals
            .trim()
            .parse()
            .map_err(|_| FormError::Decimals(self.x_tick_decimals.clone()))?;

        let (files, labels): (Vec<&str>, Vec<String>) = self
            .rows
            .iter()
            .map(|row| (row.path.trim(), row.label.trim()))
            .filter(|(path, _)| !path.is_empty())
            .map(|(path, label)| (path, display_label(path, label)))
            .unzip();
        let inputs = pair_inputs(&files, &labels)?;

        Ok(PlotRequest {
            inputs,
            options: BatchOptions {
                period,
                clean: self.clean,
                mode: PhaseMode::from_div(!self.raw_phase),
            },
            config: PlotConfig {
                figsize,
                invert_yaxis: self.invert_yaxis,
                ylabel: self.ylabel.clone(),
                xlabel: self.xlabel.clone(),
                title: self.title.clone(),
                xlim,
                x_tick_decimals,
                grid: self.grid,
                error_bars: self.error_bars,
            },
        })
    }

    /// Run the batch and build the figure. Per-file failures end up in
    /// `diagnostics`; a form error leaves the previous figure in place.
    pub fn plot(&mut self) {
        let request = match self.plot_request() {
            Ok(request) => request,
            Err(e) => {
                log::error!("Cannot plot: {e}");
                self.status_message = Some(format!("Error: {e}"));
                return;
            }
        };

        let report = process_batch(&request.inputs, &request.options);
        let figure = build_figure(&report.records, &request.config);

        self.diagnostics = report.failure_messages();
        self.diagnostics.extend(
            figure
                .failures
                .iter()
                .map(|f| format!("Cannot plot '{}': {}", f.label, f.error)),
        );
        self.status_message = Some(format!(
            "{} of {} data sets plotted",
            figure.series.len(),
            request.inputs.len()
        ));
        self.figure = Some(figure);
    }
}

fn display_label(path: &str, label: &str) -> String {
    if !label.is_empty() {
        return label.to_string();
    }
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> FormState {
        let mut state = FormState::default();
        state.period = "1.5".into();
        state.rows = vec![
            FileRow {
                path: "night1.csv".into(),
                label: "Night 1".into(),
            },
            FileRow {
                path: "  ".into(),
                label: "ignored".into(),
            },
            FileRow {
                path: "/obs/night2.tbl".into(),
                label: String::new(),
            },
        ];
        state
    }

    #[test]
    fn request_uses_structured_pairs_and_skips_blank_rows() {
        let mut state = filled();
        state.figsize = "(12, 5)".into();
        state.raw_phase = true;
        let request = state.plot_request().unwrap();

        assert_eq!(request.inputs.len(), 2);
        assert_eq!(request.inputs[0].label, "Night 1");
        assert_eq!(request.inputs[1].label, "night2");
        assert_eq!(request.options.period, 1.5);
        assert_eq!(request.options.mode, PhaseMode::Period);
        assert_eq!(request.config.figsize, (12.0, 5.0));
        assert_eq!(request.config.xlim, (0.0, 1.0));
    }

    #[test]
    fn zero_period_is_rejected() {
        let mut state = filled();
        state.period = "0".into();
        assert_eq!(
            state.plot_request().unwrap_err(),
            FormError::Input(InputError::InvalidPeriod(0.0))
        );
        state.period = "abc".into();
        assert!(matches!(
            state.plot_request(),
            Err(FormError::PeriodNotANumber(_))
        ));
    }

    #[test]
    fn untouched_period_field_reports_an_invalid_period() {
        let mut state = filled();
        state.period = FormState::default().period;
        assert_eq!(
            state.plot_request().unwrap_err(),
            FormError::Input(InputError::InvalidPeriod(0.0))
        );
    }

    #[test]
    fn non_positive_figure_size_is_rejected() {
        let mut state = filled();
        state.figsize = "-10, 6".into();
        assert_eq!(
            state.plot_request().unwrap_err(),
            FormError::Pair {
                field: "figure size",
                source: PairParseError::NotPositive("-10".into()),
            }
        );
    }

    #[test]
    fn tuple_fields_are_never_evaluated() {
        let mut state = filled();
        state.xlim = "exec('print(1)')".into();
        assert!(matches!(
            state.plot_request(),
            Err(FormError::Pair { field: "x limits", .. })
        ));
    }

    #[test]
    fn empty_form_has_nothing_to_plot() {
        let mut state = FormState::default();
        state.period = "2".into();
        assert_eq!(
            state.plot_request().unwrap_err(),
            FormError::Input(InputError::NoFiles)
        );
        state.plot();
        assert!(state.figure.is_none());
        assert!(state.status_message.unwrap().starts_with("Error"));
    }

    #[test]
    fn entry_rejects_nonexistent_paths() {
        let mut state = FormState::default();
        state.files_entry = "/no/such/file.csv".into();
        assert_eq!(
            state.add_from_entry(),
            Err(FormError::InvalidPath("/no/such/file.csv".into()))
        );
        assert!(state.rows.is_empty());
        assert_eq!(state.files_entry, "/no/such/file.csv");
    }

    #[test]
    fn entry_adds_rows_and_a_blank_one() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        std::fs::write(&a, "BJD_TDB\n1.0\n").unwrap();
        std::fs::write(&b, "BJD_TDB\n1.0\n").unwrap();

        let mut state = FormState::default();
        state.files_entry = format!("{}, {}", a.display(), b.display());
        state.add_from_entry().unwrap();

        assert_eq!(state.rows.len(), 3);
        assert_eq!(state.rows[1].path, b.display().to_string());
        assert_eq!(state.rows[2], FileRow::default());
        assert!(state.files_entry.is_empty());

        state.remove_row(2);
        assert_eq!(state.rows.len(), 2);
    }
}
