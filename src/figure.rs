use eframe::egui::Color32;

use crate::batch::ProcessedRecord;
use crate::color::series_color;
use crate::config::PlotConfig;
use crate::data::model::{CellValue, MAGNITUDE_COLUMN, PHASE_COLUMN, UNCERTAINTY_COLUMN};
use crate::data::SchemaError;

/// Relative padding added above and below the magnitude range.
const Y_MARGIN: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightCurvePoint {
    pub phase: f64,
    pub magnitude: f64,
    /// Only filled when error bars are requested and the cell holds a number.
    pub uncertainty: Option<f64>,
}

/// One input file's points, drawn in one colour under one legend entry.
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub color: Color32,
    pub points: Vec<LightCurvePoint>,
}

/// A record that could not be turned into a series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesFailure {
    pub label: String,
    pub error: SchemaError,
}

/// Everything needed to draw a phase-folded light curve, independent of the UI.
#[derive(Debug, Clone)]
pub struct LightCurveFigure {
    pub config: PlotConfig,
    pub series: Vec<Series>,
    pub failures: Vec<SeriesFailure>,
}

impl LightCurveFigure {
    pub fn plot_y(&self, magnitude: f64) -> f64 {
        self.config.plot_y(magnitude)
    }

    /// Padded magnitude range over all series, including error bars.
    pub fn magnitude_range(&self) -> Option<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for p in self.series.iter().flat_map(|s| &s.points) {
            let err = p.uncertainty.unwrap_or(0.0).abs();
            lo = lo.min(p.magnitude - err);
            hi = hi.max(p.magnitude + err);
        }
        if !lo.is_finite() || !hi.is_finite() {
            return None;
        }
        let pad = ((hi - lo) * Y_MARGIN).max(0.01);
        Some((lo - pad, hi + pad))
    }

    /// [`magnitude_range`](Self::magnitude_range) in plot coordinates, lower bound first.
    pub fn plot_y_bounds(&self) -> Option<(f64, f64)> {
        self.magnitude_range().map(|(lo, hi)| {
            let (a, b) = (self.plot_y(lo), self.plot_y(hi));
            (a.min(b), a.max(b))
        })
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

/// Turn processed records into plot series.
///
/// A record without the magnitude column, or without the uncertainty column when
/// error bars are on, is reported in `failures` and skipped; the other records
/// still make it into the figure. Rows with a missing phase or magnitude are left out.
pub fn build_figure(records: &[ProcessedRecord], config: &PlotConfig) -> LightCurveFigure {
    let mut series = Vec::with_capacity(records.len());
    let mut failures = Vec::new();

    for (index, record) in records.iter().enumerate() {
        match build_series(record, config.error_bars) {
            Ok(points) => series.push(Series {
                label: record.label.clone(),
                color: series_color(index),
                points,
            }),
            Err(error) => {
                log::error!("Cannot plot '{}': {error}", record.label);
                failures.push(SeriesFailure {
                    label: record.label.clone(),
                    error,
                });
            }
        }
    }

    LightCurveFigure {
        config: config.clone(),
        series,
        failures,
    }
}

fn build_series(record: &ProcessedRecord, error_bars: bool) -> Result<Vec<LightCurvePoint>, SchemaError> {
    let table = &record.table;
    let magnitudes = table.require_column(MAGNITUDE_COLUMN)?;
    let uncertainties = if error_bars {
        Some(table.require_column(UNCERTAINTY_COLUMN)?)
    } else {
        None
    };
    let phases = table.require_column(PHASE_COLUMN)?;

    let number = |cell: &CellValue| cell.as_f64().filter(|v| !v.is_nan());

    let points = phases
        .iter()
        .zip(magnitudes)
        .enumerate()
        .filter_map(|(row, (phase, mag))| {
            Some(LightCurvePoint {
                phase: number(phase)?,
                magnitude: number(mag)?,
                uncertainty: uncertainties.and_then(|u| number(&u[row])),
            })
        })
        .collect();
    Ok(points)
}
