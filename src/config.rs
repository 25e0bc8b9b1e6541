use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Plot configuration bundle
// ---------------------------------------------------------------------------

/// Cosmetic settings shared by every series of a light-curve plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Width and height in inches (100 points per inch on screen).
    pub figsize: (f64, f64),
    /// Brighter (lower magnitude) points are drawn higher when set.
    pub invert_yaxis: bool,
    pub ylabel: String,
    pub xlabel: String,
    pub title: String,
    pub xlim: (f64, f64),
    /// Decimal places of x-axis tick labels.
    pub x_tick_decimals: usize,
    pub grid: bool,
    pub error_bars: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            figsize: (10.0, 6.0),
            invert_yaxis: true,
            ylabel: "Magnitude (V)".to_string(),
            xlabel: "Phase".to_string(),
            title: "Partial Lightcurve".to_string(),
            xlim: (0.0, 1.0),
            x_tick_decimals: 2,
            grid: true,
            error_bars: false,
        }
    }
}

impl PlotConfig {
    pub const POINTS_PER_INCH: f32 = 100.0;
    /// Tick labels never carry more decimals than this.
    pub const MAX_X_TICK_DECIMALS: usize = 10;

    /// Figure size in screen points.
    pub fn size_points(&self) -> [f32; 2] {
        [
            self.figsize.0 as f32 * Self::POINTS_PER_INCH,
            self.figsize.1 as f32 * Self::POINTS_PER_INCH,
        ]
    }

    pub fn format_x_tick(&self, value: f64) -> String {
        let decimals = self.x_tick_decimals.min(Self::MAX_X_TICK_DECIMALS);
        format!("{value:.decimals$}")
    }

    /// Map a magnitude to the vertical plot coordinate.
    ///
    /// The plot widget has no inverted axis, so inversion negates the value and
    /// [`format_y_tick`](Self::format_y_tick) negates it back.
    pub fn plot_y(&self, magnitude: f64) -> f64 {
        if self.invert_yaxis {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Text for a y-axis tick at plot coordinate `y`.
    pub fn format_y_tick(&self, y: f64) -> String {
        format!("{:.2}", self.plot_y(y))
    }
}

/// Read a [`PlotConfig`] from JSON; absent fields keep their defaults.
pub fn load_plot_config(path: &Path) -> Result<PlotConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading plot config {}", path.display()))?;
    let config: PlotConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing plot config {}", path.display()))?;
    let (w, h) = config.figsize;
    anyhow::ensure!(
        is_positive_size(w) && is_positive_size(h),
        "plot config {}: figsize must be two positive numbers, got ({w}, {h})",
        path.display()
    );
    Ok(config)
}

// ---------------------------------------------------------------------------
// Numeric pair parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairParseError {
    #[error("expected two comma-separated numbers, got '{0}'")]
    Shape(String),

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("'{0}' must be greater than zero")]
    NotPositive(String),
}

/// Parse `"10,6"`, `"10, 6"`, `"(10, 6)"` or `"[10, 6]"` into two numbers.
pub fn parse_pair(text: &str) -> Result<(f64, f64), PairParseError> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .or_else(|| trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')))
        .unwrap_or(trimmed);

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let [a, b] = parts.as_slice() else {
        return Err(PairParseError::Shape(text.to_string()));
    };

    let number = |s: &str| {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| PairParseError::NotANumber(s.to_string()))
    };
    Ok((number(*a)?, number(*b)?))
}

/// [`parse_pair`] for a figure size: both numbers must be greater than zero.
pub fn parse_size(text: &str) -> Result<(f64, f64), PairParseError> {
    let (w, h) = parse_pair(text)?;
    for v in [w, h] {
        if !is_positive_size(v) {
            return Err(PairParseError::NotPositive(v.to_string()));
        }
    }
    Ok((w, h))
}

fn is_positive_size(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_accepts_plain_and_bracketed_forms() {
        assert_eq!(parse_pair("10,6"), Ok((10.0, 6.0)));
        assert_eq!(parse_pair(" (10, 6) "), Ok((10.0, 6.0)));
        assert_eq!(parse_pair("[0.0, 1.0]"), Ok((0.0, 1.0)));
        assert_eq!(parse_pair("-0.25,1.25"), Ok((-0.25, 1.25)));
    }

    #[test]
    fn pair_rejects_code_and_wrong_shapes() {
        assert!(matches!(
            parse_pair("__import__('os').system('ls')"),
            Err(PairParseError::Shape(_))
        ));
        assert!(matches!(parse_pair("1,2,3"), Err(PairParseError::Shape(_))));
        assert!(matches!(parse_pair("(1, 2"), Err(PairParseError::NotANumber(_))));
        assert_eq!(
            parse_pair("1, x"),
            Err(PairParseError::NotANumber("x".into()))
        );
        assert!(parse_pair("inf, 1").is_err());
    }

    #[test]
    fn size_must_be_positive() {
        assert_eq!(parse_size("(12, 5)"), Ok((12.0, 5.0)));
        assert_eq!(
            parse_size("-10, 6"),
            Err(PairParseError::NotPositive("-10".into()))
        );
        assert_eq!(parse_size("10, 0"), Err(PairParseError::NotPositive("0".into())));
        assert!(matches!(parse_size("10"), Err(PairParseError::Shape(_))));
    }

    #[test]
    fn json_config_with_negative_figsize_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.json");
        std::fs::write(&path, r#"{ "figsize": [-10, 6] }"#).unwrap();

        let err = load_plot_config(&path).unwrap_err();
        assert!(err.to_string().contains("figsize"));
    }

    #[test]
    fn tick_decimals_are_capped() {
        let cfg = PlotConfig {
            x_tick_decimals: usize::MAX,
            ..PlotConfig::default()
        };
        assert_eq!(cfg.format_x_tick(0.5), "0.5000000000");
    }

    #[test]
    fn defaults_match_the_classic_figure() {
        let cfg = PlotConfig::default();
        assert_eq!(cfg.size_points(), [1000.0, 600.0]);
        assert_eq!(cfg.format_x_tick(0.456), "0.46");
        assert!(cfg.invert_yaxis && cfg.grid && !cfg.error_bars);
    }

    #[test]
    fn json_config_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.json");
        std::fs::write(&path, r#"{ "title": "V0865 Lyr", "xlim": [-0.1, 1.1] }"#).unwrap();

        let cfg = load_plot_config(&path).unwrap();
        assert_eq!(cfg.title, "V0865 Lyr");
        assert_eq!(cfg.xlim, (-0.1, 1.1));
        assert_eq!(cfg.ylabel, "Magnitude (V)");
    }
}
