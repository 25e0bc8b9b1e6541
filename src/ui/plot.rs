use eframe::egui::Ui;
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotUi, Points};

use crate::figure::{LightCurveFigure, Series};

/// Error bar cap half-width, as a fraction of the x-limit span.
const CAP_FRACTION: f64 = 0.004;
const MARKER_RADIUS: f32 = 2.5;

// ---------------------------------------------------------------------------
// Light-curve plot
// ---------------------------------------------------------------------------

/// Draw a folded light curve. The [`PlotUi`] handed to the closure is the only
/// drawing context; nothing survives between calls apart from egui's own memory.
pub fn light_curve_plot(ui: &mut Ui, figure: &LightCurveFigure) {
    let config = &figure.config;

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(&config.title);
    });

    let [width, height] = config.size_points();
    let x_config = config.clone();
    let y_config = config.clone();

    let mut plot = Plot::new("light_curve_plot")
        .legend(Legend::default())
        .x_axis_label(config.xlabel.clone())
        .y_axis_label(config.ylabel.clone())
        .show_grid(config.grid)
        .width(width.min(ui.available_width()))
        .height(height.min(ui.available_height()))
        .include_x(config.xlim.0)
        .include_x(config.xlim.1)
        .x_axis_formatter(move |mark, _range| x_config.format_x_tick(mark.value))
        .y_axis_formatter(move |mark, _range| y_config.format_y_tick(mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if let Some((lo, hi)) = figure.plot_y_bounds() {
        plot = plot.include_y(lo).include_y(hi);
    }

    let cap = (config.xlim.1 - config.xlim.0).abs() * CAP_FRACTION;
    plot.show(ui, |plot_ui| {
        for series in &figure.series {
            if config.error_bars {
                draw_error_bars(plot_ui, figure, series, cap);
            }
            draw_markers(plot_ui, figure, series);
        }
    });
}

fn draw_markers(plot_ui: &mut PlotUi, figure: &LightCurveFigure, series: &Series) {
    let points: Vec<[f64; 2]> = series
        .points
        .iter()
        .map(|p| [p.phase, figure.plot_y(p.magnitude)])
        .collect();

    plot_ui.points(
        Points::new(points)
            .name(&series.label)
            .color(series.color)
            .shape(MarkerShape::Circle)
            .filled(true)
            .radius(MARKER_RADIUS),
    );
}

/// Vertical bar plus top and bottom caps for every point with an uncertainty.
/// Sharing the series name keeps them under the series' legend entry.
fn draw_error_bars(plot_ui: &mut PlotUi, figure: &LightCurveFigure, series: &Series, cap: f64) {
    for p in &series.points {
        let Some(err) = p.uncertainty else {
            continue;
        };
        let top = figure.plot_y(p.magnitude - err);
        let bottom = figure.plot_y(p.magnitude + err);
        for segment in [
            vec![[p.phase, bottom], [p.phase, top]],
            vec![[p.phase - cap, top], [p.phase + cap, top]],
            vec![[p.phase - cap, bottom], [p.phase + cap, bottom]],
        ] {
            plot_ui.line(
                Line::new(segment)
                    .name(&series.label)
                    .color(series.color)
                    .width(1.0),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotConfig;
    use crate::figure::LightCurvePoint;
    use eframe::egui::{CentralPanel, Color32, Context, RawInput};

    fn figure(config: PlotConfig) -> LightCurveFigure {
        LightCurveFigure {
            config,
            series: vec![Series {
                label: "Night 1".into(),
                color: Color32::RED,
                points: vec![
                    LightCurvePoint {
                        phase: 0.1,
                        magnitude: 12.4,
                        uncertainty: Some(0.004),
                    },
                    LightCurvePoint {
                        phase: 0.6,
                        magnitude: 12.9,
                        uncertainty: None,
                    },
                ],
            }],
            failures: Vec::new(),
        }
    }

    #[test]
    fn draws_a_frame_headlessly() {
        let config = PlotConfig {
            error_bars: true,
            xlim: (-0.1, 1.1),
            ..PlotConfig::default()
        };
        let figure = figure(config);

        let ctx = Context::default();
        let output = ctx.run(RawInput::default(), |ctx| {
            CentralPanel::default().show(ctx, |ui| light_curve_plot(ui, &figure));
        });
        assert!(!output.shapes.is_empty());
    }

    #[test]
    fn empty_figure_still_draws() {
        let mut figure = figure(PlotConfig::default());
        figure.series.clear();
        assert!(figure.plot_y_bounds().is_none());

        let ctx = Context::default();
        let output = ctx.run(RawInput::default(), |ctx| {
            CentralPanel::default().show(ctx, |ui| light_curve_plot(ui, &figure));
        });
        assert!(!output.shapes.is_empty());
    }
}
