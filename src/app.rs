use eframe::egui::{self, Color32, RichText, Ui};

use crate::figure::LightCurveFigure;
use crate::state::FormState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// Form application
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct LyraApp {
    pub state: FormState,
}

impl eframe::App for LyraApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: form ----
        egui::SidePanel::left("form_panel")
            .default_width(360.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::form_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| match &self.state.figure {
            Some(figure) => plot::light_curve_plot(ui, figure),
            None => {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Add files, set the period and press Plot");
                });
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Stand-alone viewer (command line)
// ---------------------------------------------------------------------------

/// Shows one finished figure, plus any problems met while building it.
pub struct ViewerApp {
    figure: LightCurveFigure,
    diagnostics: Vec<String>,
}

impl ViewerApp {
    pub fn new(figure: LightCurveFigure, diagnostics: Vec<String>) -> Self {
        Self {
            figure,
            diagnostics,
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.diagnostics.is_empty() {
            egui::TopBottomPanel::bottom("diagnostics").show(ctx, |ui| {
                for msg in &self.diagnostics {
                    ui.label(RichText::new(msg).color(Color32::YELLOW));
                }
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            plot::light_curve_plot(ui, &self.figure);
        });
    }
}

/// Open a native window sized to the figure and block until it is closed.
pub fn run_viewer(figure: LightCurveFigure, diagnostics: Vec<String>) -> eframe::Result {
    let [width, height] = figure.config.size_points();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width + 40.0, height + 80.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };

    let title = format!("Lyra – {}", figure.config.title);
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(ViewerApp::new(figure, diagnostics)))),
    )
}
