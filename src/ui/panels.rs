use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::FormState;

// ---------------------------------------------------------------------------
// Left side panel – plot form
// ---------------------------------------------------------------------------

/// Render the parameter form.
pub fn form_panel(ui: &mut Ui, state: &mut FormState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Data");
            ui.separator();
            files_section(ui, state);

            ui.add_space(8.0);
            ui.heading("Folding");
            ui.separator();
            egui::Grid::new("folding_grid")
                .num_columns(2)
                .spacing([8.0, 4.0])
                .show(ui, |ui: &mut Ui| {
                    ui.label("Period:");
                    ui.text_edit_singleline(&mut state.period);
                    ui.end_row();

                    ui.label("");
                    ui.checkbox(&mut state.clean, "Clean data");
                    ui.end_row();

                    ui.label("");
                    ui.checkbox(&mut state.raw_phase, "Phase in period units");
                    ui.end_row();
                });

            ui.add_space(8.0);
            ui.heading("Plot");
            ui.separator();
            egui::Grid::new("plot_grid")
                .num_columns(2)
                .spacing([8.0, 4.0])
                .show(ui, |ui: &mut Ui| {
                    ui.label("Title:");
                    ui.text_edit_singleline(&mut state.title);
                    ui.end_row();

                    ui.label("Figsize:");
                    ui.text_edit_singleline(&mut state.figsize);
                    ui.end_row();

                    ui.label("Y-label:");
                    ui.text_edit_singleline(&mut state.ylabel);
                    ui.end_row();

                    ui.label("X-label:");
                    ui.text_edit_singleline(&mut state.xlabel);
                    ui.end_row();

                    ui.label("X-lim:");
                    ui.text_edit_singleline(&mut state.xlim);
                    ui.end_row();

                    ui.label("X decimals:");
                    ui.text_edit_singleline(&mut state.x_tick_decimals);
                    ui.end_row();

                    ui.label("");
                    ui.checkbox(&mut state.invert_yaxis, "Invert Y-axis");
                    ui.end_row();

                    ui.label("");
                    ui.checkbox(&mut state.grid, "Grid");
                    ui.end_row();

                    ui.label("");
                    ui.checkbox(&mut state.error_bars, "Error Bars");
                    ui.end_row();
                });

            ui.add_space(8.0);
            if ui.button(RichText::new("Plot").strong()).clicked() {
                state.plot();
            }

            if !state.diagnostics.is_empty() {
                ui.add_space(8.0);
                ui.strong("Problems");
                for msg in &state.diagnostics {
                    ui.label(RichText::new(msg).color(Color32::YELLOW));
                }
            }
        });
}

fn files_section(ui: &mut Ui, state: &mut FormState) {
    ui.label("Files (comma-separated):");
    ui.horizontal(|ui: &mut Ui| {
        let response = ui.text_edit_singleline(&mut state.files_entry);
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            if let Err(e) = state.add_from_entry() {
                state.status_message = Some(format!("Error: {e}"));
            }
        }
        if ui.button("Browse").clicked() {
            open_file_dialog(state);
        }
    });

    if state.rows.is_empty() {
        return;
    }

    let mut remove = None;
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::remainder().at_least(160.0))
        .column(Column::initial(100.0).at_least(60.0))
        .column(Column::auto())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            header.col(|ui| {
                ui.strong("File");
            });
            header.col(|ui| {
                ui.strong("Data Label");
            });
            header.col(|_| {});
        })
        .body(|mut body| {
            for (idx, row) in state.rows.iter_mut().enumerate() {
                body.row(22.0, |mut table_row| {
                    table_row.col(|ui| {
                        ui.label(format!("Data Set {}", idx + 1));
                    });
                    table_row.col(|ui| {
                        ui.text_edit_singleline(&mut row.path);
                    });
                    table_row.col(|ui| {
                        ui.text_edit_singleline(&mut row.label);
                    });
                    table_row.col(|ui| {
                        if ui.small_button("✖").clicked() {
                            remove = Some(idx);
                        }
                    });
                });
            }
        });

    if let Some(idx) = remove {
        state.remove_row(idx);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut FormState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Add files…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Clear data sets").clicked() {
                state.rows.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(figure) = &state.figure {
            ui.label(format!(
                "{} series, {} points",
                figure.series.len(),
                figure.point_count()
            ));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut FormState) {
    let files = rfd::FileDialog::new()
        .set_title("Add observation files")
        .add_filter("Supported files", &["csv", "xlsx", "xls", "tbl"])
        .add_filter("CSV files", &["csv"])
        .add_filter("Excel files", &["xlsx", "xls"])
        .add_filter("Table files", &["tbl"])
        .pick_files();

    if let Some(paths) = files {
        log::info!("Adding {} files from dialog", paths.len());
        state.add_files(paths);
    }
}
