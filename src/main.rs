use eframe::egui;
use lyra::app::LyraApp;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Lyra – Light Curve Plot Generator",
        options,
        Box::new(|_cc| Ok(Box::new(LyraApp::default()))),
    )
}
