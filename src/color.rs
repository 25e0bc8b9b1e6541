use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Hue step between consecutive series; keeps neighbours far apart on the wheel.
const GOLDEN_ANGLE_DEG: f32 = 137.507_77;

/// Colour of the `index`-th series of a plot.
///
/// Depends only on the index, so adding a file to a batch does not recolour the
/// series already on screen.
pub fn series_color(index: usize) -> Color32 {
    let hue = (210.0 + index as f32 * GOLDEN_ANGLE_DEG) % 360.0;
    let lightness = if index % 2 == 0 { 0.50 } else { 0.60 };
    let rgb: Srgb = Hsl::new(hue, 0.75, lightness).into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}
