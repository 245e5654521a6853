use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: team name → Color32
// ---------------------------------------------------------------------------

/// Maps team names to distinct colours, assigned once per loaded season so a
/// team keeps its colour no matter which subset or window is displayed.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the season's team columns, in column order.
    pub fn new(team_names: &[String]) -> Self {
        let palette = generate_palette(team_names.len());
        let mapping: BTreeMap<String, Color32> = team_names
            .iter()
            .cloned()
            .zip(palette.into_iter())
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a team.
    pub fn color_for(&self, team: &str) -> Color32 {
        self.mapping
            .get(team)
            .copied()
            .unwrap_or(self.default_color)
    }
}
