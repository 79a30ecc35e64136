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

/// Fixed colours for the product lines of the reference dataset.
const KNOWN_CATEGORIES: [(&str, Color32); 6] = [
    ("Health And Beauty", Color32::from_rgb(0x1f, 0x77, 0xb4)),
    ("Electronic Accessories", Color32::from_rgb(0xff, 0x7f, 0x0e)),
    ("Home And Lifestyle", Color32::from_rgb(0x2c, 0xa0, 0x2c)),
    ("Sports And Travel", Color32::from_rgb(0xd6, 0x27, 0x28)),
    ("Food And Beverages", Color32::from_rgb(0x94, 0x67, 0xbd)),
    ("Fashion Accessories", Color32::from_rgb(0x8c, 0x56, 0x4b)),
];

// ---------------------------------------------------------------------------
// Color mapping: label → Color32
// ---------------------------------------------------------------------------

/// Maps category (or any label) values to distinct colours. Known product
/// lines keep their fixed colour; other labels draw from a generated palette.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map over the given labels.
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut mapping = BTreeMap::new();
        let mut unknown = Vec::new();
        for label in labels {
            match KNOWN_CATEGORIES.iter().find(|(name, _)| *name == label) {
                Some((_, color)) => {
                    mapping.insert(label.to_string(), *color);
                }
                None => unknown.push(label.to_string()),
            }
        }
        unknown.sort();
        unknown.dedup();
        let palette = generate_palette(unknown.len());
        mapping.extend(unknown.into_iter().zip(palette));

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(label, c)| (label.clone(), *c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_keep_their_colour() {
        let map = ColorMap::new(["Health And Beauty", "Toys"]);
        assert_eq!(map.color_for("Health And Beauty"), Color32::from_rgb(0x1f, 0x77, 0xb4));
        assert_ne!(map.color_for("Toys"), Color32::GRAY);
        assert_eq!(map.color_for("Garden"), Color32::GRAY);
        assert_eq!(map.legend_entries().len(), 2);
    }

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(5).len(), 5);
    }
}
