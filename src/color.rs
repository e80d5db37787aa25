use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Scan;

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
// Colour grouping
// ---------------------------------------------------------------------------

/// What a curve's colour is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorBy {
    /// Every curve gets its own colour.
    #[default]
    Curve,
    CurveType,
    Depth,
}

impl ColorBy {
    pub const ALL: [ColorBy; 3] = [ColorBy::Curve, ColorBy::CurveType, ColorBy::Depth];

    /// Grouping key of `scan` in file `file`.
    pub fn key(self, file: usize, scan: &Scan) -> String {
        match self {
            ColorBy::Curve => format!("{file}:{}", scan.source_index),
            ColorBy::CurveType => scan.curve_type.to_string(),
            ColorBy::Depth if scan.curve_type.is_profile() => format!("{} mm", scan.depth),
            ColorBy::Depth => scan.curve_type.to_string(),
        }
    }
}

impl fmt::Display for ColorBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorBy::Curve => write!(f, "Curve"),
            ColorBy::CurveType => write!(f, "Curve type"),
            ColorBy::Depth => write!(f, "Depth"),
        }
    }
}

// ---------------------------------------------------------------------------
// Color mapping: grouping key → Color32
// ---------------------------------------------------------------------------

/// Maps grouping keys to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub color_by: ColorBy,
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map over the given keys.
    pub fn new(color_by: ColorBy, keys: &BTreeSet<String>) -> Self {
        let palette = generate_palette(keys.len());
        let mapping: BTreeMap<String, Color32> = keys.iter().cloned().zip(palette).collect();

        ColorMap {
            color_by,
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a curve.
    pub fn color_for(&self, file: usize, scan: &Scan) -> Color32 {
        self.mapping
            .get(&self.color_by.key(file, scan))
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (key → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping.iter().map(|(k, c)| (k.clone(), *c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{RawScan, ScanBatch};

    fn scans() -> ScanBatch {
        let raw = |tag: &str, depth: f64| RawScan {
            distance: vec![0.0],
            dose: vec![1.0],
            curve_type: tag.to_string(),
            depth,
        };
        ScanBatch::classify(vec![
            raw("PDD", 0.0),
            raw("INPLANE_PROFILE", 50.0),
            raw("CROSSPLANE_PROFILE", 50.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_palette_is_distinct() {
        let palette = generate_palette(4);
        assert_eq!(palette.len(), 4);
        let unique: BTreeSet<[u8; 4]> = palette.iter().map(|c| c.to_array()).collect();
        assert_eq!(unique.len(), 4);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_depth_groups_profiles_together() {
        let batch = scans();
        let keys: BTreeSet<String> = batch.scans.iter().map(|s| ColorBy::Depth.key(0, s)).collect();
        assert_eq!(keys.len(), 2);

        let map = ColorMap::new(ColorBy::Depth, &keys);
        assert_eq!(map.color_for(0, &batch.scans[1]), map.color_for(0, &batch.scans[2]));
        assert_ne!(map.color_for(0, &batch.scans[0]), map.color_for(0, &batch.scans[1]));
        assert_eq!(map.legend_entries().len(), 2);
    }

    #[test]
    fn test_unknown_key_gets_default_color() {
        let batch = scans();
        let map = ColorMap::new(ColorBy::Curve, &BTreeSet::new());
        assert_eq!(map.color_for(3, &batch.scans[0]), Color32::GRAY);
    }
}
