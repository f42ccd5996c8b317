//! Chart figures, colors and axis helpers shared by the renderer.

use image::RgbImage;
use plotters::style::RGBColor;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Nothing to plot for '{0}'")]
    Empty(String),
    #[error("Chart drawing failed: {0}")]
    Drawing(String),
    #[error("Chart buffer has an unexpected size")]
    Buffer,
    #[error("Failed to create chart directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to save chart: {0}")]
    Save(#[from] image::ImageError),
}

impl ChartError {
    pub(crate) fn drawing<E: std::fmt::Display>(err: E) -> Self {
        ChartError::Drawing(err.to_string())
    }
}

pub const SALES_COLOR: RGBColor = RGBColor(52, 152, 219); // Blue
pub const PROFIT_COLOR: RGBColor = RGBColor(46, 204, 113); // Green
pub const ZERO_LINE_COLOR: RGBColor = RGBColor(220, 53, 69); // Red

/// Color palette for categories
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(255, 87, 34),   // Deep Orange
    RGBColor(121, 85, 72),   // Brown
    RGBColor(96, 125, 139),  // Blue Grey
];

/// A rendered chart held in memory.
#[derive(Clone)]
pub struct Figure {
    pub title: String,
    pub file_stem: String,
    pub image: RgbImage,
}

impl std::fmt::Debug for Figure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Figure")
            .field("title", &self.title)
            .field("file_stem", &self.file_stem)
            .field("size", &self.image.dimensions())
            .finish()
    }
}

impl Figure {
    /// Write the figure as `<dir>/<file_stem>.png`, creating `dir` if needed.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ChartError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.png", self.file_stem));
        self.image.save(&path)?;
        Ok(path)
    }
}

/// Get color for a category by its position.
pub fn category_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Red shades from dark to light, one per bar (worst first).
pub fn reds_palette(n: usize) -> Vec<RGBColor> {
    let dark = (103.0, 0.0, 13.0);
    let light = (252.0, 187.0, 161.0);
    (0..n)
        .map(|i| {
            let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
            let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
            RGBColor(
                lerp(dark.0, light.0),
                lerp(dark.1, light.1),
                lerp(dark.2, light.2),
            )
        })
        .collect()
}

/// Axis range covering `values` with 10% padding.
///
/// With `include_zero` the range always spans 0 so bars have a baseline.
pub fn value_range<I: IntoIterator<Item = f64>>(values: I, include_zero: bool) -> (f64, f64) {
    let (mut min, mut max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return (0.0, 1.0);
    }
    if include_zero {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }

    let pad = (max - min) * 0.1;
    let low = if include_zero && min == 0.0 { 0.0 } else { min - pad };
    let high = if include_zero && max == 0.0 { 0.0 } else { max + pad };
    (low, high)
}

/// Label for an integer tick on an index axis; blank between ticks.
pub fn label_at(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if idx < 0.0 || (x - idx).abs() > 1e-6 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_range_includes_zero() {
        assert_eq!(value_range([10.0, 20.0], true), (0.0, 22.0));
        let (low, high) = value_range([-10.0, 10.0], true);
        assert!(low < -10.0 && high > 10.0);
    }

    #[test]
    fn test_value_range_degenerate() {
        assert_eq!(value_range(Vec::<f64>::new(), false), (0.0, 1.0));
        assert_eq!(value_range([5.0, 5.0], false), (4.0, 6.0));
        assert_eq!(value_range([f64::NAN], true), (0.0, 1.0));
    }

    #[test]
    fn test_reds_palette_darkest_first() {
        let reds = reds_palette(3);
        assert_eq!(reds.len(), 3);
        assert_eq!(reds[0], RGBColor(103, 0, 13));
        assert_eq!(reds[2], RGBColor(252, 187, 161));
        assert_eq!(reds_palette(1).len(), 1);
    }

    #[test]
    fn test_label_at() {
        let labels = vec!["2023-01".to_string(), "2023-02".to_string()];
        assert_eq!(label_at(&labels, 1.0), "2023-02");
        assert_eq!(label_at(&labels, 0.5), "");
        assert_eq!(label_at(&labels, 5.0), "");
        assert_eq!(label_at(&labels, -1.0), "");
    }

    #[test]
    fn test_category_color_wraps() {
        assert_eq!(category_color(0), category_color(PALETTE.len()));
    }
}
