//! PNG rendering of the correlation heatmap, grouped bar charts and line
//! charts.
//!
//! Each chart is split into a `prepare_*` step that pulls the numbers out of
//! the cleaned table (and fails on a missing country / indicator / year) and
//! a `render_*` step that only draws. Rendering uses the [`plotters`] bitmap
//! backend so it works without a display.

pub mod bars;
pub mod heatmap;
pub mod lines;

use plotters::style::RGBColor;
use thiserror::Error;

pub use bars::{prepare_bar_panel, render_bars, BarGroup};
pub use heatmap::{heatmap_cells, render_heatmap, HeatmapCell};
pub use lines::{prepare_line_panel, render_lines, LineChart};

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to save plot to file: {0}")]
    FileSave(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = core::result::Result<T, PlotError>;

/// Default line colours when a panel names none.
const PALETTE: [RGBColor; 6] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
];

/// Resolve a colour by name or `#rrggbb`.
pub fn named_color(name: &str) -> Result<RGBColor> {
    let lower = name.trim().to_ascii_lowercase();
    let rgb = match lower.as_str() {
        "blue" => RGBColor(0, 0, 255),
        "green" => RGBColor(0, 128, 0),
        "orange" => RGBColor(255, 165, 0),
        "red" => RGBColor(255, 0, 0),
        "purple" => RGBColor(128, 0, 128),
        "cyan" => RGBColor(0, 255, 255),
        "magenta" => RGBColor(255, 0, 255),
        "yellow" => RGBColor(255, 255, 0),
        "black" => RGBColor(0, 0, 0),
        "white" => RGBColor(255, 255, 255),
        "pink" => RGBColor(255, 192, 203),
        "gray" | "grey" => RGBColor(128, 128, 128),
        hex if hex.len() == 7 && hex.starts_with('#') => {
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16)
                    .map_err(|_| PlotError::InvalidData(format!("bad colour `{}`", name)))
            };
            RGBColor(channel(1)?, channel(3)?, channel(5)?)
        }
        _ => return Err(PlotError::InvalidData(format!("unknown colour `{}`", name))),
    };
    Ok(rgb)
}

/// Colour `i` of `names`, falling back to the default palette.
pub(crate) fn color_at(names: &[String], i: usize) -> Result<RGBColor> {
    match names.get(i) {
        Some(n) => named_color(n),
        None => Ok(PALETTE[i % PALETTE.len()]),
    }
}

/// Axis range with a little headroom; never empty.
pub(crate) fn padded_range(values: impl Iterator<Item = f64>, from_zero: bool) -> (f64, f64) {
    let (mut lo, mut hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if from_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    let span = hi - lo;
    let pad = if span == 0.0 { hi.abs().max(1.0) * 0.1 } else { span * 0.08 };
    if !(from_zero && lo == 0.0) {
        lo -= pad;
    }
    hi += pad;
    (lo, hi)
}

/// Whether a sans-serif face resolves; text rendering fails without one.
#[cfg(test)]
pub(crate) fn fonts_available() -> bool {
    use plotters::style::IntoFont;
    let ok = ("sans-serif", 12).into_font().box_size("Ag").is_ok();
    if !ok {
        tracing::warn!("no sans-serif font found, skipping render test");
    }
    ok
}
