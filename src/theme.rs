use eyre::{eyre, Result};
use gpui::*;

pub const TABLEAU_10: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

pub const CATEGORY_10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub const ORANGES_9: [&str; 9] = [
    "#fff5eb", "#fee6ce", "#fdd0a2", "#fdae6b", "#fd8d3c", "#f16913", "#d94801", "#a63603",
    "#7f2704",
];

pub const BLUES_9: [&str; 9] = [
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];

#[derive(Clone, Debug)]
pub struct ChartTheme {
    pub background: Hsla,
    pub grid_line: Hsla,
    pub axis_line: Hsla,
    pub axis_label: Hsla,
    pub title: Hsla,
    pub highlight_stroke: Hsla,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            background: gpui::white(),
            grid_line: gpui::black().alpha(0.13),
            axis_line: gpui::black().alpha(0.6),
            axis_label: gpui::black().alpha(0.8),
            title: gpui::black(),
            highlight_stroke: gpui::black(),
        }
    }
}

/// Parses `#rgb` or `#rrggbb` into a color.
pub fn parse_hex(hex: &str) -> Result<Hsla> {
    let digits = hex.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(eyre!("invalid hex color '{}'", hex)),
    };
    let value = u32::from_str_radix(&expanded, 16).map_err(|e| eyre!("invalid hex color '{}': {}", hex, e))?;
    Ok(rgb(value).into())
}

/// Like [`parse_hex`], logging and falling back on invalid input.
pub fn parse_hex_or(hex: &str, fallback: Hsla) -> Hsla {
    parse_hex(hex).unwrap_or_else(|err| {
        tracing::warn!(%err, "using fallback color");
        fallback
    })
}

/// Parses a palette, failing on the first invalid entry.
pub fn parse_palette<S: AsRef<str>>(colors: &[S]) -> Result<Vec<Hsla>> {
    colors.iter().map(|c| parse_hex(c.as_ref())).collect()
}

/// Linear interpolation in RGB space, `t` clamped to `[0, 1]`.
pub fn interpolate_rgb(from: Hsla, to: Hsla, t: f64) -> Hsla {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) as f32 };
    let a = from.to_rgb();
    let b = to.to_rgb();
    Rgba {
        r: a.r + (b.r - a.r) * t,
        g: a.g + (b.g - a.g) * t,
        b: a.b + (b.b - a.b) * t,
        a: a.a + (b.a - a.a) * t,
    }
    .into()
}

/// Samples a piecewise-linear ramp through `stops` at `t` in `[0, 1]`.
pub fn sample_ramp(stops: &[Hsla], t: f64) -> Hsla {
    match stops {
        [] => gpui::black(),
        [only] => *only,
        _ => {
            let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
            let segments = (stops.len() - 1) as f64;
            let pos = t * segments;
            let i = (pos.floor() as usize).min(stops.len() - 2);
            interpolate_rgb(stops[i], stops[i + 1], pos - i as f64)
        }
    }
}
