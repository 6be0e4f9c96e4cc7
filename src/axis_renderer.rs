use crate::data_types::CategoryValue;
use crate::plot_types::Decoration;
use crate::rendering::Primitive;
use crate::scales::{BandScale, LinearScale, PointScale};
use crate::theme::ChartTheme;
use crate::utils::format_decimal;

/// Estimated room a numeric label needs along its axis, in pixels.
const NUMERIC_LABEL_SIZE: f64 = 50.0;
const LABEL_SIZE: f64 = 10.0;
const TICK_LABEL_OFFSET: f64 = 6.0;

/// Builds axis decorations in container-local coordinates.
pub struct AxisRenderer;

impl AxisRenderer {
    /// Number of ticks that fits `length` pixels without crowding.
    pub fn tick_count(length: f64, min_label_spacing: f64) -> usize {
        let label_size_est = NUMERIC_LABEL_SIZE + min_label_spacing;
        if !(length > 0.0) {
            return 2;
        }
        ((length / label_size_est).floor() as usize).clamp(2, 20)
    }

    /// Value axis on the left edge, with grid lines `grid_length` wide.
    pub fn linear_left(scale: &LinearScale, grid_length: f64, theme: &ChartTheme) -> Vec<Decoration> {
        let (r0, r1) = scale.range();
        let count = Self::tick_count((r0 - r1).abs(), 0.0);

        let mut out = vec![Decoration::new(
            "domain",
            Primitive::Line {
                x1: 0.0,
                y1: r0,
                x2: 0.0,
                y2: r1,
                stroke: theme.axis_line,
            },
        )];
        for tick in scale.ticks(count) {
            let y = scale.map(tick);
            let label = format_decimal(tick, 2);
            out.push(Decoration::new(
                format!("grid__{}", label),
                Primitive::Line {
                    x1: 0.0,
                    y1: y,
                    x2: grid_length,
                    y2: y,
                    stroke: theme.grid_line,
                },
            ));
            out.push(Decoration::new(
                format!("label__{}", label),
                Primitive::Text {
                    x: -TICK_LABEL_OFFSET,
                    y,
                    content: label,
                    size: LABEL_SIZE,
                    fill: theme.axis_label,
                },
            ));
        }
        out
    }

    /// Categorical axis along the bottom edge. `ticks` holds each category with its center.
    pub fn categories_bottom(
        ticks: &[(CategoryValue, f64)],
        length: f64,
        theme: &ChartTheme,
    ) -> Vec<Decoration> {
        let mut out = vec![Decoration::new(
            "domain",
            Primitive::Line {
                x1: 0.0,
                y1: 0.0,
                x2: length,
                y2: 0.0,
                stroke: theme.axis_line,
            },
        )];
        for (category, x) in ticks {
            out.push(Decoration::new(
                format!("label__{}", category),
                Primitive::Text {
                    x: *x,
                    y: TICK_LABEL_OFFSET + LABEL_SIZE,
                    content: category.to_string(),
                    size: LABEL_SIZE,
                    fill: theme.axis_label,
                },
            ));
        }
        out
    }

    pub fn band_ticks(scale: &BandScale) -> Vec<(CategoryValue, f64)> {
        scale
            .domain()
            .iter()
            .filter_map(|c| scale.center(c).map(|x| (c.clone(), x)))
            .collect()
    }

    pub fn point_ticks(scale: &PointScale) -> Vec<(CategoryValue, f64)> {
        scale
            .domain()
            .iter()
            .filter_map(|c| scale.map(c).map(|x| (c.clone(), x)))
            .collect()
    }

    /// Centered text, e.g. a chart title.
    pub fn label(key: &str, content: &str, size: f64, theme: &ChartTheme) -> Decoration {
        Decoration::new(
            key,
            Primitive::Text {
                x: 0.0,
                y: 0.0,
                content: content.to_string(),
                size,
                fill: theme.title,
            },
        )
    }
}
