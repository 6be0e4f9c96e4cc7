use super::{apply_changes, Decoration, DecorationLayer};
use crate::axis_renderer::AxisRenderer;
use crate::data_types::{Dimensions, TimelineConfig, Viewport};
use crate::lifecycle::{ChartHooks, UpdateContext};
use crate::reconcile::Reconciled;
use crate::rendering::{Primitive, RenderSurface, Transition};
use crate::scales::{ChartScale, LinearScale, ScaleRole, ScaleSet};
use crate::theme::{parse_hex_or, ChartTheme};
use crate::utils::date_formatter::{determine_date_format, format_millis};
use crate::utils::format_decimal;
use eyre::Result;
use gpui::Hsla;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Epoch milliseconds.
    pub date: i64,
    pub value: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineData {
    pub title: String,
    pub data: Vec<TimelinePoint>,
    pub active_time: Option<i64>,
    /// Overrides the configured date format when not empty.
    pub time_format: String,
}

impl TimelineData {
    /// Last point at or before the active time.
    pub fn active_point(&self) -> Option<TimelinePoint> {
        let active = self.active_time?;
        self.data
            .iter()
            .filter(|p| p.date <= active)
            .max_by_key(|p| p.date)
            .copied()
    }

    pub fn max_point(&self) -> Option<TimelinePoint> {
        self.data
            .iter()
            .filter(|p| p.value.is_finite())
            .max_by(|a, b| a.value.total_cmp(&b.value))
            .copied()
    }
}

/// Elements of the series container: axis lines, area, line and max label.
pub type TimelineRecord = Decoration;

const TITLE: &str = "title";
const CONTAINER: &str = "container";
const ACTIVE: &str = "active";

/// Small time-series chart shown inside a map tooltip.
#[derive(Clone, Debug)]
pub struct TimelineTooltip {
    pub theme: ChartTheme,
    scales: ScaleSet,
    title: DecorationLayer,
    active: DecorationLayer,
}

impl Default for TimelineTooltip {
    fn default() -> Self {
        Self {
            theme: ChartTheme::default(),
            scales: ScaleSet::new(),
            title: DecorationLayer::new(TITLE),
            active: DecorationLayer::new(ACTIVE),
        }
    }
}

impl TimelineTooltip {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tooltip has a fixed size.
    pub fn viewport(config: &TimelineConfig) -> Viewport {
        Viewport::new(config.width, config.height)
    }

    pub fn scales(&self) -> &ScaleSet {
        &self.scales
    }

    fn position_elements(surface: &mut dyn RenderSurface, dims: &Dimensions) -> Result<()> {
        surface.translate(TITLE, dims.margin_left(), dims.mid_margin_top())?;
        surface.translate(CONTAINER, dims.margin_left(), dims.margin_top())?;
        surface.translate(ACTIVE, dims.margin_left(), dims.margin_top())?;
        Ok(())
    }

    fn active_elements(
        &self,
        data: &TimelineData,
        config: &TimelineConfig,
        dims: &Dimensions,
    ) -> Vec<Decoration> {
        let (Some(point), Some(x), Some(y)) = (
            data.active_point(),
            self.scales.linear(ScaleRole::X),
            self.scales.linear(ScaleRole::Y),
        ) else {
            return Vec::new();
        };
        let cx = x.map(point.date as f64);
        let cy = y.map(point.value);
        let stroke = parse_hex_or(&config.line_stroke, self.theme.axis_line);
        let format = if !data.time_format.is_empty() {
            data.time_format.as_str()
        } else if !config.time_format.is_empty() {
            config.time_format.as_str()
        } else {
            let (first, last) = x.domain();
            determine_date_format(last - first).pattern()
        };

        vec![
            Decoration::new(
                "active_horizontal",
                Primitive::Line {
                    x1: 0.0,
                    y1: cy,
                    x2: cx,
                    y2: cy,
                    stroke: self.theme.grid_line,
                },
            ),
            Decoration::new(
                "active_vertical",
                Primitive::Line {
                    x1: cx,
                    y1: dims.inner_height(),
                    x2: cx,
                    y2: cy,
                    stroke: self.theme.grid_line,
                },
            ),
            Decoration::new(
                "active_circle",
                Primitive::Circle {
                    cx,
                    cy,
                    r: config.circle_radius,
                    fill: stroke,
                },
            ),
            Decoration::new(
                "active_value",
                Primitive::Text {
                    x: cx,
                    y: cy - 2.0 * config.circle_radius,
                    content: format_decimal(point.value, config.decimal_places),
                    size: 9.0,
                    fill: self.theme.axis_label,
                },
            ),
            Decoration::new(
                "active_date",
                Primitive::Text {
                    x: cx,
                    y: dims.inner_height() + 10.0,
                    content: format_millis(point.date, format),
                    size: 9.0,
                    fill: self.theme.axis_label,
                },
            ),
        ]
    }
}

impl ChartHooks for TimelineTooltip {
    type Data = TimelineData;
    type Config = TimelineConfig;
    type Record = TimelineRecord;

    fn set_elements(&mut self, surface: &mut dyn RenderSurface, dims: &Dimensions) -> Result<()> {
        for id in [TITLE, CONTAINER, ACTIVE] {
            surface.create_container(id)?;
        }
        Self::position_elements(surface, dims)
    }

    fn set_params(
        &mut self,
        ctx: &UpdateContext<'_, TimelineData, TimelineConfig>,
    ) -> Vec<TimelineRecord> {
        let config = ctx.config;
        let mut points = ctx.data.data.clone();
        points.sort_by_key(|p| p.date);

        let (first, last) = match (points.first(), points.last()) {
            (Some(a), Some(b)) => (a.date as f64, b.date as f64),
            _ => (0.0, 1.0),
        };
        let inner_width = ctx.dims.inner_width();
        let inner_height = ctx.dims.inner_height();
        let x = LinearScale::new((first, last), (0.0, inner_width));
        let y = LinearScale::for_values(points.iter().map(|p| p.value), (inner_height, 0.0));

        let stroke = parse_hex_or(&config.line_stroke, self.theme.axis_line);
        let area_fill = parse_hex_or(&config.area_fill, self.theme.grid_line);
        let area_fill = Hsla {
            a: area_fill.a * config.area_opacity as f32,
            ..area_fill
        };

        let mut records = vec![Decoration::new(
            "axis_x",
            Primitive::Line {
                x1: 0.0,
                y1: inner_height,
                x2: inner_width,
                y2: inner_height,
                stroke: self.theme.axis_line,
            },
        )];

        if let Some(max) = ctx.data.max_point() {
            let y_max = y.map(max.value);
            records.push(Decoration::new(
                "axis_max",
                Primitive::Line {
                    x1: 0.0,
                    y1: y_max,
                    x2: inner_width,
                    y2: y_max,
                    stroke: self.theme.grid_line,
                },
            ));
            records.push(Decoration::new(
                "max_value",
                Primitive::Text {
                    x: 0.0,
                    y: y_max - 2.0,
                    content: format_decimal(max.value, config.decimal_places),
                    size: 9.0,
                    fill: self.theme.axis_label,
                },
            ));
        }

        if !points.is_empty() {
            let line: Vec<(f64, f64)> = points
                .iter()
                .map(|p| (x.map(p.date as f64), y.map(p.value)))
                .collect();
            let baseline = y.map(0.0);
            let mut area = Vec::with_capacity(line.len() + 2);
            area.push((line[0].0, baseline));
            area.extend(line.iter().copied());
            area.push((line[line.len() - 1].0, baseline));

            records.push(Decoration::new(
                "area",
                Primitive::Polyline {
                    points: area,
                    stroke: area_fill,
                    fill: Some(area_fill),
                },
            ));
            records.push(Decoration::new(
                "line",
                Primitive::Polyline {
                    points: line,
                    stroke,
                    fill: None,
                },
            ));
        }

        self.scales = ScaleSet::new()
            .with(ScaleRole::X, ChartScale::Linear(x))
            .with(ScaleRole::Y, ChartScale::Linear(y));
        debug!(points = points.len(), "timeline parameters set");
        records
    }

    fn draw(
        &mut self,
        surface: &mut dyn RenderSurface,
        changes: &Reconciled<TimelineRecord>,
        ctx: &UpdateContext<'_, TimelineData, TimelineConfig>,
    ) -> Result<()> {
        Self::position_elements(surface, &ctx.dims)?;
        apply_changes(surface, CONTAINER, changes, Transition::none())?;

        let title = vec![AxisRenderer::label("title", &ctx.data.title, 12.0, &self.theme)];
        self.title.sync(surface, title, Transition::none())?;

        let active = self.active_elements(ctx.data, ctx.config, &ctx.dims);
        self.active.sync(surface, active, Transition::none())
    }
}
