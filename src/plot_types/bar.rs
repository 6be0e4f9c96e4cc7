use super::{apply_changes, DecorationLayer, Drawable};
use crate::aggregation::{aggregate, domains};
use crate::axis_renderer::AxisRenderer;
use crate::data_types::{BarChartConfig, Dimensions, Row};
use crate::lifecycle::{ChartHooks, UpdateContext};
use crate::reconcile::{Keyed, Reconciled};
use crate::rendering::{Primitive, RenderSurface, Transition};
use crate::scales::{build_scale, ScaleDomain, ScaleKind, ScaleOptions, ScaleRole, ScaleSet};
use crate::theme::{parse_hex_or, ChartTheme};
use eyre::Result;
use gpui::Hsla;
use tracing::debug;

/// Rows plus the field names playing the domain and value roles.
#[derive(Clone, Debug, PartialEq)]
pub struct BarData {
    pub title: String,
    pub rows: Vec<Row>,
    pub domain_field: String,
    pub value_field: String,
}

impl Default for BarData {
    fn default() -> Self {
        Self {
            title: String::new(),
            rows: Vec::new(),
            domain_field: "domain".to_string(),
            value_field: "value".to_string(),
        }
    }
}

/// One bar, in data-container coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct BarRecord {
    pub key: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Hsla,
}

impl Keyed for BarRecord {
    fn key(&self) -> &str {
        &self.key
    }

    /// Horizontal span, so new bars grow out of the right edge of their left neighbour.
    fn extent(&self) -> (f64, f64) {
        (self.x, self.x + self.width)
    }
}

impl Drawable for BarRecord {
    fn primitive(&self) -> Primitive {
        Primitive::Rect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            fill: self.fill,
            opacity: 1.0,
        }
    }

    fn collapsed_at(&self, boundary: f64) -> Primitive {
        Primitive::Rect {
            x: boundary,
            y: self.y,
            width: 0.0,
            height: self.height,
            fill: self.fill,
            opacity: 1.0,
        }
    }
}

const DATA: &str = "data";
const X_AXIS: &str = "x_axis";
const Y_AXIS: &str = "y_axis";
const TITLE: &str = "title";

/// Banded bar chart: one bar per domain value.
#[derive(Clone, Debug)]
pub struct BarChart {
    pub theme: ChartTheme,
    scales: ScaleSet,
    x_axis: DecorationLayer,
    y_axis: DecorationLayer,
    title: DecorationLayer,
}

impl Default for BarChart {
    fn default() -> Self {
        Self {
            theme: ChartTheme::default(),
            scales: ScaleSet::new(),
            x_axis: DecorationLayer::new(X_AXIS),
            y_axis: DecorationLayer::new(Y_AXIS),
            title: DecorationLayer::new(TITLE),
        }
    }
}

impl BarChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scales(&self) -> &ScaleSet {
        &self.scales
    }

    fn position_elements(surface: &mut dyn RenderSurface, dims: &Dimensions) -> Result<()> {
        surface.translate(DATA, dims.margin_left(), dims.margin_top())?;
        surface.translate(X_AXIS, dims.margin_left(), dims.margin_bottom())?;
        surface.translate(Y_AXIS, dims.margin_left(), dims.margin_top())?;
        surface.translate(TITLE, dims.mid_width(), dims.mid_margin_top())?;
        Ok(())
    }
}

impl ChartHooks for BarChart {
    type Data = BarData;
    type Config = BarChartConfig;
    type Record = BarRecord;

    fn set_elements(&mut self, surface: &mut dyn RenderSurface, dims: &Dimensions) -> Result<()> {
        for id in [DATA, X_AXIS, Y_AXIS, TITLE] {
            surface.create_container(id)?;
        }
        Self::position_elements(surface, dims)
    }

    fn set_params(&mut self, ctx: &UpdateContext<'_, BarData, BarChartConfig>) -> Vec<BarRecord> {
        let data = ctx.data;
        let bands = aggregate(
            &data.rows,
            &data.domain_field,
            None,
            None,
            &data.value_field,
            None,
        );

        let options = ScaleOptions {
            padding_inner: ctx.config.padding_inner,
            padding_outer: ctx.config.padding_outer,
            vertical: false,
        };
        let x = build_scale(
            ScaleKind::Band,
            ScaleDomain::Categories(domains(&bands)),
            (0.0, ctx.dims.inner_width()),
            &options,
        );
        let y = build_scale(
            ScaleKind::Linear,
            ScaleDomain::Values(bands.iter().map(|b| b.value).collect()),
            (0.0, ctx.dims.inner_height()),
            &ScaleOptions {
                vertical: true,
                ..options
            },
        );
        self.scales = ScaleSet::new().with(ScaleRole::X, x).with(ScaleRole::Y, y);

        let (Some(x), Some(y)) = (self.scales.band(ScaleRole::X), self.scales.linear(ScaleRole::Y))
        else {
            return Vec::new();
        };
        let fill = parse_hex_or(&ctx.config.color, self.theme.axis_line);
        let baseline = y.map(0.0);

        let mut records: Vec<BarRecord> = bands
            .iter()
            .filter_map(|band| {
                let left = x.map(&band.domain)?;
                let top = y.map(band.value);
                Some(BarRecord {
                    key: band.key.clone(),
                    x: left,
                    y: top.min(baseline),
                    width: x.bandwidth(),
                    height: (baseline - top).abs(),
                    fill,
                })
            })
            .collect();
        records.sort_by(|a, b| a.x.total_cmp(&b.x));
        debug!(bars = records.len(), "bar chart parameters set");
        records
    }

    fn draw(
        &mut self,
        surface: &mut dyn RenderSurface,
        changes: &Reconciled<BarRecord>,
        ctx: &UpdateContext<'_, BarData, BarChartConfig>,
    ) -> Result<()> {
        Self::position_elements(surface, &ctx.dims)?;
        apply_changes(surface, DATA, changes, ctx.transition())?;

        let x_ticks = self
            .scales
            .band(ScaleRole::X)
            .map(AxisRenderer::band_ticks)
            .unwrap_or_default();
        let x_axis = AxisRenderer::categories_bottom(&x_ticks, ctx.dims.inner_width(), &self.theme);
        self.x_axis.sync(surface, x_axis, Transition::none())?;

        let y_axis = self
            .scales
            .linear(ScaleRole::Y)
            .map(|y| AxisRenderer::linear_left(y, ctx.dims.inner_width(), &self.theme))
            .unwrap_or_default();
        self.y_axis.sync(surface, y_axis, ctx.transition())?;

        let title = vec![AxisRenderer::label("title", &ctx.data.title, 12.0, &self.theme)];
        self.title.sync(surface, title, Transition::none())
    }
}
