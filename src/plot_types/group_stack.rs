//! Grouped and stacked bar chart.
//!
//! Bars are laid out per domain band, split side by side by group and stacked by stack identity.
//! Segment extents are pixel rows under the y scale of the draw that produced them. A segment that
//! appears grows out of the top of the segment below it as that segment was drawn before, and one
//! that disappears collapses onto the top of the segment below it as drawn now. Segments with no
//! matched neighbour grow from or collapse onto the baseline.

use super::{apply_changes, Decoration, DecorationLayer, Drawable};
use crate::aggregation::{aggregate, domains, groups, max_extent, min_extent, stack, stacks};
use crate::axis_renderer::AxisRenderer;
use crate::data_types::{CategoryValue, Dimensions, GroupStackConfig, Row};
use crate::legend::{LegendConfig, LegendEvent, LegendItem, LegendState};
use crate::lifecycle::{ChartHooks, UpdateContext};
use crate::reconcile::{Keyed, Reconciled};
use crate::rendering::{Primitive, RenderSurface, Transition};
use crate::scales::{
    build_scale, ColorScale, LinearScale, ScaleDomain, ScaleKind, ScaleOptions, ScaleRole, ScaleSet,
    SequentialScale,
};
use crate::theme::{parse_hex_or, ChartTheme};
use eyre::Result;
use gpui::Hsla;
use tracing::debug;

#[derive(Clone, Debug, PartialEq)]
pub struct GroupStackData {
    pub title: String,
    pub y_label: String,
    pub unit: String,
    pub rows: Vec<Row>,
    pub domain_field: String,
    /// `None` drops the group dimension.
    pub group_field: Option<String>,
    /// `None` drops the stack dimension.
    pub stack_field: Option<String>,
    pub value_field: String,
    /// Bottom-to-top stack order. Empty means sorted order.
    pub stack_order: Vec<CategoryValue>,
}

impl Default for GroupStackData {
    fn default() -> Self {
        Self {
            title: String::new(),
            y_label: String::new(),
            unit: String::new(),
            rows: Vec::new(),
            domain_field: "domain".to_string(),
            group_field: None,
            stack_field: None,
            value_field: "value".to_string(),
            stack_order: Vec::new(),
        }
    }
}

/// One stacked segment.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentRecord {
    pub key: String,
    /// Key of the `(domain, group)` column the segment sits in.
    pub column: String,
    pub domain: CategoryValue,
    pub group: Option<CategoryValue>,
    pub stack: Option<CategoryValue>,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub x: f64,
    pub width: f64,
    pub fill: Hsla,
    y: LinearScale,
}

impl SegmentRecord {
    fn rect(&self, a: f64, b: f64) -> Primitive {
        Primitive::Rect {
            x: self.x,
            y: a.min(b),
            width: self.width,
            height: (a - b).abs(),
            fill: self.fill,
            opacity: 1.0,
        }
    }
}

impl Keyed for SegmentRecord {
    fn key(&self) -> &str {
        &self.key
    }

    fn scope(&self) -> &str {
        &self.column
    }

    fn extent(&self) -> (f64, f64) {
        (self.y.map(self.min), self.y.map(self.max))
    }

    fn origin(&self) -> f64 {
        self.y.map(0.0)
    }
}

impl Drawable for SegmentRecord {
    fn primitive(&self) -> Primitive {
        let (bottom, top) = self.extent();
        self.rect(bottom, top)
    }

    fn collapsed_at(&self, boundary: f64) -> Primitive {
        self.rect(boundary, boundary)
    }
}

const DATA: &str = "data";
const X_AXIS: &str = "x_axis";
const Y_AXIS: &str = "y_axis";
const TITLE: &str = "title";
const LEGEND: &str = "legend";

#[derive(Clone, Debug)]
pub struct GroupStackChart {
    pub theme: ChartTheme,
    legend: LegendState,
    scales: ScaleSet,
    x_axis: DecorationLayer,
    y_axis: DecorationLayer,
    title: DecorationLayer,
    legend_layer: DecorationLayer,
}

impl Default for GroupStackChart {
    fn default() -> Self {
        Self {
            theme: ChartTheme::default(),
            legend: LegendState::default(),
            scales: ScaleSet::new(),
            x_axis: DecorationLayer::new(X_AXIS),
            y_axis: DecorationLayer::new(Y_AXIS),
            title: DecorationLayer::new(TITLE),
            legend_layer: DecorationLayer::new(LEGEND),
        }
    }
}

impl GroupStackChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scales(&self) -> &ScaleSet {
        &self.scales
    }

    pub fn legend(&self) -> &LegendState {
        &self.legend
    }

    /// Applies a legend click. The caller redraws afterwards.
    pub fn legend_click(&mut self, id: &CategoryValue) -> LegendEvent {
        self.legend.click(id)
    }

    fn position_elements(surface: &mut dyn RenderSurface, dims: &Dimensions) -> Result<()> {
        surface.translate(DATA, dims.margin_left(), dims.margin_top())?;
        surface.translate(X_AXIS, dims.margin_left(), dims.margin_bottom())?;
        surface.translate(Y_AXIS, dims.margin_left(), dims.margin_top())?;
        surface.translate(TITLE, dims.mid_width(), dims.mid_margin_top())?;
        surface.translate(LEGEND, dims.margin_left(), dims.mid_margin_bottom())?;
        Ok(())
    }
}

impl ChartHooks for GroupStackChart {
    type Data = GroupStackData;
    type Config = GroupStackConfig;
    type Record = SegmentRecord;

    fn set_elements(&mut self, surface: &mut dyn RenderSurface, dims: &Dimensions) -> Result<()> {
        for id in [DATA, X_AXIS, Y_AXIS, TITLE, LEGEND] {
            surface.create_container(id)?;
        }
        Self::position_elements(surface, dims)
    }

    fn set_params(
        &mut self,
        ctx: &UpdateContext<'_, GroupStackData, GroupStackConfig>,
    ) -> Vec<SegmentRecord> {
        let data = ctx.data;
        let config = ctx.config;
        let bands = aggregate(
            &data.rows,
            &data.domain_field,
            data.group_field.as_deref(),
            data.stack_field.as_deref(),
            &data.value_field,
            None,
        );

        let stacked_mode = data.stack_field.is_some();
        let order: Vec<CategoryValue> = if !stacked_mode {
            Vec::new()
        } else if data.stack_order.is_empty() {
            stacks(&bands)
        } else {
            data.stack_order.clone()
        };

        // Legend entries are the stack identities when stacking, the groups otherwise.
        let identities = if stacked_mode { order.clone() } else { groups(&bands) };
        let ramp = vec![
            parse_hex_or(&config.colors.light, self.theme.grid_line),
            parse_hex_or(&config.colors.deep, self.theme.axis_line),
        ];
        let colors = SequentialScale::for_count(identities.len(), ramp);
        self.legend.set_items(
            identities
                .iter()
                .enumerate()
                .map(|(i, id)| LegendItem::new(id.clone(), id.to_string(), colors.map(i as f64)))
                .collect(),
        );

        let identity_of = |stack: &Option<CategoryValue>, group: &Option<CategoryValue>| {
            if stacked_mode {
                stack.clone()
            } else {
                group.clone()
            }
        };
        let visible: Vec<_> = bands
            .iter()
            .filter(|b| {
                identity_of(&b.stack, &b.group).map_or(true, |id| !self.legend.is_hidden(&id))
            })
            .cloned()
            .collect();
        let visible_order: Vec<CategoryValue> = order
            .iter()
            .filter(|id| !self.legend.is_hidden(id))
            .cloned()
            .collect();
        let stacked = stack(&visible, &visible_order);

        let x = build_scale(
            ScaleKind::Band,
            ScaleDomain::Categories(domains(&bands)),
            (0.0, ctx.dims.inner_width()),
            &ScaleOptions {
                padding_inner: config.padding_inner,
                padding_outer: config.padding_outer,
                vertical: false,
            },
        );
        let x1 = build_scale(
            ScaleKind::Band,
            ScaleDomain::Categories(groups(&bands)),
            (0.0, x.bandwidth()),
            &ScaleOptions {
                padding_inner: config.group_padding,
                padding_outer: 0.0,
                vertical: false,
            },
        );
        let extremes: Vec<f64> = max_extent(&stacked)
            .into_iter()
            .chain(min_extent(&stacked))
            .collect();
        let y = build_scale(
            ScaleKind::Linear,
            ScaleDomain::Values(extremes),
            (0.0, ctx.dims.inner_height()),
            &ScaleOptions {
                vertical: true,
                ..ScaleOptions::default()
            },
        );
        self.scales = ScaleSet::new()
            .with(ScaleRole::X, x)
            .with(ScaleRole::X1, x1)
            .with(ScaleRole::Y, y)
            .with_color(ColorScale::Sequential(colors));

        let (Some(x), Some(x1), Some(y), Some(colors)) = (
            self.scales.band(ScaleRole::X),
            self.scales.band(ScaleRole::X1),
            self.scales.linear(ScaleRole::Y),
            self.scales.sequential(),
        ) else {
            return Vec::new();
        };

        let records: Vec<SegmentRecord> = stacked
            .iter()
            .filter_map(|s| {
                let band = &s.band;
                let left = x.map(&band.domain)?;
                let (offset, width) = match &band.group {
                    Some(group) => (x1.map(group)?, x1.bandwidth()),
                    None => (0.0, x.bandwidth()),
                };
                let color_index = identities
                    .iter()
                    .position(|id| Some(id) == identity_of(&band.stack, &band.group).as_ref())
                    .unwrap_or(0);
                Some(SegmentRecord {
                    key: band.key.clone(),
                    column: band.column_key(),
                    domain: band.domain.clone(),
                    group: band.group.clone(),
                    stack: band.stack.clone(),
                    value: band.value,
                    min: s.min,
                    max: s.max,
                    x: left + offset,
                    width,
                    fill: colors.map(color_index as f64),
                    y: y.clone(),
                })
            })
            .collect();

        debug!(
            bands = bands.len(),
            segments = records.len(),
            hidden = self.legend.hidden().len(),
            "group/stack parameters set"
        );
        records
    }

    fn draw(
        &mut self,
        surface: &mut dyn RenderSurface,
        changes: &Reconciled<SegmentRecord>,
        ctx: &UpdateContext<'_, GroupStackData, GroupStackConfig>,
    ) -> Result<()> {
        let transition = ctx.transition();
        Self::position_elements(surface, &ctx.dims)?;
        apply_changes(surface, DATA, changes, transition)?;

        let x_ticks = self
            .scales
            .band(ScaleRole::X)
            .map(AxisRenderer::band_ticks)
            .unwrap_or_default();
        let x_axis = AxisRenderer::categories_bottom(&x_ticks, ctx.dims.inner_width(), &self.theme);
        self.x_axis.sync(surface, x_axis, transition)?;

        let y_axis = self
            .scales
            .linear(ScaleRole::Y)
            .map(|y| AxisRenderer::linear_left(y, ctx.dims.inner_width(), &self.theme))
            .unwrap_or_default();
        self.y_axis.sync(surface, y_axis, transition)?;

        let title = vec![AxisRenderer::label(
            "title",
            &ctx.data.title,
            ctx.config.font_size,
            &self.theme,
        )];
        self.title.sync(surface, title, Transition::none())?;

        let legend_config = LegendConfig {
            hidden_opacity: ctx.config.hidden_opacity,
            font_size: ctx.config.font_size,
            ..LegendConfig::default()
        };
        let legend = self
            .legend
            .primitives(&legend_config)
            .into_iter()
            .map(|(key, primitive)| Decoration::new(key, primitive))
            .collect();
        self.legend_layer.sync(surface, legend, Transition::none())
    }
}
