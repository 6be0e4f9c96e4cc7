use super::{apply_changes, DecorationLayer, Drawable};
use crate::aggregation::distinct_sorted;
use crate::axis_renderer::AxisRenderer;
use crate::data_types::{CategoryValue, Dimensions, PointDatum, SwarmConfig};
use crate::layout::{ForceConfig, ForceLayout};
use crate::lifecycle::{ChartHooks, UpdateContext};
use crate::reconcile::{Keyed, Reconciled};
use crate::rendering::{Primitive, RenderSurface, Transition};
use crate::scales::{
    build_scale, ColorScale, OrdinalScale, ScaleDomain, ScaleKind, ScaleOptions, ScaleRole, ScaleSet,
};
use crate::theme::{parse_palette, ChartTheme, TABLEAU_10};
use eyre::Result;
use gpui::Hsla;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmDatum {
    /// Element identity across updates. Falls back to the position when empty; a fallback or
    /// repeated id that is already taken gets a `__<position>` suffix.
    pub id: String,
    pub label: String,
    pub category: CategoryValue,
    pub group: CategoryValue,
    pub value: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmData {
    pub title: String,
    pub unit: String,
    pub data: Vec<SwarmDatum>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwarmRecord {
    pub key: String,
    pub category: CategoryValue,
    pub group: CategoryValue,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub fill: Hsla,
}

impl Keyed for SwarmRecord {
    fn key(&self) -> &str {
        &self.key
    }
}

impl Drawable for SwarmRecord {
    fn primitive(&self) -> Primitive {
        Primitive::Circle {
            cx: self.x,
            cy: self.y,
            r: self.r,
            fill: self.fill,
        }
    }

    fn collapsed_at(&self, _boundary: f64) -> Primitive {
        Primitive::Circle {
            cx: self.x,
            cy: self.y,
            r: 0.0,
            fill: self.fill,
        }
    }
}

/// One distinct key per datum, in input order. Explicit ids are reserved before any fallback is
/// handed out.
fn point_ids(data: &[SwarmDatum]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let explicit: HashSet<&str> = data
        .iter()
        .map(|d| d.id.as_str())
        .filter(|id| !id.is_empty())
        .collect();
    data.iter()
        .enumerate()
        .map(|(i, d)| {
            let mut id = if d.id.is_empty() { i.to_string() } else { d.id.clone() };
            let reserved = d.id.is_empty() && explicit.contains(id.as_str());
            if reserved || taken.contains(&id) {
                warn!(id = %id, position = i, "swarm id already in use");
                while explicit.contains(id.as_str()) || taken.contains(&id) {
                    id = format!("{}__{}", id, i);
                }
            }
            taken.insert(id.clone());
            id
        })
        .collect()
}

const DATA: &str = "data";
const X_AXIS: &str = "x_axis";
const Y_AXIS: &str = "y_axis";
const TITLE: &str = "title";
const Y_LABEL: &str = "y_label";

/// Beeswarm: points packed around their category without overlapping.
#[derive(Clone, Debug)]
pub struct SwarmChart {
    pub theme: ChartTheme,
    groups: Vec<CategoryValue>,
    scales: ScaleSet,
    x_axis: DecorationLayer,
    y_axis: DecorationLayer,
    labels: DecorationLayer,
    y_label: DecorationLayer,
}

impl Default for SwarmChart {
    fn default() -> Self {
        Self {
            theme: ChartTheme::default(),
            groups: Vec::new(),
            scales: ScaleSet::new(),
            x_axis: DecorationLayer::new(X_AXIS),
            y_axis: DecorationLayer::new(Y_AXIS),
            labels: DecorationLayer::new(TITLE),
            y_label: DecorationLayer::new(Y_LABEL),
        }
    }
}

impl SwarmChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct groups of the last update, ascending.
    pub fn groups(&self) -> &[CategoryValue] {
        &self.groups
    }

    pub fn scales(&self) -> &ScaleSet {
        &self.scales
    }

    fn position_elements(surface: &mut dyn RenderSurface, dims: &Dimensions) -> Result<()> {
        surface.translate(TITLE, dims.mid_width(), dims.mid_margin_top())?;
        surface.translate(Y_AXIS, dims.margin_left(), dims.margin_top())?;
        surface.translate(X_AXIS, dims.margin_left(), dims.margin_bottom())?;
        surface.translate(Y_LABEL, 17.0, dims.mid_height())?;
        surface.translate(DATA, dims.margin_left(), dims.margin_top())?;
        Ok(())
    }
}

impl ChartHooks for SwarmChart {
    type Data = SwarmData;
    type Config = SwarmConfig;
    type Record = SwarmRecord;

    fn set_elements(&mut self, surface: &mut dyn RenderSurface, dims: &Dimensions) -> Result<()> {
        for id in [TITLE, Y_AXIS, X_AXIS, Y_LABEL, DATA] {
            surface.create_container(id)?;
        }
        Self::position_elements(surface, dims)
    }

    fn set_params(&mut self, ctx: &UpdateContext<'_, SwarmData, SwarmConfig>) -> Vec<SwarmRecord> {
        let data = &ctx.data.data;
        let config = ctx.config;

        self.groups = distinct_sorted(data.iter().map(|d| &d.group));
        let categories = distinct_sorted(data.iter().map(|d| &d.category));

        let x = build_scale(
            ScaleKind::Point,
            ScaleDomain::Categories(categories),
            (0.0, ctx.dims.inner_width()),
            &ScaleOptions {
                padding_outer: config.padding,
                ..ScaleOptions::default()
            },
        );
        let y = build_scale(
            ScaleKind::Linear,
            ScaleDomain::Values(data.iter().map(|d| d.value).collect()),
            (0.0, ctx.dims.inner_height()),
            &ScaleOptions {
                vertical: true,
                ..ScaleOptions::default()
            },
        );
        let palette = parse_palette(&TABLEAU_10[..]).unwrap_or_else(|err| {
            warn!(%err, "invalid built-in palette");
            Vec::new()
        });
        self.scales = ScaleSet::new()
            .with(ScaleRole::X, x)
            .with(ScaleRole::Y, y)
            .with_color(ColorScale::Ordinal(OrdinalScale::new(self.groups.clone(), palette)));

        let (Some(x), Some(y), Some(colors)) = (
            self.scales.point(ScaleRole::X),
            self.scales.linear(ScaleRole::Y),
            self.scales.ordinal(),
        ) else {
            return Vec::new();
        };

        let ids = point_ids(data);
        let mut points: Vec<PointDatum> = data
            .iter()
            .zip(ids)
            .filter_map(|(d, id)| {
                let target_x = x.map(&d.category)?;
                Some(PointDatum::new(
                    id,
                    d.category.clone(),
                    d.group.clone(),
                    d.value,
                    target_x,
                    y.map(d.value),
                ))
            })
            .collect();

        let layout = ForceLayout::new(ForceConfig {
            strength_x: config.strength_x,
            strength_y: config.strength_y,
            radius: config.radius,
            ..ForceConfig::default()
        });
        layout.solve(&mut points, config.ticks);
        debug!(points = points.len(), ticks = config.ticks, "swarm laid out");

        points
            .into_iter()
            .map(|p| SwarmRecord {
                fill: colors.map(&p.group),
                key: p.id,
                category: p.category,
                group: p.group,
                value: p.value,
                x: p.x,
                y: p.y,
                r: config.radius,
            })
            .collect()
    }

    fn draw(
        &mut self,
        surface: &mut dyn RenderSurface,
        changes: &Reconciled<SwarmRecord>,
        ctx: &UpdateContext<'_, SwarmData, SwarmConfig>,
    ) -> Result<()> {
        Self::position_elements(surface, &ctx.dims)?;
        apply_changes(surface, DATA, changes, ctx.transition())?;

        let x_ticks = self
            .scales
            .point(ScaleRole::X)
            .map(AxisRenderer::point_ticks)
            .unwrap_or_default();
        let x_axis = AxisRenderer::categories_bottom(&x_ticks, ctx.dims.inner_width(), &self.theme);
        self.x_axis.sync(surface, x_axis, Transition::none())?;

        let y_axis = self
            .scales
            .linear(ScaleRole::Y)
            .map(|y| AxisRenderer::linear_left(y, ctx.dims.inner_width(), &self.theme))
            .unwrap_or_default();
        self.y_axis.sync(surface, y_axis, Transition::none())?;

        let title = vec![AxisRenderer::label("title", &ctx.data.title, 12.0, &self.theme)];
        self.labels.sync(surface, title, Transition::none())?;
        let unit = vec![AxisRenderer::label("y_label", &ctx.data.unit, 12.0, &self.theme)];
        self.y_label.sync(surface, unit, Transition::none())
    }
}
