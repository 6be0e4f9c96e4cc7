use super::{apply_changes, Decoration, DecorationLayer, Drawable};
use crate::aggregation::aggregate;
use crate::axis_renderer::AxisRenderer;
use crate::data_types::{CategoryValue, Dimensions, PieConfig, Row};
use crate::legend::{LegendConfig, LegendEvent, LegendItem, LegendState};
use crate::lifecycle::{ChartHooks, UpdateContext};
use crate::reconcile::{Keyed, Reconciled};
use crate::rendering::{Primitive, RenderSurface, Transition};
use crate::scales::{ColorScale, OrdinalScale, ScaleSet};
use crate::theme::{parse_hex_or, parse_palette, ChartTheme, CATEGORY_10};
use eyre::Result;
use gpui::Hsla;
use std::f64::consts::TAU;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq)]
pub struct PieData {
    pub title: String,
    pub rows: Vec<Row>,
    pub label_field: String,
    pub value_field: String,
}

impl Default for PieData {
    fn default() -> Self {
        Self {
            title: String::new(),
            rows: Vec::new(),
            label_field: "label".to_string(),
            value_field: "value".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArcRecord {
    pub key: String,
    pub id: CategoryValue,
    pub value: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub pad_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub fill: Hsla,
    pub stroke: Hsla,
    pub stroke_width: f64,
}

impl ArcRecord {
    fn arc(&self, start_angle: f64, end_angle: f64) -> Primitive {
        Primitive::Arc {
            inner_radius: self.inner_radius,
            outer_radius: self.outer_radius,
            start_angle,
            end_angle,
            pad_angle: self.pad_angle,
            fill: self.fill,
            stroke: self.stroke,
            stroke_width: self.stroke_width,
        }
    }
}

impl Keyed for ArcRecord {
    fn key(&self) -> &str {
        &self.key
    }

    fn extent(&self) -> (f64, f64) {
        (self.start_angle, self.end_angle)
    }
}

impl Drawable for ArcRecord {
    fn primitive(&self) -> Primitive {
        self.arc(self.start_angle, self.end_angle)
    }

    fn collapsed_at(&self, boundary: f64) -> Primitive {
        self.arc(boundary, boundary)
    }
}

/// Splits `[0, TAU]` proportionally to `values`, in input order.
///
/// Negative and non-finite values get an empty arc. An all-zero input yields all-empty arcs.
pub fn pie_angles(values: &[f64]) -> Vec<(f64, f64)> {
    let clean: Vec<f64> = values
        .iter()
        .map(|v| if v.is_finite() && *v > 0.0 { *v } else { 0.0 })
        .collect();
    let total: f64 = clean.iter().sum();
    let scale = if total > 0.0 { TAU / total } else { 0.0 };

    let mut angle = 0.0;
    clean
        .iter()
        .map(|v| {
            let start = angle;
            angle += v * scale;
            (start, angle)
        })
        .collect()
}

const DATA: &str = "data";
const TITLE: &str = "title";
const LEGEND: &str = "legend";

/// Pie or donut chart, depending on the inner radius coefficient.
#[derive(Clone, Debug)]
pub struct PieChart {
    pub theme: ChartTheme,
    legend: LegendState,
    scales: ScaleSet,
    title: DecorationLayer,
    legend_layer: DecorationLayer,
}

impl Default for PieChart {
    fn default() -> Self {
        Self {
            theme: ChartTheme::default(),
            legend: LegendState::default(),
            scales: ScaleSet::new(),
            title: DecorationLayer::new(TITLE),
            legend_layer: DecorationLayer::new(LEGEND),
        }
    }
}

impl PieChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn legend(&self) -> &LegendState {
        &self.legend
    }

    pub fn legend_click(&mut self, id: &CategoryValue) -> LegendEvent {
        self.legend.click(id)
    }

    pub fn scales(&self) -> &ScaleSet {
        &self.scales
    }

    fn position_elements(surface: &mut dyn RenderSurface, dims: &Dimensions) -> Result<()> {
        surface.translate(DATA, dims.mid_inner_width(), dims.mid_inner_height())?;
        surface.translate(TITLE, dims.mid_width(), dims.mid_margin_top())?;
        surface.translate(LEGEND, dims.margin_left(), dims.mid_margin_bottom())?;
        Ok(())
    }
}

impl ChartHooks for PieChart {
    type Data = PieData;
    type Config = PieConfig;
    type Record = ArcRecord;

    fn set_elements(&mut self, surface: &mut dyn RenderSurface, dims: &Dimensions) -> Result<()> {
        for id in [DATA, TITLE, LEGEND] {
            surface.create_container(id)?;
        }
        Self::position_elements(surface, dims)
    }

    fn set_params(&mut self, ctx: &UpdateContext<'_, PieData, PieConfig>) -> Vec<ArcRecord> {
        let config = ctx.config;
        let slices = aggregate(
            &ctx.data.rows,
            &ctx.data.label_field,
            None,
            None,
            &ctx.data.value_field,
            None,
        );

        let palette = parse_palette(&CATEGORY_10[..]).unwrap_or_else(|err| {
            warn!(%err, "invalid built-in palette");
            Vec::new()
        });
        let colors = OrdinalScale::new(slices.iter().map(|s| s.domain.clone()).collect(), palette);
        self.legend.set_items(
            slices
                .iter()
                .map(|s| LegendItem::new(s.domain.clone(), s.domain.to_string(), colors.map(&s.domain)))
                .collect(),
        );

        let visible: Vec<_> = slices
            .iter()
            .filter(|s| !self.legend.is_hidden(&s.domain))
            .collect();
        let angles = pie_angles(&visible.iter().map(|s| s.value).collect::<Vec<_>>());

        let outer_radius = ctx.dims.inner_radius();
        let inner_radius = outer_radius * config.inner_radius_coef.clamp(0.0, 1.0);
        let stroke = parse_hex_or(&config.arcs.stroke, self.theme.background);

        let records: Vec<ArcRecord> = visible
            .iter()
            .zip(angles)
            .map(|(slice, (start_angle, end_angle))| ArcRecord {
                key: slice.key.clone(),
                id: slice.domain.clone(),
                value: slice.value,
                start_angle,
                end_angle,
                pad_angle: config.arcs.pad_angle,
                inner_radius,
                outer_radius,
                fill: colors.map(&slice.domain),
                stroke,
                stroke_width: config.arcs.stroke_width,
            })
            .collect();

        self.scales = ScaleSet::new().with_color(ColorScale::Ordinal(colors));
        debug!(arcs = records.len(), outer_radius, "pie parameters set");
        records
    }

    fn draw(
        &mut self,
        surface: &mut dyn RenderSurface,
        changes: &Reconciled<ArcRecord>,
        ctx: &UpdateContext<'_, PieData, PieConfig>,
    ) -> Result<()> {
        Self::position_elements(surface, &ctx.dims)?;
        apply_changes(surface, DATA, changes, ctx.transition())?;

        let title = vec![AxisRenderer::label("title", &ctx.data.title, 12.0, &self.theme)];
        self.title.sync(surface, title, Transition::none())?;

        let legend_config = LegendConfig {
            hidden_opacity: ctx.config.hidden_opacity,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angles_cover_full_circle_in_order() {
        let angles = pie_angles(&[1.0, 3.0]);
        assert_eq!(angles[0], (0.0, TAU / 4.0));
        assert!((angles[1].1 - TAU).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_values_get_empty_arcs() {
        let angles = pie_angles(&[0.0, -2.0, f64::NAN]);
        assert!(angles.iter().all(|(a, b)| a == b));
    }
}
