//! Choropleth map.
//!
//! Geometry comes in pre-projected as path data; the chart only decides which features carry
//! data and how they are colored. Values are bucketed by a threshold scale built from
//! `thresholds[2..]`. The first two entries are the no-data marker and the lower bound, which
//! only show up in the legend.

use super::{apply_changes, Decoration, DecorationLayer, Drawable};
use crate::axis_renderer::AxisRenderer;
use crate::data_types::{Dimensions, MapConfig};
use crate::lifecycle::{ChartHooks, UpdateContext};
use crate::reconcile::{Keyed, Reconciled};
use crate::rendering::{Primitive, RenderSurface, Transition};
use crate::scales::{ColorScale, ScaleSet, ThresholdScale};
use crate::theme::{parse_hex_or, parse_palette, ChartTheme};
use crate::utils::format_decimal;
use eyre::Result;
use gpui::Hsla;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A projected map feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub path: String,
}

impl Feature {
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapDatum {
    pub id: String,
    pub value: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapData {
    pub title: String,
    pub data: Vec<MapDatum>,
    /// Legend stops. `None` stands for the no-data entry.
    pub thresholds: Vec<Option<f64>>,
}

impl MapData {
    pub fn value_of(&self, id: &str) -> Option<f64> {
        self.data.iter().find(|d| d.id == id).and_then(|d| d.value)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapRecord {
    pub key: String,
    pub path: String,
    pub value: Option<f64>,
    pub fill: Hsla,
    pub opacity: f64,
}

impl Keyed for MapRecord {
    fn key(&self) -> &str {
        &self.key
    }
}

impl Drawable for MapRecord {
    fn primitive(&self) -> Primitive {
        Primitive::Path {
            d: self.path.clone(),
            fill: self.fill,
            stroke: self.fill,
            opacity: self.opacity,
        }
    }

    fn collapsed_at(&self, _boundary: f64) -> Primitive {
        Primitive::Path {
            d: self.path.clone(),
            fill: self.fill,
            stroke: self.fill,
            opacity: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MapTooltipEvent {
    Show { id: String, x: f64, y: f64 },
    Hide,
}

const COUNTRIES: &str = "countries";
const DATA: &str = "data";
const TITLE: &str = "title";
const LEGEND: &str = "legend";

#[derive(Clone, Debug)]
pub struct ChoroplethChart {
    pub theme: ChartTheme,
    features: Vec<Feature>,
    scales: ScaleSet,
    /// Color bucket currently emphasized; other features fade.
    highlighted: Option<Hsla>,
    base: DecorationLayer,
    title: DecorationLayer,
    legend: DecorationLayer,
}

impl Default for ChoroplethChart {
    fn default() -> Self {
        Self {
            theme: ChartTheme::default(),
            features: Vec::new(),
            scales: ScaleSet::new(),
            highlighted: None,
            base: DecorationLayer::new(COUNTRIES),
            title: DecorationLayer::new(TITLE),
            legend: DecorationLayer::new(LEGEND),
        }
    }
}

impl ChoroplethChart {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            features,
            ..Self::default()
        }
    }

    /// Replaces the geometry. The caller redraws afterwards.
    pub fn set_features(&mut self, features: Vec<Feature>) {
        self.features = features;
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn scales(&self) -> &ScaleSet {
        &self.scales
    }

    /// Color for a value under the current scale.
    pub fn color(&self, value: Option<f64>) -> Option<Hsla> {
        self.scales.threshold().map(|s| s.map(value))
    }

    /// Emphasizes every feature sharing the color bucket of `value`.
    pub fn highlight_value(&mut self, value: Option<f64>) {
        self.highlighted = self.color(value);
    }

    pub fn reset_highlight(&mut self) {
        self.highlighted = None;
    }

    pub fn highlighted(&self) -> Option<Hsla> {
        self.highlighted
    }

    /// Pointer entered a feature: highlight its bucket and ask for a tooltip.
    pub fn pointer_enter(&mut self, data: &MapData, id: &str, x: f64, y: f64) -> MapTooltipEvent {
        self.highlight_value(data.value_of(id));
        MapTooltipEvent::Show {
            id: id.to_string(),
            x,
            y,
        }
    }

    pub fn pointer_leave(&mut self) -> MapTooltipEvent {
        self.reset_highlight();
        MapTooltipEvent::Hide
    }

    fn position_elements(surface: &mut dyn RenderSurface, dims: &Dimensions) -> Result<()> {
        surface.translate(COUNTRIES, dims.margin_left(), dims.margin_top())?;
        surface.translate(DATA, dims.margin_left(), dims.margin_top())?;
        surface.translate(TITLE, dims.mid_width(), dims.mid_margin_top())?;
        surface.translate(LEGEND, dims.mid_width(), dims.mid_margin_bottom())?;
        Ok(())
    }

    fn legend_items(&self, data: &MapData, config: &MapConfig) -> Vec<Decoration> {
        let width = config.legend.width;
        let height = config.legend.height;
        let no_data = parse_hex_or(&config.nodata.color, self.theme.grid_line);

        let mut out = Vec::with_capacity(data.thresholds.len() * 2);
        for (i, stop) in data.thresholds.iter().enumerate() {
            let x = i as f64 * width + if i > 0 { config.legend.nodata_separator } else { 0.0 };
            let fill = self.color(*stop).unwrap_or(no_data);
            let (label, label_x) = match stop {
                Some(v) => (format_decimal(*v, 2), x),
                None => (config.nodata.label.clone(), x + 0.5 * width),
            };
            out.push(Decoration::new(
                format!("icon__{}", i),
                Primitive::Rect {
                    x,
                    y: 0.0,
                    width,
                    height,
                    fill,
                    opacity: 1.0,
                },
            ));
            out.push(Decoration::new(
                format!("label__{}", i),
                Primitive::Text {
                    x: label_x,
                    y: height + config.legend.font_size + 1.0,
                    content: label,
                    size: config.legend.font_size,
                    fill: self.theme.axis_label,
                },
            ));
        }
        out
    }
}

impl ChartHooks for ChoroplethChart {
    type Data = MapData;
    type Config = MapConfig;
    type Record = MapRecord;

    fn set_elements(&mut self, surface: &mut dyn RenderSurface, dims: &Dimensions) -> Result<()> {
        for id in [COUNTRIES, DATA, TITLE, LEGEND] {
            surface.create_container(id)?;
        }
        Self::position_elements(surface, dims)
    }

    fn set_params(&mut self, ctx: &UpdateContext<'_, MapData, MapConfig>) -> Vec<MapRecord> {
        let config = ctx.config;
        let thresholds: Vec<f64> = ctx.data.thresholds.iter().skip(2).flatten().copied().collect();
        let colors = parse_palette(config.colors.as_slice()).unwrap_or_else(|err| {
            warn!(%err, "invalid map palette");
            Vec::new()
        });
        let no_data = parse_hex_or(&config.nodata.color, self.theme.grid_line);
        let scale = ThresholdScale::new(thresholds, colors, no_data);

        let values: HashMap<&str, Option<f64>> = ctx
            .data
            .data
            .iter()
            .map(|d| (d.id.as_str(), d.value))
            .collect();

        let records: Vec<MapRecord> = self
            .features
            .iter()
            .filter_map(|feature| {
                let value = *values.get(feature.id.as_str())?;
                let fill = scale.map(value);
                let opacity = match self.highlighted {
                    Some(color) if color != fill => config.faded_opacity,
                    _ => 1.0,
                };
                Some(MapRecord {
                    key: feature.id.clone(),
                    path: feature.path.clone(),
                    value,
                    fill,
                    opacity,
                })
            })
            .collect();

        self.scales = ScaleSet::new().with_color(ColorScale::Threshold(scale));
        debug!(
            features = self.features.len(),
            with_data = records.len(),
            "choropleth parameters set"
        );
        records
    }

    fn draw(
        &mut self,
        surface: &mut dyn RenderSurface,
        changes: &Reconciled<MapRecord>,
        ctx: &UpdateContext<'_, MapData, MapConfig>,
    ) -> Result<()> {
        let config = ctx.config;
        Self::position_elements(surface, &ctx.dims)?;

        let base_fill = parse_hex_or(&config.base_fill, self.theme.background);
        let base_stroke = parse_hex_or(&config.base_stroke, self.theme.grid_line);
        let base_opacity = if self.highlighted.is_some() {
            config.faded_opacity
        } else {
            1.0
        };
        let base = self
            .features
            .iter()
            .map(|f| {
                Decoration::new(
                    f.id.clone(),
                    Primitive::Path {
                        d: f.path.clone(),
                        fill: base_fill,
                        stroke: base_stroke,
                        opacity: base_opacity,
                    },
                )
            })
            .collect();
        self.base.sync(surface, base, Transition::none())?;

        apply_changes(surface, DATA, changes, ctx.transition())?;

        let title = vec![AxisRenderer::label("title", &ctx.data.title, 12.0, &self.theme)];
        self.title.sync(surface, title, Transition::none())?;

        let legend = self.legend_items(ctx.data, config);
        self.legend.sync(surface, legend, Transition::none())
    }
}
