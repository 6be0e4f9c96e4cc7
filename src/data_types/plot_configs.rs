use super::dimensions::Margins;
use eyre::{Result, WrapErr};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configuration understood by the lifecycle. Everything else is chart-specific.
pub trait ChartConfig: Clone + Default + Serialize + DeserializeOwned {
    fn margins(&self) -> Margins;

    /// Duration of enter/update/exit transitions, in milliseconds.
    fn transition_ms(&self) -> u64 {
        0
    }

    /// Builds a configuration from the defaults overridden by `partial`.
    fn from_partial(partial: &Value) -> Result<Self> {
        merge_config(&Self::default(), partial)
    }
}

/// Deep-merges a partial JSON object over `defaults` and returns a new value.
///
/// Objects merge key by key, any other value replaces the default. `null` leaves the default.
pub fn merge_config<C>(defaults: &C, partial: &Value) -> Result<C>
where
    C: Serialize + DeserializeOwned,
{
    let mut base = serde_json::to_value(defaults).wrap_err("failed to serialize default config")?;
    merge_values(&mut base, partial);
    serde_json::from_value(base).wrap_err("partial config does not match the expected shape")
}

fn merge_values(base: &mut Value, partial: &Value) {
    match (base, partial) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(partial_map)) => {
            for (key, value) in partial_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub normal: u64,
    pub slow: u64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            normal: 300,
            slow: 1000,
        }
    }
}

/// Two-stop color ramp, light end first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RampConfig {
    pub light: String,
    pub deep: String,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            light: "#deebf7".to_string(),
            deep: "#08519c".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarChartConfig {
    pub margins: Margins,
    pub transition: u64,
    pub padding_inner: f64,
    pub padding_outer: f64,
    pub color: String,
}

impl Default for BarChartConfig {
    fn default() -> Self {
        Self {
            margins: Margins::new(15.0, 20.0, 16.0, 10.0),
            transition: 300,
            padding_inner: 0.2,
            padding_outer: 0.2,
            color: "#4e79a7".to_string(),
        }
    }
}

impl ChartConfig for BarChartConfig {
    fn margins(&self) -> Margins {
        self.margins
    }

    fn transition_ms(&self) -> u64 {
        self.transition
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupStackConfig {
    pub margins: Margins,
    pub hidden_opacity: f64,
    pub font_size: f64,
    pub transitions: TransitionConfig,
    pub padding_inner: f64,
    pub padding_outer: f64,
    /// Inner padding between groups drawn side by side inside one domain band.
    pub group_padding: f64,
    pub colors: RampConfig,
}

impl Default for GroupStackConfig {
    fn default() -> Self {
        Self {
            margins: Margins::new(40.0, 20.0, 80.0, 50.0),
            hidden_opacity: 0.3,
            font_size: 12.0,
            transitions: TransitionConfig::default(),
            padding_inner: 0.2,
            padding_outer: 0.2,
            group_padding: 0.1,
            colors: RampConfig::default(),
        }
    }
}

impl ChartConfig for GroupStackConfig {
    fn margins(&self) -> Margins {
        self.margins
    }

    fn transition_ms(&self) -> u64 {
        self.transitions.normal
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcStyle {
    pub stroke: String,
    pub stroke_width: f64,
    pub pad_angle: f64,
}

impl Default for ArcStyle {
    fn default() -> Self {
        Self {
            stroke: "#ffffff".to_string(),
            stroke_width: 1.0,
            pad_angle: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieConfig {
    pub margins: Margins,
    /// Inner radius as a fraction of the outer radius; 0 draws a pie, anything above a donut.
    pub inner_radius_coef: f64,
    pub hidden_opacity: f64,
    pub transition: u64,
    pub arcs: ArcStyle,
}

impl Default for PieConfig {
    fn default() -> Self {
        Self {
            margins: Margins::new(40.0, 20.0, 40.0, 20.0),
            inner_radius_coef: 0.5,
            hidden_opacity: 0.3,
            transition: 1000,
            arcs: ArcStyle::default(),
        }
    }
}

impl ChartConfig for PieConfig {
    fn margins(&self) -> Margins {
        self.margins
    }

    fn transition_ms(&self) -> u64 {
        self.transition
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    pub margins: Margins,
    pub radius: f64,
    pub ticks: usize,
    pub strength_x: f64,
    pub strength_y: f64,
    /// Outer padding of the category point scale.
    pub padding: f64,
    pub transition: u64,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            margins: Margins::new(30.0, 20.0, 50.0, 50.0),
            radius: 2.0,
            ticks: 50,
            strength_x: 0.8,
            strength_y: 1.0,
            padding: 0.5,
            transition: 250,
        }
    }
}

impl ChartConfig for SwarmConfig {
    fn margins(&self) -> Margins {
        self.margins
    }

    fn transition_ms(&self) -> u64 {
        self.transition
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoDataConfig {
    pub color: String,
    pub label: String,
}

impl Default for NoDataConfig {
    fn default() -> Self {
        Self {
            color: "#b4b4b4".to_string(),
            label: "no data".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapLegendConfig {
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub nodata_separator: f64,
}

impl Default for MapLegendConfig {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 10.0,
            font_size: 10.0,
            nodata_separator: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub margins: Margins,
    pub base_fill: String,
    pub base_stroke: String,
    pub faded_opacity: f64,
    pub nodata: NoDataConfig,
    pub legend: MapLegendConfig,
    /// Threshold palette, one color per bucket.
    pub colors: Vec<String>,
    pub transition: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            margins: Margins::new(40.0, 20.0, 40.0, 20.0),
            base_fill: "#ffffff".to_string(),
            base_stroke: "#aaaaaa".to_string(),
            faded_opacity: 0.3,
            nodata: NoDataConfig::default(),
            legend: MapLegendConfig::default(),
            colors: crate::theme::ORANGES_9.iter().map(|c| c.to_string()).collect(),
            transition: 0,
        }
    }
}

impl ChartConfig for MapConfig {
    fn margins(&self) -> Margins {
        self.margins
    }

    fn transition_ms(&self) -> u64 {
        self.transition
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub margins: Margins,
    pub width: f64,
    pub height: f64,
    pub line_stroke: String,
    pub area_fill: String,
    pub area_opacity: f64,
    pub circle_radius: f64,
    pub decimal_places: usize,
    pub time_format: String,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            margins: Margins::new(25.0, 20.0, 20.0, 25.0),
            width: 270.0,
            height: 150.0,
            line_stroke: "#e15759".to_string(),
            area_fill: "#e15759".to_string(),
            area_opacity: 0.2,
            circle_radius: 3.0,
            decimal_places: 1,
            time_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl ChartConfig for TimelineConfig {
    fn margins(&self) -> Margins {
        self.margins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_keeps_untouched_defaults() {
        let defaults = GroupStackConfig::default();
        let merged = merge_config(&defaults, &json!({"margins": {"left": 10.0}})).unwrap();
        assert_eq!(merged.margins.left, 10.0);
        assert_eq!(merged.margins.top, defaults.margins.top);
        assert_eq!(merged.transitions, defaults.transitions);
        // Defaults are never touched
        assert_eq!(defaults, GroupStackConfig::default());
    }

    #[test]
    fn test_merge_replaces_arrays() {
        let merged = MapConfig::from_partial(&json!({"colors": ["#000000"]})).unwrap();
        assert_eq!(merged.colors, vec!["#000000".to_string()]);
    }

    #[test]
    fn test_merge_ignores_null_and_rejects_bad_shape() {
        let merged = PieConfig::from_partial(&json!({"transition": null})).unwrap();
        assert_eq!(merged.transition, 1000);
        assert!(PieConfig::from_partial(&json!({"transition": "slow"})).is_err());
    }
}
