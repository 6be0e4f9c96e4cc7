// Legend visibility state and item layout

use crate::data_types::CategoryValue;
use crate::rendering::Primitive;
use gpui::Hsla;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq)]
pub struct LegendItem {
    pub id: CategoryValue,
    pub label: String,
    pub color: Hsla,
}

impl LegendItem {
    pub fn new(id: impl Into<CategoryValue>, label: impl Into<String>, color: Hsla) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    /// Gap between consecutive items.
    pub separator: f64,
    pub hidden_opacity: f64,
    pub radius: f64,
    /// Gap between the swatch and its label.
    pub text_separator: f64,
    pub font_size: f64,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            separator: 10.0,
            hidden_opacity: 0.3,
            radius: 3.0,
            text_separator: 5.0,
            font_size: 12.0,
        }
    }
}

/// What the host should react to after a pointer interaction.
#[derive(Clone, Debug, PartialEq)]
pub enum LegendEvent {
    Highlighted(CategoryValue),
    Reset(CategoryValue),
    Clicked(CategoryValue),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LegendState {
    items: Vec<LegendItem>,
    hidden: BTreeSet<CategoryValue>,
    highlighted: Option<CategoryValue>,
}

impl LegendState {
    pub fn new(items: Vec<LegendItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Replaces the items. Hidden ids that no longer exist are forgotten.
    pub fn set_items(&mut self, items: Vec<LegendItem>) {
        self.hidden
            .retain(|id| items.iter().any(|item| &item.id == id));
        self.items = items;
    }

    pub fn items(&self) -> &[LegendItem] {
        &self.items
    }

    pub fn hidden(&self) -> &BTreeSet<CategoryValue> {
        &self.hidden
    }

    pub fn is_hidden(&self, id: &CategoryValue) -> bool {
        self.hidden.contains(id)
    }

    pub fn visible_ids(&self) -> Vec<CategoryValue> {
        self.items
            .iter()
            .filter(|item| !self.hidden.contains(&item.id))
            .map(|item| item.id.clone())
            .collect()
    }

    pub fn toggle(&mut self, id: &CategoryValue) {
        if !self.hidden.remove(id) {
            self.hidden.insert(id.clone());
        }
    }

    pub fn hide_all_others(&mut self, id: &CategoryValue) {
        self.hidden = self
            .items
            .iter()
            .filter(|item| &item.id != id)
            .map(|item| item.id.clone())
            .collect();
    }

    /// Flips the visibility of every item.
    pub fn reverse_hidden(&mut self) {
        let ids: Vec<CategoryValue> = self.items.iter().map(|item| item.id.clone()).collect();
        for id in &ids {
            self.toggle(id);
        }
    }

    fn all_others_hidden(&self, id: &CategoryValue) -> bool {
        !self.hidden.contains(id) && self.hidden.len() + 1 == self.items.len()
    }

    /// First click isolates the item, clicking the only visible item flips every item, any other
    /// click toggles.
    pub fn natural_click(&mut self, id: &CategoryValue) {
        if self.hidden.is_empty() {
            self.hide_all_others(id);
        } else if self.all_others_hidden(id) {
            self.reverse_hidden();
        } else {
            self.toggle(id);
        }
    }

    pub fn click(&mut self, id: &CategoryValue) -> LegendEvent {
        self.natural_click(id);
        LegendEvent::Clicked(id.clone())
    }

    pub fn pointer_enter(&mut self, id: &CategoryValue) -> LegendEvent {
        self.highlighted = Some(id.clone());
        LegendEvent::Highlighted(id.clone())
    }

    pub fn pointer_leave(&mut self, id: &CategoryValue) -> LegendEvent {
        self.highlighted = None;
        LegendEvent::Reset(id.clone())
    }

    pub fn highlighted(&self) -> Option<&CategoryValue> {
        self.highlighted.as_ref()
    }

    /// Lays items out left to right as swatch and label pairs, keyed by item id.
    ///
    /// Label width is estimated from the font size since no text metrics are available here.
    pub fn primitives(&self, config: &LegendConfig) -> Vec<(String, Primitive)> {
        let mut out = Vec::with_capacity(self.items.len() * 2);
        let mut offset = 0.0;
        for item in &self.items {
            let opacity = if self.is_hidden(&item.id) {
                config.hidden_opacity as f32
            } else {
                1.0
            };
            let color = Hsla {
                a: item.color.a * opacity,
                ..item.color
            };
            let label_x = offset + 2.0 * config.radius + config.text_separator;

            out.push((
                format!("{}__icon", item.id),
                Primitive::Circle {
                    cx: offset + config.radius,
                    cy: config.radius,
                    r: config.radius,
                    fill: color,
                },
            ));
            out.push((
                format!("{}__label", item.id),
                Primitive::Text {
                    x: label_x,
                    y: config.radius,
                    content: item.label.clone(),
                    size: config.font_size,
                    fill: Hsla {
                        a: opacity,
                        ..gpui::black()
                    },
                },
            ));

            let label_width = item.label.chars().count() as f64 * config.font_size * 0.6;
            offset = label_x + label_width + config.separator;
        }
        out
    }
}
