use super::choropleth::{MapData, MapDatum};
use crate::data_types::{numeric_field, Row};
use crate::utils::date_formatter::{format_millis, parse_date};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

const TITLE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Field names of a long-format map time series.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesFields {
    pub id: String,
    pub date: String,
    pub value: String,
}

impl Default for SeriesFields {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            date: "date".to_string(),
            value: "value".to_string(),
        }
    }
}

/// Map values grouped by day, with a current day feeding the choropleth.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapSeries {
    title: String,
    thresholds: Vec<Option<f64>>,
    by_date: BTreeMap<i64, Vec<MapDatum>>,
    current: Option<i64>,
}

impl MapSeries {
    /// Groups rows by date. The latest date becomes current.
    ///
    /// Dates are `YYYY-MM-DD` / RFC 3339 strings or epoch milliseconds. Rows without a usable
    /// date or id are skipped.
    pub fn from_rows(
        rows: &[Row],
        fields: &SeriesFields,
        title: impl Into<String>,
        thresholds: Vec<Option<f64>>,
    ) -> Self {
        let mut by_date: BTreeMap<i64, Vec<MapDatum>> = BTreeMap::new();
        let mut skipped = 0usize;

        for row in rows {
            let date = match row.get(&fields.date) {
                Some(Value::String(s)) => parse_date(s),
                Some(Value::Number(n)) => n.as_f64().map(|ms| ms as i64),
                _ => None,
            };
            let id = match row.get(&fields.id) {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };
            let (Some(date), Some(id)) = (date, id) else {
                skipped += 1;
                continue;
            };
            let value = match row.get(&fields.value) {
                None | Some(Value::Null) => None,
                Some(_) => Some(numeric_field(row, &fields.value)),
            };
            by_date.entry(date).or_default().push(MapDatum { id, value });
        }

        let current = by_date.keys().next_back().copied();
        debug!(dates = by_date.len(), skipped, "map series grouped");
        Self {
            title: title.into(),
            thresholds,
            by_date,
            current,
        }
    }

    pub fn dates(&self) -> Vec<i64> {
        self.by_date.keys().copied().collect()
    }

    /// First and last date, `None` for an empty series.
    pub fn date_range(&self) -> Option<(i64, i64)> {
        let first = self.by_date.keys().next()?;
        let last = self.by_date.keys().next_back()?;
        Some((*first, *last))
    }

    pub fn current_date(&self) -> Option<i64> {
        self.current
    }

    /// Selects a date. Returns `false` (and keeps the current one) for unknown dates.
    pub fn set_current_date(&mut self, date: i64) -> bool {
        if self.by_date.contains_key(&date) {
            self.current = Some(date);
            true
        } else {
            false
        }
    }

    /// Selects the date at `index` in ascending order.
    pub fn set_current_index(&mut self, index: usize) -> bool {
        match self.by_date.keys().nth(index).copied() {
            Some(date) => self.set_current_date(date),
            None => false,
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        let current = self.current?;
        self.by_date.keys().position(|d| *d == current)
    }

    /// Title decorated with the current date, e.g. `Deaths (2021-03-04)`.
    pub fn title(&self) -> String {
        match self.current {
            Some(date) => format!("{} ({})", self.title, format_millis(date, TITLE_DATE_FORMAT)),
            None => self.title.clone(),
        }
    }

    /// Choropleth input for the current date.
    pub fn map_data(&self) -> MapData {
        MapData {
            title: self.title(),
            data: self
                .current
                .and_then(|d| self.by_date.get(&d))
                .cloned()
                .unwrap_or_default(),
            thresholds: self.thresholds.clone(),
        }
    }

    /// Cursor over date indices, positioned on the current date.
    pub fn cursor(&self, step: usize) -> PlaybackCursor {
        let max = self.by_date.len().saturating_sub(1) as f64;
        let mut cursor = PlaybackCursor::new(0.0, max, step as f64);
        cursor.set_value(self.current_index().unwrap_or(0) as f64);
        cursor
    }
}

/// Play/pause slider state. Each [`tick`](Self::tick) advances by `step` until `max`.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackCursor {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    value: f64,
    paused: bool,
}

impl PlaybackCursor {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self {
            min,
            max,
            step,
            value: min,
            paused: true,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Manual seek. Returns the value to emit.
    pub fn set_value(&mut self, value: f64) -> f64 {
        self.value = value.clamp(self.min, self.max.max(self.min));
        self.value
    }

    pub fn play(&mut self) {
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn toggle(&mut self) {
        if self.paused {
            self.play();
        } else {
            self.pause();
        }
    }

    /// One playback step. `None` while paused; reaching the end pauses playback.
    pub fn tick(&mut self) -> Option<f64> {
        if self.paused {
            return None;
        }
        if self.value < self.max {
            self.value = (self.value + self.step).min(self.max);
            Some(self.value)
        } else {
            self.paused = true;
            None
        }
    }
}
