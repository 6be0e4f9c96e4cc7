use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// A raw input record. Field names are chosen by the caller.
pub type Row = serde_json::Map<String, Value>;

/// Categorical identity used for the domain, group and stack axes.
///
/// `Null` is a real bucket (rows whose field is missing or `null`), not an absence.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryValue {
    #[default]
    Null,
    Num(f64),
    Str(String),
}

impl CategoryValue {
    /// Reads a categorical field from a row. Missing fields land in the `Null` bucket.
    pub fn from_field(row: &Row, field: &str) -> Self {
        row.get(field).map(Self::from).unwrap_or(Self::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Num(_) => 1,
            Self::Str(_) => 2,
        }
    }
}

impl From<&Value> for CategoryValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Number(n) => n.as_f64().map(Self::Num).unwrap_or(Self::Null),
            Value::String(s) => Self::Str(s.clone()),
            Value::Bool(b) => Self::Str(b.to_string()),
            other => Self::Str(other.to_string()),
        }
    }
}

impl From<&str> for CategoryValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for CategoryValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<f64> for CategoryValue {
    fn from(value: f64) -> Self {
        Self::Num(value)
    }
}

impl From<i64> for CategoryValue {
    fn from(value: i64) -> Self {
        Self::Num(value as f64)
    }
}

impl PartialEq for CategoryValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CategoryValue {}

impl PartialOrd for CategoryValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CategoryValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Num(a), Self::Num(b)) => a.total_cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl std::hash::Hash for CategoryValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Null => {}
            Self::Num(n) => n.to_bits().hash(state),
            Self::Str(s) => s.hash(state),
        }
    }
}

impl fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            // Integral numbers print without a fractional part (2020, not 2020.0)
            Self::Num(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Num(n) => write!(f, "{}", n),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Reads a numeric field. Numeric strings are parsed, everything else counts as zero.
pub fn numeric_field(row: &Row, field: &str) -> f64 {
    match row.get(field) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Builds the stable identity of a band: `domain__group__stack`, skipping absent dimensions.
pub fn band_key(
    domain: &CategoryValue,
    group: Option<&CategoryValue>,
    stack: Option<&CategoryValue>,
) -> String {
    let mut key = domain.to_string();
    for segment in [group, stack].into_iter().flatten() {
        key.push_str("__");
        key.push_str(&segment.to_string());
    }
    key
}

/// One aggregated `(domain, group, stack) -> value` record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub key: String,
    pub domain: CategoryValue,
    /// `None` when the group dimension is not part of the aggregation.
    pub group: Option<CategoryValue>,
    /// `None` when the stack dimension is not part of the aggregation.
    pub stack: Option<CategoryValue>,
    pub value: f64,
}

impl Band {
    pub fn new(
        domain: CategoryValue,
        group: Option<CategoryValue>,
        stack: Option<CategoryValue>,
        value: f64,
    ) -> Self {
        let key = band_key(&domain, group.as_ref(), stack.as_ref());
        Self {
            key,
            domain,
            group,
            stack,
            value,
        }
    }

    /// Key of the `(domain, group)` column this band is stacked in.
    pub fn column_key(&self) -> String {
        band_key(&self.domain, self.group.as_ref(), None)
    }
}

/// A band placed inside its `(domain, group)` column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackedBand {
    #[serde(flatten)]
    pub band: Band,
    pub min: f64,
    pub max: f64,
    pub index: usize,
}

impl StackedBand {
    pub fn key(&self) -> &str {
        &self.band.key
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// A swarm point: scale-derived targets plus solver state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointDatum {
    pub id: String,
    pub category: CategoryValue,
    pub group: CategoryValue,
    pub value: f64,
    pub target_x: f64,
    pub target_y: f64,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl PointDatum {
    pub fn new(
        id: impl Into<String>,
        category: CategoryValue,
        group: CategoryValue,
        value: f64,
        target_x: f64,
        target_y: f64,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            group,
            value,
            target_x,
            target_y,
            x: target_x,
            y: target_y,
            vx: 0.0,
            vy: 0.0,
        }
    }
}
