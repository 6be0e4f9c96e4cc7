use crate::data_types::CategoryValue;
use crate::theme::sample_ramp;
use d3rs::scale::{LinearScale as D3LinearScale, Scale as D3Scale};
use gpui::Hsla;
use std::collections::BTreeMap;

/// Continuous `f64 -> f64` mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let mut d_min = domain.0;
        let mut d_max = domain.1;
        if !d_min.is_finite() || !d_max.is_finite() {
            d_min = 0.0;
            d_max = 1.0;
        }
        if (d_max - d_min).abs() < f64::EPSILON {
            d_min -= 0.5;
            d_max += 0.5;
        }
        Self {
            domain: (d_min, d_max),
            range,
        }
    }

    /// Domain `[min(0, data_min), data_max]` so bars never float off the baseline.
    /// Empty or flat data yields a unit domain.
    pub fn for_values<I>(values: I, range: (f64, f64)) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if min > max {
            return Self::new((0.0, 1.0), range);
        }
        let lo = min.min(0.0);
        let hi = if max <= lo { lo + 1.0 } else { max };
        Self::new((lo, hi), range)
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let res = r0 + (value - d0) / (d1 - d0) * (r1 - r0);
        if res.is_nan() || res.is_infinite() {
            0.0
        } else {
            res
        }
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if (r1 - r0).abs() < f64::EPSILON {
            return d0;
        }
        d0 + (pixel - r0) / (r1 - r0) * (d1 - d0)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        D3LinearScale::new()
            .domain(self.domain.0, self.domain.1)
            .range(0.0, 1.0)
            .ticks(count)
    }
}

/// Categorical bands with inner/outer padding, centered in the range.
#[derive(Clone, Debug, PartialEq)]
pub struct BandScale {
    domain: Vec<CategoryValue>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    pub const DEFAULT_PADDING: f64 = 0.2;

    /// `domain` is sorted and deduplicated.
    pub fn new(
        domain: Vec<CategoryValue>,
        range: (f64, f64),
        padding_inner: f64,
        padding_outer: f64,
    ) -> Self {
        let mut domain = domain;
        domain.sort();
        domain.dedup();

        let padding_inner = padding_inner.clamp(0.0, 1.0);
        let padding_outer = padding_outer.max(0.0);
        let n = domain.len() as f64;
        let (lo, hi) = if range.1 < range.0 {
            (range.1, range.0)
        } else {
            (range.0, range.1)
        };
        let step = (hi - lo) / (n - padding_inner + padding_outer * 2.0).max(1.0);
        let start = lo + (hi - lo - step * (n - padding_inner)) * 0.5;
        let bandwidth = step * (1.0 - padding_inner);

        Self {
            domain,
            range,
            padding_inner,
            padding_outer,
            start,
            step,
            bandwidth,
        }
    }

    /// Start of the band for `value`, `None` for values outside the domain.
    pub fn map(&self, value: &CategoryValue) -> Option<f64> {
        let index = self.domain.binary_search(value).ok()?;
        let index = if self.range.1 < self.range.0 {
            self.domain.len() - 1 - index
        } else {
            index
        };
        Some(self.start + self.step * index as f64)
    }

    /// Center of the band for `value`.
    pub fn center(&self, value: &CategoryValue) -> Option<f64> {
        self.map(value).map(|x| x + 0.5 * self.bandwidth)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn domain(&self) -> &[CategoryValue] {
        &self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn padding(&self) -> (f64, f64) {
        (self.padding_inner, self.padding_outer)
    }
}

/// Evenly spaced points: a band scale with zero-width bands.
#[derive(Clone, Debug, PartialEq)]
pub struct PointScale(BandScale);

impl PointScale {
    pub fn new(domain: Vec<CategoryValue>, range: (f64, f64), padding: f64) -> Self {
        Self(BandScale::new(domain, range, 1.0, padding))
    }

    pub fn map(&self, value: &CategoryValue) -> Option<f64> {
        self.0.map(value)
    }

    pub fn step(&self) -> f64 {
        self.0.step()
    }

    pub fn domain(&self) -> &[CategoryValue] {
        self.0.domain()
    }

    pub fn range(&self) -> (f64, f64) {
        self.0.range()
    }
}

/// Maps an index in `[0, n]` onto a color ramp; domain is `[n, 0]` so index 0 gets the deep end.
#[derive(Clone, Debug)]
pub struct SequentialScale {
    domain: (f64, f64),
    ramp: Vec<Hsla>,
}

impl SequentialScale {
    pub fn for_count(count: usize, ramp: Vec<Hsla>) -> Self {
        let domain = if count == 0 { (1.0, 0.0) } else { (count as f64, 0.0) };
        Self { domain, ramp }
    }

    pub fn map(&self, value: f64) -> Hsla {
        let (d0, d1) = self.domain;
        sample_ramp(&self.ramp, (value - d0) / (d1 - d0))
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }
}

/// Category -> palette entry, cycling when categories outnumber colors.
#[derive(Clone, Debug)]
pub struct OrdinalScale {
    domain: Vec<CategoryValue>,
    palette: Vec<Hsla>,
    unknown: Hsla,
}

impl OrdinalScale {
    /// Keeps the domain order given by the caller.
    pub fn new(domain: Vec<CategoryValue>, palette: Vec<Hsla>) -> Self {
        Self {
            domain,
            palette,
            unknown: gpui::black().alpha(0.5),
        }
    }

    pub fn map(&self, value: &CategoryValue) -> Hsla {
        match self.domain.iter().position(|d| d == value) {
            Some(i) if !self.palette.is_empty() => self.palette[i % self.palette.len()],
            _ => self.unknown,
        }
    }

    pub fn domain(&self) -> &[CategoryValue] {
        &self.domain
    }
}

/// Buckets values by sorted thresholds; `n` thresholds select among `n + 1` colors.
#[derive(Clone, Debug)]
pub struct ThresholdScale {
    thresholds: Vec<f64>,
    colors: Vec<Hsla>,
    no_data: Hsla,
}

impl ThresholdScale {
    pub fn new(thresholds: Vec<f64>, colors: Vec<Hsla>, no_data: Hsla) -> Self {
        let mut thresholds: Vec<f64> = thresholds.into_iter().filter(|t| t.is_finite()).collect();
        thresholds.sort_by(|a, b| a.total_cmp(b));
        Self {
            thresholds,
            colors,
            no_data,
        }
    }

    /// Bucket index of `value` (bisect right).
    pub fn bucket(&self, value: f64) -> usize {
        self.thresholds.partition_point(|t| *t <= value)
    }

    pub fn map(&self, value: Option<f64>) -> Hsla {
        match value {
            Some(v) if !v.is_nan() && !self.colors.is_empty() => {
                self.colors[self.bucket(v).min(self.colors.len() - 1)]
            }
            _ => self.no_data,
        }
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn no_data(&self) -> Hsla {
        self.no_data
    }
}

/// Positional scale stored in a [`ScaleSet`].
#[derive(Clone, Debug, PartialEq)]
pub enum ChartScale {
    Band(BandScale),
    Point(PointScale),
    Linear(LinearScale),
}

impl ChartScale {
    pub fn new_linear(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self::Linear(LinearScale::new(domain, range))
    }

    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Band(s) => s.range(),
            Self::Point(s) => s.range(),
            Self::Linear(s) => s.range(),
        }
    }

    /// Zero for linear and point scales.
    pub fn bandwidth(&self) -> f64 {
        match self {
            Self::Band(s) => s.bandwidth(),
            _ => 0.0,
        }
    }

    pub fn map_category(&self, value: &CategoryValue) -> Option<f64> {
        match self {
            Self::Band(s) => s.map(value),
            Self::Point(s) => s.map(value),
            Self::Linear(s) => match value {
                CategoryValue::Num(n) => Some(s.map(*n)),
                _ => None,
            },
        }
    }

    pub fn map_value(&self, value: f64) -> Option<f64> {
        match self {
            Self::Linear(s) => Some(s.map(value)),
            _ => self.map_category(&CategoryValue::Num(value)),
        }
    }
}

#[derive(Clone, Debug)]
pub enum ColorScale {
    Sequential(SequentialScale),
    Ordinal(OrdinalScale),
    Threshold(ThresholdScale),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleKind {
    Band,
    Point,
    Linear,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ScaleDomain {
    Categories(Vec<CategoryValue>),
    Values(Vec<f64>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScaleOptions {
    pub padding_inner: f64,
    pub padding_outer: f64,
    /// Flips the range so larger values land at smaller coordinates.
    pub vertical: bool,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            padding_inner: BandScale::DEFAULT_PADDING,
            padding_outer: BandScale::DEFAULT_PADDING,
            vertical: false,
        }
    }
}

/// Builds a positional scale. Point scales use `padding_outer` as their edge padding.
pub fn build_scale(
    kind: ScaleKind,
    domain: ScaleDomain,
    range: (f64, f64),
    options: &ScaleOptions,
) -> ChartScale {
    let range = if options.vertical {
        (range.1, range.0)
    } else {
        range
    };
    match kind {
        ScaleKind::Band => ChartScale::Band(BandScale::new(
            domain.into_categories(),
            range,
            options.padding_inner,
            options.padding_outer,
        )),
        ScaleKind::Point => ChartScale::Point(PointScale::new(
            domain.into_categories(),
            range,
            options.padding_outer,
        )),
        ScaleKind::Linear => ChartScale::Linear(LinearScale::for_values(domain.into_values(), range)),
    }
}

impl ScaleDomain {
    fn into_categories(self) -> Vec<CategoryValue> {
        match self {
            Self::Categories(c) => c,
            Self::Values(v) => v.into_iter().map(CategoryValue::Num).collect(),
        }
    }

    fn into_values(self) -> Vec<f64> {
        match self {
            Self::Values(v) => v,
            Self::Categories(c) => c
                .into_iter()
                .filter_map(|c| match c {
                    CategoryValue::Num(n) => Some(n),
                    _ => None,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScaleRole {
    X,
    /// Sub-band inside an X band (grouped bars).
    X1,
    Y,
}

/// The scales of one chart instance. Replaced wholesale on every parameter update.
#[derive(Clone, Debug, Default)]
pub struct ScaleSet {
    positional: BTreeMap<ScaleRole, ChartScale>,
    color: Option<ColorScale>,
}

impl ScaleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, role: ScaleRole, scale: ChartScale) -> Self {
        self.positional.insert(role, scale);
        self
    }

    pub fn with_color(mut self, scale: ColorScale) -> Self {
        self.color = Some(scale);
        self
    }

    pub fn get(&self, role: ScaleRole) -> Option<&ChartScale> {
        self.positional.get(&role)
    }

    pub fn band(&self, role: ScaleRole) -> Option<&BandScale> {
        match self.get(role) {
            Some(ChartScale::Band(s)) => Some(s),
            _ => None,
        }
    }

    pub fn point(&self, role: ScaleRole) -> Option<&PointScale> {
        match self.get(role) {
            Some(ChartScale::Point(s)) => Some(s),
            _ => None,
        }
    }

    pub fn linear(&self, role: ScaleRole) -> Option<&LinearScale> {
        match self.get(role) {
            Some(ChartScale::Linear(s)) => Some(s),
            _ => None,
        }
    }

    pub fn color(&self) -> Option<&ColorScale> {
        self.color.as_ref()
    }

    pub fn sequential(&self) -> Option<&SequentialScale> {
        match &self.color {
            Some(ColorScale::Sequential(s)) => Some(s),
            _ => None,
        }
    }

    pub fn ordinal(&self) -> Option<&OrdinalScale> {
        match &self.color {
            Some(ColorScale::Ordinal(s)) => Some(s),
            _ => None,
        }
    }

    pub fn threshold(&self) -> Option<&ThresholdScale> {
        match &self.color {
            Some(ColorScale::Threshold(s)) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.color.is_none()
    }
}
