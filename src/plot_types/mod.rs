// Chart hook implementations

pub mod bar;
pub mod choropleth;
pub mod group_stack;
pub mod map_series;
pub mod pie;
pub mod swarm;
pub mod timeline;

pub use bar::{BarChart, BarData, BarRecord};
pub use choropleth::{ChoroplethChart, Feature, MapData, MapDatum, MapRecord, MapTooltipEvent};
pub use group_stack::{GroupStackChart, GroupStackData, SegmentRecord};
pub use map_series::{MapSeries, PlaybackCursor, SeriesFields};
pub use pie::{pie_angles, ArcRecord, PieChart, PieData};
pub use swarm::{SwarmChart, SwarmData, SwarmDatum, SwarmRecord};
pub use timeline::{TimelineData, TimelinePoint, TimelineRecord, TimelineTooltip};

use crate::reconcile::{reconcile, Keyed, Reconciled};
use crate::rendering::{DrawCommand, Primitive, RenderSurface, Transition};
use eyre::Result;

/// A keyed record that knows its on-screen shape.
pub trait Drawable: Keyed {
    fn primitive(&self) -> Primitive;

    /// Zero-extent shape at `boundary`, used to grow in from and collapse into.
    fn collapsed_at(&self, boundary: f64) -> Primitive;
}

/// Emits exit, update and enter commands for one container.
pub fn apply_changes<T: Drawable>(
    surface: &mut dyn RenderSurface,
    container: &str,
    changes: &Reconciled<T>,
    transition: Transition,
) -> Result<()> {
    for gone in &changes.exiting {
        surface.apply(
            container,
            DrawCommand::Exit {
                key: gone.record.key().to_string(),
                to: gone.record.collapsed_at(gone.boundary),
                transition,
            },
        )?;
    }
    for kept in &changes.updating {
        surface.apply(
            container,
            DrawCommand::Update {
                key: kept.current.key().to_string(),
                to: kept.current.primitive(),
                transition,
            },
        )?;
    }
    for born in &changes.entering {
        surface.apply(
            container,
            DrawCommand::Enter {
                key: born.record.key().to_string(),
                from: born.record.collapsed_at(born.boundary),
                to: born.record.primitive(),
                transition,
            },
        )?;
    }
    Ok(())
}

/// Non-data element (axis tick, title, label).
#[derive(Clone, Debug, PartialEq)]
pub struct Decoration {
    pub key: String,
    pub primitive: Primitive,
}

impl Decoration {
    pub fn new(key: impl Into<String>, primitive: Primitive) -> Self {
        Self {
            key: key.into(),
            primitive,
        }
    }
}

impl Keyed for Decoration {
    fn key(&self) -> &str {
        &self.key
    }
}

impl Drawable for Decoration {
    fn primitive(&self) -> Primitive {
        self.primitive.clone()
    }

    fn collapsed_at(&self, _boundary: f64) -> Primitive {
        self.primitive.clone()
    }
}

/// Keeps the decorations of one container in sync across draws.
#[derive(Clone, Debug, Default)]
pub struct DecorationLayer {
    container: String,
    previous: Vec<Decoration>,
}

impl DecorationLayer {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            previous: Vec::new(),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn sync(
        &mut self,
        surface: &mut dyn RenderSurface,
        next: Vec<Decoration>,
        transition: Transition,
    ) -> Result<()> {
        let changes = reconcile(&self.previous, &next);
        apply_changes(surface, &self.container, &changes, transition)?;
        self.previous = next;
        Ok(())
    }
}
