// Rendering surface contract and an in-memory implementation

use eyre::{eyre, Result};
use gpui::Hsla;
use std::collections::BTreeMap;

/// Shapes the chart layer asks a surface to show.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Hsla,
        opacity: f64,
    },
    Arc {
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        end_angle: f64,
        pad_angle: f64,
        fill: Hsla,
        stroke: Hsla,
        stroke_width: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: Hsla,
    },
    /// Opaque geometry (e.g. a projected map feature) styled by the chart.
    Path {
        d: String,
        fill: Hsla,
        stroke: Hsla,
        opacity: f64,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        stroke: Hsla,
        fill: Option<Hsla>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: Hsla,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        size: f64,
        fill: Hsla,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transition {
    pub duration_ms: u64,
}

impl Transition {
    pub fn new(duration_ms: u64) -> Self {
        Self { duration_ms }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

/// One mutation of a keyed element inside a container.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Create `key` showing `from`, then animate to `to`.
    Enter {
        key: String,
        from: Primitive,
        to: Primitive,
        transition: Transition,
    },
    /// Animate an existing element to `to`.
    Update {
        key: String,
        to: Primitive,
        transition: Transition,
    },
    /// Animate an existing element to `to`, then remove it.
    Exit {
        key: String,
        to: Primitive,
        transition: Transition,
    },
}

/// Capability through which charts mutate the screen.
///
/// Core algorithms never see a surface; only chart hooks do.
pub trait RenderSurface {
    /// Creates a persistent container. Called once per container during initialization.
    fn create_container(&mut self, id: &str) -> Result<()>;

    /// Moves a container's origin.
    fn translate(&mut self, id: &str, x: f64, y: f64) -> Result<()>;

    fn apply(&mut self, container: &str, command: DrawCommand) -> Result<()>;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Container {
    pub origin: (f64, f64),
    /// Live elements by key.
    pub elements: BTreeMap<String, Primitive>,
    pub log: Vec<DrawCommand>,
}

/// Surface that records the resulting scene. Transitions complete instantly.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    containers: BTreeMap<String, Container>,
    creations: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container(&self, id: &str) -> Option<&Container> {
        self.containers.get(id)
    }

    pub fn element(&self, container: &str, key: &str) -> Option<&Primitive> {
        self.containers.get(container)?.elements.get(key)
    }

    pub fn element_count(&self, container: &str) -> usize {
        self.containers.get(container).map_or(0, |c| c.elements.len())
    }

    /// Total container creations, to check one-time initialization.
    pub fn creations(&self) -> usize {
        self.creations
    }

    pub fn container_ids(&self) -> Vec<&str> {
        self.containers.keys().map(|k| k.as_str()).collect()
    }

    fn container_mut(&mut self, id: &str) -> Result<&mut Container> {
        self.containers
            .get_mut(id)
            .ok_or_else(|| eyre!("unknown container '{}'", id))
    }
}

impl RenderSurface for RecordingSurface {
    fn create_container(&mut self, id: &str) -> Result<()> {
        if self.containers.contains_key(id) {
            return Err(eyre!("container '{}' already exists", id));
        }
        self.containers.insert(id.to_string(), Container::default());
        self.creations += 1;
        Ok(())
    }

    fn translate(&mut self, id: &str, x: f64, y: f64) -> Result<()> {
        self.container_mut(id)?.origin = (x, y);
        Ok(())
    }

    fn apply(&mut self, container: &str, command: DrawCommand) -> Result<()> {
        let target = self.container_mut(container)?;
        match &command {
            DrawCommand::Enter { key, to, .. } | DrawCommand::Update { key, to, .. } => {
                target.elements.insert(key.clone(), to.clone());
            }
            DrawCommand::Exit { key, .. } => {
                target.elements.remove(key);
            }
        }
        target.log.push(command);
        Ok(())
    }
}
