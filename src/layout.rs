//! Force layout for swarm charts.
//!
//! Points are pulled toward their scale-derived targets (harder along y than along x) while
//! pairwise collision correction keeps them `2 * radius` apart. The solver runs a fixed number of
//! ticks synchronously and never draws random numbers, so identical inputs give identical output.

use crate::data_types::PointDatum;
use glam::DVec2;
use std::collections::HashMap;
use tracing::trace;

/// Golden angle in radians, used to split coincident points deterministically.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

#[derive(Clone, Debug, PartialEq)]
pub struct ForceConfig {
    pub strength_x: f64,
    pub strength_y: f64,
    /// Point radius; centers are kept at least `2 * radius` apart.
    pub radius: f64,
    /// Fraction of velocity lost every tick.
    pub velocity_decay: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    /// Collision relaxation passes per tick.
    pub collision_iterations: usize,
}

impl Default for ForceConfig {
    fn default() -> Self {
        let alpha_min: f64 = 0.001;
        Self {
            strength_x: 0.8,
            strength_y: 1.0,
            radius: 2.0,
            velocity_decay: 0.4,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            collision_iterations: 4,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ForceLayout {
    pub config: ForceConfig,
}

impl ForceLayout {
    pub fn new(config: ForceConfig) -> Self {
        Self { config }
    }

    /// Resets every point to its target, then runs `ticks` iterations in place.
    pub fn solve<'a>(&self, points: &'a mut [PointDatum], ticks: usize) -> &'a mut [PointDatum] {
        for p in points.iter_mut() {
            p.x = p.target_x;
            p.y = p.target_y;
            p.vx = 0.0;
            p.vy = 0.0;
        }

        let mut alpha = 1.0;
        for _ in 0..ticks {
            alpha += (0.0 - alpha) * self.config.alpha_decay;
            self.tick(points, alpha.max(self.config.alpha_min));
        }

        trace!(points = points.len(), ticks, "force layout settled");
        points
    }

    fn tick(&self, points: &mut [PointDatum], alpha: f64) {
        let keep = 1.0 - self.config.velocity_decay;
        for p in points.iter_mut() {
            p.vx += (p.target_x - p.x) * self.config.strength_x * alpha;
            p.vy += (p.target_y - p.y) * self.config.strength_y * alpha;
            p.vx *= keep;
            p.vy *= keep;
            p.x += p.vx;
            p.y += p.vy;
        }

        for _ in 0..self.config.collision_iterations.max(1) {
            if !self.resolve_collisions(points) {
                break;
            }
        }
    }

    /// One relaxation pass. Returns whether any pair had to be moved.
    ///
    /// Points are bucketed into square cells of side `2 * radius` by their position at the start
    /// of the pass, so only points in the 3x3 block of cells around a point can overlap it. Pairs
    /// are visited in ascending index order, which keeps the pass deterministic.
    fn resolve_collisions(&self, points: &mut [PointDatum]) -> bool {
        let min_distance = 2.0 * self.config.radius;
        if min_distance <= 0.0 {
            return false;
        }

        let cell_of = |p: &PointDatum| {
            (
                (p.x / min_distance).floor() as i64,
                (p.y / min_distance).floor() as i64,
            )
        };
        let cells: Vec<(i64, i64)> = points.iter().map(cell_of).collect();
        let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::with_capacity(points.len());
        for (index, cell) in cells.iter().enumerate() {
            grid.entry(*cell).or_default().push(index);
        }

        let mut moved = false;
        let mut candidates: Vec<usize> = Vec::new();
        for j in 1..points.len() {
            let (cx, cy) = cells[j];
            candidates.clear();
            for dx in -1..=1 {
                for dy in -1..=1 {
                    if let Some(members) = grid.get(&(cx.saturating_add(dx), cy.saturating_add(dy))) {
                        candidates.extend(members.iter().copied().filter(|&i| i < j));
                    }
                }
            }
            candidates.sort_unstable();

            let (head, tail) = points.split_at_mut(j);
            let b = &mut tail[0];
            for &i in &candidates {
                let a = &mut head[i];
                let delta = DVec2::new(b.x - a.x, b.y - a.y);
                let distance = delta.length();
                if distance >= min_distance {
                    continue;
                }

                let direction = if distance > f64::EPSILON {
                    delta / distance
                } else {
                    let angle = (j - i) as f64 * GOLDEN_ANGLE + i as f64;
                    DVec2::new(angle.cos(), angle.sin())
                };
                let shift = direction * (0.5 * (min_distance - distance));

                a.x -= shift.x;
                a.y -= shift.y;
                b.x += shift.x;
                b.y += shift.y;
                moved = true;
            }
        }
        moved
    }
}

/// Solves with the default forces.
pub fn solve_layout(points: &mut [PointDatum], ticks: usize) -> &mut [PointDatum] {
    ForceLayout::default().solve(points, ticks)
}
