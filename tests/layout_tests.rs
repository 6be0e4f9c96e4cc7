use gpui_statchart::data_types::{CategoryValue, PointDatum};
use gpui_statchart::layout::{solve_layout, ForceConfig, ForceLayout};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_points(seed: u64, count: usize) -> Vec<PointDatum> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let category = rng.random_range(0..3);
            let value: f64 = rng.random_range(0.0..100.0);
            PointDatum::new(
                i.to_string(),
                CategoryValue::from(category as i64),
                CategoryValue::Null,
                value,
                100.0 + category as f64 * 150.0,
                400.0 - value * 4.0,
            )
        })
        .collect()
}

fn min_pair_distance(points: &[PointDatum]) -> f64 {
    let mut min = f64::INFINITY;
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let d = ((points[i].x - points[j].x).powi(2) + (points[i].y - points[j].y).powi(2)).sqrt();
            min = min.min(d);
        }
    }
    min
}

#[test]
fn test_points_do_not_overlap_after_enough_ticks() {
    let radius = 3.0;
    let layout = ForceLayout::new(ForceConfig {
        radius,
        ..ForceConfig::default()
    });
    for seed in 0..5 {
        let mut points = random_points(seed, 80);
        layout.solve(&mut points, 120);
        let closest = min_pair_distance(&points);
        assert!(
            closest >= radius,
            "seed {}: closest pair {:.3} is below the radius {}",
            seed,
            closest,
            radius
        );
    }
}

#[test]
fn test_layout_is_deterministic() {
    let mut a = random_points(3, 60);
    let mut b = a.clone();
    solve_layout(&mut a, 100);
    solve_layout(&mut b, 100);
    assert_eq!(a, b);
}

#[test]
fn test_coincident_cluster_spreads_out() {
    let radius = 2.0;
    let mut points: Vec<PointDatum> = (0..25)
        .map(|i| PointDatum::new(i.to_string(), CategoryValue::Null, CategoryValue::Null, 1.0, 50.0, 50.0))
        .collect();
    ForceLayout::new(ForceConfig {
        radius,
        ..ForceConfig::default()
    })
    .solve(&mut points, 150);

    assert!(points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    assert!(min_pair_distance(&points) >= radius);
}

#[test]
fn test_zero_ticks_leaves_points_on_targets() {
    let mut points = random_points(9, 10);
    solve_layout(&mut points, 0);
    assert!(points.iter().all(|p| p.x == p.target_x && p.y == p.target_y));
}

#[test]
fn test_points_stay_near_targets() {
    let mut points = random_points(1, 30);
    solve_layout(&mut points, 120);
    for p in &points {
        let drift = (p.x - p.target_x).abs();
        assert!(drift < 60.0, "point {} drifted {:.1}px from its category", p.id, drift);
    }
}

/// Scattered over a wide field, including negative coordinates.
fn scattered_points(seed: u64, count: usize, span: f64) -> Vec<PointDatum> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let x = rng.random_range(-span..span);
            let y = rng.random_range(-span..span);
            PointDatum::new(i.to_string(), CategoryValue::Null, CategoryValue::Null, y, x, y)
        })
        .collect()
}

#[test]
fn test_large_swarm_separates_every_pair() {
    let radius = 2.0;
    let layout = ForceLayout::new(ForceConfig {
        radius,
        ..ForceConfig::default()
    });
    let mut points = scattered_points(11, 2000, 600.0);
    // A few exact duplicates so some cells start crowded.
    for i in 0..20 {
        let (x, y) = (points[i].target_x, points[i].target_y);
        points[1000 + i].target_x = x;
        points[1000 + i].target_y = y;
    }
    let mut again = points.clone();

    layout.solve(&mut points, 120);
    let closest = min_pair_distance(&points);
    assert!(closest >= radius, "closest pair {:.3} is below the radius {}", closest, radius);

    layout.solve(&mut again, 120);
    assert_eq!(points, again);
}

#[test]
fn test_neighbours_across_cell_edges_still_collide() {
    // Cells are 4px wide; these straddle the edges at x = 0 and y = -4.
    let radius = 2.0;
    let mut points = vec![
        PointDatum::new("a", CategoryValue::Null, CategoryValue::Null, 0.0, -0.5, -3.9),
        PointDatum::new("b", CategoryValue::Null, CategoryValue::Null, 0.0, 0.5, -4.1),
    ];
    ForceLayout::new(ForceConfig {
        radius,
        ..ForceConfig::default()
    })
    .solve(&mut points, 60);
    assert!(min_pair_distance(&points) >= radius);
}
