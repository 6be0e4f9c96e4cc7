use gpui::Hsla;
use gpui_statchart::data_types::CategoryValue;
use gpui_statchart::scales::{
    build_scale, BandScale, ChartScale, LinearScale, OrdinalScale, PointScale, ScaleDomain,
    ScaleKind, ScaleOptions, ScaleRole, ScaleSet, SequentialScale, ThresholdScale,
};
use gpui_statchart::theme::{parse_hex, parse_palette, BLUES_9};

fn cats(values: &[&str]) -> Vec<CategoryValue> {
    values.iter().map(|v| CategoryValue::from(*v)).collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_linear_zero_domain() {
    // Edge case: min == max used to divide by zero
    let scale = LinearScale::new((100.0, 100.0), (0.0, 1000.0));
    let mapped = scale.map(100.0);
    assert!(mapped.is_finite(), "flat domain must still map to a finite pixel");
    assert!(close(mapped, 500.0));
}

#[test]
fn test_linear_non_finite_domain_falls_back() {
    let scale = LinearScale::new((f64::NAN, 5.0), (0.0, 10.0));
    assert_eq!(scale.domain(), (0.0, 1.0));
}

#[test]
fn test_linear_invert_round_trip() {
    let scale = LinearScale::new((0.0, 50.0), (400.0, 0.0));
    assert!(close(scale.map(25.0), 200.0));
    assert!(close(scale.invert(200.0), 25.0));
}

#[test]
fn test_for_values_includes_zero_baseline() {
    let scale = LinearScale::for_values(vec![3.0, 8.0], (0.0, 1.0));
    assert_eq!(scale.domain(), (0.0, 8.0));

    let negative = LinearScale::for_values(vec![-4.0, 8.0], (0.0, 1.0));
    assert_eq!(negative.domain(), (-4.0, 8.0));

    let empty = LinearScale::for_values(Vec::<f64>::new(), (0.0, 1.0));
    assert_eq!(empty.domain(), (0.0, 1.0));
}

#[test]
fn test_linear_ticks_cover_domain() {
    let scale = LinearScale::new((0.0, 100.0), (0.0, 500.0));
    let ticks = scale.ticks(5);
    assert!(!ticks.is_empty());
    assert!(ticks.iter().all(|t| *t >= 0.0 && *t <= 100.0));
    assert!(ticks.windows(2).all(|w| w[0] < w[1]), "ticks must be ascending");
}

#[test]
fn test_band_math() {
    // 4 bands, padding 0.2 on both sides over 0..1000
    let scale = BandScale::new(cats(&["a", "b", "c", "d"]), (0.0, 1000.0), 0.2, 0.2);
    let step = 1000.0 / (4.0 - 0.2 + 0.4);
    assert!(close(scale.step(), step));
    assert!(close(scale.bandwidth(), step * 0.8));

    let a = scale.map(&"a".into()).unwrap();
    let d = scale.map(&"d".into()).unwrap();
    // Centered: equal space left of the first band and right of the last one.
    assert!(close(a, 1000.0 - (d + scale.bandwidth())));
    assert!(scale.map(&"z".into()).is_none());
}

#[test]
fn test_band_domain_is_sorted_and_deduplicated() {
    let scale = BandScale::new(cats(&["b", "a", "b"]), (0.0, 100.0), 0.0, 0.0);
    assert_eq!(scale.domain(), cats(&["a", "b"]).as_slice());
    assert!(close(scale.bandwidth(), 50.0));
}

#[test]
fn test_empty_band_scale_is_inert() {
    let scale = BandScale::new(Vec::new(), (0.0, 100.0), 0.2, 0.2);
    assert!(scale.bandwidth().is_finite());
    assert!(scale.map(&"a".into()).is_none());
}

#[test]
fn test_point_scale_spacing() {
    let scale = PointScale::new(cats(&["a", "b", "c"]), (0.0, 300.0), 0.5);
    let xs: Vec<f64> = ["a", "b", "c"]
        .iter()
        .map(|c| scale.map(&(*c).into()).unwrap())
        .collect();
    assert!(close(xs[1] - xs[0], scale.step()));
    assert!(close(xs[2] - xs[1], scale.step()));
    // Half a step of padding on each side.
    assert!(close(xs[0], 0.5 * scale.step()));
}

#[test]
fn test_threshold_bisect_and_no_data() {
    let colors = parse_palette(&BLUES_9[..3]).unwrap();
    let no_data = parse_hex("#cccccc").unwrap();
    let scale = ThresholdScale::new(vec![10.0, 100.0], colors.clone(), no_data);

    assert_eq!(scale.bucket(5.0), 0);
    // Values equal to a threshold belong to the upper bucket.
    assert_eq!(scale.bucket(10.0), 1);
    assert_eq!(scale.bucket(1000.0), 2);

    assert_eq!(scale.map(Some(50.0)), colors[1]);
    assert_eq!(scale.map(None), no_data);
    assert_eq!(scale.map(Some(f64::NAN)), no_data);
}

#[test]
fn test_threshold_sorts_its_stops() {
    let scale = ThresholdScale::new(vec![100.0, f64::NAN, 10.0], Vec::new(), gpui::black());
    assert_eq!(scale.thresholds(), &[10.0, 100.0]);
    assert_eq!(scale.map(Some(5.0)), gpui::black(), "no colors means no-data color");
}

#[test]
fn test_sequential_index_zero_is_deep_end() {
    let light = parse_hex("#ffffff").unwrap();
    let deep = parse_hex("#000000").unwrap();
    let scale = SequentialScale::for_count(4, vec![light, deep]);
    assert_eq!(scale.domain(), (4.0, 0.0));

    let first: Hsla = scale.map(0.0);
    let last: Hsla = scale.map(4.0);
    assert!(first.l < last.l, "index 0 should be darker than index n");
}

#[test]
fn test_ordinal_cycles_palette() {
    let palette = parse_palette(&["#ff0000", "#00ff00"][..]).unwrap();
    let scale = OrdinalScale::new(cats(&["a", "b", "c"]), palette.clone());
    assert_eq!(scale.map(&"a".into()), palette[0]);
    assert_eq!(scale.map(&"b".into()), palette[1]);
    assert_eq!(scale.map(&"c".into()), palette[0]);
    assert_ne!(scale.map(&"zzz".into()), palette[0]);
}

#[test]
fn test_build_scale_vertical_flips_range() {
    let scale = build_scale(
        ScaleKind::Linear,
        ScaleDomain::Values(vec![0.0, 10.0]),
        (0.0, 200.0),
        &ScaleOptions {
            vertical: true,
            ..ScaleOptions::default()
        },
    );
    assert_eq!(scale.range(), (200.0, 0.0));
    assert_eq!(scale.map_value(10.0), Some(0.0));
    assert_eq!(scale.map_value(0.0), Some(200.0));
}

#[test]
fn test_build_scale_band_from_numbers() {
    let scale = build_scale(
        ScaleKind::Band,
        ScaleDomain::Values(vec![2021.0, 2020.0]),
        (0.0, 100.0),
        &ScaleOptions::default(),
    );
    assert!(scale.bandwidth() > 0.0);
    let first = scale.map_category(&CategoryValue::Num(2020.0)).unwrap();
    let second = scale.map_category(&CategoryValue::Num(2021.0)).unwrap();
    assert!(first < second);
}

#[test]
fn test_scale_set_typed_access() {
    let set = ScaleSet::new()
        .with(ScaleRole::X, ChartScale::new_linear((0.0, 1.0), (0.0, 10.0)))
        .with(
            ScaleRole::Y,
            ChartScale::Band(BandScale::new(cats(&["a"]), (0.0, 10.0), 0.0, 0.0)),
        );
    assert!(set.linear(ScaleRole::X).is_some());
    assert!(set.band(ScaleRole::X).is_none());
    assert!(set.band(ScaleRole::Y).is_some());
    assert!(set.get(ScaleRole::X1).is_none());
    assert!(set.color().is_none());
    assert!(!set.is_empty());
}
