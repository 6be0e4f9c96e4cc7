use eyre::{eyre, Result};
use gpui_statchart::data_types::{BarChartConfig, Dimensions, Row, Viewport};
use gpui_statchart::lifecycle::{ChartHooks, ChartLifecycle, LifecycleState, UpdateContext};
use gpui_statchart::plot_types::{BarChart, BarData, GroupStackChart, GroupStackData};
use gpui_statchart::reconcile::{Keyed, Reconciled};
use gpui_statchart::rendering::{DrawCommand, Primitive, RecordingSurface, RenderSurface};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

fn rows(value: Value) -> Vec<Row> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
}

fn bar_data(value: Value) -> BarData {
    BarData {
        title: "Cases".to_string(),
        rows: rows(value),
        ..BarData::default()
    }
}

fn bar_chart() -> ChartLifecycle<BarChart, RecordingSurface> {
    ChartLifecycle::new(BarChart::new(), RecordingSurface::new(), Viewport::new(600.0, 300.0))
}

#[derive(Clone, Debug, PartialEq)]
struct Item(String);

impl Keyed for Item {
    fn key(&self) -> &str {
        &self.0
    }
}

/// Hooks that count their invocations and can be told to fail while drawing.
#[derive(Default)]
struct CountingHooks {
    set_elements_calls: usize,
    draws: usize,
    fail_draw: bool,
}

impl ChartHooks for CountingHooks {
    type Data = Vec<String>;
    type Config = BarChartConfig;
    type Record = Item;

    fn set_elements(&mut self, surface: &mut dyn RenderSurface, _dims: &Dimensions) -> Result<()> {
        self.set_elements_calls += 1;
        surface.create_container("data")
    }

    fn set_params(&mut self, ctx: &UpdateContext<'_, Vec<String>, BarChartConfig>) -> Vec<Item> {
        ctx.data.iter().cloned().map(Item).collect()
    }

    fn draw(
        &mut self,
        _surface: &mut dyn RenderSurface,
        _changes: &Reconciled<Item>,
        _ctx: &UpdateContext<'_, Vec<String>, BarChartConfig>,
    ) -> Result<()> {
        if self.fail_draw {
            return Err(eyre!("surface lost"));
        }
        self.draws += 1;
        Ok(())
    }
}

fn counting_chart() -> ChartLifecycle<CountingHooks, RecordingSurface> {
    ChartLifecycle::with_resize_window(
        CountingHooks::default(),
        RecordingSurface::new(),
        Viewport::new(400.0, 200.0),
        Duration::from_millis(100),
    )
}

#[test]
fn test_set_elements_runs_once() {
    let mut chart = bar_chart();
    chart.init().unwrap();
    let created = chart.surface().creations();
    assert_eq!(created, 4, "data, two axes and the title");

    chart.init().unwrap();
    chart.set_data(bar_data(json!([{"domain": "a", "value": 1}]))).unwrap();
    chart.resize(Viewport::new(800.0, 300.0)).unwrap();
    assert_eq!(chart.surface().creations(), created);
}

#[test]
fn test_inputs_before_init_are_kept_and_drawn_on_init() {
    let mut chart = counting_chart();
    chart.set_data(vec!["a".into(), "b".into()]).unwrap();
    chart.set_config(&json!({"transition": 50})).unwrap();

    assert_eq!(chart.state(), LifecycleState::Uninitialized);
    assert_eq!(chart.hooks().draws, 0, "nothing is drawn before init");
    assert_eq!(chart.config().transition, 50);

    chart.init().unwrap();
    assert_eq!(chart.hooks().draws, 1);
    assert_eq!(chart.visual_set().len(), 2);
    assert_eq!(chart.state(), LifecycleState::Idle);
}

#[test]
fn test_init_without_data_does_not_draw() {
    let mut chart = counting_chart();
    chart.init().unwrap();
    assert_eq!(chart.state(), LifecycleState::Initialized);
    assert_eq!(chart.hooks().draws, 0);
    assert_eq!(chart.subscription_count(), 1);
}

#[test]
fn test_failed_draw_keeps_previous_visual_set() {
    let mut chart = counting_chart();
    chart.init().unwrap();
    chart.set_data(vec!["a".into()]).unwrap();

    chart.hooks_mut().fail_draw = true;
    assert!(chart.set_data(vec!["a".into(), "b".into()]).is_err());
    assert_eq!(chart.visual_set(), &[Item("a".into())]);
    assert_eq!(chart.state(), LifecycleState::Idle, "a failed draw must not wedge the chart");

    chart.hooks_mut().fail_draw = false;
    chart.update().unwrap();
    assert_eq!(chart.visual_set().len(), 2);
}

#[test]
fn test_resize_is_debounced() {
    let mut chart = counting_chart();
    chart.init().unwrap();
    chart.set_data(vec!["a".into()]).unwrap();
    let handle = chart.resize_handle();
    let start = Instant::now();

    assert!(handle.signal(Viewport::new(500.0, 200.0), start));
    assert!(handle.signal(Viewport::new(700.0, 200.0), start + Duration::from_millis(60)));

    assert!(!chart.poll(start + Duration::from_millis(120)).unwrap(), "window restarted at 60ms");
    assert_eq!(chart.dimensions().width(), 400.0);

    assert!(chart.poll(start + Duration::from_millis(160)).unwrap());
    assert_eq!(chart.dimensions().width(), 700.0, "only the last viewport is delivered");
    assert_eq!(chart.hooks().draws, 2);

    assert!(!chart.poll(start + Duration::from_millis(500)).unwrap());
}

#[test]
fn test_destroy_releases_everything() {
    let mut chart = counting_chart();
    chart.init().unwrap();
    chart.set_data(vec!["a".into()]).unwrap();
    let handle = chart.resize_handle();
    handle.signal(Viewport::new(10.0, 10.0), Instant::now());

    chart.destroy();
    assert_eq!(chart.state(), LifecycleState::Destroyed);
    assert_eq!(chart.subscription_count(), 0);
    assert!(chart.visual_set().is_empty());
    assert!(handle.is_closed());
    assert!(!handle.signal(Viewport::new(20.0, 20.0), Instant::now()));

    assert!(chart.set_data(vec!["b".into()]).is_err());
    assert!(chart.init().is_err());
    assert!(!chart.poll(Instant::now() + Duration::from_secs(5)).unwrap());

    // Destroying twice is harmless.
    chart.destroy();
}

#[test]
fn test_bar_chart_enters_updates_and_exits() {
    let mut chart = bar_chart();
    chart.init().unwrap();
    chart
        .set_data(bar_data(json!([
            {"domain": "a", "value": 1},
            {"domain": "b", "value": 2}
        ])))
        .unwrap();
    assert_eq!(chart.surface().element_count("data"), 2);

    chart
        .set_data(bar_data(json!([
            {"domain": "b", "value": 4},
            {"domain": "c", "value": 3}
        ])))
        .unwrap();

    let surface = chart.surface();
    assert!(surface.element("data", "a").is_none());
    assert!(surface.element("data", "b").is_some());
    assert!(surface.element("data", "c").is_some());

    let log = &surface.container("data").unwrap().log;
    let last_pass = &log[log.len() - 3..];
    assert!(matches!(&last_pass[0], DrawCommand::Exit { key, .. } if key == "a"));
    assert!(matches!(&last_pass[1], DrawCommand::Update { key, .. } if key == "b"));
    match &last_pass[2] {
        DrawCommand::Enter {
            key,
            from: Primitive::Rect { x, width, .. },
            ..
        } => {
            assert_eq!(key, "c");
            assert_eq!(*width, 0.0, "entering bars start collapsed");
            let b = chart.visual_set().iter().find(|r| r.key == "b").unwrap();
            // Grows from the right edge of "b" as it was drawn before.
            assert!(*x > b.x, "entering bar should start right of its neighbour");
        }
        other => panic!("expected an enter command, got {:?}", other),
    }
}

#[test]
fn test_bar_config_merge_keeps_defaults() {
    let mut chart = bar_chart();
    chart.set_config(&json!({"margins": {"left": 40.0}})).unwrap();
    let config = chart.config();
    assert_eq!(config.margins.left, 40.0);
    assert_eq!(config.margins.top, BarChartConfig::default().margins.top);
    assert_eq!(config.color, BarChartConfig::default().color);

    assert!(chart.set_config(&json!({"margins": "wide"})).is_err());
}

#[test]
fn test_group_stack_exit_collapses_onto_neighbour() {
    let mut chart = ChartLifecycle::new(
        GroupStackChart::new(),
        RecordingSurface::new(),
        Viewport::new(600.0, 400.0),
    );
    chart.init().unwrap();

    let data = |value: Value| GroupStackData {
        rows: rows(value),
        stack_field: Some("stack".into()),
        stack_order: vec!["x".into(), "y".into()],
        ..GroupStackData::default()
    };

    chart
        .set_data(data(json!([
            {"domain": 2020, "stack": "x", "value": 3},
            {"domain": 2020, "stack": "y", "value": 2},
            {"domain": 2021, "stack": "x", "value": 5}
        ])))
        .unwrap();
    let keys: Vec<&str> = chart.visual_set().iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys.len(), 4, "every column holds every stack member");
    assert!(keys.contains(&"2021__y"));

    chart
        .set_data(data(json!([
            {"domain": 2021, "stack": "x", "value": 5},
            {"domain": 2021, "stack": "y", "value": 1}
        ])))
        .unwrap();
    let surface = chart.surface();
    assert!(surface.element("data", "2020__x").is_none());
    assert!(surface.element("data", "2020__y").is_none());
    assert_eq!(surface.element_count("data"), 2);

    // The legend lists the stack identities in stacking order.
    let legend: Vec<String> = chart
        .hooks()
        .legend()
        .items()
        .iter()
        .map(|i| i.label.clone())
        .collect();
    assert_eq!(legend, vec!["x", "y"]);
}

fn stack_chart() -> ChartLifecycle<GroupStackChart, RecordingSurface> {
    let mut chart = ChartLifecycle::new(
        GroupStackChart::new(),
        RecordingSurface::new(),
        Viewport::new(600.0, 400.0),
    );
    chart.init().unwrap();
    chart
}

fn stacked(value: Value) -> GroupStackData {
    GroupStackData {
        rows: rows(value),
        stack_field: Some("stack".into()),
        ..GroupStackData::default()
    }
}

/// Top edge and height of a rect.
fn rect_top(primitive: &Primitive) -> (f64, f64) {
    match primitive {
        Primitive::Rect { y, height, .. } => (*y, *height),
        other => panic!("expected a rect, got {:?}", other),
    }
}

#[test]
fn test_group_stack_exit_lands_on_rescaled_neighbour() {
    let mut chart = stack_chart();
    chart
        .set_data(stacked(json!([
            {"domain": "a", "stack": "x", "value": 3},
            {"domain": "a", "stack": "y", "value": 2}
        ])))
        .unwrap();
    // The y domain grows from 0..5 to 0..10 while "y" leaves.
    chart
        .set_data(stacked(json!([{"domain": "a", "stack": "x", "value": 10}])))
        .unwrap();

    let surface = chart.surface();
    let (x_top, x_height) = rect_top(surface.element("data", "a__x").unwrap());
    assert!(x_height > 0.0);
    let exit = surface
        .container("data")
        .unwrap()
        .log
        .iter()
        .rev()
        .find_map(|c| match c {
            DrawCommand::Exit { key, to, .. } if key == "a__y" => Some(to.clone()),
            _ => None,
        })
        .expect("a__y exits");
    let (y, height) = rect_top(&exit);
    assert_eq!(height, 0.0);
    assert!(
        (y - x_top).abs() < 1e-9,
        "a__y collapses at {} but a__x now tops out at {}",
        y,
        x_top
    );
}

#[test]
fn test_group_stack_enter_grows_from_previous_neighbour_top() {
    let mut chart = stack_chart();
    chart
        .set_data(stacked(json!([{"domain": "a", "stack": "x", "value": 10}])))
        .unwrap();
    let (x_top_before, _) = rect_top(chart.surface().element("data", "a__x").unwrap());

    chart
        .set_data(stacked(json!([
            {"domain": "a", "stack": "x", "value": 3},
            {"domain": "a", "stack": "y", "value": 2}
        ])))
        .unwrap();

    let enter = chart
        .surface()
        .container("data")
        .unwrap()
        .log
        .iter()
        .find_map(|c| match c {
            DrawCommand::Enter { key, from, .. } if key == "a__y" => Some(from.clone()),
            _ => None,
        })
        .expect("a__y enters");
    let (y, height) = rect_top(&enter);
    assert_eq!(height, 0.0);
    assert!(
        (y - x_top_before).abs() < 1e-9,
        "a__y is born at {} but a__x was drawn up to {}",
        y,
        x_top_before
    );

    // Once settled the new segment sits right on top of its neighbour.
    let (x_top, _) = rect_top(chart.surface().element("data", "a__x").unwrap());
    let (y_top, y_height) = rect_top(chart.surface().element("data", "a__y").unwrap());
    assert!((y_top + y_height - x_top).abs() < 1e-9);
}

#[test]
fn test_group_stack_first_segment_grows_from_baseline() {
    let mut chart = stack_chart();
    chart
        .set_data(stacked(json!([{"domain": "a", "stack": "y", "value": 4}])))
        .unwrap();
    chart
        .set_data(stacked(json!([
            {"domain": "a", "stack": "x", "value": 1},
            {"domain": "a", "stack": "y", "value": 4}
        ])))
        .unwrap();

    let enter = chart
        .surface()
        .container("data")
        .unwrap()
        .log
        .iter()
        .find_map(|c| match c {
            DrawCommand::Enter { key, from, .. } if key == "a__x" => Some(from.clone()),
            _ => None,
        })
        .expect("a__x enters");
    let (x_top, x_height) = rect_top(chart.surface().element("data", "a__x").unwrap());
    let (y, height) = rect_top(&enter);
    assert_eq!(height, 0.0);
    assert!((y - (x_top + x_height)).abs() < 1e-9, "a__x grows from the baseline");
}

#[test]
fn test_group_stack_legend_hides_identity() {
    let mut chart = ChartLifecycle::new(
        GroupStackChart::new(),
        RecordingSurface::new(),
        Viewport::new(600.0, 400.0),
    );
    chart.init().unwrap();
    chart
        .set_data(GroupStackData {
            rows: rows(json!([
                {"domain": "a", "stack": "x", "value": 3},
                {"domain": "a", "stack": "y", "value": 2}
            ])),
            stack_field: Some("stack".into()),
            ..GroupStackData::default()
        })
        .unwrap();

    // First click isolates "x".
    chart.hooks_mut().legend_click(&"x".into());
    chart.update().unwrap();

    let keys: Vec<&str> = chart.visual_set().iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, vec!["a__x"]);
    assert!(chart.surface().element("data", "a__y").is_none());
}
