use std::path::{Path, PathBuf};
use std::rc::Rc;

use map_label::scenario::{Frame, LabelDump, Trace, load_scenario, run_scenario};
use map_label::{
    Config, Direction, Environment, HostView, Label, LabelOptions, LabelSource, MapView, Point,
    PointerEvent, PointerEventKind, Scene, Side, load_config,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_config() -> Config {
    load_config(Some(&fixture("config.json5"))).expect("fixture config loads")
}

fn run_fixture(name: &str) -> (Scene, Trace) {
    let scenario = load_scenario(&fixture(name)).expect("fixture scenario loads");
    run_scenario(scenario, &fixture_config()).expect("fixture scenario runs")
}

fn dump<'a>(frame: &'a Frame, name: &str) -> &'a LabelDump {
    frame
        .labels
        .iter()
        .find(|label| label.name == name)
        .unwrap_or_else(|| panic!("frame {} has no label {name}", frame.step))
}

fn assert_side_classes(frame: &Frame) {
    for label in &frame.labels {
        let (Some(side), Some(node)) = (label.side, label.node.as_ref()) else {
            continue;
        };
        let left = node.classes.iter().any(|class| class == "map-label-left");
        let right = node.classes.iter().any(|class| class == "map-label-right");
        assert!(
            left ^ right,
            "step {} label {}: exactly one side class expected",
            frame.step,
            label.name
        );
        assert_eq!(left, side == Side::Left, "step {} label {}", frame.step, label.name);
    }
}

fn open_at(scene: &mut Scene, options: LabelOptions, container: Point, content: &str) -> Label<MapView> {
    let anchor = scene.view().container_point_to_lat_lng(container);
    let mut label = Label::new(options, scene.environment(), None)
        .with_lat_lng(anchor)
        .with_content(content);
    label.on_add(scene.view());
    label
}

#[test]
fn run_all_fixtures() {
    let candidates = ["pan_zoom.json5", "drag.json5", "close_reopen.json5"];
    for name in candidates {
        let scenario = load_scenario(&fixture(name)).expect("fixture scenario loads");
        let steps = scenario.steps.len();
        let (_, trace) = run_scenario(scenario, &fixture_config())
            .unwrap_or_else(|err| panic!("{name}: {err}"));
        assert_eq!(trace.frames.len(), steps + 1, "{name}: one frame per step");
        for frame in &trace.frames {
            assert_side_classes(frame);
        }
        let json = serde_json::to_string(&trace).expect("trace serializes");
        assert!(json.contains("\"frames\""), "{name}");
    }
}

#[test]
fn config_fixture_merges_over_defaults() {
    let config = fixture_config();
    assert_eq!(config.label.direction, Direction::Auto);
    assert_eq!(config.label.offset, Point::new(12.0, -15.0));
    assert_eq!(config.text.char_width, Some(7.0));
    assert_eq!(config.view.width, 800.0);
}

#[test]
fn auto_direction_scenario() {
    let config = fixture_config();
    let mut scene = Scene::new(&config);
    let options = LabelOptions {
        direction: Direction::Auto,
        offset: Point::new(12.0, -15.0),
        ..LabelOptions::default()
    };
    let center = scene.view().center_container_point();
    assert_eq!(center.x, 400.0);

    let left_of_center = open_at(&mut scene, options.clone(), Point::new(300.0, 250.0), "Museum");
    let anchor = scene.view().container_point_to_layer_point(Point::new(300.0, 250.0));
    assert_eq!(left_of_center.side(), Some(Side::Right));
    assert_eq!(left_of_center.position(), Some(anchor + Point::new(12.0, -15.0)));

    let right_of_center = open_at(&mut scene, options, Point::new(500.0, 250.0), "Museum");
    let anchor = scene.view().container_point_to_layer_point(Point::new(500.0, 250.0));
    let width = right_of_center.measured_width().expect("rendered width");
    assert_eq!(width, 6.0 * 7.0 + 12.0);
    assert_eq!(right_of_center.side(), Some(Side::Left));
    assert_eq!(
        right_of_center.position(),
        Some(anchor + Point::new(-12.0 - width, -15.0))
    );
}

#[test]
fn hard_reset_refreshes_exactly_once() {
    let config = fixture_config();
    let mut scene = Scene::new(&config);
    let anchor = scene.view().container_point_to_lat_lng(Point::new(500.0, 250.0));
    let label = Label::new(config.label.clone(), config.environment, None)
        .with_lat_lng(anchor)
        .with_content("Station");
    let id = scene.add_label(label);
    scene.open_label(id);
    scene.close_label(id);
    scene.open_label(id);

    let node = scene
        .label(id)
        .and_then(Label::container)
        .cloned()
        .expect("container");
    let hides = node.hides();
    let writes = node.html_writes();

    let center = scene.view().center();
    let zoom = scene.view().zoom();
    scene.set_view(center, zoom, false);

    assert_eq!(node.hides(), hides + 1);
    assert_eq!(node.html_writes(), writes);
    assert!(node.is_visible());
}

#[test]
fn drag_fixture_moves_anchor_and_ignores_origin_samples() {
    let (scene, trace) = run_fixture("drag.json5");

    let start = trace.frames[1].pointer.as_ref().expect("pointer");
    assert!(!start.propagation_stopped);

    let moved = &trace.frames[3];
    let pin = dump(moved, "pin");
    let expected = scene.view().container_point_to_lat_lng(Point::new(150.0, 200.0));
    assert_eq!(pin.anchor, Some(expected));
    assert_eq!(pin.container_point, Some(Point::new(162.0, 185.0)));
    assert!(moved.pointer.as_ref().is_some_and(|p| p.propagation_stopped));
    assert_eq!(moved.events.len(), 1);

    let ignored = &trace.frames[4];
    assert_eq!(dump(ignored, "pin").anchor, pin.anchor);
    assert!(ignored.events.is_empty());
    assert!(ignored.pointer.as_ref().is_some_and(|p| !p.propagation_stopped));

    let end = trace.frames[5].pointer.as_ref().expect("pointer");
    assert!(!end.propagation_stopped);

    let menu = trace.frames[7].pointer.as_ref().expect("pointer");
    assert!(menu.propagation_stopped && menu.default_prevented);

    let click = trace.frames[8].pointer.as_ref().expect("pointer");
    assert!(click.propagation_stopped);
    assert_eq!(trace.frames[8].map_clicks, 0);
}

#[test]
fn pan_zoom_fixture_tracks_the_view() {
    let (_, trace) = run_fixture("pan_zoom.json5");
    let init = &trace.frames[0];
    assert_eq!(dump(init, "west").side, Some(Side::Right));
    assert_eq!(dump(init, "east").side, Some(Side::Left));

    let panned = &trace.frames[1];
    assert_eq!(panned.view.pane_offset, Point::new(-150.0, 0.0));
    let before = dump(init, "west").container_point.expect("position");
    let after = dump(panned, "west").container_point.expect("position");
    assert_eq!(after, before - Point::new(150.0, 0.0));

    let zoomed = &trace.frames[2];
    assert_eq!(zoomed.view.zoom, 14.0);
    assert_eq!(zoomed.view.pane_offset, Point::new(-150.0, 0.0));

    let jumped = &trace.frames[3];
    assert_eq!(jumped.view.pane_offset, Point::ZERO);

    let east = dump(jumped, "east");
    let node = east.node.as_ref().expect("node");
    assert_eq!(node.width, 4.0 * 7.0 + 12.0);

    let renamed = dump(&trace.frames[4], "west");
    assert_eq!(renamed.measured_width, Some(8.0 * 7.0 + 12.0));
}

#[test]
fn close_reopen_fixture_keeps_container_state() {
    let (scene, trace) = run_fixture("close_reopen.json5");

    let init = &trace.frames[0];
    assert!(dump(init, "a").open);
    assert!(!dump(init, "b").open);
    assert!(dump(init, "b").node.is_none());
    assert_eq!(dump(init, "a").source, Some(LabelSource::Marker));
    assert_eq!(dump(init, "b").source, None);

    let pending = dump(&trace.frames[2], "b");
    assert_eq!(pending.z_index, Some(700));
    assert!(pending.node.is_none());

    let b = dump(&trace.frames[3], "b");
    assert!(b.open);
    assert_eq!(b.node.as_ref().and_then(|node| node.z_index), Some(700));

    let closed = dump(&trace.frames[4], "a");
    assert!(!closed.open);
    let moved = dump(&trace.frames[5], "a");
    assert_eq!(moved.layer_point, closed.layer_point);

    let reopened = dump(&trace.frames[6], "a");
    assert!(reopened.open);
    assert_ne!(reopened.layer_point, closed.layer_point);
    assert_eq!(reopened.node.as_ref().map(|node| node.opacity), Some(0.6));

    let marker_pane = scene.view().pane_children(map_label::view::MARKER_PANE);
    assert_eq!(marker_pane.len(), 1);
}

#[test]
fn attach_detach_cycles_are_symmetric() {
    let view = Rc::new(MapView::new(&Default::default(), &Default::default()));
    let mut label: Label<MapView> = Label::new(
        LabelOptions {
            clickable: true,
            draggable: true,
            ..LabelOptions::default()
        },
        Environment {
            touch: true,
            any3d: true,
        },
        None,
    )
    .with_lat_lng((51.5, -0.09));

    for _ in 0..10 {
        label.on_add(&view);
        label.on_remove(&view);
    }

    assert!(view.subscriptions_of(label.id()).is_empty());
    let node = label.container().cloned().expect("container");
    for kind in PointerEventKind::ALL {
        assert_eq!(node.listener_count(kind), 0, "{kind}");
    }

    label.on_add(&view);
    assert_eq!(node.listener_count(PointerEventKind::Click), 2);
    assert_eq!(node.listener_count(PointerEventKind::Drag), 1);
}

#[test]
fn click_and_dragstart_propagation_policy() {
    let config = fixture_config();
    let mut scene = Scene::new(&config);
    let anchor = scene.view().container_point_to_lat_lng(Point::new(200.0, 200.0));
    let label = Label::new(
        LabelOptions {
            clickable: true,
            draggable: true,
            ..LabelOptions::default()
        },
        config.environment,
        None,
    )
    .with_lat_lng(anchor);
    let id = scene.add_label(label);
    scene.open_label(id);

    let mut click = PointerEvent::new(PointerEventKind::Click, (200.0, 200.0));
    scene.pointer(id, &mut click);
    assert!(click.is_propagation_stopped());

    let mut drag_start = PointerEvent::new(PointerEventKind::DragStart, (200.0, 200.0));
    scene.pointer(id, &mut drag_start);
    assert!(!drag_start.is_propagation_stopped());

    if let Some(label) = scene.label_mut(id) {
        label.on(PointerEventKind::DragStart, |_| {});
    }
    let mut observed = PointerEvent::new(PointerEventKind::DragStart, (200.0, 200.0));
    scene.pointer(id, &mut observed);
    assert!(observed.is_propagation_stopped());
}
