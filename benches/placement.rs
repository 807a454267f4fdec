use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use map_label::config::{Config, Direction, LabelOptions, TextConfig};
use map_label::geo::Point;
use map_label::label::{Label, compute_position};
use map_label::scenario::{parse_scenario, run_scenario};
use map_label::scene::Scene;
use std::hint::black_box;

fn fixed_text_config() -> Config {
    Config {
        text: TextConfig {
            char_width: Some(7.0),
            ..TextConfig::default()
        },
        ..Config::default()
    }
}

fn crowded_scene(labels: usize, direction: Direction) -> Scene {
    let config = fixed_text_config();
    let mut scene = Scene::new(&config);
    let columns = 20usize;
    for i in 0..labels {
        let container = Point::new(
            20.0 + (i % columns) as f64 * 38.0,
            20.0 + (i / columns) as f64 * 24.0 % 560.0,
        );
        let anchor = scene.view().container_point_to_lat_lng(container);
        let label = Label::new(
            LabelOptions {
                direction,
                ..LabelOptions::default()
            },
            config.environment,
            None,
        )
        .with_lat_lng(anchor)
        .with_content(format!("Label {i}"));
        let id = scene.add_label(label);
        scene.open_label(id);
    }
    scene
}

fn bench_compute_position(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_position");
    let center = Point::new(400.0, 300.0);
    let offset = Point::new(12.0, -15.0);
    for direction in [Direction::Right, Direction::Left, Direction::Auto] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{direction:?}")),
            &direction,
            |b, direction| {
                b.iter(|| {
                    for x in (0..800).step_by(16) {
                        let anchor = Point::new(x as f64, 240.0);
                        black_box(compute_position(
                            black_box(anchor),
                            center,
                            *direction,
                            Some(64.0),
                            offset,
                        ));
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_pan(c: &mut Criterion) {
    let mut group = c.benchmark_group("pan");
    for count in [10usize, 100, 400] {
        let mut scene = crowded_scene(count, Direction::Auto);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            let mut step = 1.0;
            b.iter(|| {
                step = -step;
                scene.pan_by(black_box(Point::new(step * 25.0, 0.0)));
            });
        });
    }
    group.finish();
}

fn bench_zoom(c: &mut Criterion) {
    let mut group = c.benchmark_group("animated_zoom");
    for count in [10usize, 100, 400] {
        let mut scene = crowded_scene(count, Direction::Right);
        let center = scene.view().center();
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            let mut zoom = 13.0;
            b.iter(|| {
                zoom = if zoom == 13.0 { 14.0 } else { 13.0 };
                scene.set_view(center, black_box(zoom), true);
            });
        });
    }
    group.finish();
}

fn bench_scenario(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario");
    let source = r#"{
        labels: [
            { name: "a", latlng: [51.505, -0.12], content: "Alpha", options: { direction: "auto" } },
            { name: "b", latlng: [51.505, -0.06], content: "Beta", options: { clickable: true, draggable: true } },
        ],
        steps: [
            { op: "pan", by: [150, 0] },
            { op: "setView", center: [51.505, -0.09], zoom: 14, animate: true },
            { op: "pointer", label: "b", event: "drag", at: [150, 200] },
            { op: "setContent", label: "a", content: "Alpha prime" },
        ],
    }"#;
    let config = fixed_text_config();
    group.bench_function("replay", |b| {
        b.iter(|| {
            let scenario = parse_scenario(black_box(source)).expect("scenario parses");
            let (_, trace) = run_scenario(scenario, &config).expect("scenario runs");
            black_box(trace.frames.len());
        });
    });
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_compute_position, bench_pan, bench_zoom, bench_scenario
);
criterion_main!(benches);
