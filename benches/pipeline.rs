use criterion::{criterion_group, criterion_main, Criterion, black_box};
use serde_json::{json, Value};

use blockout::backend::{emit, RecordingBackend};
use blockout::scene::{Catalog, SceneConfig, SceneDocument, SceneManager, apply_defaults, connect_rooms};

/// A `side` x `side` grid of touching rooms, each furnished with a table,
/// a lamp on the table, a chair and a rocket lamp.
fn grid_scene(side: usize) -> Value {
    let mut rooms = Vec::new();
    let mut objects = Vec::new();

    for gx in 0..side {
        for gy in 0..side {
            let name = format!("room_{}_{}", gx, gy);
            let (x, y) = (gx as f32 * 600.0, gy as f32 * 800.0);
            rooms.push(json!({"name": name, "position": [x, y, 0], "size": [600, 800, 350]}));

            let table = format!("{}_table", name);
            objects.push(json!({"name": "table", "id": table, "type": "table", "parent": name, "position": [x + 300.0, y + 400.0, 0]}));
            objects.push(json!({"name": "lamp", "id": format!("{}_lamp", name), "type": "lamp", "parent": table, "position": [20, 0, 60]}));
            objects.push(json!({"name": "chair", "id": format!("{}_chair", name), "type": "chair", "parent": name, "position": [x + 200.0, y + 400.0, 0]}));
            objects.push(json!({"name": "rocket", "id": format!("{}_rocket", name), "type": "rocket_lamp", "parent": table, "position": [-20, 0, 50]}));
        }
    }

    json!({"map": "/Game/Bench", "rooms": rooms, "objects": objects})
}

fn bench_full_build(c: &mut Criterion) {
    let manager = SceneManager::default();
    let scene = grid_scene(6);

    c.bench_function("build_6x6_rooms", |b| {
        b.iter(|| manager.build(black_box(&scene)))
    });
}

fn bench_adjacency(c: &mut Criterion) {
    let config = SceneConfig::default();
    let catalog = Catalog::default();
    let doc = apply_defaults(
        SceneDocument::from_value(grid_scene(10)).expect("valid bench scene"),
        &config,
        &catalog,
    );

    c.bench_function("connect_rooms_10x10", |b| {
        b.iter(|| connect_rooms(black_box(doc.clone()), &config))
    });
}

fn bench_emit(c: &mut Criterion) {
    let manager = SceneManager::default();
    let build = manager.build(&grid_scene(6)).expect("valid bench scene");

    c.bench_function("emit_recording_6x6", |b| {
        b.iter(|| {
            let mut backend = RecordingBackend::new();
            emit(black_box(&build.graph), &mut backend)
        })
    });
}

criterion_group!(
    benches,
    bench_full_build,
    bench_adjacency,
    bench_emit,
);
criterion_main!(benches);
