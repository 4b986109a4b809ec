#![allow(missing_docs)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use euclid::vec3;

use movecheck::block::{Block, BlockKind, BlockState, SlabType};
use movecheck::collision::{CollideRequest, CollisionScratch, collect_collision_boxes, collide};
use movecheck::math::{Aab, Cube, CubeRange};
use movecheck::version::ObserverVersion;
use movecheck::world::ChunkedWorld;

/// A floor of full blocks with a row of fences and a row of slabs on it.
fn cluttered_world() -> ChunkedWorld {
    let mut world = ChunkedWorld::new(-64, 320);
    let floor = CubeRange::new(Cube::new(-16, -1, -16), Cube::new(15, -1, 15));
    world.load_columns_covering(floor);
    world.fill(floor, Block::new(BlockKind::Solid)).unwrap();
    world
        .fill(
            CubeRange::new(Cube::new(-16, 0, 2), Cube::new(15, 0, 2)),
            Block::new(BlockKind::Fence),
        )
        .unwrap();
    world
        .fill(
            CubeRange::new(Cube::new(-16, 0, -2), Cube::new(15, 0, -2)),
            Block::new(BlockKind::Slab).with_state(BlockState::DEFAULT.with_slab(SlabType::Bottom)),
        )
        .unwrap();
    world
}

pub fn collide_bench(c: &mut Criterion) {
    let world = cluttered_world();
    let aab = Aab::new(0.2, 0.8, 0.0, 1.8, 0.2, 0.8);

    c.bench_function("collide: gather", |b| {
        let mut out = Vec::new();
        b.iter(|| {
            out.clear();
            collect_collision_boxes(&world, ObserverVersion::LATEST, black_box(aab), &mut out)
        });
    });

    for version in [ObserverVersion::OLDEST, ObserverVersion::LATEST] {
        c.bench_function(&format!("collide: walk into fence ({version})"), |b| {
            let mut request = CollideRequest::new(version, aab, vec3(0.0, -0.08, 1.5));
            request.step_height = 0.6;
            request.last_on_ground = true;
            let mut scratch = CollisionScratch::new();
            b.iter(|| collide(&world, black_box(&request), &mut scratch));
        });
    }

    c.bench_function("collide: step onto slab", |b| {
        let mut request = CollideRequest::new(ObserverVersion::LATEST, aab, vec3(0.0, -0.08, -1.5));
        request.step_height = 0.6;
        request.last_on_ground = true;
        let mut scratch = CollisionScratch::new();
        b.iter(|| collide(&world, black_box(&request), &mut scratch));
    });
}

criterion_group!(benches, collide_bench);
criterion_main!(benches);
