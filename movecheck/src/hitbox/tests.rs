use super::*;
use crate::block::{AttachFace, Half, SlabType, Tilt};
use crate::math::{Aab, Face6, FaceSet, FreeVector};
use crate::version::ObserverVersion as V;
use exhaust::Exhaust as _;
use pretty_assertions::assert_eq;

fn hitbox(kind: BlockKind, state: BlockState, version: V) -> Shape {
    HitboxCatalog::global().hitbox_of(Block::new(kind).with_state(state), version)
}

fn collision(kind: BlockKind, state: BlockState, version: V) -> Shape {
    HitboxCatalog::global().collision_shape(&HitboxQuery::new(
        Block::new(kind).with_state(state),
        version,
        Cube::ORIGIN,
    ))
}

fn faces(faces: &[Face6]) -> FaceSet {
    faces.iter().copied().collect()
}

#[test]
fn every_kind_has_a_rule() {
    let catalog = HitboxCatalog::global();
    for kind in BlockKind::exhaust() {
        assert!(catalog.has_rule(kind), "{kind:?}");
    }
}

#[test]
fn fallback_without_rules() {
    let catalog = HitboxCatalog::empty();
    let query = |kind| HitboxQuery::new(Block::new(kind), V::LATEST, Cube::ORIGIN);
    assert_eq!(catalog.shape(&query(BlockKind::Solid)), Shape::FULL);
    assert_eq!(catalog.shape(&query(BlockKind::Fence)), Shape::FULL);
    assert_eq!(catalog.shape(&query(BlockKind::Water)), Shape::Empty);
    assert_eq!(catalog.collision_shape(&query(BlockKind::Lever)), Shape::Empty);
}

/// The same query always gives the same shape, for every kind, version, and a spread
/// of states.
#[test]
fn lookups_are_pure() {
    let catalog = HitboxCatalog::global();
    let states = [
        BlockState::DEFAULT,
        BlockState::DEFAULT
            .with_facing(Face6::EAST)
            .with_attach(AttachFace::Wall)
            .with_powered(true)
            .with_age(2)
            .with_level(3),
        BlockState::DEFAULT
            .with_facing(Face6::SOUTH)
            .with_attach(AttachFace::Ceiling)
            .with_faces(FaceSet::ALL)
            .with_half(Half::Upper)
            .with_open(true)
            .with_ascending(true)
            .with_age(7),
    ];
    for kind in BlockKind::exhaust() {
        for version in V::ALL {
            for state in states {
                let query = HitboxQuery::new(
                    Block::new(kind).with_state(state),
                    version,
                    Cube::new(-7, 64, 1234),
                );
                assert_eq!(catalog.shape(&query), catalog.shape(&query));
                assert_eq!(catalog.collision_shape(&query), catalog.collision_shape(&query));
            }
        }
    }
}

#[test]
fn kinds_without_collision_have_empty_collision_shape() {
    for kind in BlockKind::exhaust().filter(|k| !k.has_collision()) {
        for version in V::ALL {
            assert_eq!(
                collision(kind, BlockState::DEFAULT, version),
                Shape::Empty,
                "{kind:?} {version}"
            );
        }
    }
}

#[rstest::rstest]
#[case(V::V1_7_10, 0.625)]
#[case(V::V1_8, 0.625)]
#[case(V::V1_9, 0.15625)]
#[case(V::V1_10, 1.0)]
#[case(V::V1_11, 0.5)]
#[case(V::V1_21_5, 0.5)]
fn ascending_rail_height(#[case] version: V, #[case] height: f64) {
    assert_eq!(
        hitbox(BlockKind::Rail, BlockState::DEFAULT.with_ascending(true), version),
        Shape::blocks(0., 0., 0., 1., height, 1.)
    );
}

#[test]
fn ascending_rail_oldest_depends_on_power() {
    let ascending = BlockState::DEFAULT.with_ascending(true);
    assert_eq!(
        hitbox(BlockKind::ActivatorRail, ascending, V::V1_7_10),
        Shape::blocks(0., 0., 0., 1., 0.125, 1.)
    );
    assert_eq!(
        hitbox(BlockKind::PoweredRail, ascending.with_powered(true), V::V1_7_10),
        Shape::blocks(0., 0., 0., 1., 0.125, 1.)
    );
    assert_eq!(
        hitbox(BlockKind::PoweredRail, ascending, V::V1_7_10),
        Shape::blocks(0., 0., 0., 1., 0.625, 1.)
    );
    assert_eq!(
        hitbox(BlockKind::Rail, BlockState::DEFAULT, V::V1_7_10),
        Shape::pixels(0., 0., 0., 16., 2., 16.)
    );
}

#[rstest::rstest]
#[case(V::V1_8, Shape::blocks(0., 0., 0., 1., 0.0625, 1.))]
#[case(V::V1_9, Shape::blocks(0., 0., 0., 1., 0.75, 1.))]
#[case(V::V1_16_2, Shape::blocks(0., 0., 0., 1., 0.75, 1.))]
#[case(V::V1_17, Shape::pixels(0., 6., 0., 16., 12., 16.))]
fn end_portal(#[case] version: V, #[case] expected: Shape) {
    assert_eq!(hitbox(BlockKind::EndPortal, BlockState::DEFAULT, version), expected);
}

#[test]
fn vine_sides() {
    let two_sides = BlockState::DEFAULT.with_faces(faces(&[Face6::NORTH, Face6::EAST, Face6::UP]));
    assert_eq!(hitbox(BlockKind::Vine, two_sides, V::V1_12), Shape::FULL);
    assert_eq!(
        hitbox(BlockKind::Vine, two_sides, V::V1_13),
        Shape::from_boxes([
            Aab::pixels(15., 0., 0., 16., 16., 16.),
            Aab::pixels(0., 0., 0., 16., 16., 1.),
            Aab::pixels(0., 15., 0., 16., 16., 16.),
        ])
    );
    let one_side = BlockState::DEFAULT.with_faces(faces(&[Face6::WEST]));
    assert_eq!(
        hitbox(BlockKind::Vine, one_side, V::V1_8),
        Shape::pixels(0., 0., 0., 1., 16., 16.)
    );
}

#[test]
fn button_legacy_and_modern() {
    let wall_east = BlockState::DEFAULT
        .with_attach(AttachFace::Wall)
        .with_facing(Face6::EAST);
    assert_eq!(
        hitbox(BlockKind::Button, wall_east, V::V1_12),
        Shape::blocks(0., 0.375, 0.3125, 0.125, 0.625, 0.6875)
    );
    assert_eq!(
        hitbox(BlockKind::Button, wall_east.with_powered(true), V::V1_12),
        Shape::blocks(0., 0.375, 0.3125, 0.0625, 0.625, 0.6875)
    );
    assert_eq!(
        hitbox(BlockKind::Button, wall_east, V::V1_13),
        Shape::pixels(0., 6., 5., 2., 10., 11.)
    );
    // Floor and ceiling buttons use the same boxes on every client before 1.13.
    let floor = BlockState::DEFAULT.with_attach(AttachFace::Floor);
    assert_eq!(
        hitbox(BlockKind::Button, floor, V::V1_7_10),
        Shape::blocks(0.3125, 0., 0.375, 0.6875, 0.125, 0.625)
    );
    assert_ne!(
        hitbox(BlockKind::Button, floor, V::V1_7_10),
        hitbox(BlockKind::Lever, floor, V::V1_7_10),
    );
    let pressed_ceiling = BlockState::DEFAULT
        .with_attach(AttachFace::Ceiling)
        .with_powered(true);
    assert_eq!(
        hitbox(BlockKind::Button, pressed_ceiling, V::V1_7_10),
        Shape::blocks(0.3125, 0.9375, 0.375, 0.6875, 1., 0.625)
    );
}

#[test]
fn lever_on_floor_depends_on_axis() {
    let along_x = BlockState::DEFAULT.with_facing(Face6::WEST);
    assert_eq!(
        hitbox(BlockKind::Lever, along_x, V::V1_13),
        Shape::blocks(0.25, 0., 0.3125, 0.75, 0.375, 0.6875)
    );
    assert_eq!(
        hitbox(BlockKind::Lever, BlockState::DEFAULT, V::V1_13),
        Shape::blocks(0.3125, 0., 0.25, 0.6875, 0.375, 0.75)
    );
}

#[test]
fn fence_post_and_arms() {
    let state = BlockState::DEFAULT.with_faces(faces(&[Face6::NORTH, Face6::EAST]));
    let expected_hitbox = Shape::from_boxes([
        Aab::pixels(6., 0., 6., 10., 16., 10.),
        Aab::pixels(6., 0., 0., 10., 16., 10.),
        Aab::pixels(6., 0., 6., 16., 16., 10.),
    ]);
    assert_eq!(hitbox(BlockKind::Fence, state, V::V1_21), expected_hitbox);

    let barrier = collision(BlockKind::Fence, state, V::V1_21);
    assert!(barrier.exceeds_cube());
    assert!(barrier.boxes().iter().all(|aab| aab.upper(crate::math::Axis::Y) == 1.5));
}

#[test]
fn wall_post_and_tall_arm() {
    let state = BlockState::DEFAULT
        .with_faces(faces(&[Face6::UP, Face6::SOUTH, Face6::WEST]))
        .with_tall_sides(faces(&[Face6::WEST]));
    assert_eq!(
        hitbox(BlockKind::Wall, state, V::V1_16),
        Shape::from_boxes([
            Aab::pixels(4., 0., 4., 12., 16., 12.),
            Aab::pixels(5., 0., 5., 11., 14., 16.),
            Aab::pixels(0., 0., 5., 11., 16., 11.),
        ])
    );
}

#[test]
fn fence_gate_open_has_no_collision() {
    let closed = BlockState::DEFAULT.with_facing(Face6::EAST);
    assert_eq!(
        hitbox(BlockKind::FenceGate, closed.with_in_wall(true), V::V1_21),
        Shape::pixels(6., 0., 0., 10., 13., 16.)
    );
    assert_eq!(
        collision(BlockKind::FenceGate, closed, V::V1_21),
        Shape::pixels(6., 0., 0., 10., 24., 16.)
    );
    assert_eq!(
        collision(BlockKind::FenceGate, closed.with_open(true), V::V1_21),
        Shape::Empty
    );
}

#[rstest::rstest]
#[case(1, Shape::Empty)]
#[case(2, Shape::pixels(0., 0., 0., 16., 2., 16.))]
#[case(8, Shape::pixels(0., 0., 0., 16., 14., 16.))]
fn snow_collision_is_one_layer_lower(#[case] layers: u8, #[case] expected: Shape) {
    let state = BlockState::DEFAULT.with_level(layers);
    assert_eq!(collision(BlockKind::Snow, state, V::V1_21), expected);
    assert_eq!(
        hitbox(BlockKind::Snow, state, V::V1_21),
        Shape::blocks(0., 0., 0., 1., f64::from(layers) * 0.125, 1.)
    );
}

#[test]
fn collision_differs_from_outline() {
    assert_eq!(
        collision(BlockKind::SoulSand, BlockState::DEFAULT, V::V1_21),
        Shape::pixels(0., 0., 0., 16., 14., 16.)
    );
    assert_eq!(
        hitbox(BlockKind::SoulSand, BlockState::DEFAULT, V::V1_21),
        Shape::FULL
    );
    assert_eq!(
        collision(BlockKind::HoneyBlock, BlockState::DEFAULT, V::V1_21),
        Shape::pixels(1., 0., 1., 15., 15., 15.)
    );
    assert_eq!(
        collision(BlockKind::Cactus, BlockState::DEFAULT, V::V1_12),
        Shape::FULL
    );
    assert_eq!(
        collision(BlockKind::Cactus, BlockState::DEFAULT, V::V1_13),
        Shape::pixels(1., 0., 1., 15., 15., 15.)
    );
    assert_eq!(
        collision(BlockKind::Slab, BlockState::DEFAULT.with_slab(SlabType::Top), V::V1_8),
        Shape::pixels(0., 8., 0., 16., 16., 16.)
    );
}

#[test]
fn piston_head_reaches_into_base() {
    let head = hitbox(
        BlockKind::PistonHead,
        BlockState::DEFAULT.with_facing(Face6::UP),
        V::V1_21,
    );
    assert_eq!(
        head,
        Shape::from_boxes([
            Aab::pixels(0., 12., 0., 16., 16., 16.),
            Aab::pixels(6., -4., 6., 10., 12., 10.),
        ])
    );
    assert!(head.exceeds_cube());

    let west = hitbox(
        BlockKind::PistonHead,
        BlockState::DEFAULT.with_facing(Face6::WEST),
        V::V1_21,
    );
    assert_eq!(west.boxes()[0], Aab::pixels(0., 0., 0., 4., 16., 16.));
    assert_eq!(west.boxes()[1].upper(crate::math::Axis::X), 1.25);
}

#[test]
fn plant_offset_is_deterministic_and_bounded() {
    use crate::hitbox::plants::plant_offset;

    assert_eq!(plant_offset(Cube::ORIGIN), FreeVector::new(-0.25, 0.0, -0.25));
    for x in -20..20 {
        for z in -20..20 {
            let offset = plant_offset(Cube::new(x, 70, z));
            assert_eq!(offset, plant_offset(Cube::new(x, -3, z)));
            assert!(offset.x.abs() <= 0.25 && offset.z.abs() <= 0.25, "{offset:?}");
            assert_eq!(offset.y, 0.0);
        }
    }
}

#[test]
fn flower_offset_only_on_newer_clients() {
    let at = Cube::new(5, 64, -9);
    let query = |version| {
        HitboxQuery::new(Block::new(BlockKind::SmallFlower), version, at)
    };
    let catalog = HitboxCatalog::global();
    let centered = Shape::blocks(0.3125, 0., 0.3125, 0.6875, 0.625, 0.6875);
    assert_eq!(catalog.shape(&query(V::V1_12)), centered);
    assert_eq!(
        catalog.shape(&query(V::V1_13)),
        centered.translate(crate::hitbox::plants::plant_offset(at))
    );
}

#[rstest::rstest]
#[case(0, Face6::NORTH, Shape::Empty)]
#[case(1, Face6::NORTH, Shape::blocks(0., 0., 0., 0.5, 0.1875, 0.5))]
#[case(2, Face6::SOUTH, Shape::blocks(0.5, 0., 0., 1., 0.1875, 1.))]
#[case(4, Face6::EAST, Shape::blocks(0., 0., 0., 1., 0.1875, 1.))]
fn pink_petals_segments(#[case] amount: u8, #[case] facing: Face6, #[case] expected: Shape) {
    let state = BlockState::DEFAULT.with_level(amount).with_facing(facing);
    assert_eq!(hitbox(BlockKind::PinkPetals, state, V::V1_21), expected);
}

#[test]
fn pink_petals_older_substitutes() {
    let state = BlockState::DEFAULT.with_level(2);
    assert_eq!(
        hitbox(BlockKind::PinkPetals, state, V::V1_20),
        Shape::blocks(0., 0., 0., 1., 0.1875, 1.)
    );
    assert_eq!(
        hitbox(BlockKind::PinkPetals, state, V::V1_16),
        Shape::pixels(2., 0., 2., 14., 4., 14.)
    );
    assert_eq!(
        hitbox(BlockKind::PinkPetals, state, V::V1_12),
        Shape::blocks(0.1, 0., 0.1, 0.9, 0.8, 0.9)
    );
}

#[test]
fn crops_grow() {
    let heights: Vec<f64> = (0..8)
        .map(|age| {
            hitbox(BlockKind::Wheat, BlockState::DEFAULT.with_age(age), V::V1_21).boxes()[0]
                .upper(crate::math::Axis::Y)
        })
        .collect();
    assert_eq!(heights, [0.125, 0.25, 0.375, 0.5, 0.625, 0.75, 0.875, 1.0]);
    assert_eq!(
        hitbox(BlockKind::NetherWart, BlockState::DEFAULT.with_age(3), V::V1_21),
        Shape::pixels(0., 0., 0., 16., 14., 16.)
    );
    assert_eq!(
        hitbox(
            BlockKind::Cocoa,
            BlockState::DEFAULT.with_age(2).with_facing(Face6::WEST),
            V::V1_21
        ),
        Shape::pixels(1., 3., 4., 9., 12., 12.)
    );
}

#[test]
fn big_dripleaf_tilt() {
    let state = BlockState::DEFAULT.with_facing(Face6::NORTH);
    assert_eq!(
        hitbox(BlockKind::BigDripleaf, state, V::V1_17),
        Shape::from_boxes([
            Aab::pixels(5., 0., 9., 11., 15., 15.),
            Aab::pixels(0., 11., 0., 16., 15., 16.),
        ])
    );
    assert_eq!(
        collision(BlockKind::BigDripleaf, state.with_tilt(Tilt::Full), V::V1_17),
        Shape::Empty
    );
    assert_eq!(
        collision(BlockKind::BigDripleaf, state.with_tilt(Tilt::Partial), V::V1_17),
        Shape::pixels(0., 11., 0., 16., 13., 16.)
    );
    assert_eq!(hitbox(BlockKind::BigDripleaf, state, V::V1_16_2), Shape::FULL);
}

#[test]
fn shape_construction() {
    let a = Aab::pixels(0., 0., 0., 16., 1., 16.);
    let b = Aab::pixels(0., 15., 0., 16., 16., 16.);
    assert_eq!(Shape::from_boxes([]), Shape::Empty);
    assert_eq!(Shape::from_boxes([a]), Shape::Single(a));
    assert_eq!(Shape::from_boxes([a, b]), Shape::Composite(vec![a, b]));
    assert_eq!(Shape::Empty.with(a).with(b), Shape::Composite(vec![a, b]));
    assert_eq!(
        Shape::Single(a).union(Shape::from_boxes([b, a])),
        Shape::Composite(vec![a, b, a])
    );
    assert!(Shape::FULL.is_full_block());
    assert!(!Shape::Single(a).is_full_block());
    assert!(!Shape::FULL.exceeds_cube());
}

#[test]
fn shape_intersects_excludes_touching() {
    let slab = Shape::pixels(0., 0., 0., 16., 8., 16.);
    assert!(slab.intersects(Aab::new(0.2, 0.8, 0.4, 1.2, 0.2, 0.8)));
    assert!(!slab.intersects(Aab::new(0.2, 0.8, 0.5, 1.5, 0.2, 0.8)));
    assert!(!Shape::Empty.intersects(Aab::UNIT));
}

#[test]
fn shape_translate() {
    let shape = Shape::from_boxes([Aab::UNIT, Aab::ZERO]);
    assert_eq!(
        shape.translate(FreeVector::new(1.0, 2.0, 3.0)).boxes()[0],
        Aab::new(1.0, 2.0, 2.0, 3.0, 3.0, 4.0)
    );
    assert_eq!(Shape::Empty.translate(FreeVector::new(1.0, 0.0, 0.0)), Shape::Empty);
}

#[test]
fn concise_format() {
    use manyfmt::Refmt as _;
    assert_eq!(
        format!("{:?}", Shape::pixels(0., 0., 0., 16., 8., 16.).refmt(&crate::util::ConciseDebug)),
        "[(+0.000, +0.000, +0.000)..(+1.000, +0.500, +1.000)]"
    );
}
