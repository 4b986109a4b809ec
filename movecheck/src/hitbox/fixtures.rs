//! Geometry of blocks that are not plants and do not connect to their neighbors.

use crate::block::{AttachFace, BlockKind, SlabType};
use crate::hitbox::{HitboxCatalog, HitboxQuery, HitboxRule, Shape};
use crate::math::{Aab, Face6, FreeCoordinate};
use crate::version::ObserverVersion as V;

use BlockKind as K;
use HitboxRule::{Dynamic, Static};

/// Shorthand for [`Aab::pixels()`].
#[inline]
pub(super) fn px(
    x1: FreeCoordinate,
    y1: FreeCoordinate,
    z1: FreeCoordinate,
    x2: FreeCoordinate,
    y2: FreeCoordinate,
    z2: FreeCoordinate,
) -> Aab {
    Aab::pixels(x1, y1, z1, x2, y2, z2)
}

/// Shorthand for [`Aab::from_corners()`], for tables written in fractions of a block.
#[inline]
pub(super) fn blk(
    x1: FreeCoordinate,
    y1: FreeCoordinate,
    z1: FreeCoordinate,
    x2: FreeCoordinate,
    y2: FreeCoordinate,
    z2: FreeCoordinate,
) -> Aab {
    Aab::from_corners(x1, y1, z1, x2, y2, z2)
}

/// The slab, one pixel thick, lying against the given face of the cube.
pub(super) fn face_slab(face: Face6) -> Aab {
    match face {
        Face6::NX => px(0., 0., 0., 1., 16., 16.),
        Face6::PX => px(15., 0., 0., 16., 16., 16.),
        Face6::NZ => px(0., 0., 0., 16., 16., 1.),
        Face6::PZ => px(0., 0., 15., 16., 16., 16.),
        Face6::NY => px(0., 0., 0., 16., 1., 16.),
        Face6::PY => px(0., 15., 0., 16., 16., 16.),
    }
}

/// Rotates a box given in pixels for a block facing up so that it faces `facing`.
///
/// The second coordinate of each corner is the distance towards `facing`.
fn oriented(facing: Face6, [x1, u1, z1, x2, u2, z2]: [FreeCoordinate; 6]) -> Aab {
    match facing {
        Face6::PY => px(x1, u1, z1, x2, u2, z2),
        Face6::NY => px(x1, 16. - u1, z1, x2, 16. - u2, z2),
        Face6::PZ => px(x1, z1, u1, x2, z2, u2),
        Face6::NZ => px(x1, z1, 16. - u1, x2, z2, 16. - u2),
        Face6::PX => px(u1, x1, z1, u2, x2, z2),
        Face6::NX => px(16. - u1, x1, z1, 16. - u2, x2, z2),
    }
}

pub(super) fn register(catalog: &mut HitboxCatalog) {
    catalog.hitbox(&[K::Air, K::Water, K::Lava, K::BubbleColumn], Static(Shape::Empty));
    catalog.hitbox(
        &[
            K::Solid,
            K::Ice,
            K::PackedIce,
            K::FrostedIce,
            K::BlueIce,
            K::SlimeBlock,
            K::Cobweb,
            K::Observer,
            K::RedstoneBlock,
            K::Tnt,
            K::Leaves,
            K::Glass,
            K::Beacon,
            K::SculkShrieker,
            // Full outline, but see their collision shapes below.
            K::HoneyBlock,
            K::PowderSnow,
            K::SoulSand,
        ],
        Static(Shape::FULL),
    );
    catalog.collision(
        &[K::HoneyBlock],
        Static(Shape::pixels(1., 0., 1., 15., 15., 15.)),
    );
    catalog.collision(
        &[K::SoulSand],
        Static(Shape::pixels(0., 0., 0., 16., 14., 16.)),
    );
    catalog.collision(
        &[K::SculkShrieker],
        Static(Shape::pixels(0., 0., 0., 16., 8., 16.)),
    );

    catalog.hitbox(&[K::Vine], Dynamic(vine));
    catalog.hitbox(
        &[K::Rail, K::PoweredRail, K::DetectorRail, K::ActivatorRail],
        Dynamic(rail),
    );
    catalog.hitbox(&[K::EndPortal], Dynamic(end_portal));
    catalog.hitbox(&[K::Ladder], Dynamic(ladder));
    catalog.hitbox(&[K::Trapdoor], Dynamic(trapdoor));
    catalog.hitbox(&[K::Lever], Dynamic(lever));
    catalog.hitbox(&[K::Button], Dynamic(button));
    catalog.hitbox(&[K::WallSign], Dynamic(wall_sign));
    catalog.hitbox(&[K::WallHangingSign], Dynamic(wall_hanging_sign));
    catalog.hitbox(
        &[K::StandingSign, K::Banner],
        Static(Shape::pixels(4., 0., 4., 12., 16., 12.)),
    );
    catalog.hitbox(&[K::WallBanner], Dynamic(wall_banner));
    catalog.hitbox(&[K::BrewingStand], Dynamic(brewing_stand));
    catalog.hitbox(&[K::Lectern], Dynamic(lectern));
    catalog.collision(&[K::Lectern], Static(lectern_common()));
    catalog.hitbox(&[K::Slab], Dynamic(slab));
    catalog.hitbox(&[K::Carpet], Static(Shape::pixels(0., 0., 0., 16., 1., 16.)));
    catalog.hitbox(&[K::Farmland], Dynamic(farmland));
    catalog.hitbox(&[K::DirtPath], Dynamic(dirt_path));
    catalog.hitbox(&[K::Piston], Dynamic(piston));
    catalog.hitbox(&[K::PistonHead], Dynamic(piston_head));
    catalog.hitbox(&[K::RedstoneWire], Static(Shape::Empty));
    catalog.hitbox(&[K::Fire], Dynamic(fire));
    catalog.hitbox(
        &[K::GlowLichen, K::SculkVein, K::ResinClump],
        Dynamic(multiface),
    );
    catalog.hitbox(&[K::Cactus], Dynamic(cactus));
    catalog.collision(&[K::Cactus], Dynamic(cactus_collision));
    catalog.hitbox(&[K::Snow], Dynamic(snow));
    catalog.collision(&[K::Snow], Dynamic(snow_collision));
    catalog.hitbox(&[K::Scaffolding], Dynamic(scaffolding));
    catalog.collision(&[K::Scaffolding], Dynamic(scaffolding_collision));
}

fn vine(q: &HitboxQuery) -> Shape {
    let faces = q.state.faces;
    let mut shape = Shape::Empty;
    for face in [Face6::WEST, Face6::EAST, Face6::NORTH, Face6::SOUTH] {
        if faces.contains(face) {
            shape = shape.with(face_slab(face));
        }
    }
    // Old clients treat a vine on more than one side as a full block.
    if q.version.before(V::V1_13) && shape.boxes().len() > 1 {
        return Shape::FULL;
    }
    if faces.contains(Face6::UP) {
        shape = shape.with(face_slab(Face6::UP));
    }
    shape
}

fn rail(q: &HitboxQuery) -> Shape {
    if !q.state.ascending {
        return Shape::pixels(0., 0., 0., 16., 2., 16.);
    }
    let v = q.version;
    let height = if v.before(V::V1_8) {
        let powered_type = q.kind == K::ActivatorRail || (q.kind == K::PoweredRail && q.state.powered);
        if powered_type { 0.125 } else { 0.625 }
    } else if v.before(V::V1_9) {
        0.625
    } else if v.before(V::V1_10) {
        0.15625
    } else if v.before(V::V1_11) {
        1.0
    } else {
        0.5
    };
    Shape::blocks(0., 0., 0., 1., height, 1.)
}

fn end_portal(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_9) {
        Shape::blocks(0., 0., 0., 1., 0.0625, 1.)
    } else if q.version.before(V::V1_17) {
        Shape::blocks(0., 0., 0., 1., 0.75, 1.)
    } else {
        Shape::pixels(0., 6., 0., 16., 12., 16.)
    }
}

fn ladder(q: &HitboxQuery) -> Shape {
    let t = if q.version.before(V::V1_9) { 2. } else { 3. };
    Shape::Single(match q.state.facing {
        Face6::SOUTH => px(0., 0., 0., 16., 16., t),
        Face6::WEST => px(16. - t, 0., 0., 16., 16., 16.),
        Face6::EAST => px(0., 0., 0., t, 16., 16.),
        _ => px(0., 0., 16. - t, 16., 16., 16.),
    })
}

fn trapdoor(q: &HitboxQuery) -> Shape {
    let s = q.state;
    Shape::Single(if s.open {
        match s.facing {
            Face6::SOUTH => px(0., 0., 0., 16., 16., 3.),
            Face6::WEST => px(13., 0., 0., 16., 16., 16.),
            Face6::EAST => px(0., 0., 0., 3., 16., 16.),
            _ => px(0., 0., 13., 16., 16., 16.),
        }
    } else if s.slab == SlabType::Top {
        px(0., 13., 0., 16., 16., 16.)
    } else {
        px(0., 0., 0., 16., 3., 16.)
    })
}

fn lever(q: &HitboxQuery) -> Shape {
    let s = q.state;
    let x_axis = matches!(s.facing, Face6::EAST | Face6::WEST);
    Shape::Single(if q.version.before(V::V1_13) {
        let f = 0.1875;
        match s.attach {
            AttachFace::Wall => match s.facing {
                Face6::WEST => blk(1. - f * 2., 0.2, 0.5 - f, 1., 0.8, 0.5 + f),
                Face6::EAST => blk(0., 0.2, 0.5 - f, f * 2., 0.8, 0.5 + f),
                Face6::SOUTH => blk(0.5 - f, 0.2, 0., 0.5 + f, 0.8, f * 2.),
                _ => blk(0.5 - f, 0.2, 1. - f * 2., 0.5 + f, 0.8, 1.),
            },
            AttachFace::Ceiling => blk(0.25, 0.4, 0.25, 0.75, 1., 0.75),
            AttachFace::Floor => blk(0.25, 0., 0.25, 0.75, 0.6, 0.75),
        }
    } else {
        match (s.attach, x_axis) {
            (AttachFace::Floor, true) => blk(0.25, 0., 0.3125, 0.75, 0.375, 0.6875),
            (AttachFace::Floor, false) => blk(0.3125, 0., 0.25, 0.6875, 0.375, 0.75),
            (AttachFace::Wall, _) => match s.facing {
                Face6::EAST => blk(0., 0.25, 0.3125, 0.375, 0.75, 0.6875),
                Face6::WEST => blk(0.625, 0.25, 0.3125, 1., 0.75, 0.6875),
                Face6::SOUTH => blk(0.3125, 0.25, 0., 0.6875, 0.75, 0.375),
                _ => blk(0.3125, 0.25, 0.625, 0.6875, 0.75, 1.),
            },
            (AttachFace::Ceiling, true) => blk(0.25, 0.625, 0.3125, 0.75, 1., 0.6875),
            (AttachFace::Ceiling, false) => blk(0.3125, 0.625, 0.25, 0.6875, 1., 0.75),
        }
    })
}

fn button(q: &HitboxQuery) -> Shape {
    let s = q.state;
    let x_axis = matches!(s.facing, Face6::EAST | Face6::WEST);
    Shape::Single(if q.version.before(V::V1_13) {
        let f2 = (if s.powered { 1. } else { 2. }) / 16.;
        match s.attach {
            AttachFace::Wall => match s.facing {
                Face6::WEST => blk(1. - f2, 0.375, 0.3125, 1., 0.625, 0.6875),
                Face6::EAST => blk(0., 0.375, 0.3125, f2, 0.625, 0.6875),
                Face6::SOUTH => blk(0.3125, 0.375, 0., 0.6875, 0.625, f2),
                _ => blk(0.3125, 0.375, 1. - f2, 0.6875, 0.625, 1.),
            },
            AttachFace::Ceiling => blk(0.3125, 1. - f2, 0.375, 0.6875, 1., 0.625),
            AttachFace::Floor => blk(0.3125, 0., 0.375, 0.6875, f2, 0.625),
        }
    } else {
        let d = if s.powered { 1. } else { 2. };
        match (s.attach, x_axis) {
            (AttachFace::Wall, _) => match s.facing {
                Face6::EAST => px(0., 6., 5., d, 10., 11.),
                Face6::WEST => px(16. - d, 6., 5., 16., 10., 11.),
                Face6::SOUTH => px(5., 6., 0., 11., 10., d),
                _ => px(5., 6., 16. - d, 11., 10., 16.),
            },
            (AttachFace::Ceiling, true) => px(6., 16. - d, 5., 10., 16., 11.),
            (AttachFace::Ceiling, false) => px(5., 16. - d, 6., 11., 16., 10.),
            (AttachFace::Floor, true) => px(6., 0., 5., 10., d, 11.),
            (AttachFace::Floor, false) => px(5., 0., 6., 11., d, 10.),
        }
    })
}

fn wall_sign(q: &HitboxQuery) -> Shape {
    Shape::Single(match q.state.facing {
        Face6::SOUTH => px(0., 4.5, 0., 16., 12.5, 2.),
        Face6::EAST => px(0., 4.5, 0., 2., 12.5, 16.),
        Face6::WEST => px(14., 4.5, 0., 16., 12.5, 16.),
        _ => px(0., 4.5, 14., 16., 12.5, 16.),
    })
}

fn wall_hanging_sign(q: &HitboxQuery) -> Shape {
    if matches!(q.state.facing, Face6::NORTH | Face6::SOUTH) {
        Shape::from_boxes([
            px(0., 14., 6., 16., 16., 10.),
            px(1., 0., 7., 15., 10., 9.),
        ])
    } else {
        Shape::from_boxes([
            px(6., 14., 0., 10., 16., 16.),
            px(7., 0., 1., 9., 10., 15.),
        ])
    }
}

fn wall_banner(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_8) {
        return wall_sign(q);
    }
    Shape::Single(match q.state.facing {
        Face6::SOUTH => px(0., 0., 0., 16., 12.5, 2.),
        Face6::EAST => px(0., 0., 0., 2., 12.5, 16.),
        Face6::WEST => px(14., 0., 0., 16., 12.5, 16.),
        _ => px(0., 0., 14., 16., 12.5, 16.),
    })
}

fn brewing_stand(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_13) {
        Shape::blocks(0., 0., 0., 1., 0.125, 1.)
    } else {
        Shape::from_boxes([
            px(1., 0., 1., 15., 2., 15.),
            blk(0.4375, 0., 0.4375, 0.5625, 0.875, 0.5625),
        ])
    }
}

/// Base and post of a lectern, without the sloped top.
fn lectern_common() -> Shape {
    Shape::from_boxes([
        px(0., 0., 0., 16., 2., 16.),
        px(4., 2., 4., 12., 14., 12.),
    ])
}

fn lectern(q: &HitboxQuery) -> Shape {
    const A: FreeCoordinate = 5.333333;
    const B: FreeCoordinate = 9.666667;
    const C: FreeCoordinate = 10.666667;
    const D: FreeCoordinate = 6.333333;
    let top: [Aab; 3] = match q.state.facing {
        Face6::WEST => [
            px(1., 10., 0., A, 14., 16.),
            px(A, 12., 0., B, 16., 16.),
            px(B, 14., 0., 14., 18., 16.),
        ],
        Face6::EAST => [
            px(C, 10., 0., 15., 14., 16.),
            px(D, 12., 0., C, 16., 16.),
            px(2., 14., 0., D, 18., 16.),
        ],
        Face6::SOUTH => [
            px(0., 10., C, 16., 14., 15.),
            px(0., 12., D, 16., 16., C),
            px(0., 14., 2., 16., 18., D),
        ],
        _ => [
            px(0., 10., 1., 16., 14., A),
            px(0., 12., A, 16., 16., B),
            px(0., 14., B, 16., 18., 14.),
        ],
    };
    top.into_iter().fold(lectern_common(), Shape::with)
}

fn slab(q: &HitboxQuery) -> Shape {
    match q.state.slab {
        SlabType::Bottom => Shape::pixels(0., 0., 0., 16., 8., 16.),
        SlabType::Top => Shape::pixels(0., 8., 0., 16., 16., 16.),
        SlabType::Double => Shape::FULL,
    }
}

fn farmland(q: &HitboxQuery) -> Shape {
    if q.version.since(V::V1_10) {
        Shape::pixels(0., 0., 0., 16., 15., 16.)
    } else {
        Shape::FULL
    }
}

fn dirt_path(q: &HitboxQuery) -> Shape {
    if q.version.since(V::V1_9) {
        Shape::pixels(0., 0., 0., 16., 15., 16.)
    } else {
        Shape::FULL
    }
}

fn piston(q: &HitboxQuery) -> Shape {
    if q.state.extended {
        Shape::Single(oriented(q.state.facing, [0., 0., 0., 16., 12., 16.]))
    } else {
        Shape::FULL
    }
}

/// The head plate and the arm, which reaches back into the piston's own cube.
fn piston_head(q: &HitboxQuery) -> Shape {
    let facing = q.state.facing;
    Shape::from_boxes([
        oriented(facing, [0., 12., 0., 16., 16., 16.]),
        oriented(facing, [6., -4., 6., 10., 12., 10.]),
    ])
}

fn fire(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_16) {
        return Shape::Empty;
    }
    let faces = q.state.faces;
    let mut shape = Shape::Empty;
    for face in [Face6::WEST, Face6::EAST, Face6::NORTH, Face6::SOUTH, Face6::UP] {
        if faces.contains(face) {
            shape = shape.with(face_slab(face));
        }
    }
    if shape.is_empty() {
        Shape::pixels(0., 0., 0., 16., 1., 16.)
    } else {
        shape
    }
}

/// Glow lichen and similar blocks that can cover any of the six faces.
fn multiface(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_17) {
        return Shape::Empty;
    }
    Shape::from_boxes(q.state.faces.faces().map(face_slab))
}

fn cactus(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_13) {
        Shape::FULL
    } else {
        Shape::pixels(1., 0., 1., 15., 16., 15.)
    }
}

fn cactus_collision(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_13) {
        cactus(q)
    } else {
        Shape::pixels(1., 0., 1., 15., 15., 15.)
    }
}

fn snow_layers(q: &HitboxQuery) -> FreeCoordinate {
    FreeCoordinate::from(q.state.level.clamp(1, 8))
}

fn snow(q: &HitboxQuery) -> Shape {
    Shape::blocks(0., 0., 0., 1., snow_layers(q) * 0.125, 1.)
}

fn snow_collision(q: &HitboxQuery) -> Shape {
    let height = (snow_layers(q) - 1.) * 2.;
    if height == 0. {
        Shape::Empty
    } else {
        Shape::pixels(0., 0., 0., 16., height, 16.)
    }
}

fn scaffolding(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_14) {
        return Shape::FULL;
    }
    let stable = Shape::from_boxes([
        px(0., 14., 0., 16., 16., 16.),
        px(0., 0., 0., 2., 16., 2.),
        px(14., 0., 0., 16., 16., 2.),
        px(0., 0., 14., 2., 16., 16.),
        px(14., 0., 14., 16., 16., 16.),
    ]);
    if q.state.bottom {
        [
            px(0., 0., 0., 2., 2., 16.),
            px(14., 0., 0., 16., 2., 16.),
            px(0., 0., 14., 16., 2., 16.),
            px(0., 0., 0., 16., 2., 2.),
        ]
        .into_iter()
        .fold(stable, Shape::with)
    } else {
        stable
    }
}

/// Only the top platform; the legs may be walked through.
fn scaffolding_collision(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_14) {
        Shape::FULL
    } else {
        Shape::pixels(0., 14., 0., 16., 16., 16.)
    }
}
