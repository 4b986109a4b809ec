//! Geometry of plants and crops.

use crate::block::{BlockKind, Half, Tilt};
use crate::hitbox::fixtures::{blk, face_slab, px};
use crate::hitbox::{HitboxCatalog, HitboxQuery, HitboxRule, Shape};
use crate::math::{Aab, Cube, Face6, FreeCoordinate, FreeVector};
use crate::version::ObserverVersion as V;

use BlockKind as K;
use HitboxRule::{Dynamic, Static};

/// Clients from this version on shift some plants sideways by a function of their position.
const PLANT_OFFSETS: V = V::V1_13;

pub(super) fn register(catalog: &mut HitboxCatalog) {
    catalog.hitbox(&[K::SmallFlower], Dynamic(small_flower));
    catalog.hitbox(&[K::TallFlower, K::TallGrass, K::LargeFern], Static(Shape::FULL));
    catalog.hitbox(&[K::Sapling], Static(Shape::pixels(2., 0., 2., 14., 12., 14.)));
    catalog.hitbox(&[K::Roots], Static(Shape::pixels(2., 0., 2., 14., 13., 14.)));
    catalog.hitbox(&[K::DeadBush, K::SmallDripleaf], Static(Shape::pixels(2., 0., 2., 14., 13., 14.)));
    catalog.hitbox(&[K::SugarCane, K::TallSeagrass], Static(Shape::pixels(2., 0., 2., 14., 16., 14.)));
    catalog.hitbox(&[K::NetherSprouts], Static(Shape::pixels(2., 0., 2., 14., 3., 14.)));
    catalog.hitbox(&[K::HangingRoots], Static(hanging_roots()));
    catalog.hitbox(&[K::PaleHangingMoss], Dynamic(pale_hanging_moss));
    catalog.hitbox(&[K::ShortGrass, K::Fern], Dynamic(short_grass));
    catalog.hitbox(&[K::Seagrass], Static(Shape::pixels(2., 0., 2., 14., 12., 14.)));
    catalog.hitbox(&[K::CaveVines, K::CaveVinesPlant], Static(Shape::pixels(1., 0., 1., 15., 16., 15.)));
    catalog.hitbox(&[K::CoralFan], Static(coral_fan()));
    catalog.hitbox(&[K::TorchflowerCrop], Dynamic(torchflower_crop));
    catalog.hitbox(&[K::SweetBerryBush], Dynamic(sweet_berry_bush));
    catalog.hitbox(&[K::PitcherCrop], Dynamic(pitcher_crop));
    catalog.hitbox(
        &[
            K::TwistingVines,
            K::TwistingVinesPlant,
            K::WeepingVines,
            K::WeepingVinesPlant,
        ],
        Dynamic(nether_vines),
    );
    catalog.hitbox(&[K::Bamboo], Dynamic(bamboo));
    catalog.collision(&[K::Bamboo], Dynamic(bamboo_collision));
    catalog.hitbox(&[K::BambooSapling], Dynamic(bamboo_sapling));
    catalog.hitbox(&[K::MangrovePropagule], Dynamic(mangrove_propagule));
    catalog.hitbox(&[K::PinkPetals], Dynamic(pink_petals));
    catalog.hitbox(&[K::Wildflowers], Dynamic(wildflowers));
    catalog.hitbox(&[K::LeafLitter], Dynamic(leaf_litter));
    catalog.hitbox(&[K::Bush], Dynamic(bush));
    catalog.hitbox(&[K::ShortDryGrass], Dynamic(short_dry_grass));
    catalog.hitbox(&[K::TallDryGrass], Dynamic(tall_dry_grass));
    catalog.hitbox(&[K::CactusFlower], Dynamic(cactus_flower));
    catalog.hitbox(&[K::BigDripleaf], Dynamic(big_dripleaf));
    catalog.collision(&[K::BigDripleaf], Dynamic(big_dripleaf_collision));
    catalog.hitbox(&[K::SporeBlossom], Dynamic(spore_blossom));
    catalog.hitbox(&[K::Frogspawn], Dynamic(frogspawn));

    catalog.hitbox(&[K::Wheat, K::Beetroots], Dynamic(|q| crop(2. * (age(q) + 1.))));
    catalog.hitbox(&[K::Carrots, K::Potatoes], Dynamic(|q| crop(age(q) + 2.)));
    catalog.hitbox(&[K::NetherWart], Dynamic(|q| crop(5. + 3. * age(q))));
    catalog.hitbox(&[K::Stem], Dynamic(|q| Shape::pixels(7., 0., 7., 9., 2. * (age(q) + 1.), 9.)));
    catalog.hitbox(&[K::AttachedStem], Dynamic(attached_stem));
    catalog.hitbox(&[K::Cocoa], Dynamic(cocoa));
}

fn age(q: &HitboxQuery) -> FreeCoordinate {
    FreeCoordinate::from(q.state.age)
}

fn crop(height: FreeCoordinate) -> Shape {
    Shape::pixels(0., 0., 0., 16., height, 16.)
}

/// Pseudorandom horizontal displacement of a plant at `cube`, at most a quarter block
/// on each axis. Identical to what clients compute, so it must not be changed.
pub(crate) fn plant_offset(cube: Cube) -> FreeVector {
    let mut seed: i64 = i64::from(cube.x.wrapping_mul(3129871)) ^ i64::from(cube.z).wrapping_mul(116129781);
    seed = seed
        .wrapping_mul(seed)
        .wrapping_mul(42317861)
        .wrapping_add(seed.wrapping_mul(11));
    seed >>= 16;

    let component = |bits: i64| -> FreeCoordinate {
        let unit = f64::from((bits & 15) as f32 / 15.0f32);
        ((unit - 0.5) * 0.5).clamp(-0.25, 0.25)
    };
    FreeVector::new(component(seed), 0.0, component(seed >> 8))
}

/// Applies [`plant_offset()`] when the version has it.
fn offset(q: &HitboxQuery, shape: Shape) -> Shape {
    if q.version.since(PLANT_OFFSETS) {
        shape.translate(plant_offset(q.cube))
    } else {
        shape
    }
}

fn small_flower(q: &HitboxQuery) -> Shape {
    offset(q, Shape::blocks(0.3125, 0., 0.3125, 0.6875, 0.625, 0.6875))
}

fn hanging_roots() -> Shape {
    Shape::pixels(2., 10., 2., 14., 16., 14.)
}

fn pale_hanging_moss(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_21_2) {
        hanging_roots()
    } else {
        Shape::pixels(1., if q.state.tip { 2. } else { 0. }, 1., 15., 16., 15.)
    }
}

fn short_grass(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_13) {
        Shape::blocks(0.1, 0., 0.1, 0.9, 0.8, 0.9)
    } else {
        Shape::pixels(2., 0., 2., 14., 13., 14.)
    }
}

fn coral_fan() -> Shape {
    Shape::pixels(2., 0., 2., 14., 4., 14.)
}

fn torchflower_crop(q: &HitboxQuery) -> Shape {
    if q.state.age == 0 {
        Shape::pixels(5., 0., 5., 11., 6., 11.)
    } else {
        Shape::pixels(5., 0., 5., 11., 10., 11.)
    }
}

fn sweet_berry_bush(q: &HitboxQuery) -> Shape {
    match q.state.age {
        0 => Shape::pixels(3., 0., 3., 13., 8., 13.),
        1 | 2 => Shape::pixels(1., 0., 1., 15., 16., 15.),
        _ => Shape::FULL,
    }
}

fn pitcher_crop(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_20) {
        return Shape::FULL;
    }
    let age = usize::from(q.state.age.min(4));
    match q.state.half {
        Half::Upper => {
            let upper = [px(3., 0., 3., 13., 11., 13.), px(3., 0., 3., 13., 15., 13.)];
            let index = 4usize.abs_diff(age + 1).min(1);
            Shape::Single(upper[index])
        }
        Half::Lower => {
            let full_lower = px(3., -1., 3., 13., 16., 13.);
            let lower = [
                px(5., -1., 5., 11., 3., 11.),
                px(3., -1., 3., 13., 14., 13.),
                full_lower,
                full_lower,
                full_lower,
            ];
            Shape::Single(lower[age])
        }
    }
}

fn nether_vines(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_16) {
        return Shape::from_boxes(
            [Face6::WEST, Face6::EAST, Face6::NORTH, Face6::SOUTH].map(face_slab),
        );
    }
    match q.kind {
        K::WeepingVines => Shape::blocks(0.25, 0.5625, 0.25, 0.75, 1., 0.75),
        K::WeepingVinesPlant => Shape::blocks(0.0625, 0., 0.0625, 0.9375, 1., 0.9375),
        K::TwistingVines => Shape::blocks(0.25, 0., 0.25, 0.75, 0.9375, 0.75),
        _ => Shape::blocks(0.25, 0., 0.25, 0.75, 1., 0.75),
    }
}

fn bamboo(q: &HitboxQuery) -> Shape {
    let shape = if q.state.large_leaves {
        Shape::pixels(3., 0., 3., 13., 16., 13.)
    } else {
        Shape::pixels(5., 0., 5., 11., 16., 11.)
    };
    offset(q, shape)
}

fn bamboo_collision(q: &HitboxQuery) -> Shape {
    offset(q, Shape::pixels(6.5, 0., 6.5, 9.5, 16., 9.5))
}

fn bamboo_sapling(q: &HitboxQuery) -> Shape {
    offset(q, Shape::pixels(4., 0., 4., 12., 12., 12.))
}

fn mangrove_propagule(q: &HitboxQuery) -> Shape {
    let shape = if q.state.hanging {
        Shape::pixels(7., 0., 7., 9., 16., 9.)
    } else {
        let age = FreeCoordinate::from(q.state.age.min(4));
        let min_y = if age <= 2. { 13. - 3. * age } else { (4. - age) * 3. };
        Shape::pixels(7., min_y, 7., 9., 16., 9.)
    };
    offset(q, shape)
}

/// Flat plants made of up to four quarter-block pieces, rotated by `facing`.
fn segmented(amount: u8, facing: Face6, height_px: FreeCoordinate) -> Shape {
    let h = height_px / 16.;
    let aab = match (amount, facing) {
        (0, _) => return Shape::Empty,
        (1, Face6::SOUTH) => blk(0.5, 0., 0.5, 1., h, 1.),
        (1, Face6::WEST) => blk(0.5, 0., 0., 1., h, 0.5),
        (1, Face6::EAST) => blk(0., 0., 0.5, 0.5, h, 1.),
        (1, _) => blk(0., 0., 0., 0.5, h, 0.5),
        (2, Face6::SOUTH) => blk(0.5, 0., 0., 1., h, 1.),
        (2, Face6::WEST) => blk(0., 0., 0.5, 1., h, 1.),
        (2, Face6::EAST) => blk(0., 0., 0., 1., h, 0.5),
        (2, _) => blk(0., 0., 0., 0.5, h, 1.),
        _ => blk(0., 0., 0., 1., h, 1.),
    };
    Shape::Single(aab)
}

fn pink_petals(q: &HitboxQuery) -> Shape {
    if q.version.since(V::V1_20_3) {
        segmented(q.state.level, q.state.facing, 3.)
    } else if q.version.since(V::V1_19_4) {
        Shape::blocks(0., 0., 0., 1., 0.1875, 1.)
    } else if q.version.since(V::V1_13) {
        coral_fan()
    } else {
        short_grass(q)
    }
}

/// Stand-in shape for the newest flat plants, on clients that do not have them.
fn top_slab() -> Shape {
    Shape::pixels(0., 15., 0., 16., 16., 16.)
}

fn wildflowers(q: &HitboxQuery) -> Shape {
    if q.version.since(V::V1_21_5) {
        segmented(q.state.level, q.state.facing, 3.)
    } else {
        top_slab()
    }
}

fn leaf_litter(q: &HitboxQuery) -> Shape {
    if q.version.since(V::V1_21_5) {
        segmented(q.state.level, q.state.facing, 1.)
    } else {
        top_slab()
    }
}

fn bush(q: &HitboxQuery) -> Shape {
    if q.version.since(V::V1_21_5) {
        Shape::blocks(0., 0., 0., 1., 0.8125, 1.)
    } else {
        short_grass(q)
    }
}

fn short_dry_grass(q: &HitboxQuery) -> Shape {
    if q.version.since(V::V1_21_5) {
        Shape::blocks(0.125, 0., 0.125, 0.875, 0.625, 0.875)
    } else {
        short_grass(q)
    }
}

fn tall_dry_grass(q: &HitboxQuery) -> Shape {
    if q.version.since(V::V1_21_5) {
        Shape::blocks(0.0625, 0., 0.0625, 0.9375, 1., 0.9375)
    } else {
        short_grass(q)
    }
}

fn cactus_flower(q: &HitboxQuery) -> Shape {
    if q.version.since(V::V1_21_5) {
        Shape::blocks(0.0625, 0., 0.0625, 0.9375, 0.75, 0.9375)
    } else {
        coral_fan()
    }
}

fn dripleaf_leaf(tilt: Tilt) -> Option<Aab> {
    match tilt {
        Tilt::None | Tilt::Unstable => Some(px(0., 11., 0., 16., 15., 16.)),
        Tilt::Partial => Some(px(0., 11., 0., 16., 13., 16.)),
        Tilt::Full => None,
    }
}

fn big_dripleaf(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_17) {
        return Shape::FULL;
    }
    let stem = match q.state.facing {
        Face6::NORTH => px(5., 0., 9., 11., 15., 15.),
        Face6::SOUTH => px(5., 0., 1., 11., 15., 7.),
        Face6::EAST => px(1., 0., 5., 7., 15., 11.),
        _ => px(9., 0., 5., 15., 15., 11.),
    };
    let shape = Shape::Single(stem);
    match dripleaf_leaf(q.state.tilt) {
        Some(leaf) => shape.with(leaf),
        None => shape,
    }
}

/// Only the leaf can be stood on, and not once it has tipped fully.
fn big_dripleaf_collision(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_17) {
        return Shape::FULL;
    }
    Shape::from_boxes(dripleaf_leaf(q.state.tilt))
}

fn spore_blossom(q: &HitboxQuery) -> Shape {
    if q.version.since(V::V1_17) {
        Shape::pixels(2., 13., 2., 14., 16., 14.)
    } else {
        Shape::FULL
    }
}

fn frogspawn(q: &HitboxQuery) -> Shape {
    if q.version.since(V::V1_19) {
        Shape::pixels(0., 0., 0., 16., 1.5, 16.)
    } else {
        Shape::Empty
    }
}

fn attached_stem(q: &HitboxQuery) -> Shape {
    if q.version.before(V::V1_13) {
        return Shape::pixels(7., 0., 7., 9., 16., 9.);
    }
    match q.state.facing {
        Face6::SOUTH => Shape::pixels(6., 0., 6., 10., 10., 16.),
        Face6::WEST => Shape::pixels(0., 0., 6., 10., 10., 10.),
        Face6::NORTH => Shape::pixels(6., 0., 0., 10., 10., 10.),
        _ => Shape::pixels(6., 0., 6., 16., 10., 10.),
    }
}

fn cocoa(q: &HitboxQuery) -> Shape {
    let age = usize::from(q.state.age.min(2));
    let table: [[FreeCoordinate; 6]; 3] = match q.state.facing {
        Face6::EAST => [
            [11., 7., 6., 15., 12., 10.],
            [9., 5., 5., 15., 12., 11.],
            [7., 3., 4., 15., 12., 12.],
        ],
        Face6::WEST => [
            [1., 7., 6., 5., 12., 10.],
            [1., 5., 5., 7., 12., 11.],
            [1., 3., 4., 9., 12., 12.],
        ],
        Face6::SOUTH => [
            [6., 7., 11., 10., 12., 15.],
            [5., 5., 9., 11., 12., 15.],
            [4., 3., 7., 12., 12., 15.],
        ],
        _ => [
            [6., 7., 1., 10., 12., 5.],
            [5., 5., 1., 11., 12., 7.],
            [4., 3., 1., 12., 12., 9.],
        ],
    };
    let [x1, y1, z1, x2, y2, z2] = table[age];
    Shape::pixels(x1, y1, z1, x2, y2, z2)
}
