//! Effects of the blocks an entity is inside of or next to, other than stopping it.
//!
//! These are the block interactions that modify velocity directly: cobwebs and berry
//! bushes slow the entity down, bubble columns push it, honey makes it slide, and
//! blocks the entity is stuck inside of push it out. Also here are the positional
//! rules for climbing and for sneaking along an edge.

use euclid::{point3, vec3};

use crate::block::{Block, BlockKind};
use crate::collision::is_space_empty;
use crate::hitbox::{HitboxCatalog, HitboxQuery};
use crate::math::{Aab, Axis, Cube, Face6, FreeCoordinate, FreePoint, FreeVector};
use crate::traverse::Traversal;
use crate::version::ObserverVersion;
use crate::world::WorldQuery;

use BlockKind as K;
use ObserverVersion as V;

/// From this version, the box checked for blocks the entity is inside of is shrunk by
/// 1e-5 instead of 0.001.
const PRECISE_INSIDE_CHECK: V = V::V1_19_4;
/// From this version, blocks passed through during a movement affect the entity, not
/// only those at its destination.
const INSIDE_ALONG_PATH: V = V::V1_21_2;
const BERRY_BUSH_SLOWDOWN: V = V::V1_14;
const POWDER_SNOW_SLOWDOWN: V = V::V1_17;
/// Before this version, soul sand slows entities by scaling their velocity rather
/// than through its speed factor.
const SOUL_SAND_SPEED_FACTOR: V = V::V1_15;
/// From this version, the block supporting an entity is found half a block below its
/// feet rather than in the cube below the one containing them.
const SUPPORT_HALF_BELOW: V = V::V1_15;
const BUBBLE_COLUMNS: V = V::V1_13;
const HONEY_SLIDING: V = V::V1_15;
/// From this version, a block only suffocates an entity if its shape actually
/// intersects the entity's box.
const SUFFOCATION_BY_SHAPE: V = V::V1_16;
/// From this version, entities are pushed out of the blocks their corners are inside of
/// by checking whole columns of their height.
const PUSH_OUT_BY_COLUMN: V = V::V1_14;
const CAVE_VINES_CLIMBABLE: V = V::V1_17;
const TRAPDOOR_LADDERS: V = V::V1_9;
/// From this version, a sneaking entity's edge check looks down by its step height
/// and it counts as above ground while falling a short distance.
const EDGE_CHECK_BY_STEP: V = V::V1_11;

/// Distance by which edge back-off reduces movement at each attempt.
const EDGE_BACK_OFF_STEP: FreeCoordinate = 0.05;

/// The fluid an entity is immersed in.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, exhaust::Exhaust)]
pub enum Medium {
    /// Not in any fluid.
    #[default]
    Air,
    /// In water, or in a bubble column.
    Water,
    /// In lava and not water.
    Lava,
}

/// A bubble column the entity is inside of.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct BubbleColumn {
    /// Whether the column pulls downward.
    pub drag: bool,
    /// Whether the column's top is open to air, which makes it stronger.
    pub surface: bool,
}

/// Everything found in the blocks an entity is inside of.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct InsideBlocks {
    /// Multiplier applied to the entity's next movement, if it is stuck in something.
    pub stuck_speed: Option<FreeVector>,
    /// Number of soul sand blocks touched, each of which slows older clients.
    pub soul_sand: u32,
    /// Bubble column, if any.
    pub bubble_column: Option<BubbleColumn>,
    /// A honey block the entity may be sliding down the side of.
    pub honey: Option<Cube>,
    /// The fluid the entity is in.
    pub medium: Medium,
}

impl InsideBlocks {
    /// Examines the blocks overlapping `aab`, the box of an entity whose position is
    /// `position`.
    ///
    /// `weaving` is whether the entity has the weaving status effect, which makes
    /// cobwebs less sticky.
    pub fn scan<W>(
        world: &W,
        version: ObserverVersion,
        aab: Aab,
        position: FreePoint,
        weaving: bool,
    ) -> Self
    where
        W: WorldQuery + ?Sized,
    {
        let mut found = Self {
            medium: medium_at(world, aab),
            ..Self::default()
        };
        let feet = Cube::containing(position);
        for cube in inside_box(version, aab).touched_cubes().cubes() {
            found.visit(world, version, cube, feet, weaving);
        }
        found
    }

    /// Like [`Self::scan()`], for an entity which has just moved from `from` to
    /// `position`.
    ///
    /// Newer clients examine every block passed through on the way, so that a fast
    /// entity cannot skip over a cobweb; older ones only the blocks at the destination.
    /// The path is taken one axis at a time. On 1.21.2 the destination box is swept
    /// along every step; later versions sweep the box at the end of each step.
    pub fn scan_path<W>(
        world: &W,
        version: ObserverVersion,
        aab: Aab,
        from: FreePoint,
        position: FreePoint,
        weaving: bool,
        traversal: &mut Traversal,
    ) -> Self
    where
        W: WorldQuery + ?Sized,
    {
        if version.before(INSIDE_ALONG_PATH) {
            return Self::scan(world, version, aab, position, weaving);
        }
        let mut found = Self {
            medium: medium_at(world, aab),
            ..Self::default()
        };
        let feet = Cube::containing(position);
        let destination = inside_box(version, aab);
        let sweep_box_at = |end: FreePoint| {
            if version.before(V::V1_21_4) {
                destination
            } else {
                destination.translate(end - position)
            }
        };
        for &cube in traversal.traverse_by_axis(from, position, sweep_box_at) {
            found.visit(world, version, cube, feet, weaving);
        }
        found
    }

    fn visit<W>(
        &mut self,
        world: &W,
        version: ObserverVersion,
        cube: Cube,
        feet: Option<Cube>,
        weaving: bool,
    ) where
        W: WorldQuery + ?Sized,
    {
        let block = world.block_at(cube);
        match block.kind {
            K::Cobweb => {
                self.stuck_speed = Some(if weaving {
                    vec3(0.5, 0.25, 0.5)
                } else {
                    vec3(0.25, 0.05, 0.25)
                });
            }
            K::SweetBerryBush if version.since(BERRY_BUSH_SLOWDOWN) => {
                self.stuck_speed = Some(vec3(0.8, 0.75, 0.8));
            }
            K::PowderSnow if version.since(POWDER_SNOW_SLOWDOWN) && feet == Some(cube) => {
                self.stuck_speed = Some(vec3(0.9, 1.5, 0.9));
            }
            K::SoulSand if version.before(SOUL_SAND_SPEED_FACTOR) => {
                self.soul_sand += 1;
            }
            K::BubbleColumn if version.since(BUBBLE_COLUMNS) => {
                self.bubble_column = Some(BubbleColumn {
                    drag: block.state.drag,
                    surface: world.block_at(cube + Face6::UP).kind.is_air(),
                });
            }
            K::HoneyBlock if version.since(HONEY_SLIDING) => {
                self.honey.get_or_insert(cube);
            }
            _ => {}
        }
    }

    /// Applies the effects found to the velocity an entity has after moving.
    ///
    /// `position`, `width`, and `on_ground` describe the entity after the move.
    #[must_use]
    pub fn apply_to_velocity(
        &self,
        mut velocity: FreeVector,
        position: FreePoint,
        width: FreeCoordinate,
        on_ground: bool,
    ) -> FreeVector {
        for _ in 0..self.soul_sand {
            velocity.x *= 0.4;
            velocity.z *= 0.4;
        }

        if let Some(column) = self.bubble_column {
            velocity.y = match (column.surface, column.drag) {
                (true, true) => (velocity.y - 0.03).max(-0.9),
                (true, false) => (velocity.y + 0.1).min(1.8),
                (false, true) => (velocity.y - 0.03).max(-0.3),
                (false, false) => (velocity.y + 0.06).min(0.7),
            };
        }

        if self.is_sliding_on_honey(velocity, position, width, on_ground) {
            velocity = if velocity.y < -0.13 {
                let scale = -0.05 / velocity.y;
                vec3(velocity.x * scale, -0.05, velocity.z * scale)
            } else {
                vec3(velocity.x, -0.05, velocity.z)
            };
        }
        velocity
    }

    fn is_sliding_on_honey(
        &self,
        velocity: FreeVector,
        position: FreePoint,
        width: FreeCoordinate,
        on_ground: bool,
    ) -> bool {
        let Some(cube) = self.honey else {
            return false;
        };
        if on_ground
            || position.y > FreeCoordinate::from(cube.y) + 0.9375 - 1.0e-7
            || velocity.y >= -0.08
        {
            return false;
        }
        let center = cube.center();
        let reach = 0.4375 + width / 2.0;
        (center.x - position.x).abs() + 1.0e-7 > reach
            || (center.z - position.z).abs() + 1.0e-7 > reach
    }

    /// Whether the effects found reset the distance the entity has fallen.
    #[inline]
    pub fn resets_fall_distance(&self) -> bool {
        self.bubble_column.is_some() || self.honey.is_some()
    }
}

/// The box within which blocks count as being inside an entity with box `aab`.
fn inside_box(version: ObserverVersion, aab: Aab) -> Aab {
    let shrink = if version.since(PRECISE_INSIDE_CHECK) {
        1e-5
    } else {
        0.001
    };
    aab.expand(-shrink)
}

/// Returns the fluid an entity with box `aab` is immersed in.
///
/// Every fluid block is treated as a source block, whose surface is 8/9 of the way up
/// its cube unless the same fluid is above it.
pub fn medium_at<W>(world: &W, aab: Aab) -> Medium
where
    W: WorldQuery + ?Sized,
{
    let inner = aab.expand(-0.001);
    let bottom = inner.lower(Axis::Y);
    let mut medium = Medium::Air;
    for cube in inner.touched_cubes().cubes() {
        let kind = world.block_at(cube).kind;
        let fluid = if kind.is_water() {
            Medium::Water
        } else if kind.is_lava() {
            Medium::Lava
        } else {
            continue;
        };
        let above = world.block_at(cube + Face6::UP).kind;
        let same_above = match fluid {
            Medium::Water => above.is_water(),
            _ => above.is_lava(),
        };
        let surface = FreeCoordinate::from(cube.y) + if same_above { 1.0 } else { 8.0 / 9.0 };
        if surface < bottom {
            continue;
        }
        if fluid == Medium::Water {
            return Medium::Water;
        }
        medium = fluid;
    }
    medium
}

// -------------------------------------------------------------------------------------------------

/// Returns whether `block` can suffocate entities inside it, in `version`.
///
/// Most blocks suffocate exactly when their collision shape is a full cube; the
/// exceptions changed over time.
pub fn block_suffocates(block: Block, version: ObserverVersion) -> bool {
    match block.kind {
        K::Observer | K::RedstoneBlock | K::Tnt | K::Beacon => version.since(V::V1_14),
        K::Ice | K::FrostedIce => version.since(V::V1_14),
        K::Farmland => version.since(V::V1_16),
        K::SoulSand => version.since(V::V1_16) || version.before(V::V1_14),
        K::DirtPath => version.since(V::V1_16) || version.before(V::V1_9),
        K::Piston if version.before(V::V1_14) => false,
        K::Leaves | K::Glass => false,
        _ => HitboxCatalog::global()
            .collision_shape(&HitboxQuery::new(block, version, Cube::ORIGIN))
            .is_full_block(),
    }
}

/// Returns whether an entity occupying `aab` is inside a suffocating block.
pub fn suffocates_at<W>(world: &W, version: ObserverVersion, aab: Aab) -> bool
where
    W: WorldQuery + ?Sized,
{
    let Some(cells) = aab.interior_cubes() else {
        return false;
    };
    let catalog = HitboxCatalog::global();
    cells.cubes().any(|cube| {
        let block = world.block_at(cube);
        if block.kind.is_air() || !block_suffocates(block, version) {
            return false;
        }
        if version.before(SUFFOCATION_BY_SHAPE) {
            return true;
        }
        let offset = cube.lower_bounds_f();
        catalog
            .collision_shape(&HitboxQuery::new(block, version, cube))
            .boxes()
            .iter()
            .any(|b| b.translate(offset).overlaps(aab))
    })
}

/// Applies the client's push out of blocks its corners are stuck inside of, and
/// returns the modified velocity.
///
/// Each of four points near the corners of the entity's box is checked in turn; if it
/// is inside a suffocating block, the velocity on one horizontal axis is replaced by a
/// push of 0.1 towards the nearest open neighbor.
pub fn push_out_of_blocks<W>(
    world: &W,
    version: ObserverVersion,
    aab: Aab,
    velocity: FreeVector,
) -> FreeVector
where
    W: WorldQuery + ?Sized,
{
    let center = aab.center();
    let inset = aab.size().width * 0.35;
    let y = if version.since(PUSH_OUT_BY_COLUMN) {
        aab.lower(Axis::Y)
    } else {
        aab.lower(Axis::Y) + 0.5
    };
    [
        (center.x - inset, center.z + inset),
        (center.x - inset, center.z - inset),
        (center.x + inset, center.z - inset),
        (center.x + inset, center.z + inset),
    ]
    .into_iter()
    .fold(velocity, |velocity, (x, z)| {
        push_from_point(world, version, aab, point3(x, y, z), velocity)
    })
}

fn push_from_point<W>(
    world: &W,
    version: ObserverVersion,
    aab: Aab,
    point: FreePoint,
    mut velocity: FreeVector,
) -> FreeVector
where
    W: WorldQuery + ?Sized,
{
    let Some(cube) = Cube::containing(point) else {
        return velocity;
    };
    let modern = version.since(PUSH_OUT_BY_COLUMN);
    let blocked = |cube: Cube| {
        if modern {
            let column = Aab::new(
                cube.x.into(),
                FreeCoordinate::from(cube.x) + 1.0,
                aab.lower(Axis::Y),
                aab.upper(Axis::Y),
                cube.z.into(),
                FreeCoordinate::from(cube.z) + 1.0,
            )
            .expand(-1.0e-7);
            suffocates_at(world, version, column)
        } else {
            block_suffocates(world.block_at(cube), version)
                || block_suffocates(world.block_at(cube + Face6::UP), version)
        }
    };
    if !blocked(cube) {
        return velocity;
    }

    let within = point - cube.lower_bounds_f().to_point();
    let mut nearest: Option<(FreeCoordinate, Face6)> = None;
    for face in [Face6::WEST, Face6::EAST, Face6::NORTH, Face6::SOUTH] {
        let along = within[face.axis()];
        let distance = if face.is_positive() {
            1.0 - along
        } else {
            along
        };
        if nearest.is_none_or(|(best, _)| distance < best) && !blocked(cube + face) {
            nearest = Some((distance, face));
        }
    }

    if let Some((_, face)) = nearest {
        let speed = if modern { 0.1 } else { f64::from(0.1f32) };
        let sign = if face.is_positive() { 1.0 } else { -1.0 };
        velocity[face.axis()] = speed * sign;
    }
    velocity
}

// -------------------------------------------------------------------------------------------------

/// Reduces the horizontal part of `movement` so that a sneaking entity does not walk
/// off the edge of the block it is standing on.
///
/// Each horizontal component is reduced by 0.05 at a time (and finally to zero) for as
/// long as the entity's box, moved by it and down by the check depth, would be
/// entirely in open space.
///
/// The caller is responsible for checking that the entity is sneaking and not flying.
#[expect(clippy::too_many_arguments)]
pub fn back_off_from_edge<W>(
    world: &W,
    version: ObserverVersion,
    aab: Aab,
    movement: FreeVector,
    step_height: FreeCoordinate,
    on_ground: bool,
    fall_distance: FreeCoordinate,
    scratch: &mut Vec<Aab>,
) -> FreeVector
where
    W: WorldQuery + ?Sized,
{
    if movement.y > 0.0 {
        return movement;
    }
    let modern = version.since(EDGE_CHECK_BY_STEP);
    let depth = if modern { step_height } else { 1.0 - 1.0e-7 };
    let mut open = |dx: FreeCoordinate, dy: FreeCoordinate, dz: FreeCoordinate| {
        is_space_empty(world, version, aab.translate(vec3(dx, dy, dz)), scratch).0
    };

    let above_ground = on_ground
        || (modern && fall_distance < step_height && !open(0.0, fall_distance - step_height, 0.0));
    if !above_ground {
        return movement;
    }

    let reduce = |c: FreeCoordinate| {
        if (-EDGE_BACK_OFF_STEP..EDGE_BACK_OFF_STEP).contains(&c) {
            0.0
        } else if c > 0.0 {
            c - EDGE_BACK_OFF_STEP
        } else {
            c + EDGE_BACK_OFF_STEP
        }
    };

    let mut x = movement.x;
    let mut z = movement.z;
    while x != 0.0 && open(x, -depth, 0.0) {
        x = reduce(x);
    }
    while z != 0.0 && open(0.0, -depth, z) {
        z = reduce(z);
    }
    while x != 0.0 && z != 0.0 && open(x, -depth, z) {
        x = reduce(x);
        z = reduce(z);
    }
    vec3(x, movement.y, z)
}

/// Returns the factor by which the block at or below `position` scales an entity's
/// horizontal velocity after it moves.
///
/// The block the entity's feet are in takes precedence, unless it is water or has no
/// effect, in which case the block supporting it decides.
pub fn block_speed_factor<W>(world: &W, version: ObserverVersion, position: FreePoint) -> f32
where
    W: WorldQuery + ?Sized,
{
    let factor = |kind: BlockKind| match kind {
        K::SoulSand | K::HoneyBlock if version.since(SOUL_SAND_SPEED_FACTOR) => 0.4,
        _ => 1.0,
    };
    let Some(feet) = Cube::containing(position) else {
        return 1.0;
    };
    let at_feet = world.block_at(feet).kind;
    if at_feet.is_water() {
        return 1.0;
    }
    let own = factor(at_feet);
    if own != 1.0 {
        return own;
    }
    supporting_cube(version, position).map_or(1.0, |cube| factor(world.block_at(cube).kind))
}

/// Returns the cube whose block an entity standing at `position` is supported by, for
/// the purpose of friction, jumping, and speed factors.
pub fn supporting_cube(version: ObserverVersion, position: FreePoint) -> Option<Cube> {
    if version.since(SUPPORT_HALF_BELOW) {
        Cube::containing(point3(position.x, position.y - 0.500_000_1, position.z))
    } else {
        Cube::containing(position).map(|cube| cube + Face6::DOWN)
    }
}

/// Returns whether an entity whose position is `position` is on something climbable.
pub fn on_climbable<W>(world: &W, version: ObserverVersion, position: FreePoint) -> bool
where
    W: WorldQuery + ?Sized,
{
    let Some(cube) = Cube::containing(position) else {
        return false;
    };
    let block = world.block_at(cube);
    match block.kind {
        K::Ladder
        | K::Vine
        | K::Scaffolding
        | K::TwistingVines
        | K::TwistingVinesPlant
        | K::WeepingVines
        | K::WeepingVinesPlant => true,
        K::CaveVines | K::CaveVinesPlant => version.since(CAVE_VINES_CLIMBABLE),
        // Older clients are shown a vine in its place.
        K::SweetBerryBush => version.before(BERRY_BUSH_SLOWDOWN),
        K::Trapdoor if version.since(TRAPDOOR_LADDERS) && block.state.open => {
            let below = world.block_at(cube + Face6::DOWN);
            below.kind == K::Ladder && below.state.facing == block.state.facing
        }
        _ => false,
    }
}
