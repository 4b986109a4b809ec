use crate::hitbox::{HitboxCatalog, HitboxQuery};
use crate::math::{
    Aab, COLLISION_EPSILON, Cube, FreeCoordinate, FreePoint, GridCoordinate, SECTION_SIZE,
};
use crate::version::ObserverVersion;
use crate::world::{SectionLookup, WorldBorder, WorldQuery};

/// Clients ignore the world border entirely before this version.
const BORDER_COLLISION: ObserverVersion = ObserverVersion::V1_8;

/// The border is only collided with when the entity is at most this far from it.
const BORDER_PROXIMITY: FreeCoordinate = 16.0;

/// How far the border walls extend past the corners of the border.
const BORDER_WALL_OVERHANG: FreeCoordinate = 10.0;

/// Summary of a call to [`collect_collision_boxes()`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct Gathered {
    /// Number of boxes that were appended.
    pub boxes: usize,
    /// Whether part of the volume lies in a column which is not loaded, so the boxes
    /// found may be incomplete.
    pub indeterminate: bool,
}

impl Gathered {
    /// Combines the results of two gathers into the same buffer.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            boxes: self.boxes + other.boxes,
            indeterminate: self.indeterminate || other.indeterminate,
        }
    }
}

/// Appends to `out` the collision boxes, in world coordinates, of the blocks which could
/// obstruct an entity occupying any part of `query`.
///
/// The blocks examined extend one block beyond `query` on every side, so that blocks
/// whose collision shape is taller than a cube (fences and walls) are found. Blocks on
/// that outer layer are only included if their shape can actually reach into the
/// layer's interior.
///
/// Columns which are not loaded contribute nothing and mark the result as
/// [indeterminate](Gathered::indeterminate).
///
/// World border walls are not included; see [`border_walls()`].
#[allow(clippy::missing_inline_in_public_items)]
pub fn collect_collision_boxes<W>(
    world: &W,
    version: ObserverVersion,
    query: Aab,
    out: &mut Vec<Aab>,
) -> Gathered
where
    W: WorldQuery + ?Sized,
{
    let catalog = HitboxCatalog::global();
    let start_len = out.len();
    let mut indeterminate = false;

    let lower = query
        .lower_bounds_p()
        .map(|c| (c - COLLISION_EPSILON).floor() as GridCoordinate - 1);
    let upper = query
        .upper_bounds_p()
        .map(|c| (c + COLLISION_EPSILON).floor() as GridCoordinate + 1);
    let (world_min_y, world_max_y) = world.height_bounds();
    let min_y = lower.y.max(world_min_y);
    let max_y = upper.y.min(world_max_y - 1);
    if min_y > max_y {
        return Gathered::default();
    }

    for cx in lower.x.div_euclid(SECTION_SIZE)..=upper.x.div_euclid(SECTION_SIZE) {
        for cz in lower.z.div_euclid(SECTION_SIZE)..=upper.z.div_euclid(SECTION_SIZE) {
            if !world.chunk_present((cx, cz)) {
                indeterminate = true;
                continue;
            }
            let x_range = (cx * SECTION_SIZE).max(lower.x)..=(cx * SECTION_SIZE + 15).min(upper.x);
            let z_range = (cz * SECTION_SIZE).max(lower.z)..=(cz * SECTION_SIZE + 15).min(upper.z);

            for sy in min_y.div_euclid(SECTION_SIZE)..=max_y.div_euclid(SECTION_SIZE) {
                let section = match world.section((cx, cz), sy) {
                    SectionLookup::Loaded(section) => section,
                    SectionLookup::Empty => continue,
                    SectionLookup::Unloaded => {
                        indeterminate = true;
                        continue;
                    }
                };
                let y_range = (sy * SECTION_SIZE).max(min_y)..=(sy * SECTION_SIZE + 15).min(max_y);

                for y in y_range {
                    for z in z_range.clone() {
                        for x in x_range.clone() {
                            let edges = u8::from(x == lower.x || x == upper.x)
                                + u8::from(y == lower.y || y == upper.y)
                                + u8::from(z == lower.z || z == upper.z);
                            if edges == 3 {
                                continue;
                            }
                            let cube = Cube::new(x, y, z);
                            let block = section.block(cube.within_section());
                            if block.kind.is_air()
                                || (edges == 1 && !block.kind.exceeds_cube())
                                || (edges == 2 && !block.kind.is_overhang())
                            {
                                continue;
                            }
                            let shape =
                                catalog.collision_shape(&HitboxQuery::new(block, version, cube));
                            let offset = cube.lower_bounds_f();
                            out.extend(shape.boxes().iter().map(|aab| aab.translate(offset)));
                        }
                    }
                }
            }
        }
    }

    Gathered {
        boxes: out.len() - start_len,
        indeterminate,
    }
}

/// Returns the four walls of the world border, if an entity at `position` would collide
/// with them.
///
/// The walls are zero-thickness boxes of unbounded height. They are only returned when
/// the entity's position is strictly inside the border and less than 16 blocks from it,
/// even if its box already straddles the border; an entity which is already outside
/// may move freely.
#[allow(clippy::missing_inline_in_public_items)]
pub fn border_walls(
    version: ObserverVersion,
    border: &WorldBorder,
    position: FreePoint,
) -> Option<[Aab; 4]> {
    if version.before(BORDER_COLLISION) {
        return None;
    }
    let min_x = border.min_x().floor();
    let max_x = border.max_x().ceil();
    let min_z = border.min_z().floor();
    let max_z = border.max_z().ceil();

    let distance = (position.x - min_x)
        .min(max_x - position.x)
        .min(position.z - min_z)
        .min(max_z - position.z);
    let inside = position.x > min_x
        && position.x < max_x
        && position.z > min_z
        && position.z < max_z;
    if !(inside && distance < BORDER_PROXIMITY) {
        return None;
    }

    let inf = FreeCoordinate::INFINITY;
    let m = BORDER_WALL_OVERHANG;
    Some([
        Aab::new(min_x - m, max_x + m, -inf, inf, max_z, max_z),
        Aab::new(min_x - m, max_x + m, -inf, inf, min_z, min_z),
        Aab::new(max_x, max_x, -inf, inf, min_z - m, max_z + m),
        Aab::new(min_x, min_x, -inf, inf, min_z - m, max_z + m),
    ])
}

/// Gathers everything an entity with box `entity` collides with while occupying any
/// part of `query`: blocks, and the world border if it is near.
pub(crate) fn gather_all<W>(
    world: &W,
    version: ObserverVersion,
    entity: Aab,
    query: Aab,
    out: &mut Vec<Aab>,
) -> Gathered
where
    W: WorldQuery + ?Sized,
{
    let mut gathered = collect_collision_boxes(world, version, query, out);
    if let Some(walls) = world
        .border()
        .and_then(|border| border_walls(version, &border, entity.center()))
    {
        out.extend(walls);
        gathered.boxes += walls.len();
    }
    gathered
}

/// Returns whether an entity occupying `aab` would not be inside any block's collision
/// shape or the world border, and whether that answer is certain.
///
/// Boxes merely touching a block do not count as intersecting it. The border walls are
/// present or absent according to the center of `aab`, as in [`border_walls()`].
#[allow(clippy::missing_inline_in_public_items)]
pub fn is_space_empty<W>(
    world: &W,
    version: ObserverVersion,
    aab: Aab,
    scratch: &mut Vec<Aab>,
) -> (bool, Gathered)
where
    W: WorldQuery + ?Sized,
{
    scratch.clear();
    let gathered = gather_all(world, version, aab, aab, scratch);
    let empty = !scratch.iter().any(|obstacle| obstacle.overlaps(aab));
    scratch.clear();
    (empty, gathered)
}
