//! Definition of blocks: the [`BlockKind`] that says what a block is, and the
//! [`BlockState`] that says how it is placed.

use core::fmt;

use crate::math::{Face6, FaceSet};


/// The kind of a block, as far as movement is concerned.
///
/// Blocks whose geometry and movement effects are identical to some other block's are not
/// distinguished; for example, every kind of stone, planks, ore, and so on is
/// [`BlockKind::Solid`], and every fence material is [`BlockKind::Fence`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, exhaust::Exhaust)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
#[allow(missing_docs)]
pub enum BlockKind {
    // Generic terrain and fluids
    Air,
    /// Any block whose shape is always a full cube and which has no special effect.
    Solid,
    Water,
    Lava,
    BubbleColumn,

    // Surfaces with special friction or effects
    Ice,
    PackedIce,
    FrostedIce,
    BlueIce,
    SlimeBlock,
    HoneyBlock,
    SoulSand,
    PowderSnow,
    Cobweb,

    // Climbable
    Ladder,
    Vine,
    Scaffolding,
    TwistingVines,
    TwistingVinesPlant,
    WeepingVines,
    WeepingVinesPlant,
    CaveVines,
    CaveVinesPlant,
    Trapdoor,

    // Rails
    Rail,
    PoweredRail,
    DetectorRail,
    ActivatorRail,

    // Fixtures
    EndPortal,
    FenceGate,
    Fence,
    Pane,
    Wall,
    Lever,
    Button,
    WallSign,
    WallHangingSign,
    StandingSign,
    Banner,
    WallBanner,
    BrewingStand,
    Lectern,
    Slab,
    Carpet,
    Farmland,
    DirtPath,
    Piston,
    PistonHead,
    Observer,
    RedstoneBlock,
    RedstoneWire,
    Tnt,
    Leaves,
    Glass,
    Beacon,
    SculkShrieker,
    Fire,
    Cactus,
    Snow,

    // Plants and crops
    SmallFlower,
    TallFlower,
    Sapling,
    Roots,
    DeadBush,
    SugarCane,
    NetherSprouts,
    HangingRoots,
    PaleHangingMoss,
    ShortGrass,
    Fern,
    TallGrass,
    LargeFern,
    Seagrass,
    TallSeagrass,
    SmallDripleaf,
    BigDripleaf,
    CoralFan,
    TorchflowerCrop,
    SweetBerryBush,
    PitcherCrop,
    Bamboo,
    BambooSapling,
    MangrovePropagule,
    PinkPetals,
    Wildflowers,
    LeafLitter,
    Bush,
    ShortDryGrass,
    TallDryGrass,
    CactusFlower,
    Wheat,
    Beetroots,
    Carrots,
    Potatoes,
    NetherWart,
    Stem,
    AttachedStem,
    Cocoa,
    GlowLichen,
    SculkVein,
    ResinClump,
    SporeBlossom,
    Frogspawn,
}

impl BlockKind {
    /// Returns whether this is air, which is skipped by every spatial query.
    #[inline]
    pub const fn is_air(self) -> bool {
        matches!(self, Self::Air)
    }

    /// Returns whether an entity inside this block is in water.
    #[inline]
    pub const fn is_water(self) -> bool {
        matches!(self, Self::Water | Self::BubbleColumn)
    }

    /// Returns whether an entity inside this block is in lava.
    #[inline]
    pub const fn is_lava(self) -> bool {
        matches!(self, Self::Lava)
    }

    /// Friction factor of the top surface of this block; how much horizontal velocity
    /// is kept per tick by an entity standing on it, before air resistance.
    #[inline]
    pub const fn slipperiness(self) -> f32 {
        match self {
            Self::Ice | Self::PackedIce | Self::FrostedIce => 0.98,
            Self::BlueIce => 0.989,
            Self::SlimeBlock => 0.8,
            _ => 0.6,
        }
    }

    /// Returns whether this kind's collision shape may extend outside its own cube.
    ///
    /// Blocks just outside the range a query would otherwise examine must still be
    /// checked when they are of such a kind.
    #[inline]
    pub const fn exceeds_cube(self) -> bool {
        matches!(self, Self::Fence | Self::Wall | Self::FenceGate)
    }

    /// Returns whether this kind's shape may reach into the cubes on two sides of it at
    /// once, so that it must be checked even when diagonally adjacent to a query.
    #[inline]
    pub const fn is_overhang(self) -> bool {
        matches!(self, Self::PistonHead)
    }

    /// Returns whether moving entities can ever collide with this kind.
    pub const fn has_collision(self) -> bool {
        !matches!(
            self,
            Self::Air
                | Self::Water
                | Self::Lava
                | Self::BubbleColumn
                | Self::PowderSnow
                | Self::Cobweb
                | Self::Vine
                | Self::TwistingVines
                | Self::TwistingVinesPlant
                | Self::WeepingVines
                | Self::WeepingVinesPlant
                | Self::CaveVines
                | Self::CaveVinesPlant
                | Self::Rail
                | Self::PoweredRail
                | Self::DetectorRail
                | Self::ActivatorRail
                | Self::EndPortal
                | Self::Lever
                | Self::Button
                | Self::WallSign
                | Self::WallHangingSign
                | Self::StandingSign
                | Self::Banner
                | Self::WallBanner
                | Self::RedstoneWire
                | Self::Fire
                | Self::SmallFlower
                | Self::TallFlower
                | Self::Sapling
                | Self::Roots
                | Self::DeadBush
                | Self::SugarCane
                | Self::NetherSprouts
                | Self::HangingRoots
                | Self::PaleHangingMoss
                | Self::ShortGrass
                | Self::Fern
                | Self::TallGrass
                | Self::LargeFern
                | Self::Seagrass
                | Self::TallSeagrass
                | Self::SmallDripleaf
                | Self::CoralFan
                | Self::TorchflowerCrop
                | Self::SweetBerryBush
                | Self::PitcherCrop
                | Self::BambooSapling
                | Self::MangrovePropagule
                | Self::PinkPetals
                | Self::Wildflowers
                | Self::LeafLitter
                | Self::Bush
                | Self::ShortDryGrass
                | Self::TallDryGrass
                | Self::CactusFlower
                | Self::Wheat
                | Self::Beetroots
                | Self::Carrots
                | Self::Potatoes
                | Self::NetherWart
                | Self::Stem
                | Self::AttachedStem
                | Self::GlowLichen
                | Self::SculkVein
                | Self::ResinClump
                | Self::SporeBlossom
                | Self::Frogspawn
        )
    }

    /// The shape used when no specific geometry is registered for this kind:
    /// whether it is a full cube (otherwise it has no shape at all).
    #[inline]
    pub(crate) const fn is_full_by_default(self) -> bool {
        !matches!(
            self,
            Self::Air | Self::Water | Self::Lava | Self::BubbleColumn
        )
    }
}

// -------------------------------------------------------------------------------------------------

/// Which surface of its neighbor a lever or button is attached to.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, exhaust::Exhaust)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum AttachFace {
    #[default]
    Floor,
    Wall,
    Ceiling,
}

/// Which half of a two-block-tall block this is.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, exhaust::Exhaust)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum Half {
    #[default]
    Lower,
    Upper,
}

/// Which part of its cube a slab (or a trapdoor) occupies.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, exhaust::Exhaust)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum SlabType {
    #[default]
    Bottom,
    Top,
    Double,
}

/// How far a big dripleaf's leaf has tipped over.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, exhaust::Exhaust)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum Tilt {
    #[default]
    None,
    Unstable,
    Partial,
    Full,
}

/// The placement properties of a block.
///
/// Each [`BlockKind`] reads only the properties that apply to it and ignores the rest,
/// so unrelated properties may be left at their default values.
///
/// ```
/// use movecheck::block::{AttachFace, BlockState};
/// use movecheck::math::Face6;
///
/// let state = BlockState::DEFAULT
///     .with_attach(AttachFace::Wall)
///     .with_facing(Face6::EAST)
///     .with_powered(true);
/// assert_eq!(state.facing, Face6::EAST);
/// ```
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub struct BlockState {
    /// Horizontal (or, for some blocks, any) direction the block faces.
    pub facing: Face6,
    /// Surface a lever or button is mounted on.
    pub attach: AttachFace,
    /// Sides the block is attached to or connects towards.
    ///
    /// For vines, fire, and lichen-like blocks, these are the faces covered.
    /// For fences, panes, and walls, these are the horizontal directions with a
    /// connecting arm, and for walls [`Face6::UP`] means the central post is present.
    pub faces: FaceSet,
    /// For walls: the connected sides whose arm is full height.
    pub tall_sides: FaceSet,
    /// Growth stage of a crop or plant.
    pub age: u8,
    /// Count property: layers of snow, or petals and leaves of segmented plants.
    pub level: u8,
    /// Which half of a two-block-tall block this is.
    pub half: Half,
    /// Slab or trapdoor placement.
    pub slab: SlabType,
    /// Big dripleaf leaf tilt.
    pub tilt: Tilt,
    /// Pressed button, or powered rail.
    pub powered: bool,
    /// Open trapdoor or fence gate.
    pub open: bool,
    /// Fence gate lowered because it is attached to walls.
    pub in_wall: bool,
    /// Hanging variant of a mangrove propagule.
    pub hanging: bool,
    /// Last segment of a hanging plant.
    pub tip: bool,
    /// Bamboo with large leaves.
    pub large_leaves: bool,
    /// Rail ascending towards a neighbor.
    pub ascending: bool,
    /// Bubble column pulling downward (rather than pushing upward).
    pub drag: bool,
    /// Scaffolding that is not supported from below.
    pub bottom: bool,
    /// Extended piston.
    pub extended: bool,
}

macro_rules! with_methods {
    ($($(#[$meta:meta])* $method:ident($field:ident: $t:ty);)*) => {
        $(
            $(#[$meta])*
            #[inline]
            #[must_use]
            pub const fn $method(mut self, value: $t) -> Self {
                self.$field = value;
                self
            }
        )*
    };
}

impl BlockState {
    /// Every property at its default: facing north, a level of 1, and everything else
    /// zero, false, empty, or the first variant.
    pub const DEFAULT: Self = Self {
        facing: Face6::NORTH,
        attach: AttachFace::Floor,
        faces: FaceSet::EMPTY,
        tall_sides: FaceSet::EMPTY,
        age: 0,
        level: 1,
        half: Half::Lower,
        slab: SlabType::Bottom,
        tilt: Tilt::None,
        powered: false,
        open: false,
        in_wall: false,
        hanging: false,
        tip: false,
        large_leaves: false,
        ascending: false,
        drag: false,
        bottom: false,
        extended: false,
    };

    with_methods! {
        /// Returns a copy with [`facing`](Self::facing) replaced.
        with_facing(facing: Face6);
        /// Returns a copy with [`attach`](Self::attach) replaced.
        with_attach(attach: AttachFace);
        /// Returns a copy with [`faces`](Self::faces) replaced.
        with_faces(faces: FaceSet);
        /// Returns a copy with [`tall_sides`](Self::tall_sides) replaced.
        with_tall_sides(tall_sides: FaceSet);
        /// Returns a copy with [`age`](Self::age) replaced.
        with_age(age: u8);
        /// Returns a copy with [`level`](Self::level) replaced.
        with_level(level: u8);
        /// Returns a copy with [`half`](Self::half) replaced.
        with_half(half: Half);
        /// Returns a copy with [`slab`](Self::slab) replaced.
        with_slab(slab: SlabType);
        /// Returns a copy with [`tilt`](Self::tilt) replaced.
        with_tilt(tilt: Tilt);
        /// Returns a copy with [`powered`](Self::powered) replaced.
        with_powered(powered: bool);
        /// Returns a copy with [`open`](Self::open) replaced.
        with_open(open: bool);
        /// Returns a copy with [`in_wall`](Self::in_wall) replaced.
        with_in_wall(in_wall: bool);
        /// Returns a copy with [`hanging`](Self::hanging) replaced.
        with_hanging(hanging: bool);
        /// Returns a copy with [`tip`](Self::tip) replaced.
        with_tip(tip: bool);
        /// Returns a copy with [`large_leaves`](Self::large_leaves) replaced.
        with_large_leaves(large_leaves: bool);
        /// Returns a copy with [`ascending`](Self::ascending) replaced.
        with_ascending(ascending: bool);
        /// Returns a copy with [`drag`](Self::drag) replaced.
        with_drag(drag: bool);
        /// Returns a copy with [`bottom`](Self::bottom) replaced.
        with_bottom(bottom: bool);
        /// Returns a copy with [`extended`](Self::extended) replaced.
        with_extended(extended: bool);
    }
}

impl Default for BlockState {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Debug for BlockState {
    /// Lists only the properties which differ from [`BlockState::DEFAULT`].
    #[allow(clippy::missing_inline_in_public_items)]
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = Self::DEFAULT;
        let mut ds = f.debug_struct("BlockState");
        macro_rules! field_if_changed {
            ($($field:ident)*) => {
                $(
                    if self.$field != d.$field {
                        ds.field(stringify!($field), &self.$field);
                    }
                )*
            };
        }
        field_if_changed!(
            facing attach faces tall_sides age level half slab tilt powered open in_wall
            hanging tip large_leaves ascending drag bottom extended
        );
        ds.finish_non_exhaustive()
    }
}

// -------------------------------------------------------------------------------------------------

/// A block as found in the world: its kind and its placement properties.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::exhaustive_structs)]
pub struct Block {
    /// What the block is.
    pub kind: BlockKind,
    /// How it is placed.
    pub state: BlockState,
}

impl Block {
    /// The block of empty space.
    pub const AIR: Self = Self::new(BlockKind::Air);

    /// Constructs a block of the given kind, with default state.
    #[inline]
    pub const fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            state: BlockState::DEFAULT,
        }
    }

    /// Returns a copy of this block with the given state.
    #[inline]
    #[must_use]
    pub const fn with_state(mut self, state: BlockState) -> Self {
        self.state = state;
        self
    }
}

impl From<BlockKind> for Block {
    #[inline]
    fn from(kind: BlockKind) -> Self {
        Self::new(kind)
    }
}
