//! How the engine reads the world: the [`WorldQuery`] trait, and [`ChunkedWorld`], an
//! in-memory implementation of it.
//!
//! The world is divided into columns 16 blocks wide ([`SECTION_SIZE`]), which are
//! loaded or not as a whole, and each column into sections 16 blocks tall.

use core::fmt;

use hashbrown::HashMap;

use crate::block::Block;
use crate::math::{Cube, CubeRange, FreeCoordinate, GridCoordinate, SECTION_SIZE};

// -------------------------------------------------------------------------------------------------

/// Read access to block state.
///
/// Implementations must be consistent for the duration of one evaluation: the engine
/// may read the same block several times and expects the same answer.
pub trait WorldQuery: Sync {
    /// Returns the section at the given column and section index.
    ///
    /// `section_y` is the Y coordinate of a block divided by 16 (rounding down).
    fn section(&self, column: (GridCoordinate, GridCoordinate), section_y: GridCoordinate)
    -> SectionLookup<'_>;

    /// The range of Y coordinates blocks may occupy: lower inclusive, upper exclusive.
    fn height_bounds(&self) -> (GridCoordinate, GridCoordinate);

    /// The world border, if there is one.
    fn border(&self) -> Option<WorldBorder> {
        None
    }

    /// Returns the block at `cube`, or air if it is not loaded or out of bounds.
    fn block_at(&self, cube: Cube) -> Block {
        match self.section(cube.column(), cube.section_y()) {
            SectionLookup::Loaded(section) => section.block(cube.within_section()),
            SectionLookup::Empty | SectionLookup::Unloaded => Block::AIR,
        }
    }

    /// Returns whether the column is loaded.
    fn chunk_present(&self, column: (GridCoordinate, GridCoordinate)) -> bool {
        let (min_y, _) = self.height_bounds();
        !matches!(
            self.section(column, min_y.div_euclid(SECTION_SIZE)),
            SectionLookup::Unloaded
        )
    }
}

/// Result of [`WorldQuery::section()`].
#[derive(Clone, Copy)]
#[non_exhaustive]
pub enum SectionLookup<'a> {
    /// The column containing the section is not loaded, so nothing is known about it.
    Unloaded,
    /// The section is loaded and contains only air, or lies outside the height bounds.
    Empty,
    /// The section is loaded and contains some non-air blocks.
    Loaded(&'a dyn BlockSection),
}

impl fmt::Debug for SectionLookup<'_> {
    #[allow(clippy::missing_inline_in_public_items)]
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unloaded => write!(f, "Unloaded"),
            Self::Empty => write!(f, "Empty"),
            Self::Loaded(_) => write!(f, "Loaded(..)"),
        }
    }
}

/// A 16×16×16 section of blocks.
pub trait BlockSection: Sync {
    /// Returns the block at the given position within the section, each coordinate in
    /// `0..16`, in X, Y, Z order.
    fn block(&self, position: [usize; 3]) -> Block;
}

// -------------------------------------------------------------------------------------------------

/// The square boundary of the world, outside of which entities may not move.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub struct WorldBorder {
    /// X coordinate of the center of the square.
    pub center_x: FreeCoordinate,
    /// Z coordinate of the center of the square.
    pub center_z: FreeCoordinate,
    /// Side length of the square.
    pub size: FreeCoordinate,
    /// Coordinates beyond this (positive or negative) are never inside the border,
    /// whatever its size.
    pub absolute_max_size: FreeCoordinate,
}

impl WorldBorder {
    /// The value of [`WorldBorder::absolute_max_size`] servers use unless configured
    /// otherwise.
    pub const DEFAULT_ABSOLUTE_MAX_SIZE: FreeCoordinate = 29_999_984.0;

    /// Constructs a border with the default absolute maximum size.
    #[inline]
    pub fn new(center_x: FreeCoordinate, center_z: FreeCoordinate, size: FreeCoordinate) -> Self {
        Self {
            center_x,
            center_z,
            size,
            absolute_max_size: Self::DEFAULT_ABSOLUTE_MAX_SIZE,
        }
    }

    /// The lowest X coordinate inside the border.
    #[inline]
    pub fn min_x(&self) -> FreeCoordinate {
        (self.center_x - self.size / 2.0).max(-self.absolute_max_size)
    }

    /// The highest X coordinate inside the border.
    #[inline]
    pub fn max_x(&self) -> FreeCoordinate {
        (self.center_x + self.size / 2.0).min(self.absolute_max_size)
    }

    /// The lowest Z coordinate inside the border.
    #[inline]
    pub fn min_z(&self) -> FreeCoordinate {
        (self.center_z - self.size / 2.0).max(-self.absolute_max_size)
    }

    /// The highest Z coordinate inside the border.
    #[inline]
    pub fn max_z(&self) -> FreeCoordinate {
        (self.center_z + self.size / 2.0).min(self.absolute_max_size)
    }
}

// -------------------------------------------------------------------------------------------------

/// Error from modifying a [`ChunkedWorld`].
#[derive(Clone, Debug, Eq, Hash, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum SetBlockError {
    /// The cube is above or below the height bounds.
    #[error("{0:?} is out of the world's height bounds")]
    OutOfBounds(Cube),
    /// The column containing the cube is not loaded.
    #[error("{0:?} is in a column which is not loaded")]
    Unloaded(Cube),
    /// The section already holds the maximum number of distinct blocks.
    #[error("too many distinct blocks in the section containing {0:?}")]
    TooManyBlocks(Cube),
}

const SECTION_VOLUME: usize = (SECTION_SIZE * SECTION_SIZE * SECTION_SIZE) as usize;

/// Storage of one section: a palette of distinct blocks and, for each position, an
/// index into the palette.
#[derive(Clone)]
struct Section {
    /// Index 0 is always air.
    palette: Vec<Block>,
    block_to_index: HashMap<Block, u16>,
    indices: Box<[u16; SECTION_VOLUME]>,
    /// Number of positions which are not air; the section is reported as
    /// [`SectionLookup::Empty`] when this is zero.
    non_air: u16,
}

impl Section {
    fn new() -> Self {
        Self {
            palette: vec![Block::AIR],
            block_to_index: HashMap::from([(Block::AIR, 0)]),
            indices: Box::new([0; SECTION_VOLUME]),
            non_air: 0,
        }
    }

    #[inline]
    fn linear_index([x, y, z]: [usize; 3]) -> usize {
        (y << 8) | (z << 4) | x
    }

    fn ensure_index(&mut self, block: Block) -> Option<u16> {
        if let Some(&index) = self.block_to_index.get(&block) {
            return Some(index);
        }
        // TODO: Compact the palette when entries are no longer used, instead of
        // failing once 65536 distinct blocks have ever been placed.
        let index = u16::try_from(self.palette.len()).ok()?;
        self.palette.push(block);
        self.block_to_index.insert(block, index);
        Some(index)
    }

    /// Replaces the block at `position` and returns the previous one.
    fn set(&mut self, position: [usize; 3], block: Block) -> Option<Block> {
        let new_index = self.ensure_index(block)?;
        let slot = &mut self.indices[Self::linear_index(position)];
        let old = self.palette[usize::from(*slot)];
        *slot = new_index;
        match (old.kind.is_air(), block.kind.is_air()) {
            (true, false) => self.non_air += 1,
            (false, true) => self.non_air -= 1,
            _ => {}
        }
        Some(old)
    }
}

impl BlockSection for Section {
    #[inline]
    fn block(&self, position: [usize; 3]) -> Block {
        self.palette[usize::from(self.indices[Self::linear_index(position)])]
    }
}

/// A loaded column: one optional section per 16 blocks of height, bottom first.
/// Sections that have never held a block are not allocated.
#[derive(Clone, Default)]
struct Column {
    sections: Vec<Option<Box<Section>>>,
}

/// An in-memory [`WorldQuery`] implementation, for hosts that mirror the world
/// themselves and for tests.
///
/// ```
/// use movecheck::block::{Block, BlockKind};
/// use movecheck::math::Cube;
/// use movecheck::world::{ChunkedWorld, WorldQuery};
///
/// let mut world = ChunkedWorld::new(-64, 320);
/// world.load_column((0, 0));
/// world.set(Cube::new(3, 70, 5), Block::new(BlockKind::Solid)).unwrap();
/// assert_eq!(world.block_at(Cube::new(3, 70, 5)).kind, BlockKind::Solid);
/// assert!(!world.chunk_present((1, 0)));
/// ```
#[derive(Clone)]
pub struct ChunkedWorld {
    min_y: GridCoordinate,
    max_y: GridCoordinate,
    columns: HashMap<(GridCoordinate, GridCoordinate), Column>,
    border: Option<WorldBorder>,
}

impl ChunkedWorld {
    /// Constructs a world with nothing loaded, whose blocks have Y coordinates in
    /// `min_y..max_y`.
    ///
    /// Panics if `min_y > max_y`.
    #[track_caller]
    pub fn new(min_y: GridCoordinate, max_y: GridCoordinate) -> Self {
        assert!(min_y <= max_y, "invalid height bounds {min_y}..{max_y}");
        Self {
            min_y,
            max_y,
            columns: HashMap::new(),
            border: None,
        }
    }

    /// Marks a column as loaded, containing only air. Does nothing if it is already
    /// loaded.
    pub fn load_column(&mut self, column: (GridCoordinate, GridCoordinate)) {
        self.columns.entry(column).or_default();
    }

    /// Loads every column overlapping the given range of cubes.
    pub fn load_columns_covering(&mut self, range: CubeRange) {
        let (lx, lz) = range.lower().column();
        let (ux, uz) = range.upper_inclusive().column();
        for cx in lx..=ux {
            for cz in lz..=uz {
                self.load_column((cx, cz));
            }
        }
    }

    /// Forgets a column's contents; it becomes unloaded.
    pub fn unload_column(&mut self, column: (GridCoordinate, GridCoordinate)) {
        self.columns.remove(&column);
    }

    /// Sets or removes the world border.
    pub fn set_border(&mut self, border: Option<WorldBorder>) {
        self.border = border;
    }

    fn section_index(&self, section_y: GridCoordinate) -> Option<usize> {
        let lowest = self.min_y.div_euclid(SECTION_SIZE);
        usize::try_from(section_y.checked_sub(lowest)?).ok()
    }

    /// Replaces the block at `cube`, and returns the block that was there.
    pub fn set(&mut self, cube: Cube, block: Block) -> Result<Block, SetBlockError> {
        if !(self.min_y..self.max_y).contains(&cube.y) {
            return Err(SetBlockError::OutOfBounds(cube));
        }
        let index = self
            .section_index(cube.section_y())
            .ok_or(SetBlockError::OutOfBounds(cube))?;
        let column = self
            .columns
            .get_mut(&cube.column())
            .ok_or(SetBlockError::Unloaded(cube))?;
        if column.sections.len() <= index {
            if block.kind.is_air() {
                return Ok(Block::AIR);
            }
            column.sections.resize_with(index + 1, || None);
        }
        let section = column.sections[index].get_or_insert_with(|| Box::new(Section::new()));
        section
            .set(cube.within_section(), block)
            .ok_or(SetBlockError::TooManyBlocks(cube))
    }

    /// Sets every cube in `range` to `block`. Stops at the first failure.
    pub fn fill(&mut self, range: CubeRange, block: Block) -> Result<(), SetBlockError> {
        for cube in range.cubes() {
            self.set(cube, block)?;
        }
        Ok(())
    }
}

impl WorldQuery for ChunkedWorld {
    fn section(
        &self,
        column: (GridCoordinate, GridCoordinate),
        section_y: GridCoordinate,
    ) -> SectionLookup<'_> {
        let Some(loaded) = self.columns.get(&column) else {
            return SectionLookup::Unloaded;
        };
        let section = self
            .section_index(section_y)
            .and_then(|index| loaded.sections.get(index))
            .and_then(Option::as_deref);
        match section {
            Some(section) if section.non_air > 0 => SectionLookup::Loaded(section),
            _ => SectionLookup::Empty,
        }
    }

    fn height_bounds(&self) -> (GridCoordinate, GridCoordinate) {
        (self.min_y, self.max_y)
    }

    fn border(&self) -> Option<WorldBorder> {
        self.border
    }

    fn chunk_present(&self, column: (GridCoordinate, GridCoordinate)) -> bool {
        self.columns.contains_key(&column)
    }
}

impl fmt::Debug for ChunkedWorld {
    #[allow(clippy::missing_inline_in_public_items)]
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            min_y,
            max_y,
            columns,
            border,
        } = self;
        f.debug_struct("ChunkedWorld")
            .field("height", &(min_y..max_y))
            .field("loaded_columns", &columns.len())
            .field("border", border)
            .finish()
    }
}
