//! The geometry of blocks, for every [`ObserverVersion`].
//!
//! Two shapes are defined for every block:
//!
//! * the *hitbox*, which is the outline a client targets and which entities get stuck
//!   inside of; and
//! * the *collision shape*, which moving entities are stopped by. For most blocks
//!   this is the same as the hitbox, but some blocks are taller (fences), shorter
//!   (soul sand), or have none at all (plants).
//!
//! Both are obtained from the process-wide [`HitboxCatalog::global()`].

use hashbrown::HashMap;
use once_cell::sync::Lazy;

use crate::block::{Block, BlockKind, BlockState};
use crate::math::Cube;
use crate::version::ObserverVersion;

mod shape;
pub use shape::Shape;

mod connectors;
mod fixtures;
mod plants;

#[cfg(test)]
mod tests;

/// Everything a [`HitboxRule`] may consult to produce a block's shape.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct HitboxQuery {
    /// The kind of block.
    pub kind: BlockKind,
    /// Its placement properties.
    pub state: BlockState,
    /// The rules in effect.
    pub version: ObserverVersion,
    /// Where the block is. Some plants are offset by a pseudorandom function of this.
    pub cube: Cube,
}

impl HitboxQuery {
    /// Constructs a query for `block` at `cube`.
    #[inline]
    pub fn new(block: Block, version: ObserverVersion, cube: Cube) -> Self {
        Self {
            kind: block.kind,
            state: block.state,
            version,
            cube,
        }
    }
}

/// How the shape of a block kind is determined.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum HitboxRule {
    /// The shape never varies.
    Static(Shape),
    /// The shape depends on the block state, version, or position.
    Dynamic(fn(&HitboxQuery) -> Shape),
}

impl HitboxRule {
    /// Produces the shape this rule gives for `query`.
    #[inline]
    pub fn evaluate(&self, query: &HitboxQuery) -> Shape {
        match self {
            HitboxRule::Static(shape) => shape.clone(),
            HitboxRule::Dynamic(function) => function(query),
        }
    }
}

/// Table of the geometry of every [`BlockKind`].
///
/// The catalog is immutable once built; use [`HitboxCatalog::global()`].
/// Every lookup is a pure function of its [`HitboxQuery`].
#[derive(Debug)]
pub struct HitboxCatalog {
    hitboxes: HashMap<BlockKind, HitboxRule>,
    /// Collision shapes that differ from the hitbox.
    collisions: HashMap<BlockKind, HitboxRule>,
}

static GLOBAL: Lazy<HitboxCatalog> = Lazy::new(HitboxCatalog::build);

impl HitboxCatalog {
    /// Returns the catalog of all known block geometry.
    #[inline]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    fn empty() -> Self {
        Self {
            hitboxes: HashMap::new(),
            collisions: HashMap::new(),
        }
    }

    fn build() -> Self {
        let mut catalog = Self::empty();
        fixtures::register(&mut catalog);
        connectors::register(&mut catalog);
        plants::register(&mut catalog);
        log::debug!(
            "built hitbox catalog with {} hitbox rules and {} collision rules",
            catalog.hitboxes.len(),
            catalog.collisions.len()
        );
        catalog
    }

    /// Registers the hitbox rule for each of `kinds`.
    fn hitbox(&mut self, kinds: &[BlockKind], rule: HitboxRule) {
        for &kind in kinds {
            let previous = self.hitboxes.insert(kind, rule.clone());
            debug_assert!(previous.is_none(), "hitbox of {kind:?} registered twice");
        }
    }

    /// Registers a collision shape rule, for kinds whose collision shape is not their
    /// hitbox.
    fn collision(&mut self, kinds: &[BlockKind], rule: HitboxRule) {
        for &kind in kinds {
            let previous = self.collisions.insert(kind, rule.clone());
            debug_assert!(previous.is_none(), "collision of {kind:?} registered twice");
        }
    }

    /// Returns the hitbox of the queried block.
    ///
    /// Kinds with no registered rule are treated as a full cube, or as having no shape
    /// if they are air or fluid.
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn shape(&self, query: &HitboxQuery) -> Shape {
        match self.hitboxes.get(&query.kind) {
            Some(rule) => rule.evaluate(query),
            None => fallback(query),
        }
    }

    /// Returns the hitbox of `block`, placed at the origin.
    ///
    /// ```
    /// use movecheck::block::{Block, BlockKind, BlockState};
    /// use movecheck::hitbox::{HitboxCatalog, Shape};
    /// use movecheck::version::ObserverVersion;
    ///
    /// let snow = Block::new(BlockKind::Snow).with_state(BlockState::DEFAULT.with_level(4));
    /// assert_eq!(
    ///     HitboxCatalog::global().hitbox_of(snow, ObserverVersion::V1_21),
    ///     Shape::pixels(0., 0., 0., 16., 8., 16.),
    /// );
    /// ```
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn hitbox_of(&self, block: Block, version: ObserverVersion) -> Shape {
        self.shape(&HitboxQuery::new(block, version, Cube::ORIGIN))
    }

    /// Returns the shape that moving entities collide with.
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn collision_shape(&self, query: &HitboxQuery) -> Shape {
        if !query.kind.has_collision() {
            return Shape::Empty;
        }
        match self.collisions.get(&query.kind) {
            Some(rule) => rule.evaluate(query),
            None => self.shape(query),
        }
    }

    /// Returns whether a specific hitbox rule is registered for `kind`.
    #[inline]
    pub fn has_rule(&self, kind: BlockKind) -> bool {
        self.hitboxes.contains_key(&kind)
    }
}

#[cold]
fn fallback(query: &HitboxQuery) -> Shape {
    log::trace!("no hitbox rule for {:?}; using generic shape", query.kind);
    if query.kind.is_full_by_default() {
        Shape::FULL
    } else {
        Shape::Empty
    }
}
