use core::fmt;

use manyfmt::Refmt as _;

use crate::math::FreeVector;
use crate::predict::CandidateTags;
use crate::util::ConciseDebug;

/// Index of a [`VelocityCandidate`] within a [`CandidateArena`].
///
/// Only meaningful for the arena, and the tick, that produced it.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CandidateId(u16);

impl CandidateId {
    /// Returns the position of the candidate in its arena.
    #[inline]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Debug for CandidateId {
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A velocity considered during prediction.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct VelocityCandidate {
    /// For start vectors, the velocity at the start of the tick; for branches, the
    /// movement attempted before collision.
    pub velocity: FreeVector,
    #[allow(missing_docs)]
    pub tags: CandidateTags,
    /// The candidate this one was derived from.
    pub parent: Option<CandidateId>,
}

/// Storage for one tick's [`VelocityCandidate`]s.
///
/// Cleared and reused every tick.
#[derive(Clone, Default)]
pub struct CandidateArena {
    candidates: Vec<VelocityCandidate>,
}

impl CandidateArena {
    /// Constructs an empty arena.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all candidates, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.candidates.clear();
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Adds a candidate derived from `parent`, inheriting its tags.
    ///
    /// Returns [`None`] if the arena cannot hold any more candidates.
    pub fn push(
        &mut self,
        velocity: FreeVector,
        tags: CandidateTags,
        parent: Option<CandidateId>,
    ) -> Option<CandidateId> {
        let id = CandidateId(u16::try_from(self.candidates.len()).ok()?);
        let inherited = parent.map_or(CandidateTags::empty(), |p| self[p].tags);
        self.candidates.push(VelocityCandidate {
            velocity,
            tags: tags | inherited,
            parent,
        });
        Some(id)
    }

    /// Returns the candidate with the given ID, if it is in this arena.
    #[inline]
    pub fn get(&self, id: CandidateId) -> Option<&VelocityCandidate> {
        self.candidates.get(id.index())
    }

    /// All candidates, in the order they were added.
    #[inline]
    pub fn as_slice(&self) -> &[VelocityCandidate] {
        &self.candidates
    }

    /// Iterates over `id` and then each candidate it was derived from, in turn.
    pub fn lineage(&self, id: CandidateId) -> Lineage<'_> {
        Lineage {
            arena: self,
            next: Some(id),
        }
    }
}

impl core::ops::Index<CandidateId> for CandidateArena {
    type Output = VelocityCandidate;

    #[inline]
    fn index(&self, id: CandidateId) -> &Self::Output {
        &self.candidates[id.index()]
    }
}

impl fmt::Debug for CandidateArena {
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for c in &self.candidates {
            list.entry(&format_args!(
                "{:?} {:?} <- {:?}",
                c.velocity.refmt(&ConciseDebug),
                c.tags,
                c.parent
            ));
        }
        list.finish()
    }
}

/// Iterator returned by [`CandidateArena::lineage()`].
#[derive(Clone, Debug)]
pub struct Lineage<'a> {
    arena: &'a CandidateArena,
    next: Option<CandidateId>,
}

impl<'a> Iterator for Lineage<'a> {
    type Item = (CandidateId, &'a VelocityCandidate);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let candidate = self.arena.get(id)?;
        self.next = candidate.parent;
        Some((id, candidate))
    }
}
