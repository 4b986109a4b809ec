use crate::predict::Scratch;

/// Spare [`Scratch`] buffers left behind by entities that are no longer tracked, handed
/// to newly tracked entities so their allocations are reused.
#[derive(Debug)]
pub struct ScratchPool {
    spare: Vec<Scratch>,
    limit: usize,
}

impl ScratchPool {
    /// Number of spare buffers kept when no limit is given.
    const DEFAULT_LIMIT: usize = 64;

    /// Constructs an empty pool.
    pub fn new() -> Self {
        Self::with_limit(Self::DEFAULT_LIMIT)
    }

    /// Constructs an empty pool which keeps at most `limit` spare buffers.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            spare: Vec::new(),
            limit,
        }
    }

    /// Returns a spare buffer, or a new one if none are spare.
    pub fn take(&mut self) -> Scratch {
        self.spare.pop().unwrap_or_default()
    }

    /// Returns a buffer to the pool, clearing its contents.
    pub fn give(&mut self, mut scratch: Scratch) {
        if self.spare.len() < self.limit {
            scratch.reset();
            self.spare.push(scratch);
        }
    }

    /// Number of spare buffers.
    pub fn len(&self) -> usize {
        self.spare.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.spare.is_empty()
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_up_to_limit() {
        let mut pool = ScratchPool::with_limit(1);
        assert!(pool.is_empty());
        pool.give(Scratch::new());
        pool.give(Scratch::new());
        assert_eq!(pool.len(), 1);
        let _ = pool.take();
        assert!(pool.is_empty());
        let _ = pool.take();
        assert!(pool.is_empty());
    }
}
