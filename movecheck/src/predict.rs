//! Search over the inputs a player might have pressed, for the one that best explains
//! an observed movement.
//!
//! Each tick, a small set of *start vectors* is derived from the velocity the entity
//! carried over: the plain velocity, any velocity the server sent, and a jumping
//! variant of each. Every start vector is then combined with every forward/strafe
//! input, integrated, and resolved against the world. The branch whose displacement is
//! closest to the observed one is chosen, and the remaining distance is the *offset*.
//!
//! Every vector considered is recorded in a [`CandidateArena`] with a link to the vector
//! it was derived from, for inspection after the fact.

mod arena;
pub use arena::*;

mod search;
pub use search::*;


bitflags::bitflags! {
    /// Which rules produced a [`VelocityCandidate`].
    ///
    /// A candidate's tags include those of the candidate it was derived from.
    #[derive(Clone, Copy, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
    pub struct CandidateTags: u16 {
        /// Derived from the velocity carried over from the previous tick.
        const CARRIED = 1 << 0;
        /// Derived from a knockback velocity sent by the server.
        const KNOCKBACK = 1 << 1;
        /// Derived from an explosion velocity sent by the server.
        const EXPLOSION = 1 << 2;
        /// Jumped off the ground.
        const JUMP = 1 << 3;
        /// Swam upward in a fluid.
        const SWIM_HOP = 1 << 4;
        /// Movement keys were pressed.
        const INPUT = 1 << 5;
        /// Speed was limited by climbing.
        const CLIMBING = 1 << 6;
        /// Speed was scaled by a block the entity is stuck in.
        const STUCK = 1 << 7;
        /// Horizontal movement was reduced to avoid walking off an edge while sneaking.
        const EDGE_BACK_OFF = 1 << 8;
        /// Stepped up onto a ledge.
        const STEPPED = 1 << 9;
        /// Pushed out of a block the entity was inside of.
        const PUSHED_OUT = 1 << 10;
        /// Resolved with every axis order, since the client may have skipped a tick.
        const SKIPPED_TICK = 1 << 11;
    }
}
