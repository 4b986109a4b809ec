//! Movecheck decides whether an observed entity's movement across one tick is
//! physically achievable under the movement rules of the client that produced it.
//!
//! Clients speak many historical versions of the game, and the rules differ between
//! them: block shapes change, collision is resolved differently, and constants are
//! adjusted. Every rule in this crate is therefore parameterized by an
//! [`ObserverVersion`], and reproduces that version's behavior including its bugs.
//!
//! ## Overview
//!
//! * The [`hitbox`] catalog gives the geometry of every [`Block`] for every version.
//! * The [`world`] module defines how the engine reads block state ([`WorldQuery`]),
//!   and provides [`ChunkedWorld`], a simple in-memory implementation.
//! * The [`collision`] module gathers the boxes near a moving entity and resolves a
//!   desired movement against them, including stepping up ledges.
//! * The [`physics`] module advances an entity's velocity by one tick, before
//!   collision: friction, gravity, fluids, status effects, and player input.
//! * The [`predict`] module branches over every input the player might have pressed,
//!   simulates each, and finds the one closest to what was observed.
//! * The [`violation`] module accumulates evidence of impossible movement.
//! * [`TpsTracker`](tps::TpsTracker) estimates the server's tick rate, which widens the
//!   tolerance when the server lags.
//! * [`Engine`] ties these together per tracked entity.
//!
//! ## Package features
//!
//! * `auto-threads`: evaluate many entities in parallel with [`rayon`] in
//!   [`Engine::predict_many()`].
//! * `serde`: serialization for [`EngineConfig`] and [`ObserverVersion`].
//!
//! [`Block`]: crate::block::Block
//! [`ChunkedWorld`]: crate::world::ChunkedWorld
//! [`Engine`]: crate::engine::Engine
//! [`Engine::predict_many()`]: crate::engine::Engine::predict_many
//! [`EngineConfig`]: crate::config::EngineConfig
//! [`ObserverVersion`]: crate::version::ObserverVersion
//! [`WorldQuery`]: crate::world::WorldQuery
#![cfg_attr(not(feature = "auto-threads"), doc = "[`rayon`]: https://docs.rs/rayon/")]
// Lenience for tests.
#![cfg_attr(test,
    allow(clippy::float_cmp), // deterministic tests
    allow(clippy::redundant_clone), // prefer regularity over efficiency
)]
// Crate-specific lint settings.
#![forbid(unsafe_code)]
#![allow(
    clippy::suboptimal_flops,
    reason = "movement rules must round exactly like the clients they model, so no fused multiply-add"
)]

pub use movecheck_base::{math, traverse};

pub mod util {
    //! Formatting helpers for log messages.

    pub use movecheck_base::util::*;
}

pub mod block;
pub mod collision;
pub mod config;
pub mod effects;
pub mod engine;
pub mod hitbox;
pub mod physics;
pub mod predict;
pub mod tps;
pub mod version;
pub mod violation;
pub mod world;

pub use engine::Engine;

/// Re-export the version of the `euclid` vector math library we're using.
pub use euclid;
