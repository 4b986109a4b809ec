//! [`Engine`], which tracks entities and checks their movement every tick.

use core::fmt;
use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use manyfmt::Refmt as _;

use crate::block::Block;
use crate::collision::{CollideRequest, CollisionScratch, collide};
use crate::config::{EngineConfig, Uncertainty};
use crate::hitbox::{HitboxCatalog, Shape};
use crate::math::{Aab, FreeCoordinate, FreePoint, FreeVector};
use crate::physics::{EntityPhysicsState, ServerVelocity};
use crate::predict::{CandidateTags, Prediction, PredictionSearch, Scratch};
use crate::util::ConciseDebug;
use crate::version::ObserverVersion;
use crate::violation::{
    Certainty, CheckKind, CheckOutcome, ViolationLevel, ViolationSink, ViolationTracker,
};
use crate::world::WorldQuery;

#[cfg(feature = "auto-threads")]
use rayon::iter::{IntoParallelRefMutIterator as _, ParallelIterator as _};

mod pool;
pub use pool::ScratchPool;


/// Identifies an entity tracked by an [`Engine`]. Assigned by the host.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(u64);

impl EntityId {
    #[allow(missing_docs)]
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[allow(missing_docs)]
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity {}", self.0)
    }
}

/// Error from [`Engine::predict_movement()`] and the other per-entity operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum PredictError {
    /// The entity was never tracked, or has already been removed.
    #[error("{0} is not tracked")]
    UnknownEntity(EntityId),
    /// The entity was removed while its movement was being evaluated.
    #[error("{0} was removed during evaluation")]
    EntityRemoved(EntityId),
    /// The observed displacement, or the entity's position, velocity, or size, contains
    /// NaN or infinite components.
    #[error("movement or state of {0} is not finite")]
    NonFinite(EntityId),
}

/// Overall result of checking one tick of an entity's movement.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_enums)]
pub enum Verdict {
    /// The observed movement matched a prediction.
    Clean,
    /// The observed movement failed at least one check this tick. Whether that is
    /// reported depends on the entity's violation levels.
    Violation,
    /// The movement reached into terrain that is not loaded, so it could not be
    /// checked. Violation levels are unchanged.
    Indeterminate,
    /// The entity is exempt from checks, or is flying.
    Exempt,
}

/// Result of [`Engine::predict_movement()`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct MovementReport {
    #[allow(missing_docs)]
    pub verdict: Verdict,
    /// Distance between the observed and the best predicted displacement, if a
    /// prediction was made.
    pub offset: Option<FreeCoordinate>,
    /// Offset tolerated this tick: the configured threshold plus the allowance for
    /// network conditions.
    pub tolerance: FreeCoordinate,
    /// Velocity of the chosen branch, before collision. Equal to the observed
    /// displacement when no prediction was made.
    pub chosen_velocity: FreeVector,
    /// Details of the prediction, if one was made.
    pub prediction: Option<Prediction>,
}

/// An entity tracked by an [`Engine`].
#[derive(Debug)]
#[non_exhaustive]
pub struct TrackedEntity {
    /// Physical state. The host should update the fields it knows about, such as
    /// rotation, input flags, status effects, and the claimed ground state, before each
    /// call to [`Engine::predict_movement()`].
    pub state: EntityPhysicsState,
    /// Latency of the entity's connection.
    pub ping: Duration,
    /// Whether checks are skipped for this entity, for example because the host
    /// excludes it.
    pub exempt: bool,
    scratch: Scratch,
    removed: Arc<AtomicBool>,
}

impl TrackedEntity {
    fn removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }

    /// Checks one tick of movement and updates `self.state`, without touching any
    /// violation levels; those are applied afterwards from the returned outcomes.
    fn evaluate<W>(
        &mut self,
        id: EntityId,
        world: &W,
        context: &TickContext<'_>,
        observed: FreeVector,
    ) -> Result<Evaluation, PredictError>
    where
        W: WorldQuery + ?Sized,
    {
        if self.removed() {
            return Err(PredictError::EntityRemoved(id));
        }
        if !(is_finite(observed) && self.state.is_finite()) {
            return Err(PredictError::NonFinite(id));
        }

        let allowance = context.config.uncertainty.tolerance(
            self.ping,
            context.tps,
            self.state.uncertain_ticks > 0,
        );
        let tolerance = context.config.prediction.threshold + allowance;
        let unchecked = |verdict: Verdict, outcome: Option<CheckOutcome>| Evaluation {
            report: MovementReport {
                verdict,
                offset: None,
                tolerance,
                chosen_velocity: observed,
                prediction: None,
            },
            outcomes: outcome.map(|outcome| CheckKind::ALL.map(|check| (check, outcome))),
        };

        if self.exempt || self.state.flying {
            self.state.follow(observed);
            return Ok(unchecked(Verdict::Exempt, Some(CheckOutcome::Inapplicable)));
        }

        let Some(prediction) =
            context
                .search
                .predict(&mut self.scratch, world, &self.state, observed)
        else {
            self.state.follow(observed);
            return Ok(unchecked(Verdict::Indeterminate, None));
        };
        if self.removed() {
            return Err(PredictError::EntityRemoved(id));
        }
        if prediction.indeterminate {
            log::debug!("{id}: movement reached unloaded terrain");
            self.state.follow(observed);
            return Ok(unchecked(Verdict::Indeterminate, None));
        }

        let prediction_outcome = if prediction.offset > tolerance {
            CheckOutcome::Violated {
                amount: 1,
                certainty: Certainty::from_excess(prediction.offset, tolerance),
            }
        } else {
            CheckOutcome::Clean
        };
        let ground_spoof_outcome = if self.state.claimed_on_ground && !prediction.settled.on_ground
        {
            CheckOutcome::Violated {
                amount: 1,
                certainty: Certainty::MAX,
            }
        } else {
            CheckOutcome::Clean
        };
        let no_fall_outcome = self.no_fall(id, context, &prediction);
        let anti_knockback_outcome = self.anti_knockback(context, &prediction, observed, allowance);
        let outcomes = [
            (CheckKind::Prediction, prediction_outcome),
            (CheckKind::GroundSpoof, ground_spoof_outcome),
            (CheckKind::NoFall, no_fall_outcome),
            (CheckKind::AntiKnockback, anti_knockback_outcome),
        ];

        let verdict = if outcomes
            .iter()
            .all(|(_, outcome)| !matches!(outcome, CheckOutcome::Violated { .. }))
        {
            Verdict::Clean
        } else {
            log::debug!(
                "{id}: observed {:?}, offset {:.5} (tolerance {tolerance:.5}), tags {:?}",
                observed.refmt(&ConciseDebug),
                prediction.offset,
                prediction.tags,
            );
            Verdict::Violation
        };

        // The client is authoritative for its position; everything else carries over
        // from the prediction.
        let mut settled = prediction.settled;
        settled.position = self.state.position + observed;
        self.state.commit(&settled);

        Ok(Evaluation {
            report: MovementReport {
                verdict,
                offset: Some(prediction.offset),
                tolerance,
                chosen_velocity: prediction.velocity,
                prediction: Some(prediction),
            },
            outcomes: Some(outcomes),
        })
    }

    /// Landing after a damaging fall without claiming to be on the ground avoids the
    /// damage, since the server only applies it on a tick claimed to be on the ground.
    fn no_fall(
        &self,
        id: EntityId,
        context: &TickContext<'_>,
        prediction: &Prediction,
    ) -> CheckOutcome {
        let config = &context.config.no_fall;
        if !config.enabled {
            return CheckOutcome::Inapplicable;
        }
        if self.state.on_ground || !prediction.settled.on_ground {
            return CheckOutcome::Unchanged;
        }
        let fallen = self.state.fall_distance + (-prediction.collided.displacement.y).max(0.0);
        let safe = config.max_fall_distance + self.state.safe_fall_bonus();
        if fallen <= safe {
            CheckOutcome::Unchanged
        } else if self.state.claimed_on_ground {
            CheckOutcome::Clean
        } else {
            log::debug!("{id}: landed after falling {fallen:.3} without claiming ground");
            CheckOutcome::Violated {
                amount: 1,
                certainty: Certainty::from_excess(fallen, safe),
            }
        }
    }

    /// A pending knockback was ignored if the chosen branch does not derive from it, and
    /// no branch that does comes within tolerance of the observed movement.
    fn anti_knockback(
        &self,
        context: &TickContext<'_>,
        prediction: &Prediction,
        observed: FreeVector,
        allowance: FreeCoordinate,
    ) -> CheckOutcome {
        let config = &context.config.anti_knockback;
        if !config.enabled {
            return CheckOutcome::Inapplicable;
        }
        let Some(ServerVelocity::Replace(knockback)) = self.state.pending_velocity else {
            return CheckOutcome::Unchanged;
        };
        if knockback.length() < config.min_knockback {
            return CheckOutcome::Unchanged;
        }
        let tolerance = config.offset_threshold + allowance;
        let took_knockback = prediction.tags.contains(CandidateTags::KNOCKBACK)
            || prediction.server_offset.is_none_or(|offset| offset <= tolerance);
        if took_knockback {
            return CheckOutcome::Clean;
        }
        let moved = (observed.length() / config.assumed_knockback).clamp(0.0, 1.0);
        CheckOutcome::Violated {
            amount: 1,
            certainty: Certainty::new(((1.0 - moved) * 100.0) as u8),
        }
    }
}

fn is_finite(v: FreeVector) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

/// Allows removing an entity from an [`Engine`] without access to the engine, such as
/// from another thread while [`Engine::predict_many()`] is running.
///
/// Any evaluation of the entity's movement which has not finished yet is abandoned
/// without changing its state, and returns [`PredictError::EntityRemoved`].
#[derive(Clone, Debug)]
pub struct RemovalHandle {
    id: EntityId,
    flag: Arc<AtomicBool>,
}

impl RemovalHandle {
    #[allow(missing_docs)]
    pub fn entity(&self) -> EntityId {
        self.id
    }

    /// Marks the entity as removed. The engine forgets it the next time it is evaluated,
    /// or on the next [`Engine::collect_removed()`].
    pub fn remove(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

/// Parameters shared by every evaluation in a tick.
#[derive(Clone, Copy, Debug)]
struct TickContext<'a> {
    config: &'a EngineConfig,
    search: PredictionSearch,
    tps: FreeCoordinate,
}

/// Result of [`TrackedEntity::evaluate()`], before violations are recorded.
#[derive(Clone, Copy, Debug)]
struct Evaluation {
    report: MovementReport,
    /// [`None`] if violation levels are to be left unchanged.
    outcomes: Option<[(CheckKind, CheckOutcome); CheckKind::ALL.len()]>,
}

/// Tracks entities and checks their movement.
///
/// The host drives the engine: once per tick per entity, it updates the entity's
/// [`TrackedEntity::state`] with what it knows, then calls
/// [`predict_movement()`](Self::predict_movement) with the displacement the entity
/// reported. Detections are delivered to a [`ViolationSink`].
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    entities: HashMap<EntityId, TrackedEntity>,
    violations: ViolationTracker,
    pool: ScratchPool,
    tps: FreeCoordinate,
}

impl Engine {
    /// Constructs an engine tracking no entities.
    ///
    /// Invalid values in `config` are replaced; see [`EngineConfig::repair()`].
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: config.repair(),
            entities: HashMap::new(),
            violations: ViolationTracker::new(),
            pool: ScratchPool::new(),
            tps: Uncertainty::TARGET_TPS,
        }
    }

    #[allow(missing_docs)]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replaces the configuration. Violation levels are kept.
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config.repair();
    }

    /// Sets the server's current tick rate, used to compute tolerances.
    pub fn set_tps(&mut self, tps: FreeCoordinate) {
        self.tps = tps;
    }

    /// Starts tracking an entity, or replaces the state of an already tracked one.
    ///
    /// Replacing the state keeps the entity's violation levels.
    pub fn track(&mut self, id: EntityId, state: EntityPhysicsState) -> &mut TrackedEntity {
        match self.entities.entry(id) {
            Entry::Occupied(entry) => {
                let entity = entry.into_mut();
                entity.state = state;
                entity
            }
            Entry::Vacant(entry) => entry.insert(TrackedEntity {
                state,
                ping: Duration::ZERO,
                exempt: false,
                scratch: self.pool.take(),
                removed: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    #[allow(missing_docs)]
    pub fn entity(&self, id: EntityId) -> Option<&TrackedEntity> {
        self.entities.get(&id)
    }

    #[allow(missing_docs)]
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut TrackedEntity> {
        self.entities.get_mut(&id)
    }

    /// Number of tracked entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns a handle which can remove the entity from elsewhere.
    pub fn removal_handle(&self, id: EntityId) -> Option<RemovalHandle> {
        self.entities.get(&id).map(|entity| RemovalHandle {
            id,
            flag: entity.removed.clone(),
        })
    }

    /// Stops tracking an entity, forgetting its state and violation levels.
    ///
    /// Returns whether it was tracked.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        self.violations.remove_entity(id);
        match self.entities.remove(&id) {
            Some(entity) => {
                self.pool.give(entity.scratch);
                true
            }
            None => false,
        }
    }

    /// Forgets every entity removed through a [`RemovalHandle`].
    pub fn collect_removed(&mut self) {
        let Self {
            entities,
            violations,
            pool,
            ..
        } = self;
        entities
            .extract_if(|_, entity| entity.removed())
            .for_each(|(id, entity)| {
                violations.remove_entity(id);
                pool.give(entity.scratch);
            });
    }

    /// Moves a tracked entity as the server does when teleporting it.
    pub fn teleport(&mut self, id: EntityId, position: FreePoint) -> Result<(), PredictError> {
        let ticks = self.config.uncertainty.ticks_after_event;
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(PredictError::UnknownEntity(id))?;
        if !is_finite(position.to_vector()) {
            return Err(PredictError::NonFinite(id));
        }
        entity.state.teleport(position, ticks);
        Ok(())
    }

    /// Records that the server sent the entity a velocity, such as from knockback or an
    /// explosion, which the client should apply on its next movement.
    pub fn send_velocity(
        &mut self,
        id: EntityId,
        velocity: ServerVelocity,
    ) -> Result<(), PredictError> {
        let ticks = self.config.uncertainty.ticks_after_event;
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(PredictError::UnknownEntity(id))?;
        entity.state.receive_velocity(velocity, ticks);
        Ok(())
    }

    /// Current violation level of `check` for `id`.
    pub fn violation_level(&self, id: EntityId, check: CheckKind) -> ViolationLevel {
        self.violations.level(id, check)
    }

    /// Checks one tick of movement of entity `id`, which moved by `observed`.
    ///
    /// The entity's state is advanced to the end of the tick, and its violation levels
    /// are updated. Each check whose level is above its threshold is reported to `sink`.
    pub fn predict_movement<W, S>(
        &mut self,
        world: &W,
        id: EntityId,
        observed: FreeVector,
        sink: &mut S,
    ) -> Result<MovementReport, PredictError>
    where
        W: WorldQuery + ?Sized,
        S: ViolationSink + ?Sized,
    {
        let context = TickContext {
            config: &self.config,
            search: PredictionSearch::new(self.config.max_branches),
            tps: self.tps,
        };
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(PredictError::UnknownEntity(id))?;
        let result = entity.evaluate(id, world, &context, observed);
        self.finish(id, result, sink)
    }

    /// Checks one tick of movement for each of `observations`, in parallel if the
    /// `auto-threads` feature is enabled.
    ///
    /// Equivalent to calling [`predict_movement()`](Self::predict_movement) for each
    /// entry, except that results are returned sorted by entity ID, and that if an entity
    /// appears more than once, only its last entry is evaluated. Detections are delivered
    /// to `sink` on the calling thread, in the same order as the results.
    pub fn predict_many<W, S>(
        &mut self,
        world: &W,
        observations: &[(EntityId, FreeVector)],
        sink: &mut S,
    ) -> Vec<(EntityId, Result<MovementReport, PredictError>)>
    where
        W: WorldQuery + ?Sized,
        S: ViolationSink + ?Sized,
    {
        let mut pending: HashMap<EntityId, FreeVector> = HashMap::with_capacity(observations.len());
        let mut unknown = Vec::new();
        for &(id, observed) in observations {
            if self.entities.contains_key(&id) {
                pending.insert(id, observed);
            } else {
                unknown.push((id, Err(PredictError::UnknownEntity(id))));
            }
        }

        let context = TickContext {
            config: &self.config,
            search: PredictionSearch::new(self.config.max_branches),
            tps: self.tps,
        };
        let evaluate = |(&id, entity): (&EntityId, &mut TrackedEntity)| {
            let observed = *pending.get(&id)?;
            Some((id, entity.evaluate(id, world, &context, observed)))
        };
        #[cfg(feature = "auto-threads")]
        let mut evaluated: Vec<_> = self.entities.par_iter_mut().filter_map(evaluate).collect();
        #[cfg(not(feature = "auto-threads"))]
        let mut evaluated: Vec<_> = self.entities.iter_mut().filter_map(evaluate).collect();
        evaluated.sort_unstable_by_key(|&(id, _)| id);

        let mut results: Vec<_> = evaluated
            .into_iter()
            .map(|(id, result)| (id, self.finish(id, result, sink)))
            .collect();
        results.extend(unknown);
        results.sort_by_key(|&(id, _)| id);
        results
    }

    /// Applies the outcome of an evaluation to the violation levels.
    fn finish<S>(
        &mut self,
        id: EntityId,
        result: Result<Evaluation, PredictError>,
        sink: &mut S,
    ) -> Result<MovementReport, PredictError>
    where
        S: ViolationSink + ?Sized,
    {
        let evaluation = match result {
            Ok(evaluation) => evaluation,
            Err(error @ PredictError::EntityRemoved(_)) => {
                self.remove_entity(id);
                return Err(error);
            }
            Err(error) => return Err(error),
        };
        for (check, outcome) in evaluation.outcomes.into_iter().flatten() {
            let policy = match check {
                CheckKind::Prediction => self.config.prediction.policy(),
                CheckKind::GroundSpoof => self.config.ground_spoof.policy(),
            };
            if let Some(certainty) = self.violations.record(id, check, outcome, policy) {
                sink.on_violation(id, check, certainty);
            }
        }
        Ok(evaluation.report)
    }

    /// Resolves a movement of a box against the blocks of `world`, with no stepping.
    ///
    /// Returns the displacement actually achieved.
    #[allow(clippy::unused_self)]
    pub fn resolve_collision<W>(
        &self,
        world: &W,
        version: ObserverVersion,
        aab: Aab,
        desired: FreeVector,
    ) -> FreeVector
    where
        W: WorldQuery + ?Sized,
    {
        let request = CollideRequest::new(version, aab, desired);
        collide(world, &request, &mut CollisionScratch::new()).displacement
    }

    /// Collision shape of `block` for clients of `version`, relative to the block's
    /// lower corner.
    #[allow(clippy::unused_self)]
    pub fn hitbox_of(&self, block: Block, version: ObserverVersion) -> Shape {
        HitboxCatalog::global().hitbox_of(block, version)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::DEFAULT)
    }
}
