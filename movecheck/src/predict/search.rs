use manyfmt::Refmt as _;

use crate::collision::{CollideRequest, Collided, CollisionScratch, collide};
use crate::effects::{Medium, back_off_from_edge, push_out_of_blocks};
use crate::math::{Aab, FreeCoordinate, FreeVector};
use crate::physics::{EntityPhysicsState, Integrator, MoveInput, ServerVelocity, Settled};
use crate::predict::{CandidateArena, CandidateId, CandidateTags};
use crate::traverse::Traversal;
use crate::util::ConciseDebug;
use crate::world::WorldQuery;

/// Tags of start vectors taken from a velocity the server sent.
const SERVER_TAGS: CandidateTags = CandidateTags::KNOCKBACK.union(CandidateTags::EXPLOSION);

/// Squared offset below which a branch is taken as an exact match and the search ends.
const EXACT_SCORE: FreeCoordinate = 1e-5 * 1e-5;

/// Reusable buffers for [`PredictionSearch::predict()`].
///
/// Keeping one per entity means that, once warmed up, prediction does not allocate.
#[derive(Clone, Debug, Default)]
pub struct Scratch {
    arena: CandidateArena,
    starts: Vec<CandidateId>,
    collision: CollisionScratch,
    edge: Vec<Aab>,
    traversal: Traversal,
}

impl Scratch {
    /// Constructs empty buffers.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the previous tick's contents but keeps allocations.
    pub fn reset(&mut self) {
        self.arena.clear();
        self.starts.clear();
        self.collision.clear();
        self.edge.clear();
    }

    /// The candidates considered by the most recent prediction.
    #[inline]
    pub fn arena(&self) -> &CandidateArena {
        &self.arena
    }
}

/// Outcome of [`PredictionSearch::predict()`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct Prediction {
    /// Distance between the observed displacement and the closest predicted one.
    pub offset: FreeCoordinate,
    /// The closest branch, in the scratch's [`CandidateArena`].
    pub chosen: CandidateId,
    /// Tags of the chosen branch.
    pub tags: CandidateTags,
    /// Input of the chosen branch.
    pub input: MoveInput,
    /// Movement the chosen branch attempted, before collision.
    pub velocity: FreeVector,
    /// Collision result of the chosen branch.
    pub collided: Collided,
    /// What the entity's state becomes if the chosen branch is what happened.
    pub settled: Settled,
    /// Distance between the observed displacement and the closest branch derived from a
    /// velocity the server sent, if one was pending.
    pub server_offset: Option<FreeCoordinate>,
    /// Number of branches evaluated.
    pub branches: usize,
    /// Whether some branch's movement reached into unloaded terrain, so that the
    /// prediction cannot be trusted.
    pub indeterminate: bool,
}

/// Finds the input that best explains an entity's observed movement.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PredictionSearch {
    max_branches: usize,
}

impl PredictionSearch {
    /// Constructs a search which evaluates at most `max_branches` branches per tick.
    /// At least one branch is always evaluated.
    pub fn new(max_branches: usize) -> Self {
        Self {
            max_branches: max_branches.max(1),
        }
    }

    /// Predicts the movement of the entity described by `state` in `world`, choosing the
    /// branch closest to `observed`.
    ///
    /// The start vectors, in order of priority, are: the carried-over velocity, the
    /// server's velocity if one is pending, and the jumping variant of each. Each is
    /// crossed with [`MoveInput::GRID`], skipping inputs other than forward while
    /// sprinting. If more branches than allowed remain, the later ones are not evaluated.
    ///
    /// If a server velocity is pending but the search ended before reaching any branch
    /// derived from it, one such branch with the chosen input is evaluated anyway, to
    /// fill in [`Prediction::server_offset`]. It is not counted against the limit.
    ///
    /// Returns [`None`] if no branch could be evaluated, which only happens if the
    /// candidate arena overflows.
    pub fn predict<W>(
        &self,
        scratch: &mut Scratch,
        world: &W,
        state: &EntityPhysicsState,
        observed: FreeVector,
    ) -> Option<Prediction>
    where
        W: WorldQuery + ?Sized,
    {
        scratch.reset();
        let integrator = Integrator::new(world, state);
        add_starts(scratch, world, state, &integrator);

        let aab = state.aab();
        let mut request = CollideRequest::new(state.version, aab, FreeVector::zero());
        request.step_height = state.attributes.step_height;
        request.last_on_ground = state.on_ground;
        request.falling_last_tick = state.last_velocity.y < 0.0;
        request.all_orders = state.possible_skipped_tick;
        request.observed = Some(observed);
        request.claimed_on_ground = Some(state.claimed_on_ground);

        let mut best: Option<(FreeCoordinate, CandidateId, MoveInput, Collided)> = None;
        let mut server_score: Option<FreeCoordinate> = None;
        let mut branches = 0;
        let mut indeterminate = false;

        'search: for start_index in 0..scratch.starts.len() {
            let start = scratch.starts[start_index];
            let start_velocity = scratch.arena[start].velocity;
            for input in MoveInput::GRID {
                if state.sprinting && input.forward <= 0 && !input.is_none() {
                    continue;
                }
                if branches >= self.max_branches {
                    log::debug!("branch limit reached with {branches} branches");
                    break 'search;
                }

                let mut tags = CandidateTags::empty();
                if !input.is_none() {
                    tags |= CandidateTags::INPUT;
                }
                if integrator.climbing() {
                    tags |= CandidateTags::CLIMBING;
                }
                if state.stuck_speed.is_some() {
                    tags |= CandidateTags::STUCK;
                }
                if state.possible_skipped_tick {
                    tags |= CandidateTags::SKIPPED_TICK;
                }

                let mut movement = integrator.integrate(state, start_velocity, input);
                if state.sneaking && !state.flying {
                    let backed_off = back_off_from_edge(
                        world,
                        state.version,
                        aab,
                        movement,
                        state.attributes.step_height,
                        state.on_ground,
                        state.fall_distance,
                        &mut scratch.edge,
                    );
                    if backed_off != movement {
                        tags |= CandidateTags::EDGE_BACK_OFF;
                        movement = backed_off;
                    }
                }

                request.desired = movement;
                let collided = collide(world, &request, &mut scratch.collision);
                branches += 1;
                indeterminate |= collided.gathered.indeterminate;
                if collided.stepped {
                    tags |= CandidateTags::STEPPED;
                }

                let Some(id) = scratch.arena.push(movement, tags, Some(start)) else {
                    break 'search;
                };
                let score = (collided.displacement - observed).square_length();
                if scratch.arena[start].tags.intersects(SERVER_TAGS) {
                    server_score = Some(server_score.map_or(score, |s| s.min(score)));
                }
                log::trace!(
                    "branch {id:?} {:?}: {:?} -> {:?}, score {score}",
                    scratch.arena[id].tags,
                    movement.refmt(&ConciseDebug),
                    collided.displacement.refmt(&ConciseDebug),
                );
                if best.as_ref().is_none_or(|&(best_score, ..)| score < best_score) {
                    best = Some((score, id, input, collided));
                    if score < EXACT_SCORE {
                        break 'search;
                    }
                }
            }
        }

        let (score, chosen, input, collided) = best?;
        let candidate = scratch.arena[chosen];
        if server_score.is_none() {
            let server_start = scratch
                .starts
                .iter()
                .copied()
                .find(|&id| scratch.arena[id].tags.intersects(SERVER_TAGS));
            if let Some(start) = server_start {
                request.desired = integrator.integrate(state, scratch.arena[start].velocity, input);
                let server_branch = collide(world, &request, &mut scratch.collision);
                indeterminate |= server_branch.gathered.indeterminate;
                server_score = Some((server_branch.displacement - observed).square_length());
            }
        }
        let settled = integrator.settle(
            world,
            state,
            &collided,
            candidate.tags.contains(CandidateTags::JUMP),
            &mut scratch.traversal,
        );
        let offset = score.sqrt();
        log::debug!(
            "predicted {:?} with {:?}, observed {:?}, offset {offset:.5}",
            collided.displacement.refmt(&ConciseDebug),
            candidate.tags,
            observed.refmt(&ConciseDebug),
        );

        Some(Prediction {
            offset,
            chosen,
            tags: candidate.tags,
            input,
            velocity: candidate.velocity,
            collided,
            settled,
            server_offset: server_score.map(FreeCoordinate::sqrt),
            branches,
            indeterminate,
        })
    }
}

/// Adds the start vectors for `state` to the scratch arena and start list.
fn add_starts<W>(
    scratch: &mut Scratch,
    world: &W,
    state: &EntityPhysicsState,
    integrator: &Integrator,
) where
    W: WorldQuery + ?Sized,
{
    let carried = integrator.carry_over(state, state.last_velocity);
    let server = match state.pending_velocity {
        None => None,
        Some(ServerVelocity::Replace(v)) => Some((v, CandidateTags::KNOCKBACK)),
        Some(ServerVelocity::Add(v)) => Some((carried + v, CandidateTags::EXPLOSION)),
    };

    let aab = state.aab();
    let prepare = |velocity: FreeVector, mut tags: CandidateTags| {
        let pushed = if state.flying {
            velocity
        } else {
            push_out_of_blocks(world, state.version, aab, velocity)
        };
        if pushed != velocity {
            tags |= CandidateTags::PUSHED_OUT;
        }
        (integrator.cutoff(pushed), tags)
    };

    let bases = [
        Some(prepare(carried, CandidateTags::CARRIED)),
        server.map(|(v, tags)| prepare(v, tags)),
    ];
    for (velocity, tags) in bases.into_iter().flatten() {
        if let Some(id) = scratch.arena.push(velocity, tags, None) {
            scratch.starts.push(id);
        }
    }
    for i in 0..scratch.starts.len() {
        let base = scratch.starts[i];
        let Some(jumped) = integrator.jump(state, scratch.arena[base].velocity) else {
            continue;
        };
        let tag = if integrator.medium() == Medium::Air {
            CandidateTags::JUMP
        } else {
            CandidateTags::SWIM_HOP
        };
        if let Some(id) = scratch.arena.push(jumped, tag, Some(base)) {
            scratch.starts.push(id);
        }
    }
}
