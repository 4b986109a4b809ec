//! Per-entity, per-check violation counters, and delivery of detections to the host.

use core::fmt;

use hashbrown::HashMap;

use crate::engine::EntityId;

/// Which check a violation level belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, exhaust::Exhaust)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum CheckKind {
    /// The observed movement was not close to any predicted movement.
    Prediction,
    /// The entity claimed to be on the ground while the predicted movement left it in
    /// the air.
    GroundSpoof,
    /// The entity landed after a fall long enough to hurt, without claiming to be on the
    /// ground, so that no fall damage was dealt.
    NoFall,
    /// The entity moved as if a knockback sent by the server had not happened.
    AntiKnockback,
}

impl CheckKind {
    /// Every check, in the order their outcomes are recorded each tick.
    pub const ALL: [Self; 4] = [
        Self::Prediction,
        Self::GroundSpoof,
        Self::NoFall,
        Self::AntiKnockback,
    ];

    /// Short name for display to the host's users.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Prediction => "prediction",
            Self::GroundSpoof => "ground-spoof",
            Self::NoFall => "no-fall",
            Self::AntiKnockback => "anti-knockback",
        }
    }
}

impl fmt::Display for CheckKind {
    #[mutants::skip]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How sure a check is that a detection is not a false positive, from 0 to 100.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Certainty(u8);

impl Certainty {
    #[allow(missing_docs)]
    pub const MAX: Self = Self(100);

    /// Clamps `percent` to the range 0 to 100.
    #[inline]
    pub const fn new(percent: u8) -> Self {
        Self(if percent > 100 { 100 } else { percent })
    }

    /// Certainty proportional to how far `value` exceeds `limit`, as a fraction of
    /// `limit`: exceeding it by half gives 50, and by double or more gives 100.
    ///
    /// A non-positive `limit` gives full certainty for any excess.
    pub fn from_excess(value: f64, limit: f64) -> Self {
        if value <= limit {
            return Self(0);
        }
        if limit <= 0.0 {
            return Self::MAX;
        }
        let percent = ((value - limit) / limit * 100.0).clamp(0.0, 100.0);
        Self(percent as u8)
    }

    #[allow(missing_docs)]
    #[inline]
    pub const fn percent(self) -> u8 {
        self.0
    }
}

/// A saturating violation counter.
///
/// The level never goes below zero; decreasing an already low level stops at zero.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViolationLevel(u32);

impl ViolationLevel {
    #[allow(missing_docs)]
    pub const ZERO: Self = Self(0);

    #[allow(missing_docs)]
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn increase(&mut self, amount: u32) {
        self.0 = self.0.saturating_add(amount);
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn decrease(&mut self, amount: u32) {
        self.0 = self.0.saturating_sub(amount);
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Whether a detection fires at this level.
    #[inline]
    pub const fn exceeds(self, threshold: u32) -> bool {
        self.0 > threshold
    }
}

/// How one tick of one check turned out, for [`ViolationTracker::record()`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[expect(clippy::exhaustive_enums)]
pub enum CheckOutcome {
    /// The check failed.
    Violated {
        /// Amount to increase the level by; usually 1.
        amount: u32,
        #[allow(missing_docs)]
        certainty: Certainty,
    },
    /// The check passed, so the level decays.
    Clean,
    /// The check could not apply to this entity this tick, so the level is reset.
    Inapplicable,
    /// Nothing happened this tick which the check judges; the level is left alone.
    Unchanged,
}

/// Thresholds for turning violation levels into detections.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[allow(clippy::exhaustive_structs)]
pub struct ViolationPolicy {
    /// A detection fires while the level is above this.
    pub threshold: u32,
    /// Amount the level decreases by on a clean tick.
    pub decay: u32,
}

/// Violation levels for every tracked entity and check.
///
/// Levels are created when first increased and removed when they return to zero.
#[derive(Clone, Debug, Default)]
pub struct ViolationTracker {
    levels: HashMap<(EntityId, CheckKind), ViolationLevel>,
}

impl ViolationTracker {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level of `check` for `entity`; zero if never violated.
    pub fn level(&self, entity: EntityId, check: CheckKind) -> ViolationLevel {
        self.levels
            .get(&(entity, check))
            .copied()
            .unwrap_or(ViolationLevel::ZERO)
    }

    #[allow(missing_docs)]
    pub fn increase(&mut self, entity: EntityId, check: CheckKind, amount: u32) -> ViolationLevel {
        let level = self.levels.entry((entity, check)).or_default();
        level.increase(amount);
        *level
    }

    #[allow(missing_docs)]
    pub fn decrease(&mut self, entity: EntityId, check: CheckKind, amount: u32) -> ViolationLevel {
        let Some(level) = self.levels.get_mut(&(entity, check)) else {
            return ViolationLevel::ZERO;
        };
        level.decrease(amount);
        let level = *level;
        if level == ViolationLevel::ZERO {
            self.levels.remove(&(entity, check));
        }
        level
    }

    #[allow(missing_docs)]
    pub fn reset(&mut self, entity: EntityId, check: CheckKind) {
        self.levels.remove(&(entity, check));
    }

    /// Forgets every level belonging to `entity`.
    pub fn remove_entity(&mut self, entity: EntityId) {
        self.levels.retain(|&(e, _), _| e != entity);
    }

    /// Applies one tick's outcome to the level of `check` for `entity`.
    ///
    /// Returns the certainty to report if a detection fires, which is whenever the
    /// check was violated and the level is now above the policy's threshold.
    pub fn record(
        &mut self,
        entity: EntityId,
        check: CheckKind,
        outcome: CheckOutcome,
        policy: ViolationPolicy,
    ) -> Option<Certainty> {
        match outcome {
            CheckOutcome::Violated { amount, certainty } => {
                let level = self.increase(entity, check, amount);
                log::debug!("{entity:?} violated {check}, level {}", level.get());
                level.exceeds(policy.threshold).then_some(certainty)
            }
            CheckOutcome::Clean => {
                self.decrease(entity, check, policy.decay);
                None
            }
            CheckOutcome::Inapplicable => {
                self.reset(entity, check);
                None
            }
            CheckOutcome::Unchanged => None,
        }
    }

    /// Number of nonzero levels stored.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Receiver of detections.
///
/// Implemented for closures taking the same arguments as
/// [`on_violation()`](Self::on_violation).
pub trait ViolationSink {
    /// Called once for each tick on which a detection fires. Whether to alert on every
    /// such call, or only some, is up to the implementation.
    fn on_violation(&mut self, entity: EntityId, check: CheckKind, certainty: Certainty);
}

impl<F> ViolationSink for F
where
    F: FnMut(EntityId, CheckKind, Certainty),
{
    fn on_violation(&mut self, entity: EntityId, check: CheckKind, certainty: Certainty) {
        (self)(entity, check, certainty);
    }
}

/// A [`ViolationSink`] which discards all detections.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[allow(clippy::exhaustive_structs)]
pub struct NullSink;

impl ViolationSink for NullSink {
    fn on_violation(&mut self, _: EntityId, _: CheckKind, _: Certainty) {}
}

/// A [`ViolationSink`] which stores all the detections it receives, in order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ViolationLog {
    entries: Vec<(EntityId, CheckKind, Certainty)>,
}

impl ViolationLog {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns all stored detections.
    pub fn drain(&mut self) -> impl Iterator<Item = (EntityId, CheckKind, Certainty)> + '_ {
        self.entries.drain(..)
    }

    #[allow(missing_docs)]
    pub fn as_slice(&self) -> &[(EntityId, CheckKind, Certainty)] {
        &self.entries
    }
}

impl ViolationSink for ViolationLog {
    fn on_violation(&mut self, entity: EntityId, check: CheckKind, certainty: Certainty) {
        self.entries.push((entity, check, certainty));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exhaust::Exhaust as _;
    use pretty_assertions::assert_eq;
    use rand::{Rng as _, SeedableRng as _};
    use rstest::rstest;

    const E: EntityId = EntityId::new(7);

    #[test]
    fn level_saturates() {
        let mut level = ViolationLevel::ZERO;
        level.decrease(3);
        assert_eq!(level.get(), 0);
        level.increase(u32::MAX);
        level.increase(5);
        assert_eq!(level.get(), u32::MAX);
        level.reset();
        assert_eq!(level, ViolationLevel::ZERO);
    }

    #[test]
    fn increases_then_decreases() {
        let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let n: u32 = rng.random_range(0..50);
            let m: u32 = rng.random_range(0..50);
            let mut tracker = ViolationTracker::new();
            for _ in 0..n {
                tracker.increase(E, CheckKind::Prediction, 1);
            }
            for _ in 0..m {
                tracker.decrease(E, CheckKind::Prediction, 1);
            }
            assert_eq!(
                tracker.level(E, CheckKind::Prediction).get(),
                n.saturating_sub(m),
                "n = {n}, m = {m}"
            );
        }
    }

    #[test]
    fn levels_are_independent() {
        let mut tracker = ViolationTracker::new();
        let other = EntityId::new(8);
        tracker.increase(E, CheckKind::Prediction, 3);
        tracker.increase(E, CheckKind::GroundSpoof, 1);
        tracker.increase(other, CheckKind::Prediction, 2);
        assert_eq!(tracker.len(), 3);

        tracker.decrease(E, CheckKind::GroundSpoof, 1);
        assert_eq!(tracker.len(), 2, "zero levels are dropped");

        tracker.remove_entity(E);
        assert_eq!(tracker.level(E, CheckKind::Prediction), ViolationLevel::ZERO);
        assert_eq!(tracker.level(other, CheckKind::Prediction).get(), 2);
    }

    #[test]
    fn detection_fires_above_threshold() {
        let mut tracker = ViolationTracker::new();
        let policy = ViolationPolicy {
            threshold: 2,
            decay: 1,
        };
        let violated = CheckOutcome::Violated {
            amount: 1,
            certainty: Certainty::new(40),
        };
        let fired: Vec<Option<Certainty>> = (0..4)
            .map(|_| tracker.record(E, CheckKind::Prediction, violated, policy))
            .collect();
        assert_eq!(fired, [None, None, Some(Certainty::new(40)), Some(Certainty::new(40))]);

        assert_eq!(tracker.record(E, CheckKind::Prediction, CheckOutcome::Clean, policy), None);
        assert_eq!(tracker.level(E, CheckKind::Prediction).get(), 3);
        assert_eq!(tracker.record(E, CheckKind::Prediction, CheckOutcome::Unchanged, policy), None);
        assert_eq!(tracker.level(E, CheckKind::Prediction).get(), 3);
        tracker.record(E, CheckKind::Prediction, CheckOutcome::Inapplicable, policy);
        assert!(tracker.is_empty());
    }

    #[rstest]
    #[case(0.5, 1.0, 0)]
    #[case(1.0, 1.0, 0)]
    #[case(1.5, 1.0, 50)]
    #[case(2.0, 1.0, 100)]
    #[case(30.0, 1.0, 100)]
    #[case(0.1, 0.0, 100)]
    fn certainty_from_excess(#[case] value: f64, #[case] limit: f64, #[case] expected: u8) {
        assert_eq!(Certainty::from_excess(value, limit).percent(), expected);
    }

    #[test]
    fn sinks() {
        let mut log = ViolationLog::new();
        log.on_violation(E, CheckKind::GroundSpoof, Certainty::MAX);
        assert_eq!(log.as_slice(), [(E, CheckKind::GroundSpoof, Certainty::MAX)]);
        assert_eq!(log.drain().count(), 1);
        assert!(log.as_slice().is_empty());

        let mut count = 0;
        let mut closure = |_: EntityId, _: CheckKind, _: Certainty| count += 1;
        closure.on_violation(E, CheckKind::Prediction, Certainty::new(1));
        assert_eq!(count, 1);
    }

    #[test]
    fn check_names() {
        let names: Vec<String> = CheckKind::exhaust().map(|c| c.to_string()).collect();
        assert_eq!(
            names,
            ["prediction", "ground-spoof", "no-fall", "anti-knockback"]
        );
    }
}
