//! Tunable thresholds for [`Engine`](crate::Engine).

use core::time::Duration;

use crate::math::FreeCoordinate;
use crate::violation::ViolationPolicy;

/// Configuration of an [`Engine`](crate::Engine).
///
/// Persisting this is up to the host; with the `serde` feature it can be deserialized
/// from any format, and missing fields take their default values.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
pub struct EngineConfig {
    /// Thresholds for the check that the observed movement matches some prediction.
    pub prediction: PredictionCheckConfig,
    /// Thresholds for the check that the entity is not falsely claiming to be on the
    /// ground.
    pub ground_spoof: GroundSpoofCheckConfig,
    /// Thresholds for the check that landing after a long fall is reported as landing.
    pub no_fall: NoFallCheckConfig,
    /// Thresholds for the check that knockback from the server is taken.
    pub anti_knockback: AntiKnockbackCheckConfig,
    /// How much extra offset is tolerated due to network conditions.
    pub uncertainty: Uncertainty,
    /// Upper bound on the number of branches evaluated per entity per tick.
    ///
    /// A typical tick needs 18; more are needed when the server has sent a velocity.
    pub max_branches: usize,
}

impl EngineConfig {
    /// Maximum allowed value of [`Self::max_branches`].
    pub const MAX_BRANCHES_LIMIT: usize = 1024;

    /// Default configuration, as a constant.
    pub const DEFAULT: Self = Self {
        prediction: PredictionCheckConfig::DEFAULT,
        ground_spoof: GroundSpoofCheckConfig::DEFAULT,
        no_fall: NoFallCheckConfig::DEFAULT,
        anti_knockback: AntiKnockbackCheckConfig::DEFAULT,
        uncertainty: Uncertainty::DEFAULT,
        max_branches: 36,
    };

    /// Returns an error describing the first invalid value, if any.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self {
            prediction,
            ground_spoof: _,
            no_fall,
            anti_knockback,
            uncertainty,
            max_branches,
        } = self;
        if !non_negative(prediction.threshold) {
            return Err(ConfigError::OffsetThreshold(prediction.threshold));
        }
        if !non_negative(no_fall.max_fall_distance) {
            return Err(ConfigError::FallDistance(no_fall.max_fall_distance));
        }
        anti_knockback.validate()?;
        if !(1..=Self::MAX_BRANCHES_LIMIT).contains(max_branches) {
            return Err(ConfigError::MaxBranches(*max_branches));
        }
        uncertainty.validate()
    }

    /// Constrain fields to valid values, logging a warning for each one changed.
    #[must_use]
    pub fn repair(mut self) -> Self {
        if !non_negative(self.prediction.threshold) {
            log::warn!(
                "offset threshold {} is invalid; using the default",
                self.prediction.threshold
            );
            self.prediction.threshold = PredictionCheckConfig::DEFAULT.threshold;
        }
        if !non_negative(self.no_fall.max_fall_distance) {
            log::warn!(
                "safe fall distance {} is invalid; using the default",
                self.no_fall.max_fall_distance
            );
            self.no_fall.max_fall_distance = NoFallCheckConfig::DEFAULT.max_fall_distance;
        }
        if self.anti_knockback.validate().is_err() {
            log::warn!("knockback thresholds are invalid; using the defaults");
            self.anti_knockback = AntiKnockbackCheckConfig {
                enabled: self.anti_knockback.enabled,
                violation_threshold: self.anti_knockback.violation_threshold,
                ..AntiKnockbackCheckConfig::DEFAULT
            };
        }
        let clamped = self.max_branches.clamp(1, Self::MAX_BRANCHES_LIMIT);
        if clamped != self.max_branches {
            log::warn!("max_branches {} clamped to {clamped}", self.max_branches);
            self.max_branches = clamped;
        }
        if self.uncertainty.validate().is_err() {
            log::warn!("uncertainty factors are invalid; using the defaults");
            self.uncertainty = Uncertainty::DEFAULT;
        }
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Choices for [`EngineConfig::prediction`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
pub struct PredictionCheckConfig {
    /// Offset, in blocks, above which a tick counts as a violation, before tolerance for
    /// network conditions is added.
    pub threshold: FreeCoordinate,
    /// Violation level above which a detection is reported.
    pub violation_threshold: u32,
    /// Amount the violation level decreases by on each clean tick.
    pub decay: u32,
}

impl PredictionCheckConfig {
    #[allow(missing_docs)]
    pub const DEFAULT: Self = Self {
        threshold: 1.0,
        violation_threshold: 10,
        decay: 1,
    };

    /// The parts of this configuration used by [`ViolationTracker`](crate::violation::ViolationTracker).
    pub fn policy(&self) -> ViolationPolicy {
        ViolationPolicy {
            threshold: self.violation_threshold,
            decay: self.decay,
        }
    }
}

impl Default for PredictionCheckConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Choices for [`EngineConfig::ground_spoof`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
pub struct GroundSpoofCheckConfig {
    /// Violation level above which a detection is reported.
    pub violation_threshold: u32,
}

impl GroundSpoofCheckConfig {
    #[allow(missing_docs)]
    pub const DEFAULT: Self = Self {
        violation_threshold: 5,
    };

    /// The parts of this configuration used by [`ViolationTracker`](crate::violation::ViolationTracker).
    pub fn policy(&self) -> ViolationPolicy {
        ViolationPolicy {
            threshold: self.violation_threshold,
            decay: 1,
        }
    }
}

impl Default for GroundSpoofCheckConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Choices for [`EngineConfig::no_fall`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
pub struct NoFallCheckConfig {
    /// If false, the check never fires and its levels are cleared.
    pub enabled: bool,
    /// Distance, in blocks, an entity may fall without taking damage. Jump boost adds
    /// one block per level.
    pub max_fall_distance: FreeCoordinate,
    /// Violation level above which a detection is reported.
    pub violation_threshold: u32,
}

impl NoFallCheckConfig {
    #[allow(missing_docs)]
    pub const DEFAULT: Self = Self {
        enabled: true,
        max_fall_distance: 3.0,
        violation_threshold: 5,
    };

    /// The parts of this configuration used by [`ViolationTracker`](crate::violation::ViolationTracker).
    pub fn policy(&self) -> ViolationPolicy {
        ViolationPolicy {
            threshold: self.violation_threshold,
            decay: 1,
        }
    }
}

impl Default for NoFallCheckConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Choices for [`EngineConfig::anti_knockback`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
pub struct AntiKnockbackCheckConfig {
    /// If false, the check never fires and its levels are cleared.
    pub enabled: bool,
    /// Knockback velocities shorter than this are not checked, since ignoring them is
    /// hard to tell apart from taking them.
    pub min_knockback: FreeCoordinate,
    /// Offset, in blocks, between the observed movement and the closest movement that
    /// takes the knockback, above which the knockback counts as ignored. The allowance
    /// for network conditions is added to it.
    pub offset_threshold: FreeCoordinate,
    /// Length of a typical knockback velocity. The less of it the entity moved, the
    /// more certain a detection is.
    pub assumed_knockback: FreeCoordinate,
    /// Violation level above which a detection is reported.
    pub violation_threshold: u32,
}

impl AntiKnockbackCheckConfig {
    #[allow(missing_docs)]
    pub const DEFAULT: Self = Self {
        enabled: true,
        min_knockback: 0.1,
        offset_threshold: 0.1,
        assumed_knockback: 0.4,
        violation_threshold: 1,
    };

    /// The parts of this configuration used by [`ViolationTracker`](crate::violation::ViolationTracker).
    pub fn policy(&self) -> ViolationPolicy {
        ViolationPolicy {
            threshold: self.violation_threshold,
            decay: 1,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for value in [self.min_knockback, self.offset_threshold] {
            if !non_negative(value) {
                return Err(ConfigError::Knockback(value));
            }
        }
        if !(self.assumed_knockback.is_finite() && self.assumed_knockback > 0.0) {
            return Err(ConfigError::Knockback(self.assumed_knockback));
        }
        Ok(())
    }
}

impl Default for AntiKnockbackCheckConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn non_negative(value: FreeCoordinate) -> bool {
    value.is_finite() && value >= 0.0
}

/// Extra offset tolerated because the server's view of an entity lags behind the
/// client's.
///
/// The tolerance for a tick is
/// `base + ping_seconds × per_ping_second + (20 − tps) × per_missing_tick`,
/// plus `while_uncertain` during the ticks following a teleport or server velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
pub struct Uncertainty {
    #[allow(missing_docs)]
    pub base: FreeCoordinate,
    #[allow(missing_docs)]
    pub per_ping_second: FreeCoordinate,
    #[allow(missing_docs)]
    pub per_missing_tick: FreeCoordinate,
    #[allow(missing_docs)]
    pub while_uncertain: FreeCoordinate,
    /// Number of ticks after a teleport or server velocity during which
    /// [`Self::while_uncertain`] applies.
    pub ticks_after_event: u32,
}

impl Uncertainty {
    /// Nominal server tick rate.
    pub const TARGET_TPS: FreeCoordinate = 20.0;

    #[allow(missing_docs)]
    pub const DEFAULT: Self = Self {
        base: 0.003,
        per_ping_second: 0.5,
        per_missing_tick: 0.05,
        while_uncertain: 0.2,
        ticks_after_event: 10,
    };

    /// Computes the tolerance for an entity whose connection has latency `ping`, on a
    /// server running at `tps` ticks per second.
    ///
    /// A `tps` above the nominal rate does not reduce the tolerance.
    pub fn tolerance(&self, ping: Duration, tps: FreeCoordinate, uncertain: bool) -> FreeCoordinate {
        let missing_ticks = if tps.is_finite() {
            (Self::TARGET_TPS - tps).max(0.0)
        } else {
            0.0
        };
        let mut tolerance = self.base
            + ping.as_secs_f64() * self.per_ping_second
            + missing_ticks * self.per_missing_tick;
        if uncertain {
            tolerance += self.while_uncertain;
        }
        tolerance
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for value in [
            self.base,
            self.per_ping_second,
            self.per_missing_tick,
            self.while_uncertain,
        ] {
            if !non_negative(value) {
                return Err(ConfigError::Uncertainty(value));
            }
        }
        Ok(())
    }
}

impl Default for Uncertainty {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Error from [`EngineConfig::validate()`].
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The offset threshold is negative or not finite.
    #[error("offset threshold must be a non-negative number, not {0}")]
    OffsetThreshold(FreeCoordinate),
    /// The branch limit is out of range.
    #[error(
        "max_branches must be between 1 and {limit}, not {0}",
        limit = EngineConfig::MAX_BRANCHES_LIMIT
    )]
    MaxBranches(usize),
    /// The safe fall distance is negative or not finite.
    #[error("safe fall distance must be a non-negative number, not {0}")]
    FallDistance(FreeCoordinate),
    /// A knockback threshold is negative or not finite, or the assumed knockback is
    /// zero.
    #[error("knockback lengths must be positive numbers, not {0}")]
    Knockback(FreeCoordinate),
    /// An uncertainty factor is negative or not finite.
    #[error("uncertainty factors must be non-negative numbers, not {0}")]
    Uncertainty(FreeCoordinate),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn default_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
        assert_eq!(EngineConfig::default(), EngineConfig::DEFAULT.repair());
    }

    #[rstest]
    #[case::negative_threshold(
        EngineConfig { prediction: PredictionCheckConfig { threshold: -1.0, ..PredictionCheckConfig::DEFAULT }, ..EngineConfig::DEFAULT },
        ConfigError::OffsetThreshold(-1.0),
    )]
    #[case::zero_branches(
        EngineConfig { max_branches: 0, ..EngineConfig::DEFAULT },
        ConfigError::MaxBranches(0),
    )]
    #[case::negative_fall_distance(
        EngineConfig { no_fall: NoFallCheckConfig { max_fall_distance: -3.0, ..NoFallCheckConfig::DEFAULT }, ..EngineConfig::DEFAULT },
        ConfigError::FallDistance(-3.0),
    )]
    #[case::zero_assumed_knockback(
        EngineConfig { anti_knockback: AntiKnockbackCheckConfig { assumed_knockback: 0.0, ..AntiKnockbackCheckConfig::DEFAULT }, ..EngineConfig::DEFAULT },
        ConfigError::Knockback(0.0),
    )]
    #[case::negative_uncertainty(
        EngineConfig { uncertainty: Uncertainty { base: -0.5, ..Uncertainty::DEFAULT }, ..EngineConfig::DEFAULT },
        ConfigError::Uncertainty(-0.5),
    )]
    fn invalid(#[case] config: EngineConfig, #[case] expected: ConfigError) {
        assert_eq!(config.validate(), Err(expected));
        assert_eq!(config.repair().validate(), Ok(()));
    }

    #[test]
    fn repair_clamps_branches() {
        let config = EngineConfig {
            max_branches: 1_000_000,
            ..EngineConfig::DEFAULT
        };
        assert_eq!(config.repair().max_branches, EngineConfig::MAX_BRANCHES_LIMIT);
    }

    #[test]
    fn error_message() {
        assert_eq!(
            ConfigError::MaxBranches(0).to_string(),
            "max_branches must be between 1 and 1024, not 0"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_partial() {
        let config: EngineConfig = serde_json::from_str(indoc::indoc! {r#"
            {
                "prediction": { "threshold": 0.5 },
                "no_fall": { "enabled": false },
                "max_branches": 18
            }
        "#})
        .unwrap();
        assert_eq!(
            config,
            EngineConfig {
                prediction: PredictionCheckConfig {
                    threshold: 0.5,
                    ..PredictionCheckConfig::DEFAULT
                },
                no_fall: NoFallCheckConfig {
                    enabled: false,
                    ..NoFallCheckConfig::DEFAULT
                },
                max_branches: 18,
                ..EngineConfig::DEFAULT
            }
        );
    }

    #[rstest]
    #[case(Duration::ZERO, 20.0, false, 0.003)]
    #[case(Duration::from_millis(100), 20.0, false, 0.053)]
    #[case(Duration::ZERO, 18.0, false, 0.103)]
    #[case(Duration::ZERO, 25.0, true, 0.203)]
    #[case(Duration::ZERO, f64::NAN, false, 0.003)]
    fn tolerance(
        #[case] ping: Duration,
        #[case] tps: FreeCoordinate,
        #[case] uncertain: bool,
        #[case] expected: FreeCoordinate,
    ) {
        let actual = Uncertainty::DEFAULT.tolerance(ping, tps, uncertain);
        assert!((actual - expected).abs() < 1e-12, "{actual}");
    }
}
