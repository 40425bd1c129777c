//! Level configuration: every tunable table the engine consumes.
//!
//! Configuration is serde-loadable from JSON. `validate` normalizes the
//! ordered tables (sort + de-duplicate) and rejects values the engine
//! could not degrade gracefully from. Empty threshold or speed tables
//! are not load-time failures: the consuming components log and no-op
//! on them.

use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::ContactEffect;
use crate::constants::DEFAULT_IMMORTALITY_SECS;
use crate::enums::{BiofeedbackControl, PulseCondition, Speed};
use crate::types::{BarColor, Pose};

/// Configuration loading/validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("archetype {index} has spawn weight {weight}, must be within 0..=100")]
    WeightOutOfRange { index: usize, weight: u32 },
    #[error("archetype {index} has no movement paths")]
    NoMovementPaths { index: usize },
    #[error("polling rate must be positive, got {0}")]
    NonPositivePollingRate(f32),
    #[error("recalculating cycle period must be at least 1")]
    ZeroRecalculatingCyclePeriod,
    #[error("hp count must be at least 1, got {0}")]
    NonPositiveHpCount(i32),
}

/// One row of the condition threshold table: readings strictly below
/// `ceiling` resolve to `condition`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseThreshold {
    pub ceiling: f32,
    pub condition: PulseCondition,
    /// Color shown on the debug bar while this row is selected.
    pub color: BarColor,
}

/// Per-tier movement and spawn-rate settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    pub tier: Speed,
    pub movement_speed: f32,
    /// Spawns happen every `100 / spawn_rate` seconds.
    pub spawn_rate: f32,
}

/// A projectile trajectory: spawn pose and destination point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementPath {
    pub entry: Pose,
    pub exit: Vec3,
}

/// A spawnable projectile type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileArchetype {
    pub effect: ContactEffect,
    /// Relative draw weight, 0..=100.
    pub spawn_weight: u32,
    /// Offset applied to both the spawn position and the destination.
    pub local_offset: Vec3,
    /// Rotation composed onto the entry pose rotation.
    pub local_rotation: Quat,
    pub paths: Vec<MovementPath>,
}

/// Biofeedback signal source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSettings {
    /// Synthesize readings instead of talking to a device.
    pub use_placeholder: bool,
    pub placeholder_pulse: i32,
    pub placeholder_acceleration: f32,
    /// Correction added to every parsed device value.
    pub pulse_offset: i32,
    /// Seconds between poll cycles.
    pub polling_rate_secs: f32,
    /// Poll cycles per derived-metric recomputation.
    pub recalculating_cycle_period: u32,
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            use_placeholder: true,
            placeholder_pulse: 80,
            placeholder_acceleration: 0.0,
            pulse_offset: 0,
            polling_rate_secs: 0.5,
            recalculating_cycle_period: 4,
        }
    }
}

/// Complete level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub control: BiofeedbackControl,
    pub signal: SignalSettings,
    pub thresholds: Vec<PulseThreshold>,
    pub show_debug_bar: bool,
    pub debug_bar_label: String,
    pub hp_count: i32,
    pub immortality_secs: f32,
    /// Whole seconds of pre-game countdown before the first game tick.
    pub wait_before_start: u32,
    pub speed_profiles: Vec<SpeedProfile>,
    pub archetypes: Vec<ProjectileArchetype>,
}

impl GameConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Normalize ordered tables and reject unusable values.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        normalize_thresholds(&mut self.thresholds);
        normalize_speed_profiles(&mut self.speed_profiles);

        for (index, archetype) in self.archetypes.iter().enumerate() {
            if archetype.spawn_weight > 100 {
                return Err(ConfigError::WeightOutOfRange {
                    index,
                    weight: archetype.spawn_weight,
                });
            }
            if archetype.paths.is_empty() {
                return Err(ConfigError::NoMovementPaths { index });
            }
        }
        if self.signal.polling_rate_secs <= 0.0 {
            return Err(ConfigError::NonPositivePollingRate(
                self.signal.polling_rate_secs,
            ));
        }
        if self.signal.recalculating_cycle_period == 0 {
            return Err(ConfigError::ZeroRecalculatingCyclePeriod);
        }
        if self.hp_count < 1 {
            return Err(ConfigError::NonPositiveHpCount(self.hp_count));
        }
        Ok(())
    }

    /// Built-in default level used by the demo and tests.
    pub fn default_level() -> Self {
        let lanes: Vec<MovementPath> = [-2.0_f32, 0.0, 2.0]
            .iter()
            .map(|&x| MovementPath {
                entry: Pose::at(Vec3::new(x, 1.5, 12.0)),
                exit: Vec3::new(x, 1.5, -2.0),
            })
            .collect();

        Self {
            control: BiofeedbackControl::HeartRate,
            signal: SignalSettings::default(),
            thresholds: vec![
                PulseThreshold {
                    ceiling: 60.0,
                    condition: PulseCondition::Slow,
                    color: BarColor::rgb(0.3, 0.5, 1.0),
                },
                PulseThreshold {
                    ceiling: 100.0,
                    condition: PulseCondition::Normal,
                    color: BarColor::rgb(0.3, 1.0, 0.4),
                },
                PulseThreshold {
                    ceiling: 140.0,
                    condition: PulseCondition::Fast,
                    color: BarColor::rgb(1.0, 0.8, 0.2),
                },
                PulseThreshold {
                    ceiling: 999.0,
                    condition: PulseCondition::Critical,
                    color: BarColor::rgb(1.0, 0.2, 0.2),
                },
            ],
            show_debug_bar: false,
            debug_bar_label: "Pulse".to_owned(),
            hp_count: 5,
            immortality_secs: DEFAULT_IMMORTALITY_SECS,
            wait_before_start: 3,
            speed_profiles: vec![
                SpeedProfile {
                    tier: Speed::Slow,
                    movement_speed: 4.0,
                    spawn_rate: 25.0,
                },
                SpeedProfile {
                    tier: Speed::Normal,
                    movement_speed: 7.0,
                    spawn_rate: 50.0,
                },
                SpeedProfile {
                    tier: Speed::Fast,
                    movement_speed: 11.0,
                    spawn_rate: 100.0,
                },
            ],
            archetypes: vec![
                ProjectileArchetype {
                    effect: ContactEffect::Damage {
                        hp_drain: 1,
                        crash_force: 6.0,
                        crash_radius: 6.0,
                        destruction_delay_secs: 2.5,
                    },
                    spawn_weight: 60,
                    local_offset: Vec3::ZERO,
                    local_rotation: Quat::IDENTITY,
                    paths: lanes.clone(),
                },
                ProjectileArchetype {
                    effect: ContactEffect::Heal {
                        hp_added: 1,
                        shrink_duration_secs: 1.2,
                    },
                    spawn_weight: 10,
                    local_offset: Vec3::new(0.0, 0.3, 0.0),
                    local_rotation: Quat::IDENTITY,
                    paths: lanes.clone(),
                },
                ProjectileArchetype {
                    effect: ContactEffect::Score {
                        points: 5,
                        fade_duration_secs: 1.5,
                        surface_count: 3,
                    },
                    spawn_weight: 30,
                    local_offset: Vec3::ZERO,
                    local_rotation: Quat::IDENTITY,
                    paths: lanes,
                },
            ],
        }
    }
}

/// Sort ascending by ceiling and drop duplicate ceilings, keeping the
/// first occurrence. Ceilings are compared at centi-unit precision, the
/// same granularity the table was tuned at.
pub fn normalize_thresholds(thresholds: &mut Vec<PulseThreshold>) {
    thresholds.sort_by_key(|t| (t.ceiling * 100.0) as i64);
    thresholds.dedup_by(|a, b| a.ceiling == b.ceiling);
}

/// Sort by tier and drop duplicate tiers, keeping the first occurrence.
pub fn normalize_speed_profiles(profiles: &mut Vec<SpeedProfile>) {
    profiles.sort_by_key(|p| p.tier);
    profiles.dedup_by(|a, b| a.tier == b.tier);
}
