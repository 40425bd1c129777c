//! Enumeration types used throughout the game loop.

use serde::{Deserialize, Serialize};

/// Discrete classification of the player's physiological reading.
///
/// Ordering is carried by the threshold table position, not by the
/// variant declaration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PulseCondition {
    /// Reading below the resting band.
    Slow,
    /// Reading inside the resting band.
    #[default]
    Normal,
    /// Reading elevated above the resting band.
    Fast,
    /// Reading high enough that the game must not run.
    Critical,
}

/// Game pacing tier broadcast to every speed consumer.
///
/// Declaration order is the tier order; speed-profile tables are sorted
/// by it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Speed {
    /// Actuators deactivate.
    Stop,
    Slow,
    #[default]
    Normal,
    Fast,
}

/// Top-level game state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Awaiting a start request (also the post-game "awaiting restart").
    #[default]
    Idle,
    /// Pre-game countdown in progress.
    CountingDown,
    /// Game running: spawning, health, and score are live.
    Running,
    /// Game over; a new start request returns to CountingDown.
    Ended,
}

/// Which biofeedback signal drives condition classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiofeedbackControl {
    /// No signal wired; the condition never leaves Normal.
    None,
    /// Classify on the raw heart-rate value.
    #[default]
    HeartRate,
    /// Classify on the derived rate-of-change metric.
    Acceleration,
}

/// Projectile archetype kind, for views and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Drains health on contact, then crashes out with a physics impulse.
    Damage,
    /// Restores health on contact, then shrinks away.
    Heal,
    /// Adds score on contact, then fades out surface by surface.
    Score,
}
