//! Game state snapshot — the complete visible state produced each tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::{GamePhase, ProjectileKind, PulseCondition, Speed};
use crate::events::GameEvent;
use crate::types::{ProjectileId, SimTime};

/// Complete game state available to the frontend after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub condition: PulseCondition,
    pub speed: Speed,
    pub signal: SignalView,
    pub health: HealthView,
    pub score: i32,
    pub projectiles: Vec<ProjectileView>,
    /// Events that fired during this tick, in order.
    pub events: Vec<GameEvent>,
}

/// Latest biofeedback readings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalView {
    /// Last received heart-rate value (-1 while disconnected).
    pub pulse: i32,
    /// Last computed rate-of-change metric.
    pub acceleration: f32,
    pub connected: bool,
    pub placeholder: bool,
}

/// Health state for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthView {
    pub max_points: i32,
    pub current_points: i32,
    pub immortal: bool,
    pub immortality_remaining_secs: f32,
}

/// A live projectile for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: ProjectileId,
    pub kind: ProjectileKind,
    pub position: Vec3,
    pub destination: Vec3,
    pub moving: bool,
    /// Uniform scale, shrinking toward zero on consumed heal projectiles.
    pub scale: f32,
}
