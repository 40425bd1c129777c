//! Events emitted by the game loop for UI, audio, and physics feedback.
//!
//! Events are routed internally within the tick that produced them and
//! exported on that tick's snapshot for external consumers.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::{ProjectileKind, PulseCondition, Speed};
use crate::types::ProjectileId;

/// Everything observable that happens during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A heart-rate value was received from the device or placeholder.
    PulseReceived { value: i32 },
    /// The derived rate-of-change metric was recomputed.
    AccelerationCalculated { rate: f32 },
    /// The classified condition changed.
    ConditionChanged { condition: PulseCondition },
    /// A new pacing tier was broadcast to all speed consumers.
    SpeedChanged { speed: Speed },
    /// Pre-game countdown tick; 0 is the terminal tick.
    CountdownTick { remaining: i64 },
    /// The game entered the running phase.
    GameStarted,
    /// The game ended (health reached zero).
    GameEnded,
    /// Health points ran out.
    OutOfHealth,
    /// Post-damage grace window opened.
    ImmortalityStarted,
    /// Post-damage grace window closed.
    ImmortalityStopped,
    /// A projectile was spawned.
    ProjectileSpawned {
        id: ProjectileId,
        kind: ProjectileKind,
    },
    /// A damage projectile was released to physics with an impulse.
    ProjectileCrashed {
        id: ProjectileId,
        force: f32,
        radius: f32,
        epicenter: Vec3,
    },
    /// A projectile left the live registry.
    ProjectileDestroyed { id: ProjectileId },
}
