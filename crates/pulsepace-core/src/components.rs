//! ECS components for hecs entities.
//!
//! Components are plain data structs with no game logic.
//! Logic lives in systems, not components.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::types::ProjectileId;

/// A live projectile tracked by the spawn engine's registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Projectile {
    pub id: ProjectileId,
    /// Whether the projectile is still traveling toward its destination.
    /// Cleared on first contact; doubles as the one-shot contact guard.
    pub moving: bool,
}

/// World position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Translation(pub Vec3);

/// World orientation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rotation(pub Quat);

/// Straight-line travel toward a fixed destination.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MoveToward {
    pub destination: Vec3,
    /// Distance covered per step (already scaled by the speed divider).
    pub step_distance: f32,
}

/// Effect performed once on first contact with the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ContactEffect {
    /// Drain health, release the body to physics with an impulse, and
    /// despawn after a fixed delay.
    Damage {
        hp_drain: i32,
        crash_force: f32,
        crash_radius: f32,
        destruction_delay_secs: f32,
    },
    /// Restore health and shrink to zero scale before despawning.
    Heal {
        hp_added: i32,
        shrink_duration_secs: f32,
    },
    /// Add score and fade every surface in parallel; despawn only once
    /// all fades have finished.
    Score {
        points: i32,
        fade_duration_secs: f32,
        surface_count: u32,
    },
}

impl ContactEffect {
    pub fn kind(&self) -> crate::enums::ProjectileKind {
        match self {
            Self::Damage { .. } => crate::enums::ProjectileKind::Damage,
            Self::Heal { .. } => crate::enums::ProjectileKind::Heal,
            Self::Score { .. } => crate::enums::ProjectileKind::Score,
        }
    }
}

/// Timed despawn after a damage projectile crashes out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DespawnAfter {
    pub remaining_secs: f32,
}

/// Shrink-to-zero animation on a consumed heal projectile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShrinkOut {
    pub remaining_secs: f32,
    pub duration_secs: f32,
}

impl ShrinkOut {
    /// Current uniform scale in `[0, 1]`.
    pub fn scale(&self) -> f32 {
        if self.duration_secs <= 0.0 {
            0.0
        } else {
            (self.remaining_secs / self.duration_secs).clamp(0.0, 1.0)
        }
    }
}

/// Parallel surface fade on a consumed score projectile. The pending
/// count gates destruction: the entity despawns only at zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FadeOut {
    pub remaining_secs: f32,
    pub pending_surfaces: u32,
}
