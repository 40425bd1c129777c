//! Commands sent from the outside world to the game engine.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::types::ProjectileId;

/// All external actions the engine accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    /// The start affordance was pressed. Ignored while a countdown or a
    /// game is already in progress.
    StartRequested,
    /// The environment detected contact between a live projectile and
    /// the player. Ignored for projectiles that already stopped moving.
    ReportContact { projectile: ProjectileId },
}
