//! Cleanup system: despawns queued entities and reports them out of the
//! spawn engine's live registry.
//!
//! Systems queue despawns into a shared buffer instead of removing
//! entities mid-iteration; the buffer is drained here once per tick.

use hecs::{Entity, World};

use pulsepace_core::components::Projectile;
use pulsepace_core::events::GameEvent;

use crate::spawner::SpawnEngine;

pub fn run(
    world: &mut World,
    despawn_buffer: &mut Vec<Entity>,
    spawner: &mut SpawnEngine,
    events: &mut Vec<GameEvent>,
) {
    for entity in despawn_buffer.drain(..) {
        let id = world.get::<&Projectile>(entity).map(|p| p.id).ok();
        if world.despawn(entity).is_ok() {
            spawner.report_destroyed(entity);
            if let Some(id) = id {
                events.push(GameEvent::ProjectileDestroyed { id });
            }
        }
    }
}
