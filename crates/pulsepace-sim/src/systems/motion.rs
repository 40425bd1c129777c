//! Projectile motion: step each moving projectile toward its destination
//! and queue it for despawn on exact arrival.

use hecs::{Entity, World};

use pulsepace_core::components::{MoveToward, Projectile, Translation};
use pulsepace_core::types::move_towards;

/// Advance all projectiles by one step. The arrival check runs for
/// stopped projectiles too: one that was halted exactly on its
/// destination still despawns.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    for (entity, (projectile, translation, travel)) in
        world.query_mut::<(&Projectile, &mut Translation, &MoveToward)>()
    {
        if projectile.moving {
            translation.0 = move_towards(translation.0, travel.destination, travel.step_distance);
        }
        if translation.0 == travel.destination {
            despawn_buffer.push(entity);
        }
    }
}
