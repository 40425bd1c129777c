//! Post-contact effect timers: delayed despawn after a crash, shrink-out
//! on consumed heals, and the fade refcount on consumed score pickups.

use hecs::{Entity, World};

use pulsepace_core::components::{DespawnAfter, FadeOut, ShrinkOut};

pub fn run(world: &mut World, dt: f32, despawn_buffer: &mut Vec<Entity>) {
    for (entity, timer) in world.query_mut::<&mut DespawnAfter>() {
        timer.remaining_secs -= dt;
        if timer.remaining_secs <= 0.0 {
            despawn_buffer.push(entity);
        }
    }

    for (entity, shrink) in world.query_mut::<&mut ShrinkOut>() {
        shrink.remaining_secs -= dt;
        if shrink.remaining_secs <= 0.0 {
            despawn_buffer.push(entity);
        }
    }

    for (entity, fade) in world.query_mut::<&mut FadeOut>() {
        if fade.remaining_secs > 0.0 {
            fade.remaining_secs -= dt;
            if fade.remaining_secs <= 0.0 {
                // All surfaces share one duration, so their fades finish
                // on the same step.
                fade.pending_surfaces = 0;
            }
        }
        // The pending count gates destruction, not the timer.
        if fade.pending_surfaces == 0 {
            despawn_buffer.push(entity);
        }
    }
}
