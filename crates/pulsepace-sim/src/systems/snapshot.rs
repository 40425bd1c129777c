//! Snapshot system: queries the ECS world and builds a complete
//! GameStateSnapshot.
//!
//! This system is read-only — it never modifies the world.

use hecs::World;

use pulsepace_core::components::{ContactEffect, MoveToward, Projectile, ShrinkOut, Translation};
use pulsepace_core::enums::{GamePhase, PulseCondition, Speed};
use pulsepace_core::events::GameEvent;
use pulsepace_core::state::{GameStateSnapshot, HealthView, ProjectileView, SignalView};
use pulsepace_core::types::SimTime;

/// Build a complete GameStateSnapshot from the current world state.
#[allow(clippy::too_many_arguments)]
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: GamePhase,
    condition: PulseCondition,
    speed: Speed,
    signal: SignalView,
    health: HealthView,
    score: i32,
    events: Vec<GameEvent>,
) -> GameStateSnapshot {
    GameStateSnapshot {
        time: *time,
        phase,
        condition,
        speed,
        signal,
        health,
        score,
        projectiles: build_projectiles(world),
        events,
    }
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    let mut projectiles: Vec<ProjectileView> = world
        .query::<(
            &Projectile,
            &ContactEffect,
            &Translation,
            &MoveToward,
            Option<&ShrinkOut>,
        )>()
        .iter()
        .map(
            |(_, (projectile, effect, translation, travel, shrink))| ProjectileView {
                id: projectile.id,
                kind: effect.kind(),
                position: translation.0,
                destination: travel.destination,
                moving: projectile.moving,
                scale: shrink.map_or(1.0, ShrinkOut::scale),
            },
        )
        .collect();

    projectiles.sort_by_key(|p| p.id);
    projectiles
}
