//! Spawn engine: tier-scaled, weighted-random projectile spawning and
//! the live-instance registry.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use pulsepace_core::actuator::SpeedConsumer;
use pulsepace_core::components::{MoveToward, Projectile, Rotation, Translation};
use pulsepace_core::config::{normalize_speed_profiles, ProjectileArchetype, SpeedProfile};
use pulsepace_core::constants::{
    SPAWN_ACCUMULATOR_PRIME, SPAWN_INTERVAL_NUMERATOR, SPEED_DIVIDER,
};
use pulsepace_core::enums::Speed;
use pulsepace_core::events::GameEvent;
use pulsepace_core::types::ProjectileId;

/// Weighted draw over the archetype table: `winner` is uniform in
/// `[1, total]`, archetypes are scanned in declared order against a
/// shrinking remainder, so selection probability is proportional to
/// weight and ties resolve to declaration order.
pub fn select_archetype(archetypes: &[ProjectileArchetype], rng: &mut ChaCha8Rng) -> Option<usize> {
    let total: u32 = archetypes.iter().map(|a| a.spawn_weight).sum();
    if total == 0 {
        log::error!("projectile archetype weights sum to zero; nothing to spawn");
        return None;
    }
    let winner = rng.gen_range(1..=total);
    let mut remaining = total;
    for (index, archetype) in archetypes.iter().enumerate() {
        remaining -= archetype.spawn_weight;
        if winner >= remaining {
            return Some(index);
        }
    }
    None
}

/// Projectile spawner and live-instance registry.
pub struct SpawnEngine {
    archetypes: Vec<ProjectileArchetype>,
    profiles: Vec<SpeedProfile>,
    current: Option<SpeedProfile>,
    active: bool,
    time_after_spawn: f32,
    live: Vec<(ProjectileId, Entity)>,
}

impl SpawnEngine {
    pub fn new(mut profiles: Vec<SpeedProfile>, archetypes: Vec<ProjectileArchetype>) -> Self {
        normalize_speed_profiles(&mut profiles);
        if profiles.is_empty() {
            log::error!("speed profile table is empty; the spawn engine will never spawn");
        }
        let current = profiles.first().copied();
        Self {
            archetypes,
            profiles,
            current,
            active: false,
            time_after_spawn: SPAWN_ACCUMULATOR_PRIME,
            live: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn find_entity(&self, id: ProjectileId) -> Option<Entity> {
        self.live
            .iter()
            .find(|&&(live_id, _)| live_id == id)
            .map(|&(_, entity)| entity)
    }

    /// Begin spawning. Driven by the game-started event only; a tier
    /// change back from Stop does not reactivate the engine.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Accumulate elapsed time and spawn once the current tier's
    /// interval has passed.
    pub fn step(
        &mut self,
        dt: f32,
        world: &mut World,
        rng: &mut ChaCha8Rng,
        next_id: &mut u32,
        events: &mut Vec<GameEvent>,
    ) {
        if !self.active {
            return;
        }
        let Some(profile) = self.current else {
            return;
        };

        self.time_after_spawn += dt;
        if self.time_after_spawn >= SPAWN_INTERVAL_NUMERATOR / profile.spawn_rate {
            self.spawn_random(world, rng, next_id, &profile, events);
            self.time_after_spawn = 0.0;
        }
    }

    fn spawn_random(
        &mut self,
        world: &mut World,
        rng: &mut ChaCha8Rng,
        next_id: &mut u32,
        profile: &SpeedProfile,
        events: &mut Vec<GameEvent>,
    ) {
        let Some(index) = select_archetype(&self.archetypes, rng) else {
            return;
        };
        let archetype = &self.archetypes[index];

        let path = archetype.paths[rng.gen_range(0..archetype.paths.len())];
        let position = path.entry.position + archetype.local_offset;
        let rotation = path.entry.rotation * archetype.local_rotation;
        let destination = path.exit + archetype.local_offset;

        let id = ProjectileId(*next_id);
        *next_id += 1;

        let entity = world.spawn((
            Projectile { id, moving: true },
            archetype.effect,
            Translation(position),
            Rotation(rotation),
            MoveToward {
                destination,
                step_distance: profile.movement_speed / SPEED_DIVIDER,
            },
        ));
        self.live.push((id, entity));
        events.push(GameEvent::ProjectileSpawned {
            id,
            kind: archetype.effect.kind(),
        });
    }

    /// Stop spawning and force-destroy every live instance immediately,
    /// independent of position.
    pub fn stop_and_destroy_all(&mut self, world: &mut World, events: &mut Vec<GameEvent>) {
        self.active = false;
        for (id, entity) in self.live.drain(..).rev() {
            let _ = world.despawn(entity);
            events.push(GameEvent::ProjectileDestroyed { id });
        }
    }

    /// A destroyed instance reports itself out of the registry.
    pub fn report_destroyed(&mut self, entity: Entity) {
        self.live.retain(|&(_, live_entity)| live_entity != entity);
    }
}

impl SpeedConsumer for SpawnEngine {
    fn on_speed_changed(&mut self, speed: Speed) {
        if speed == Speed::Stop {
            self.active = false;
            return;
        }
        if self.profiles.is_empty() {
            log::error!("speed profile table is empty");
            return;
        }
        match self.profiles.iter().find(|p| p.tier == speed) {
            Some(profile) => self.current = Some(*profile),
            None => log::error!("no speed profile configured for tier {speed:?}"),
        }
    }
}
