//! Game engine — the core of the adaptive-difficulty loop.
//!
//! `GameEngine` owns the hecs ECS world and every runtime component
//! (signal source, classifier, level controller, spawn engine, health
//! model), processes queued commands, runs all systems in a fixed order,
//! and produces `GameStateSnapshot`s. Completely headless, enabling
//! deterministic testing.

use std::collections::VecDeque;

use hecs::World;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use pulsepace_biofeedback::classifier::{ClassifierInput, ConditionClassifier};
use pulsepace_biofeedback::receiver::{DeviceLink, SignalSource};
use pulsepace_core::actuator::SpeedConsumer;
use pulsepace_core::commands::SimCommand;
use pulsepace_core::components::{
    ContactEffect, DespawnAfter, FadeOut, Projectile, ShrinkOut, Translation,
};
use pulsepace_core::config::GameConfig;
use pulsepace_core::constants::{CRASH_EPICENTER_JITTER, DT};
use pulsepace_core::display::DisplaySet;
use pulsepace_core::enums::{BiofeedbackControl, GamePhase, PulseCondition, Speed};
use pulsepace_core::events::GameEvent;
use pulsepace_core::state::{GameStateSnapshot, HealthView, SignalView};
use pulsepace_core::types::{ProjectileId, SimTime};

use crate::controller::LevelController;
use crate::health::HealthModel;
use crate::spawner::SpawnEngine;
use crate::systems;

/// Configuration for starting a new engine.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// The game engine. Owns the ECS world and all runtime components.
pub struct GameEngine {
    world: World,
    time: SimTime,
    rng: ChaCha8Rng,
    command_queue: VecDeque<SimCommand>,
    despawn_buffer: Vec<hecs::Entity>,
    /// Events carried over from construction (startup priming).
    pending_events: Vec<GameEvent>,
    next_projectile_id: u32,
    control: BiofeedbackControl,
    signal: SignalSource,
    classifier: Option<ConditionClassifier>,
    controller: LevelController,
    spawner: SpawnEngine,
    health: HealthModel,
}

impl GameEngine {
    /// Create a new engine from a level configuration.
    pub fn new(
        config: GameConfig,
        sim_config: SimConfig,
        displays: DisplaySet,
        link: DeviceLink,
    ) -> Self {
        let DisplaySet {
            score_bar,
            notification,
            health_bar,
            start_button,
            debug_bar,
        } = displays;

        let signal = SignalSource::new(config.signal, link);

        let classifier_input = match config.control {
            BiofeedbackControl::None => None,
            BiofeedbackControl::HeartRate => Some(ClassifierInput::HeartRate),
            BiofeedbackControl::Acceleration => Some(ClassifierInput::Acceleration),
        };
        let mut classifier = classifier_input.map(|input| {
            ConditionClassifier::new(
                input,
                config.thresholds,
                debug_bar,
                config.show_debug_bar,
                &config.debug_bar_label,
            )
        });

        // Startup priming: the classifier observes a zero reading so a
        // condition is resolved before the first real sample arrives.
        let mut pending_events = Vec::new();
        if let Some(classifier) = classifier.as_mut() {
            classifier.observe(0.0, &mut pending_events);
        }

        Self {
            world: World::new(),
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(sim_config.seed),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            pending_events,
            next_projectile_id: 0,
            control: config.control,
            signal,
            classifier,
            controller: LevelController::new(
                config.hp_count,
                config.wait_before_start,
                score_bar,
                notification,
                start_button,
            ),
            spawner: SpawnEngine::new(config.speed_profiles, config.archetypes),
            health: HealthModel::new(config.immortality_secs, health_bar),
        }
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    pub fn phase(&self) -> GamePhase {
        self.controller.phase()
    }

    pub fn condition(&self) -> PulseCondition {
        self.controller.condition()
    }

    pub fn speed(&self) -> Speed {
        self.controller.speed()
    }

    pub fn score(&self) -> i32 {
        self.controller.score()
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn live_projectiles(&self) -> usize {
        self.spawner.live_count()
    }

    pub fn health(&self) -> &HealthModel {
        &self.health
    }

    /// Cancel pending timers. Used on shutdown.
    pub fn shutdown(&self) {
        self.controller.cancel_timers();
    }

    /// Advance the game by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        let mut events = std::mem::take(&mut self.pending_events);

        self.process_commands(&mut events);
        self.signal.step(DT, &mut events);
        self.controller.step(DT, &mut events);
        self.health.step(DT, &mut events);
        self.dispatch(&mut events);

        self.spawner.step(
            DT,
            &mut self.world,
            &mut self.rng,
            &mut self.next_projectile_id,
            &mut events,
        );
        systems::motion::run(&mut self.world, &mut self.despawn_buffer);
        systems::effects::run(&mut self.world, DT, &mut self.despawn_buffer);
        systems::cleanup::run(
            &mut self.world,
            &mut self.despawn_buffer,
            &mut self.spawner,
            &mut events,
        );

        self.time.advance();

        let signal = SignalView {
            pulse: self.signal.last_pulse(),
            acceleration: self.signal.last_acceleration(),
            connected: self.signal.connected(),
            placeholder: self.signal.is_placeholder(),
        };
        let health = HealthView {
            max_points: self.health.max_points(),
            current_points: self.health.current_points(),
            immortal: self.health.is_immortal(),
            immortality_remaining_secs: self.health.immortality_remaining(),
        };
        systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            self.controller.phase(),
            self.controller.condition(),
            self.controller.speed(),
            signal,
            health,
            self.controller.score(),
            events,
        )
    }

    fn process_commands(&mut self, events: &mut Vec<GameEvent>) {
        while let Some(command) = self.command_queue.pop_front() {
            match command {
                SimCommand::StartRequested => self.controller.request_start(events),
                SimCommand::ReportContact { projectile } => {
                    self.handle_contact(projectile, events);
                }
            }
        }
    }

    /// Single-pass event dispatch over a growing vector. Events pushed by
    /// a handler are scanned in the same pass, so the full cascade —
    /// reading → condition → tier → consumers, and out-of-health → game
    /// end → force-despawn — resolves within one tick.
    fn dispatch(&mut self, events: &mut Vec<GameEvent>) {
        let mut index = 0;
        while index < events.len() {
            let event = events[index];
            match event {
                GameEvent::PulseReceived { value } => {
                    if self.control == BiofeedbackControl::HeartRate {
                        if let Some(classifier) = self.classifier.as_mut() {
                            classifier.observe(value as f32, events);
                        }
                    }
                }
                GameEvent::AccelerationCalculated { rate } => {
                    if self.control == BiofeedbackControl::Acceleration {
                        if let Some(classifier) = self.classifier.as_mut() {
                            classifier.observe(rate, events);
                        }
                    }
                }
                GameEvent::ConditionChanged { condition } => {
                    self.controller.on_condition_changed(condition, events);
                }
                GameEvent::SpeedChanged { speed } => self.broadcast_speed(speed),
                GameEvent::CountdownTick { remaining } => {
                    self.controller
                        .on_countdown_tick(remaining, &mut self.health, events);
                }
                GameEvent::OutOfHealth => self.controller.end_game(events),
                GameEvent::GameStarted => self.spawner.activate(),
                GameEvent::GameEnded => {
                    self.spawner.stop_and_destroy_all(&mut self.world, events);
                }
                _ => {}
            }
            index += 1;
        }
    }

    /// Fan a new tier out to every registered consumer, in any phase;
    /// consumers decide whether to act.
    fn broadcast_speed(&mut self, speed: Speed) {
        let consumers: [&mut dyn SpeedConsumer; 1] = [&mut self.spawner];
        for consumer in consumers {
            consumer.on_speed_changed(speed);
        }
    }

    /// Apply a reported contact: the one-shot guard is the `moving`
    /// flag, so a stopped projectile ignores repeat contact. Unknown ids
    /// (already destroyed, or a stale report after game end) are
    /// silently ignored.
    fn handle_contact(&mut self, id: ProjectileId, events: &mut Vec<GameEvent>) {
        let Some(entity) = self.spawner.find_entity(id) else {
            return;
        };
        let (effect, position) = match self
            .world
            .query_one_mut::<(&mut Projectile, &ContactEffect, &Translation)>(entity)
        {
            Ok((projectile, effect, translation)) => {
                if !projectile.moving {
                    return;
                }
                projectile.moving = false;
                (*effect, translation.0)
            }
            Err(_) => return,
        };

        match effect {
            ContactEffect::Damage {
                hp_drain,
                crash_force,
                crash_radius,
                destruction_delay_secs,
            } => {
                self.health.subtract(hp_drain, events);
                let jitter = glam::Vec3::new(
                    self.rng.gen_range(-CRASH_EPICENTER_JITTER..=CRASH_EPICENTER_JITTER),
                    self.rng.gen_range(-CRASH_EPICENTER_JITTER..=CRASH_EPICENTER_JITTER),
                    self.rng.gen_range(-CRASH_EPICENTER_JITTER..=CRASH_EPICENTER_JITTER),
                );
                events.push(GameEvent::ProjectileCrashed {
                    id,
                    force: crash_force,
                    radius: crash_radius,
                    epicenter: position + jitter,
                });
                let _ = self.world.insert_one(
                    entity,
                    DespawnAfter {
                        remaining_secs: destruction_delay_secs,
                    },
                );
            }
            ContactEffect::Heal {
                hp_added,
                shrink_duration_secs,
            } => {
                self.health.add(hp_added, events);
                let _ = self.world.insert_one(
                    entity,
                    ShrinkOut {
                        remaining_secs: shrink_duration_secs,
                        duration_secs: shrink_duration_secs,
                    },
                );
            }
            ContactEffect::Score {
                points,
                fade_duration_secs,
                surface_count,
            } => {
                self.controller.add_score(points);
                let _ = self.world.insert_one(
                    entity,
                    FadeOut {
                        remaining_secs: fade_duration_secs,
                        pending_surfaces: surface_count,
                    },
                );
            }
        }
    }
}
