//! Game engine for pulsepace.
//!
//! Owns the hecs ECS world, runs the control loop (signal →
//! classification → pacing → spawning → health) at a fixed tick rate,
//! and produces GameStateSnapshots.

pub mod controller;
pub mod countdown;
pub mod engine;
pub mod health;
pub mod spawner;
pub mod systems;

pub use engine::GameEngine;
pub use pulsepace_core as core;

#[cfg(test)]
mod tests;
