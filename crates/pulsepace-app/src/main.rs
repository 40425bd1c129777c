//! Headless pulsepace demo.
//!
//! Builds an engine from a JSON level configuration (or the built-in
//! default level), runs the game loop at the fixed tick rate, requests a
//! game start, and logs snapshot summaries until shutdown. Logging is
//! controlled via `RUST_LOG`.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pulsepace_app::display::log_displays;
use pulsepace_app::game_loop::spawn_game_loop;
use pulsepace_app::state::GameLoopCommand;
use pulsepace_biofeedback::receiver::DeviceLink;
use pulsepace_core::commands::SimCommand;
use pulsepace_core::config::GameConfig;
use pulsepace_sim::engine::{GameEngine, SimConfig};

/// How long the demo runs before shutting down.
const DEMO_DURATION_SECS: u64 = 20;

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match GameConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(err) => {
                log::error!("could not load level config {path}: {err}");
                std::process::exit(1);
            }
        },
        None => GameConfig::default_level(),
    };

    let engine = GameEngine::new(
        config,
        SimConfig::default(),
        log_displays(),
        DeviceLink::default(),
    );

    let latest_snapshot = Arc::new(Mutex::new(None));
    let cmd_tx = spawn_game_loop(engine, Arc::clone(&latest_snapshot));

    let _ = cmd_tx.send(GameLoopCommand::Command(SimCommand::StartRequested));

    for _ in 0..DEMO_DURATION_SECS / 2 {
        std::thread::sleep(Duration::from_secs(2));
        if let Ok(lock) = latest_snapshot.lock() {
            if let Some(snapshot) = lock.as_ref() {
                log::info!(
                    "tick {} phase {:?} condition {:?} speed {:?} hp {}/{} score {} projectiles {}",
                    snapshot.time.tick,
                    snapshot.phase,
                    snapshot.condition,
                    snapshot.speed,
                    snapshot.health.current_points,
                    snapshot.health.max_points,
                    snapshot.score,
                    snapshot.projectiles.len(),
                );
            }
        }
    }

    let _ = cmd_tx.send(GameLoopCommand::Shutdown);
}
