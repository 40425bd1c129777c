//! Game loop thread — runs the engine at the fixed tick rate and stores
//! the latest snapshot for synchronous polling.
//!
//! Commands arrive via `mpsc` channel; the engine is moved into the
//! thread so it owns all game state.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pulsepace_core::constants::TICK_RATE;
use pulsepace_core::state::GameStateSnapshot;
use pulsepace_sim::engine::GameEngine;

use crate::state::GameLoopCommand;

/// Nominal duration of one tick.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Spawns the game loop in a new thread.
///
/// Returns the command sender for the frontend side to use.
pub fn spawn_game_loop(
    engine: GameEngine,
    latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
) -> mpsc::Sender<GameLoopCommand> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    std::thread::Builder::new()
        .name("pulsepace-game-loop".into())
        .spawn(move || {
            run_game_loop(engine, cmd_rx, &latest_snapshot);
        })
        .expect("failed to spawn game loop thread");

    cmd_tx
}

/// The game loop. Runs until Shutdown command or channel disconnect.
fn run_game_loop(
    mut engine: GameEngine,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<GameStateSnapshot>>,
) {
    let mut next_tick_time = Instant::now();

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::Command(cmd)) => engine.queue_command(cmd),
                Ok(GameLoopCommand::Shutdown) => {
                    engine.shutdown();
                    return;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    engine.shutdown();
                    return;
                }
            }
        }

        // 2. Advance one tick
        let snapshot = engine.tick();

        // 3. Store latest snapshot for synchronous polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 4. Sleep until the next tick boundary
        next_tick_time += TICK_DURATION;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > TICK_DURATION * 2 {
            // Too far behind — reset to avoid catch-up spiral
            next_tick_time = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsepace_biofeedback::receiver::DeviceLink;
    use pulsepace_core::commands::SimCommand;
    use pulsepace_core::config::GameConfig;
    use pulsepace_core::display::DisplaySet;
    use pulsepace_core::enums::GamePhase;
    use pulsepace_sim::engine::SimConfig;

    fn test_engine() -> GameEngine {
        let mut config = GameConfig::default_level();
        config.wait_before_start = 0;
        GameEngine::new(
            config,
            SimConfig::default(),
            DisplaySet::default(),
            DeviceLink::default(),
        )
    }

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<GameLoopCommand>();

        tx.send(GameLoopCommand::Command(SimCommand::StartRequested))
            .unwrap();
        tx.send(GameLoopCommand::Shutdown).unwrap();

        let mut commands = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            commands.push(cmd);
        }

        assert_eq!(commands.len(), 2);
        assert!(matches!(
            commands[0],
            GameLoopCommand::Command(SimCommand::StartRequested)
        ));
        assert!(matches!(commands[1], GameLoopCommand::Shutdown));
    }

    #[test]
    fn test_tick_duration_constant() {
        // 30Hz = 33.333ms per tick
        let expected_nanos = 1_000_000_000u64 / 30;
        assert_eq!(TICK_DURATION.as_nanos(), expected_nanos as u128);
    }

    #[test]
    fn test_snapshot_serializes_quickly() {
        let mut engine = test_engine();
        engine.queue_command(SimCommand::StartRequested);
        for _ in 0..100 {
            engine.tick();
        }

        let snapshot = engine.tick();
        let start = Instant::now();
        let json = serde_json::to_string(&snapshot).unwrap();
        let elapsed = start.elapsed();

        assert!(
            elapsed < Duration::from_millis(3),
            "snapshot serialization took {elapsed:?}, should be <3ms"
        );
        assert!(!json.is_empty());
    }

    #[test]
    fn test_loop_thread_runs_and_shuts_down() {
        let latest = Arc::new(Mutex::new(None));
        let tx = spawn_game_loop(test_engine(), Arc::clone(&latest));

        tx.send(GameLoopCommand::Command(SimCommand::StartRequested))
            .unwrap();
        std::thread::sleep(Duration::from_millis(300));

        let snapshot = latest.lock().unwrap().clone();
        let snapshot = snapshot.expect("the loop should have published a snapshot");
        assert_eq!(snapshot.phase, GamePhase::Running);
        assert!(snapshot.time.tick > 0);

        tx.send(GameLoopCommand::Shutdown).unwrap();
    }
}
