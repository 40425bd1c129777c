//! Commands shared between the frontend side and the game loop thread.

use pulsepace_core::commands::SimCommand;

/// Commands sent from the outside into the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A command to forward to the engine.
    Command(SimCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}
