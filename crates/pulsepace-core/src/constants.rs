//! Game loop constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick, as the fixed gameplay step.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

// --- Device protocol ---

/// Prefix of a valid device response line.
pub const PULSE_PREFIX: &str = "pulse=";

/// Request token sent to the device every poll cycle.
pub const PULSE_REQUEST_MESSAGE: &str = "1";

/// Sentinel reading emitted while the device is disconnected.
pub const PULSE_NOT_RECEIVED: i32 = -1;

// --- Classifier ---

/// Value the classifier holds before its first observation. Chosen off
/// zero so the startup priming observation of 0 always reclassifies.
pub const INITIAL_CLASSIFIER_INPUT: f32 = 80.0;

// --- Countdown ---

/// Period between pre-game countdown ticks (seconds).
pub const COUNTDOWN_PERIOD_SECS: f64 = 1.0;

// --- Spawning ---

/// Divider applied to a tier's movement speed to obtain the per-step
/// projectile travel distance.
pub const SPEED_DIVIDER: f32 = 70.0;

/// Numerator of the spawn interval: seconds between spawns is
/// `SPAWN_INTERVAL_NUMERATOR / spawn_rate`.
pub const SPAWN_INTERVAL_NUMERATOR: f32 = 100.0;

/// Initial value of the spawn accumulator. Primed far past any real
/// interval so the first spawn after activation is immediate.
pub const SPAWN_ACCUMULATOR_PRIME: f32 = 200.0;

/// Half-width of the random epicenter jitter applied to a crash impulse.
pub const CRASH_EPICENTER_JITTER: f32 = 1.0;

// --- Health ---

/// Grace window after taking damage (seconds).
pub const DEFAULT_IMMORTALITY_SECS: f32 = 3.0;
