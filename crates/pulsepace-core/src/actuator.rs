//! Tier-consumer interface.

use crate::enums::Speed;

/// Implemented by every actuator that reacts to pacing-tier broadcasts
/// (the spawn engine, movement scalers, and so on).
///
/// `Speed::Stop` must deactivate the actuator. An actuator receiving a
/// tier it has no configuration for logs a diagnostic and keeps its
/// prior behavior.
pub trait SpeedConsumer {
    fn on_speed_changed(&mut self, speed: Speed);
}
