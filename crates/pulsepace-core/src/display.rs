//! Write-only display sinks.
//!
//! The core never renders; it pushes values into these traits. Real
//! implementations live with the frontend (the app crate ships
//! log-backed ones); [`NullDisplay`] discards everything and is the
//! default for tests and headless runs.

use crate::types::BarColor;

/// A labeled numeric readout (score bar, debug pulse bar).
pub trait ParameterBar: Send {
    fn set_visible(&mut self, visible: bool);
    fn set_label(&mut self, label: &str);
    /// Replace the displayed value.
    fn set_value(&mut self, value: f32);
    /// Add to the displayed value; smooth-change bars animate toward the
    /// new total.
    fn add_value(&mut self, delta: f32);
    fn set_color(&mut self, color: BarColor);
}

/// A transient text line (the pre-game countdown).
pub trait NotificationBar: Send {
    fn set_text(&mut self, text: &str);
}

/// The health-point row: a bar of individually activatable slots.
pub trait HealthBar: Send {
    /// Build a fresh bar with `points` active slots, replacing any old one.
    fn create_bar(&mut self, points: usize);
    /// Tear the bar down entirely.
    fn destroy_bar(&mut self);
    fn set_point_active(&mut self, index: usize, active: bool);
}

/// The start affordance (button cluster) visibility.
pub trait StartAffordance: Send {
    fn show(&mut self);
    fn hide(&mut self);
}

/// Discards every display call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDisplay;

impl ParameterBar for NullDisplay {
    fn set_visible(&mut self, _visible: bool) {}
    fn set_label(&mut self, _label: &str) {}
    fn set_value(&mut self, _value: f32) {}
    fn add_value(&mut self, _delta: f32) {}
    fn set_color(&mut self, _color: BarColor) {}
}

impl NotificationBar for NullDisplay {
    fn set_text(&mut self, _text: &str) {}
}

impl HealthBar for NullDisplay {
    fn create_bar(&mut self, _points: usize) {}
    fn destroy_bar(&mut self) {}
    fn set_point_active(&mut self, _index: usize, _active: bool) {}
}

impl StartAffordance for NullDisplay {
    fn show(&mut self) {}
    fn hide(&mut self) {}
}

/// The full set of sinks the engine writes to.
pub struct DisplaySet {
    pub score_bar: Box<dyn ParameterBar>,
    pub notification: Box<dyn NotificationBar>,
    pub health_bar: Box<dyn HealthBar>,
    pub start_button: Box<dyn StartAffordance>,
    /// Debug readout fed by the condition classifier.
    pub debug_bar: Box<dyn ParameterBar>,
}

impl Default for DisplaySet {
    fn default() -> Self {
        Self {
            score_bar: Box::new(NullDisplay),
            notification: Box::new(NullDisplay),
            health_bar: Box::new(NullDisplay),
            start_button: Box::new(NullDisplay),
            debug_bar: Box::new(NullDisplay),
        }
    }
}
