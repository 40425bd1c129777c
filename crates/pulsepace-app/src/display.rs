//! Log-backed display sinks for headless runs.
//!
//! Each sink renders its writes as log lines, which is all the headless
//! binary needs; a graphical frontend would supply its own
//! implementations of the same traits.

use pulsepace_core::display::{
    DisplaySet, HealthBar, NotificationBar, ParameterBar, StartAffordance,
};
use pulsepace_core::types::BarColor;

/// Numeric readout logged on every change.
pub struct LogParameterBar {
    name: String,
    label: String,
    visible: bool,
    value: f32,
    decimals: usize,
}

impl LogParameterBar {
    pub fn new(name: &str, decimals: usize) -> Self {
        Self {
            name: name.to_owned(),
            label: name.to_owned(),
            visible: true,
            value: 0.0,
            decimals,
        }
    }

    fn report(&self) {
        if self.visible {
            log::info!(
                "[{}] {}: {:.*}",
                self.name,
                self.label,
                self.decimals,
                self.value
            );
        }
    }
}

impl ParameterBar for LogParameterBar {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_label(&mut self, label: &str) {
        self.label = label.to_owned();
    }

    fn set_value(&mut self, value: f32) {
        self.value = value;
        self.report();
    }

    fn add_value(&mut self, delta: f32) {
        self.value += delta;
        self.report();
    }

    fn set_color(&mut self, _color: BarColor) {}
}

/// Notification line logged while non-empty.
#[derive(Debug, Default)]
pub struct LogNotificationBar;

impl NotificationBar for LogNotificationBar {
    fn set_text(&mut self, text: &str) {
        if !text.is_empty() {
            log::info!("[notification] {text}");
        }
    }
}

/// Health bar logged as a row of filled/empty slots.
#[derive(Debug, Default)]
pub struct LogHealthBar {
    slots: Vec<bool>,
}

impl LogHealthBar {
    fn report(&self) {
        let row: String = self
            .slots
            .iter()
            .map(|&active| if active { '\u{2665}' } else { '.' })
            .collect();
        log::info!("[hp] {row}");
    }
}

impl HealthBar for LogHealthBar {
    fn create_bar(&mut self, points: usize) {
        self.slots = vec![true; points];
        self.report();
    }

    fn destroy_bar(&mut self) {
        self.slots.clear();
        log::info!("[hp] (bar removed)");
    }

    fn set_point_active(&mut self, index: usize, active: bool) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = active;
        }
        self.report();
    }
}

/// Start affordance visibility logged on change.
#[derive(Debug, Default)]
pub struct LogStartAffordance;

impl StartAffordance for LogStartAffordance {
    fn show(&mut self) {
        log::info!("[start button] shown");
    }

    fn hide(&mut self) {
        log::info!("[start button] hidden");
    }
}

/// The full log-backed display set.
pub fn log_displays() -> DisplaySet {
    DisplaySet {
        score_bar: Box::new(LogParameterBar::new("score", 0)),
        notification: Box::new(LogNotificationBar),
        health_bar: Box::new(LogHealthBar::default()),
        start_button: Box::new(LogStartAffordance),
        debug_bar: Box::new(LogParameterBar::new("pulse", 1)),
    }
}
