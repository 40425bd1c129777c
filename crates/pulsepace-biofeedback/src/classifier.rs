//! Condition classifier: maps a scalar biofeedback input onto the ordered
//! threshold table.

use pulsepace_core::config::{normalize_thresholds, PulseThreshold};
use pulsepace_core::constants::INITIAL_CLASSIFIER_INPUT;
use pulsepace_core::display::ParameterBar;
use pulsepace_core::enums::PulseCondition;
use pulsepace_core::events::GameEvent;

/// Which scalar the classifier consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierInput {
    /// The raw heart-rate value, scanned against the threshold table.
    HeartRate,
    /// The derived rate-of-change metric. Provisional: always resolves to
    /// the first threshold tagged Normal, regardless of the live value.
    Acceleration,
}

/// Threshold-table classifier with change-triggered events.
pub struct ConditionClassifier {
    input: ClassifierInput,
    thresholds: Vec<PulseThreshold>,
    last_input: f32,
    condition: PulseCondition,
    debug_bar: Box<dyn ParameterBar>,
}

impl ConditionClassifier {
    pub fn new(
        input: ClassifierInput,
        mut thresholds: Vec<PulseThreshold>,
        mut debug_bar: Box<dyn ParameterBar>,
        show_debug_bar: bool,
        debug_bar_label: &str,
    ) -> Self {
        if thresholds.is_empty() {
            log::error!("condition threshold table is empty");
        }
        normalize_thresholds(&mut thresholds);

        debug_bar.set_visible(show_debug_bar);
        if !debug_bar_label.is_empty() {
            debug_bar.set_label(debug_bar_label);
        }

        Self {
            input,
            thresholds,
            last_input: INITIAL_CLASSIFIER_INPUT,
            condition: PulseCondition::default(),
            debug_bar,
        }
    }

    pub fn condition(&self) -> PulseCondition {
        self.condition
    }

    /// Feed one scalar observation. Level-triggered: a value equal to the
    /// previous observation is ignored entirely.
    pub fn observe(&mut self, value: f32, events: &mut Vec<GameEvent>) {
        if value == self.last_input {
            return;
        }
        self.last_input = value;
        self.reclassify(events);
        self.debug_bar.set_value(value);
    }

    fn reclassify(&mut self, events: &mut Vec<GameEvent>) {
        if self.thresholds.is_empty() {
            log::error!("condition threshold table is empty; keeping previous condition");
            return;
        }

        let index = match self.input {
            ClassifierInput::HeartRate => self
                .thresholds
                .iter()
                .position(|row| self.last_input < row.ceiling)
                .unwrap_or(self.thresholds.len() - 1),
            ClassifierInput::Acceleration => {
                match self
                    .thresholds
                    .iter()
                    .position(|row| row.condition == PulseCondition::Normal)
                {
                    Some(index) => index,
                    None => return,
                }
            }
        };

        self.select(index, events);
    }

    /// The color updates on every resolution; the event fires only when
    /// the resolved condition actually changed.
    fn select(&mut self, index: usize, events: &mut Vec<GameEvent>) {
        let row = self.thresholds[index];
        self.debug_bar.set_color(row.color);
        if self.condition != row.condition {
            self.condition = row.condition;
            events.push(GameEvent::ConditionChanged {
                condition: self.condition,
            });
        }
    }
}
