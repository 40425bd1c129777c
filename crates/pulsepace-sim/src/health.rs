//! Health model: ordered health points with a post-damage immortality
//! window.

use pulsepace_core::display::HealthBar;
use pulsepace_core::events::GameEvent;

/// Health-point state machine driving an indexed health-bar display.
pub struct HealthModel {
    max_points: i32,
    current: i32,
    immortality_duration_secs: f32,
    immortality_remaining: f32,
    immortal: bool,
    bar: Box<dyn HealthBar>,
}

impl HealthModel {
    pub fn new(immortality_duration_secs: f32, bar: Box<dyn HealthBar>) -> Self {
        Self {
            max_points: 0,
            current: 0,
            immortality_duration_secs,
            immortality_remaining: 0.0,
            immortal: false,
            bar,
        }
    }

    pub fn max_points(&self) -> i32 {
        self.max_points
    }

    pub fn current_points(&self) -> i32 {
        self.current
    }

    pub fn is_immortal(&self) -> bool {
        self.immortal
    }

    pub fn immortality_remaining(&self) -> f32 {
        self.immortality_remaining.max(0.0)
    }

    /// Set the health-point count. A new count rebuilds the display; the
    /// same count instead reactivates every existing slot ("heal to
    /// full") without resizing.
    pub fn set_hp(&mut self, count: i32, events: &mut Vec<GameEvent>) {
        if self.max_points != count {
            self.max_points = count;
            self.current = count;
            self.bar.create_bar(count as usize);
        } else {
            self.reset(events);
        }
    }

    /// Reactivate all health points without changing their quantity.
    pub fn reset(&mut self, events: &mut Vec<GameEvent>) {
        self.change_hp(self.max_points, events);
    }

    /// Add health points. A target above the maximum is rejected whole.
    pub fn add(&mut self, value: i32, events: &mut Vec<GameEvent>) {
        self.change_hp(self.current + value, events);
    }

    /// Subtract health points. A complete no-op while an immortality
    /// window is active; otherwise the window opens before the health
    /// change applies.
    pub fn subtract(&mut self, value: i32, events: &mut Vec<GameEvent>) {
        if self.immortality_remaining > 0.0 {
            return;
        }
        let target = self.current - value;
        self.start_immortality(events);
        self.change_hp(target, events);
    }

    /// One step of the fixed game loop: run down the immortality window.
    pub fn step(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        if self.immortality_remaining <= 0.0 {
            self.stop_immortality(events);
        } else {
            self.immortality_remaining -= dt;
        }
    }

    fn start_immortality(&mut self, events: &mut Vec<GameEvent>) {
        self.immortal = true;
        self.immortality_remaining = self.immortality_duration_secs;
        events.push(GameEvent::ImmortalityStarted);
    }

    /// Idempotent: only an active window emits the stop event.
    fn stop_immortality(&mut self, events: &mut Vec<GameEvent>) {
        if self.immortal {
            self.immortal = false;
            self.immortality_remaining = 0.0;
            events.push(GameEvent::ImmortalityStopped);
        }
    }

    /// Walk the display slots one at a time toward the target. Targets
    /// outside `0..=max` are rejected without side effects.
    fn change_hp(&mut self, target: i32, events: &mut Vec<GameEvent>) {
        if target > self.max_points || target < 0 {
            return;
        }

        while self.current != target {
            if target > self.current {
                self.bar.set_point_active(self.current as usize, true);
                self.current += 1;
            } else {
                self.current -= 1;
                self.bar.set_point_active(self.current as usize, false);
            }
        }

        if self.current == 0 {
            events.push(GameEvent::OutOfHealth);
            self.bar.destroy_bar();
        }
    }
}
