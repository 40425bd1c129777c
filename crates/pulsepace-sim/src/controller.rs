//! Level controller: the game state machine.
//!
//! Sequences start requests through the pre-game countdown into the
//! running phase, maps classified conditions onto pacing tiers, keeps
//! the score, and ends the game when health runs out.

use pulsepace_core::constants::COUNTDOWN_PERIOD_SECS;
use pulsepace_core::display::{NotificationBar, ParameterBar, StartAffordance};
use pulsepace_core::enums::{GamePhase, PulseCondition, Speed};
use pulsepace_core::events::GameEvent;

use crate::countdown::{CancelToken, Countdown, TimeUnit};
use crate::health::HealthModel;

/// Fixed condition→tier map. The relationship is inverse: elevated
/// readings slow the game down to help the player de-escalate.
pub fn map_condition_to_speed(condition: PulseCondition) -> Speed {
    match condition {
        PulseCondition::Critical => Speed::Stop,
        PulseCondition::Slow => Speed::Fast,
        PulseCondition::Normal => Speed::Normal,
        PulseCondition::Fast => Speed::Slow,
    }
}

/// Game state machine and score keeper.
pub struct LevelController {
    phase: GamePhase,
    condition: PulseCondition,
    speed: Speed,
    score: i32,
    hp_count: i32,
    wait_before_start: u32,
    countdown: Option<Countdown>,
    timer_token: CancelToken,
    score_bar: Box<dyn ParameterBar>,
    notification: Box<dyn NotificationBar>,
    start_button: Box<dyn StartAffordance>,
}

impl LevelController {
    pub fn new(
        hp_count: i32,
        wait_before_start: u32,
        mut score_bar: Box<dyn ParameterBar>,
        mut notification: Box<dyn NotificationBar>,
        start_button: Box<dyn StartAffordance>,
    ) -> Self {
        score_bar.set_value(0.0);
        notification.set_text("");
        Self {
            phase: GamePhase::default(),
            condition: PulseCondition::default(),
            speed: Speed::default(),
            score: 0,
            hp_count,
            wait_before_start,
            countdown: None,
            timer_token: CancelToken::new(),
            score_bar,
            notification,
            start_button,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn condition(&self) -> PulseCondition {
        self.condition
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    /// Begin the pre-game countdown. Ignored while a countdown or game
    /// is already in progress.
    pub fn request_start(&mut self, events: &mut Vec<GameEvent>) {
        if matches!(self.phase, GamePhase::CountingDown | GamePhase::Running) {
            log::debug!("start request ignored in phase {:?}", self.phase);
            return;
        }
        self.phase = GamePhase::CountingDown;
        let (countdown, first) = Countdown::setup(self.timer_token.clone())
            .count(i64::from(self.wait_before_start) + 1)
            .period(COUNTDOWN_PERIOD_SECS, TimeUnit::Seconds)
            .start();
        self.countdown = Some(countdown);
        events.push(GameEvent::CountdownTick { remaining: first });
    }

    /// Poll the running countdown, if any.
    pub fn step(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        if let Some(countdown) = self.countdown.as_mut() {
            if let Some(remaining) = countdown.step(dt) {
                events.push(GameEvent::CountdownTick { remaining });
            }
        }
    }

    /// Show a countdown tick; tick 0 is terminal and attempts the
    /// transition into the running phase.
    pub fn on_countdown_tick(
        &mut self,
        remaining: i64,
        health: &mut HealthModel,
        events: &mut Vec<GameEvent>,
    ) {
        self.notification.set_text(&remaining.to_string());
        if remaining == 0 {
            self.notification.set_text("");
            self.countdown = None;
            self.begin_run(health, events);
        }
    }

    /// Transition to Running, unless the current condition is critical,
    /// in which case the start is refused and the controller returns to
    /// Idle without raising the started event.
    fn begin_run(&mut self, health: &mut HealthModel, events: &mut Vec<GameEvent>) {
        self.start_button.hide();
        if self.condition == PulseCondition::Critical {
            log::info!("critical pulse condition; request to start the game rejected");
            self.start_button.show();
            self.phase = GamePhase::Idle;
            return;
        }

        log::info!("the game has started");
        health.set_hp(self.hp_count, events);
        self.score = 0;
        self.score_bar.set_value(0.0);
        self.phase = GamePhase::Running;
        events.push(GameEvent::GameStarted);
    }

    /// Record a condition change and broadcast the mapped tier.
    pub fn on_condition_changed(&mut self, condition: PulseCondition, events: &mut Vec<GameEvent>) {
        self.condition = condition;
        self.speed = map_condition_to_speed(condition);
        events.push(GameEvent::SpeedChanged { speed: self.speed });
    }

    /// End the running game.
    pub fn end_game(&mut self, events: &mut Vec<GameEvent>) {
        if self.phase != GamePhase::Running {
            return;
        }
        log::info!("the game is over");
        self.phase = GamePhase::Ended;
        events.push(GameEvent::GameEnded);
        self.start_button.show();
    }

    pub fn add_score(&mut self, points: i32) {
        self.score += points;
        self.score_bar.add_value(points as f32);
    }

    /// Cancel any pending countdown. Used on shutdown.
    pub fn cancel_timers(&self) {
        self.timer_token.cancel();
    }
}
