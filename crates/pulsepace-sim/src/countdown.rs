//! Cancellable countdown scheduler.
//!
//! A countdown fires its first tick synchronously on `start()` and then
//! one tick per elapsed period, counting down to 0. Tick values are the
//! count *after* decrement, so a countdown of `n` fires `n-1 .. 0`, and
//! callers treat 0 as the terminal tick.
//!
//! The running countdown is a handle polled from the single-threaded
//! step loop. Cancelling the token guarantees no further ticks: the
//! pending wait is abandoned without yielding.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Time measurement units for countdown periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
}

impl TimeUnit {
    /// Span of one unit in milliseconds.
    pub fn millis(self) -> u64 {
        match self {
            Self::Days => 86_400_000,
            Self::Hours => 3_600_000,
            Self::Minutes => 60_000,
            Self::Seconds => 1_000,
            Self::Milliseconds => 1,
        }
    }
}

/// Builder for a [`Countdown`].
pub struct CountdownSetup {
    token: CancelToken,
    count: i64,
    period: f64,
    unit: TimeUnit,
}

impl CountdownSetup {
    /// Number of ticks to fire.
    pub fn count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    /// Period between ticks.
    pub fn period(mut self, period: f64, unit: TimeUnit) -> Self {
        self.period = period;
        self.unit = unit;
        self
    }

    /// Fire the first tick synchronously and return the running handle
    /// together with that tick's value.
    pub fn start(self) -> (Countdown, i64) {
        let mut countdown = Countdown {
            remaining: self.count,
            period_secs: self.period * self.unit.millis() as f64 / 1000.0,
            elapsed_secs: 0.0,
            token: self.token,
        };
        let first = countdown.fire();
        (countdown, first)
    }
}

/// A started countdown, polled once per step.
pub struct Countdown {
    remaining: i64,
    period_secs: f64,
    elapsed_secs: f64,
    token: CancelToken,
}

impl Countdown {
    /// Begin configuring a countdown bound to a cancellation token.
    pub fn setup(token: CancelToken) -> CountdownSetup {
        CountdownSetup {
            token,
            count: 0,
            period: 1.0,
            unit: TimeUnit::Seconds,
        }
    }

    /// Advance by `dt` seconds; yields the tick value when a period
    /// elapses. Yields nothing once finished or cancelled.
    pub fn step(&mut self, dt: f32) -> Option<i64> {
        if self.is_finished() {
            return None;
        }
        self.elapsed_secs += f64::from(dt);
        if self.elapsed_secs >= self.period_secs {
            self.elapsed_secs -= self.period_secs;
            return Some(self.fire());
        }
        None
    }

    /// True once the terminal tick fired or the token was cancelled.
    pub fn is_finished(&self) -> bool {
        self.remaining <= 0 || self.token.is_cancelled()
    }

    fn fire(&mut self) -> i64 {
        self.remaining -= 1;
        self.remaining
    }
}
