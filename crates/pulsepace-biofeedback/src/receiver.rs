//! Signal source: polls a biofeedback device (or a synthetic placeholder)
//! for heart-rate readings and derives a windowed rate-of-change metric.
//!
//! Device responses and connection changes arrive out-of-band through
//! mailboxes and are merged at the top of each step; the raw transport
//! itself is external and only reachable through [`RequestSink`].

use pulsepace_core::config::SignalSettings;
use pulsepace_core::constants::{PULSE_NOT_RECEIVED, PULSE_PREFIX, PULSE_REQUEST_MESSAGE};
use pulsepace_core::events::GameEvent;

use crate::mailbox::Mailbox;

/// Outgoing side of the device transport.
pub trait RequestSink: Send {
    fn send(&mut self, message: &str);
}

/// Discards outgoing requests. Used in placeholder mode and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRequestSink;

impl RequestSink for NullRequestSink {
    fn send(&mut self, _message: &str) {}
}

/// Endpoints wiring the signal source to a device transport.
pub struct DeviceLink {
    /// Latest response line from the device.
    pub lines: Mailbox<String>,
    /// Latest connection-state change.
    pub connection: Mailbox<bool>,
    /// Outgoing request channel.
    pub request: Box<dyn RequestSink>,
}

impl Default for DeviceLink {
    fn default() -> Self {
        Self {
            lines: Mailbox::new(),
            connection: Mailbox::new(),
            request: Box::new(NullRequestSink),
        }
    }
}

/// Polled heart-rate source with placeholder fallback.
pub struct SignalSource {
    settings: SignalSettings,
    link: DeviceLink,
    connected: bool,
    time_since_last_poll: f32,
    current_cycle: u32,
    /// Value at the start of the current metric window.
    first_period_pulse: i32,
    last_pulse: i32,
    last_acceleration: f32,
}

impl SignalSource {
    pub fn new(settings: SignalSettings, link: DeviceLink) -> Self {
        Self {
            settings,
            link,
            connected: false,
            time_since_last_poll: 0.0,
            current_cycle: 0,
            first_period_pulse: 0,
            last_pulse: 0,
            last_acceleration: 0.0,
        }
    }

    /// Source with no transport attached (placeholder mode, tests).
    pub fn with_null_link(settings: SignalSettings) -> Self {
        Self::new(settings, DeviceLink::default())
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn is_placeholder(&self) -> bool {
        self.settings.use_placeholder
    }

    /// Last received reading (-1 while disconnected).
    pub fn last_pulse(&self) -> i32 {
        self.last_pulse
    }

    /// Last computed rate-of-change metric.
    pub fn last_acceleration(&self) -> f32 {
        self.last_acceleration
    }

    /// One step of the fixed game loop: merge out-of-band callbacks, then
    /// poll once the polling interval has elapsed.
    pub fn step(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        if let Some(connected) = self.link.connection.take() {
            self.set_connection(connected, events);
        }
        if let Some(line) = self.link.lines.take() {
            self.process_device_line(&line, events);
        }

        self.time_since_last_poll += dt;
        if self.time_since_last_poll > self.settings.polling_rate_secs {
            if self.settings.use_placeholder {
                self.poll_placeholder(events);
            } else {
                self.send_request(events);
            }
            self.time_since_last_poll = 0.0;
        }
    }

    fn set_connection(&mut self, connected: bool, events: &mut Vec<GameEvent>) {
        self.connected = connected;
        if connected {
            log::debug!("biofeedback device connection established");
            self.send_request(events);
        } else {
            log::debug!("biofeedback device connection attempt failed or disconnect detected");
        }
    }

    /// Send one request token. While disconnected this first surfaces the
    /// sentinel reading, but the request still goes out every cycle so a
    /// reconnected device answers without waiting for a state change.
    fn send_request(&mut self, events: &mut Vec<GameEvent>) {
        if !self.connected {
            self.last_pulse = PULSE_NOT_RECEIVED;
            events.push(GameEvent::PulseReceived {
                value: PULSE_NOT_RECEIVED,
            });
            log::error!(
                "failed to retrieve data from the device; reading set to {PULSE_NOT_RECEIVED}"
            );
        }
        self.link.request.send(PULSE_REQUEST_MESSAGE);
        log::trace!("sent device request: {PULSE_REQUEST_MESSAGE}");
    }

    fn poll_placeholder(&mut self, events: &mut Vec<GameEvent>) {
        // Run the synthetic value through the same parse path as a real
        // response, so the configured offset applies to it as well.
        let line = format!("{PULSE_PREFIX}{}", self.settings.placeholder_pulse);
        self.parse_pulse_line(&line, events);

        self.current_cycle += 1;
        if self.current_cycle >= self.settings.recalculating_cycle_period {
            self.current_cycle = 0;
            self.last_acceleration = self.settings.placeholder_acceleration;
            events.push(GameEvent::AccelerationCalculated {
                rate: self.settings.placeholder_acceleration,
            });
        }
    }

    fn process_device_line(&mut self, line: &str, events: &mut Vec<GameEvent>) {
        log::trace!("device returned message: {line}");
        let pulse = self.parse_pulse_line(line, events);
        self.advance_metric_cycle(pulse, events);
    }

    /// Parse a `pulse=<n>` line. A malformed line contributes a zero
    /// reading without raising the value event.
    fn parse_pulse_line(&mut self, line: &str, events: &mut Vec<GameEvent>) -> i32 {
        if let Some(number) = line
            .strip_prefix(PULSE_PREFIX)
            .and_then(|rest| rest.trim().parse::<i32>().ok())
        {
            let value = number + self.settings.pulse_offset;
            self.last_pulse = value;
            events.push(GameEvent::PulseReceived { value });
            value
        } else {
            0
        }
    }

    /// Advance the derived-metric window by one processed reading.
    fn advance_metric_cycle(&mut self, pulse: i32, events: &mut Vec<GameEvent>) {
        self.current_cycle += 1;
        if self.current_cycle >= self.settings.recalculating_cycle_period {
            self.current_cycle = 0;
            let range = pulse - self.first_period_pulse;
            let rate = range as f32
                / (self.settings.polling_rate_secs * self.settings.recalculating_cycle_period as f32);
            log::debug!(
                "acceleration recalculated: {rate} = {range}/({}*{})",
                self.settings.polling_rate_secs,
                self.settings.recalculating_cycle_period
            );
            self.last_acceleration = rate;
            events.push(GameEvent::AccelerationCalculated { rate });
            self.first_period_pulse = pulse;
        }
    }
}
