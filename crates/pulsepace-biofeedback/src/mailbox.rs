//! Latest-value-wins handoff between a transport callback thread and the
//! game-loop thread.
//!
//! Device callbacks may arrive at arbitrary times; they must never mutate
//! game state directly. A `Mailbox` is a single slot: the producer
//! replaces whatever is there, the consumer drains it once per step.

use std::sync::{Arc, Mutex};

/// A cloneable single-slot mailbox. Clones share the slot.
#[derive(Debug)]
pub struct Mailbox<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Store a value, replacing any unconsumed one.
    pub fn post(&self, value: T) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(value);
        }
    }

    /// Remove and return the latest value, if any.
    pub fn take(&self) -> Option<T> {
        self.slot.lock().ok().and_then(|mut slot| slot.take())
    }
}
