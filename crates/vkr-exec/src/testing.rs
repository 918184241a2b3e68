//! A minimal receiver for exercising senders in tests without building a
//! full pipeline each time. Exported (not `#[cfg(test)]`-gated) so
//! downstream crates in the workspace can use it as a dev-dependency.

use std::sync::Arc;

use parking_lot::Mutex;
use vkr_env::{EmptyEnv, HasEnv};

use crate::sender::Receiver;

enum Outcome<V, E> {
    Pending,
    Value(V),
    Error(E),
    Stopped,
}

/// A clonable receiver that records whichever completion it received.
/// Clones share the recorded outcome, so one clone can be handed to
/// `connect` while the original is kept around to inspect afterward.
pub struct CellReceiver<V, E> {
    state: Arc<Mutex<Outcome<V, E>>>,
}

impl<V, E> Clone for CellReceiver<V, E> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<V, E> Default for CellReceiver<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> CellReceiver<V, E> {
    /// Builds a receiver with no recorded outcome yet.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(Outcome::Pending)),
        }
    }

    /// Takes the recorded value, if that's how the operation completed.
    pub fn take_value(&self) -> Option<V> {
        let mut guard = self.state.lock();
        match std::mem::replace(&mut *guard, Outcome::Pending) {
            Outcome::Value(v) => Some(v),
            other => {
                *guard = other;
                None
            }
        }
    }

    /// Takes the recorded error, if that's how the operation completed.
    pub fn take_error(&self) -> Option<E> {
        let mut guard = self.state.lock();
        match std::mem::replace(&mut *guard, Outcome::Pending) {
            Outcome::Error(e) => Some(e),
            other => {
                *guard = other;
                None
            }
        }
    }

    /// Did the operation complete with `set_stopped`?
    pub fn took_stopped(&self) -> bool {
        matches!(*self.state.lock(), Outcome::Stopped)
    }
}

impl<V: 'static, E: 'static> HasEnv for CellReceiver<V, E> {
    type Env = EmptyEnv;
    fn get_env(&self) -> EmptyEnv {
        EmptyEnv
    }
}

impl<V: 'static, E: 'static> Receiver for CellReceiver<V, E> {
    type Value = V;
    type Error = E;

    fn set_value(self, value: V) {
        *self.state.lock() = Outcome::Value(value);
    }

    fn set_error(self, error: E) {
        *self.state.lock() = Outcome::Error(error);
    }

    fn set_stopped(self) {
        *self.state.lock() = Outcome::Stopped;
    }
}
