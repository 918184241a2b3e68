//! Cooperative cancellation: stop tokens, stop sources, and stop callbacks.
//!
//! Stop requests here are a single `AtomicBool` shared through an `Arc`,
//! plus a list of registered callbacks guarded by a mutex: a stop request
//! flips the flag once and fires every still-registered callback inline, on
//! the thread that observed the transition.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// The cancellation capability a receiver's environment exposes.
pub trait StoppableToken: Clone + PartialEq {
    /// Has a stop already been requested?
    fn stop_requested(&self) -> bool;
    /// Can this token ever become requested?
    fn stop_possible(&self) -> bool;
}

/// A token that can never be stopped. The default `get_stop_token` result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeverStopToken;

impl StoppableToken for NeverStopToken {
    fn stop_requested(&self) -> bool {
        false
    }
    fn stop_possible(&self) -> bool {
        false
    }
}

struct Inner {
    requested: AtomicBool,
    callbacks: Mutex<Vec<(u64, Box<dyn FnOnce() + Send>)>>,
    next_id: AtomicU64,
}

/// Owns a cancellation flag; `token()` hands out cooperative observers.
pub struct StopSource {
    inner: Arc<Inner>,
}

impl fmt::Debug for StopSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopSource")
            .field("requested", &self.inner.requested.load(Ordering::Acquire))
            .finish()
    }
}

impl Default for StopSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StopSource {
    /// Creates a fresh, not-yet-requested stop source.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                requested: AtomicBool::new(false),
                callbacks: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Requests a stop. Idempotent; fires every still-registered callback
    /// on the calling thread, at most once each.
    pub fn request_stop(&self) {
        if self.inner.requested.swap(true, Ordering::AcqRel) {
            return;
        }
        let callbacks = std::mem::take(&mut *self.inner.callbacks.lock());
        for (_, cb) in callbacks {
            cb();
        }
    }

    /// Hands out a token observing this source.
    pub fn token(&self) -> StopToken {
        StopToken {
            inner: self.inner.clone(),
        }
    }
}

/// A cooperative-cancellation observer produced by a [`StopSource`].
#[derive(Clone)]
pub struct StopToken {
    inner: Arc<Inner>,
}

impl fmt::Debug for StopToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopToken")
            .field("requested", &self.stop_requested())
            .finish()
    }
}

impl PartialEq for StopToken {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl StoppableToken for StopToken {
    fn stop_requested(&self) -> bool {
        self.inner.requested.load(Ordering::Acquire)
    }

    fn stop_possible(&self) -> bool {
        true
    }
}

impl StopToken {
    /// Registers `f` to run when a stop is requested. If a stop has already
    /// been requested, `f` runs immediately, inline, on the calling thread.
    /// Dropping the returned [`StopCallback`] deregisters `f`.
    pub fn register(&self, f: impl FnOnce() + Send + 'static) -> StopCallback {
        if self.stop_requested() {
            f();
            return StopCallback {
                inner: self.inner.clone(),
                id: None,
            };
        }
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let mut callbacks = self.inner.callbacks.lock();
        // A stop may have been requested while we were waiting on the lock;
        // re-check under the lock rather than fire-and-forget outside it.
        if self.inner.requested.load(Ordering::Acquire) {
            drop(callbacks);
            f();
            return StopCallback {
                inner: self.inner.clone(),
                id: None,
            };
        }
        callbacks.push((id, Box::new(f)));
        StopCallback {
            inner: self.inner.clone(),
            id: Some(id),
        }
    }
}

/// A scoped registration handle for a stop-token callback. Deregisters the
/// callback on drop.
pub struct StopCallback {
    inner: Arc<Inner>,
    id: Option<u64>,
}

impl Drop for StopCallback {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            let mut callbacks = self.inner.callbacks.lock();
            callbacks.retain(|(cb_id, _)| *cb_id != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn never_stop_token_is_never_requested() {
        let t = NeverStopToken;
        assert!(!t.stop_requested());
        assert!(!t.stop_possible());
    }

    #[test]
    fn callback_fires_on_request() {
        let source = StopSource::new();
        let token = source.token();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired2 = fired.clone();
        let _cb = token.register(move || {
            fired2.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        source.request_stop();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        // Idempotent.
        source.request_stop();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_fires_inline_if_already_requested() {
        let source = StopSource::new();
        source.request_stop();
        let token = source.token();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired2 = fired.clone();
        let _cb = token.register(move || {
            fired2.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_callback_deregisters() {
        let source = StopSource::new();
        let token = source.token();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired2 = fired.clone();
        let cb = token.register(move || {
            fired2.fetch_add(1, Ordering::SeqCst);
        });
        drop(cb);
        source.request_stop();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn tokens_from_the_same_source_are_equal() {
        let source = StopSource::new();
        assert_eq!(source.token(), source.token());
        let other = StopSource::new();
        assert_ne!(source.token(), other.token());
    }
}
