//! Observer notification hook.
//!
//! The store calls into a `Notifier` after every mutating operation so that
//! external observers of named keys learn a value changed. Any reactive
//! layer, observer list, or event emitter can sit behind the trait.

use std::sync::{Arc, Mutex};

/// Notification hook invoked after each mutation.
///
/// Implementations must tolerate repeated calls for the same key and must
/// not panic; the store assumes notification never fails.
pub trait Notifier: Send + Sync {
    /// Report that `key` changed on the store identified by `target`.
    fn notify(&self, target: &str, key: &str);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, target: &str, key: &str) {
        (**self).notify(target, key);
    }
}

/// Notifier that drops every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _target: &str, _key: &str) {}
}

/// Notifier that records every `(target, key)` pair it sees.
///
/// Share it with the store through an `Arc` and inspect the recorded
/// events afterwards.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded `(target, key)` pairs, in notification order.
    pub fn events(&self) -> Vec<(String, String)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Just the recorded keys, in notification order.
    pub fn keys(&self) -> Vec<String> {
        self.events
            .lock()
            .map(|e| e.iter().map(|(_, key)| key.clone()).collect())
            .unwrap_or_default()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, target: &str, key: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((target.to_owned(), key.to_owned()));
        }
    }
}
