//! Shared handle to the underlying content object.
//!
//! `ContentCell` wraps the content in an `Arc<Mutex<..>>` so the caller can
//! keep observing it while the store stages edits. Only `execute` replaces
//! the value; the buffer never writes through before commit.

use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable handle to the underlying content object.
///
/// Clones share the same content; the store and the caller observe the same
/// value at all times.
#[derive(Clone)]
pub struct ContentCell(Arc<Mutex<Value>>);

impl ContentCell {
    /// Create a new cell with the given content.
    pub fn new(value: Value) -> Self {
        Self(Arc::new(Mutex::new(value)))
    }

    /// Acquire a read lock on the content.
    ///
    /// The returned guard dereferences to `&Value`. Callers should clone
    /// any needed data before dropping the guard.
    #[inline]
    pub fn get(&self) -> MutexGuard<'_, Value> {
        self.0.lock().unwrap()
    }

    /// Clone the current content value.
    pub fn snapshot(&self) -> Value {
        self.get().clone()
    }

    /// Replace the content with a new value.
    pub fn replace(&self, value: Value) {
        *self.get() = value;
    }
}

impl Default for ContentCell {
    fn default() -> Self {
        Self::new(Value::Object(Default::default()))
    }
}

impl std::fmt::Debug for ContentCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ContentCell").field(&"<Value>").finish()
    }
}
