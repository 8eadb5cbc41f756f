//! Focus router: one slot naming the field that receives external input.
//!
//! A form field that wants values from a shared input source (keypad, clicked
//! price, remote control) registers an update function when it gains focus.
//! The input source calls `dispatch` without knowing which field is listening.
//!
//! Semantics:
//! - Last writer wins: `set_active` replaces any earlier registration.
//! - No queue, no fan-out: at most one target receives each value.
//! - `dispatch` with nothing registered is a silent no-op.
//! - Each registration gets a `FocusToken`. Holders of a shared router release
//!   focus with `clear_if_owner`, which leaves other registrations alone.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type UpdateFn<V> = Arc<dyn Fn(V) + Send + Sync>;

/// Identifies one `set_active` registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusToken(u64);

/// The currently registered receiver.
struct FocusTarget<V> {
    token: FocusToken,
    field: String,
    update: UpdateFn<V>,
}

pub struct FocusRouter<V = String> {
    slot: Mutex<Option<FocusTarget<V>>>,
    issued: AtomicU64,
}

impl<V> Default for FocusRouter<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FocusRouter<V> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            issued: AtomicU64::new(0),
        }
    }

    /// Make `update` the receiver of subsequent dispatches.
    ///
    /// The returned token identifies this registration for `clear_if_owner`.
    pub fn set_active<F>(&self, field: impl Into<String>, update: F) -> FocusToken
    where
        F: Fn(V) + Send + Sync + 'static,
    {
        let field = field.into();
        let mut slot = self.lock();
        if let Some(previous) = slot.as_ref() {
            tracing::debug!(from = %previous.field, to = %field, "focus moved");
        } else {
            tracing::debug!(to = %field, "focus set");
        }
        let token = FocusToken(self.issued.fetch_add(1, Ordering::Relaxed) + 1);
        *slot = Some(FocusTarget {
            token,
            field,
            update: Arc::new(update),
        });
        token
    }

    /// Deliver `value` to the active target. Returns whether one was registered.
    ///
    /// The slot lock is released before the target runs, so a target may
    /// re-register focus from inside its update.
    pub fn dispatch(&self, value: V) -> bool {
        let target = {
            let slot = self.lock();
            slot.as_ref()
                .map(|t| (t.field.clone(), Arc::clone(&t.update)))
        };
        match target {
            Some((field, update)) => {
                tracing::debug!(field = %field, "dispatching external value");
                update(value);
                true
            }
            None => {
                tracing::trace!("dispatch with no focused field");
                false
            }
        }
    }

    /// Drop the registration, if any.
    pub fn clear(&self) {
        if let Some(previous) = self.lock().take() {
            tracing::debug!(from = %previous.field, "focus cleared");
        }
    }

    /// Drop the registration only if it is still the one `token` names.
    ///
    /// Returns whether it was removed. A registration that has since been
    /// replaced by someone else stays in place.
    pub fn clear_if_owner(&self, token: FocusToken) -> bool {
        let mut slot = self.lock();
        match slot.as_ref() {
            Some(target) if target.token == token => {
                tracing::debug!(from = %target.field, "focus released");
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Label of the field currently receiving input.
    pub fn active_field(&self) -> Option<String> {
        self.lock().as_ref().map(|t| t.field.clone())
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<FocusTarget<V>>> {
        // A panicking target never holds the lock, so the slot stays consistent
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<V> fmt::Debug for FocusRouter<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusRouter")
            .field("active_field", &self.active_field())
            .finish()
    }
}
