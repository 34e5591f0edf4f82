//! Deferred, per-thread channel for codec error messages.
//!
//! The codec reports failures through one global callback that carries no
//! link to the call that triggered it. The callback runs on whichever thread
//! is executing the codec call, so the message is parked in a thread-local
//! slot and drained by that same thread once the call has returned.
//!
//! ```text
//! codec call ──► callback ──► record()      (overwrites, never queues)
//!      │
//!      ▼ returns null/false
//! raise_pending() ──► Error::Codec(message)  (read-and-clear)
//! ```
//!
//! A successful top-level operation calls [`clear`] so a message left over
//! from an earlier, already handled failure is never attributed to a later
//! one.

use std::cell::RefCell;

use crate::codec::Format;
use crate::error::Error;

thread_local! {
    static PENDING: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Store `message` for the calling thread, replacing any unread message.
pub(crate) fn record(message: impl Into<String>) {
    let message = message.into();
    log::warn!("codec reported: {message}");
    PENDING.with(|slot| *slot.borrow_mut() = Some(message));
}

/// Entry point registered as the codec's error callback.
pub(crate) fn record_from_codec(format: Option<Format>, message: &str) {
    match format {
        Some(format) => record(format!("{format}: {message}")),
        None => record(message),
    }
}

/// Drop any pending message for the calling thread.
pub fn clear() {
    PENDING.with(|slot| slot.borrow_mut().take());
}

/// Read and clear the calling thread's pending message.
pub fn take() -> Option<String> {
    PENDING.with(|slot| slot.borrow_mut().take())
}

/// Whether the calling thread has an unread message.
pub fn has_pending() -> bool {
    PENDING.with(|slot| slot.borrow().is_some())
}

/// Drain the pending message into an [`Error::Codec`].
///
/// Only call this once nothing the codec allocated for the failed call is
/// still outstanding.
pub fn raise_pending() -> Error {
    Error::Codec(take())
}
