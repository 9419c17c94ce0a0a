//! Event hand-off from the reader driver to the kiosk.
//!
//! Reader drivers call back on their own thread, often with a short
//! deadline before the next USB poll. [`EventSink::emit`] never blocks: it
//! uses `try_send` on a bounded Tokio channel. If the kiosk has fallen far
//! enough behind to fill the buffer, the event is dropped and logged. A
//! kiosk serves one card at a time; a backlog of stale taps is worse than
//! losing one.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::ReaderEvent;

/// Receiving half of the reader event channel, owned by the user manager.
pub type EventReceiver = mpsc::Receiver<ReaderEvent>;

/// Creates a reader event channel holding up to `buffer` undelivered
/// events.
///
/// # Panics
/// Panics if `buffer` is 0 (a Tokio channel requirement).
pub fn event_channel(buffer: usize) -> (EventSink, EventReceiver) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSink { tx }, rx)
}

/// Sending half of the reader event channel.
///
/// Cheap to clone and safe to use from any thread, including threads that
/// are not part of a Tokio runtime.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<ReaderEvent>,
}

impl EventSink {
    /// Hands an event to the kiosk without blocking.
    ///
    /// Returns `false` if the event was dropped (buffer full, or the kiosk
    /// has shut down).
    pub fn emit(&self, event: ReaderEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(%event, "reader event dropped: kiosk is behind");
                false
            }
            Err(TrySendError::Closed(event)) => {
                tracing::debug!(%event, "reader event dropped: kiosk stopped");
                false
            }
        }
    }

    /// Returns `true` once the receiving side is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
