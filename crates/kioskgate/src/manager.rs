//! The user manager actor.
//!
//! A single Tokio task that owns the session. It waits on two things at
//! once: the next reader event, and the validation currently in flight (if
//! any). Handling both in one task means an outcome is always applied
//! before the next card can be admitted, and tag-lost events and LED
//! updates keep flowing while the directory is slow.
//!
//! ```text
//! EventReceiver ──→ ┌──────────────┐ ──→ Reader (LED, antenna)
//!                   │ UserManager  │ ──→ NavigationRouter ──→ KioskDisplay
//! Validation   ──→  └──────────────┘ ──→ watch<KioskStatus>
//! ```

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use kioskgate_directory::Directory;
use kioskgate_reader::{EventReceiver, Reader, ReaderError, ReaderEvent};
use kioskgate_router::{KioskDisplay, NavigationRouter};
use kioskgate_session::{Admission, SessionGate, SessionState, ValidationOutcome};
use tokio::sync::{oneshot, watch};

/// What the kiosk looks like from outside, published after every event
/// and every resolved validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KioskStatus {
    pub session: SessionState,
    /// Outcome of the most recent validation.
    pub last_outcome: Option<ValidationOutcome>,
    /// Validations resolved so far.
    pub resolved: u64,
    /// Reader events handled so far.
    pub events: u64,
}

/// A validation in flight, resolving to its tag and outcome.
type PendingOutcome = BoxFuture<'static, (String, ValidationOutcome)>;

pub(crate) struct UserManager<R: Reader, D: Directory, V: KioskDisplay> {
    reader: R,
    gate: SessionGate<D>,
    router: NavigationRouter,
    display: V,
    status: watch::Sender<KioskStatus>,
    last_outcome: Option<ValidationOutcome>,
    resolved: u64,
    events: u64,
}

impl<R, D, V> UserManager<R, D, V>
where
    R: Reader,
    D: Directory,
    V: KioskDisplay,
{
    pub(crate) fn new(
        reader: R,
        gate: SessionGate<D>,
        router: NavigationRouter,
        display: V,
        status: watch::Sender<KioskStatus>,
    ) -> Self {
        Self {
            reader,
            gate,
            router,
            display,
            status,
            last_outcome: None,
            resolved: 0,
            events: 0,
        }
    }

    /// Runs until the event channel closes or `shutdown` fires (or its
    /// sender is dropped). Closes the reader on the way out.
    pub(crate) async fn run(
        mut self,
        mut events: EventReceiver,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        tracing::info!("user manager started");
        let mut pending: Option<PendingOutcome> = None;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        if let Some(validation) = self.handle_event(event) {
                            pending = Some(validation);
                        }
                    }
                    None => {
                        tracing::info!("reader event channel closed");
                        break;
                    }
                },
                (tag, outcome) = maybe_pending(&mut pending) => {
                    pending = None;
                    self.apply(&tag, outcome);
                }
                _ = &mut shutdown => {
                    tracing::info!("user manager shutting down");
                    break;
                }
            }
        }

        command("close", self.reader.close());
        tracing::info!("user manager stopped");
    }

    fn handle_event(&mut self, event: ReaderEvent) -> Option<PendingOutcome> {
        self.events += 1;
        let mut started = None;

        match event {
            ReaderEvent::Attach { serial } => {
                tracing::info!(serial, "reader attached");
            }
            ReaderEvent::Detach { serial } => {
                tracing::warn!(serial, "reader detached");
            }
            ReaderEvent::Error { code, message } => {
                tracing::error!(code, %message, "reader reported an error");
            }
            ReaderEvent::OutputChanged { index, state } => {
                tracing::debug!(index, state, "reader output changed");
            }
            ReaderEvent::TagGained(tag) => {
                tracing::info!(%tag, "tag gained");
                command("led on", self.reader.set_led_on(true));
                started = self.admit(&tag);
            }
            ReaderEvent::TagLost(tag) => {
                tracing::info!(%tag, "tag lost");
                command("led off", self.reader.set_led_on(false));
                self.gate.on_tag_lost(&tag);
            }
        }

        self.publish();
        started
    }

    fn admit(&mut self, tag: &str) -> Option<PendingOutcome> {
        match self.gate.on_tag_gained(tag) {
            Admission::Start(validation) => {
                let tag = tag.to_owned();
                Some(async move { (tag, validation.run().await) }.boxed())
            }
            Admission::Busy => {
                tracing::debug!(%tag, "card dropped, validation in flight");
                None
            }
            Admission::AlreadySignedOn => None,
        }
    }

    fn apply(&mut self, tag: &str, outcome: ValidationOutcome) {
        self.resolved += 1;
        self.last_outcome = Some(outcome.clone());

        match self.gate.resolve(tag, outcome) {
            Some(employee) => {
                self.router.navigate(employee, &self.display);
            }
            None => {
                // The card was rejected: keep the field live for the next one.
                command("antenna on", self.reader.set_antenna_on(true));
            }
        }

        self.publish();
    }

    fn publish(&self) {
        self.status.send_replace(KioskStatus {
            session: self.gate.state(),
            last_outcome: self.last_outcome.clone(),
            resolved: self.resolved,
            events: self.events,
        });
    }
}

/// Resolves with the pending validation, or never if there is none.
async fn maybe_pending(pending: &mut Option<PendingOutcome>) -> (String, ValidationOutcome) {
    match pending {
        Some(validation) => validation.await,
        None => std::future::pending().await,
    }
}

/// Reader commands are best effort once the kiosk is running.
fn command(name: &'static str, result: Result<(), ReaderError>) {
    if let Err(error) = result {
        tracing::error!(command = name, %error, "reader command failed");
    }
}
