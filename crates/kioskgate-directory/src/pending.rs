//! In-flight lookups and their single completion.
//!
//! A lookup has three ways to finish: the server answered, the server could
//! not be reached, or the server answered with something unusable. Exactly
//! one of them is delivered, and the types make that structural:
//!
//! - [`LookupCompleter::complete`] takes `self`, so a completer can only
//!   fire once.
//! - [`PendingLookup::wait`] takes `self`, so a lookup can only be awaited
//!   once.
//!
//! The pair is a `tokio::sync::oneshot` channel with a little bookkeeping:
//! if the lookup runs in a spawned task, dropping the [`PendingLookup`]
//! aborts that task. A caller that times out does not leave a request
//! running behind its back.

use std::future::Future;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::DirectoryResponse;

/// How a lookup finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupCompletion {
    /// The directory answered with a well-formed payload. The payload may
    /// still contain zero or several records; that is for the caller to
    /// judge.
    Success(DirectoryResponse),

    /// The request never got a usable HTTP response (DNS, refused
    /// connection, reset, client-side timeout).
    TransportError(String),

    /// The directory answered, but not with something we can trust: a
    /// non-2xx status, a body that is not JSON, missing fields, or results
    /// that disagree with the count.
    ProtocolFailure(String),
}

/// The sending half of a lookup. Fires exactly once.
#[derive(Debug)]
pub struct LookupCompleter {
    tx: oneshot::Sender<LookupCompletion>,
}

impl LookupCompleter {
    /// Delivers the completion.
    ///
    /// If the waiting side has already given up (timed out, or was dropped),
    /// the completion is discarded.
    pub fn complete(self, completion: LookupCompletion) {
        if self.tx.send(completion).is_err() {
            tracing::debug!("lookup completed after the caller stopped waiting");
        }
    }
}

/// A lookup that has been issued but not yet resolved.
///
/// Created by a [`Directory`](crate::Directory) implementation and consumed
/// by [`wait`](Self::wait).
#[derive(Debug)]
pub struct PendingLookup {
    rx: oneshot::Receiver<LookupCompletion>,
    /// The task performing the request, if the lookup owns one.
    task: Option<JoinHandle<()>>,
}

impl PendingLookup {
    /// Creates an unresolved lookup and the completer that resolves it.
    ///
    /// Useful for directories that complete lookups from somewhere other
    /// than a spawned future, and for tests that want to decide when (or
    /// whether) a lookup finishes.
    pub fn channel() -> (LookupCompleter, PendingLookup) {
        let (tx, rx) = oneshot::channel();
        (LookupCompleter { tx }, PendingLookup { rx, task: None })
    }

    /// Runs `request` on the Tokio runtime and resolves with its output.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(request: F) -> Self
    where
        F: Future<Output = LookupCompletion> + Send + 'static,
    {
        let (completer, mut pending) = Self::channel();
        pending.task = Some(tokio::spawn(async move {
            completer.complete(request.await);
        }));
        pending
    }

    /// A lookup that is already resolved.
    pub fn ready(completion: LookupCompletion) -> Self {
        let (completer, pending) = Self::channel();
        completer.complete(completion);
        pending
    }

    /// Waits for the completion.
    ///
    /// This future does not time out on its own; wrap it in
    /// `tokio::time::timeout` to bound the wait.
    ///
    /// If the completer is dropped without firing (for example the request
    /// task panicked), the lookup resolves as a transport error so that the
    /// caller still sees exactly one completion.
    pub async fn wait(mut self) -> LookupCompletion {
        match (&mut self.rx).await {
            Ok(completion) => completion,
            Err(_) => LookupCompletion::TransportError(
                "lookup abandoned before completion".into(),
            ),
        }
    }
}

impl Drop for PendingLookup {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            // No-op when the request already finished.
            task.abort();
        }
    }
}
