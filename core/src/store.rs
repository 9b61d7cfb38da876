//! Owner of the current `ViewSnapshot`.
//!
//! # Design
//! The snapshot lives in a `tokio::sync::watch` channel; each transition is
//! folded in with `send_modify`, so subscribers always observe a snapshot
//! produced by `reduce` and never a half-applied one.
//!
//! `dispatch` runs the three phases of an operation: `LoadingStarted`, the
//! remote attempt, then `LoadingFinished`. The last phase runs from a drop
//! guard, so it also fires when the attempt fails, panics, or the dispatch
//! future is dropped mid-flight.
//!
//! Overlapping dispatches are not sequenced. Their loading transitions
//! interleave (the first one to finish clears `is_loading`) and the data
//! transition that resolves last wins.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::actions::{self, Action, OperationKind};
use crate::api::TodoApi;
use crate::error::ApiError;
use crate::state::{reduce, Transition, ViewSnapshot};

/// Receives user-facing error messages. A UI shows them in a blocking dialog.
pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
}

/// Default notifier: logs the message at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

pub struct Store {
    tx: watch::Sender<ViewSnapshot>,
    notifier: Arc<dyn Notifier>,
}

impl Store {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let (tx, _rx) = watch::channel(ViewSnapshot::default());
        Self { tx, notifier }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> ViewSnapshot {
        self.tx.borrow().clone()
    }

    /// Receiver that is notified after every applied transition.
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.tx.subscribe()
    }

    pub fn apply(&self, transition: Transition) {
        tracing::trace!(?transition, "applying transition");
        self.tx.send_modify(|snapshot| *snapshot = reduce(snapshot, &transition));
    }

    /// Run `action` against `api` and fold the result into the snapshot.
    ///
    /// Failures are sent to the notifier and also returned, so the caller
    /// can branch on them; the snapshot only changes its loading flag.
    pub async fn dispatch(&self, api: &TodoApi, action: Action) -> Result<(), ApiError> {
        let kind = action.kind();
        self.run(kind, actions::perform(api, action)).await
    }

    /// Begin / attempt / end around an arbitrary attempt future.
    pub async fn run<F>(&self, kind: OperationKind, attempt: F) -> Result<(), ApiError>
    where
        F: Future<Output = Result<Transition, ApiError>>,
    {
        self.apply(Transition::LoadingStarted);
        let _end = scopeguard::guard((), |()| self.apply(Transition::LoadingFinished));

        match attempt.await {
            Ok(transition) => {
                tracing::debug!(operation = kind.as_str(), "operation succeeded");
                self.apply(transition);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(operation = kind.as_str(), "operation failed: {err}");
                self.notifier.notify_error(&err.to_string());
                Err(err)
            }
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Arc::new(TracingNotifier))
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("snapshot", &*self.tx.borrow())
            .finish()
    }
}
