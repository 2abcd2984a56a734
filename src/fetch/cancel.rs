//! Cancellation primitives for in-flight loads.
//!
//! One handle/signal pair is created per pipeline run. The handle side is
//! kept by whoever may abort the load (a superseding request, a Ctrl-C
//! handler); the signal side is threaded through both asynchronous stages
//! so cancelling mid-fetch and mid-decode behave the same.

use std::sync::Arc;

use tokio::sync::watch;

/// Creates a connected cancellation handle/signal pair.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx: Arc::new(tx) }, CancelSignal { rx })
}

/// Requests cancellation of the load it was created for.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Signals cancellation. Idempotent; safe to call from any task.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Observes cancellation inside the load stages.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Resolves once cancellation has been requested.
    ///
    /// If every handle is dropped without cancelling, the load can no
    /// longer be aborted and this future stays pending.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}
