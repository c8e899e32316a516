//! Cooperative shutdown signal
//!
//! The poller has no per-target unsubscribe; a [`Shutdown`] stops the whole
//! scheduler between cycles instead of killing the process.

use std::sync::Arc;
use tokio::sync::watch;

/// Trigger side of the shutdown channel
#[derive(Debug, Clone)]
pub struct Shutdown {
    sender: Arc<watch::Sender<bool>>,
}

/// Observer side of the shutdown channel
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

/// Create a linked trigger/observer pair
pub fn shutdown_channel() -> (Shutdown, ShutdownSignal) {
    let (sender, receiver) = watch::channel(false);
    (
        Shutdown {
            sender: Arc::new(sender),
        },
        ShutdownSignal { receiver },
    )
}

impl Shutdown {
    /// Request shutdown; idempotent
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    /// Create another observer
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.sender.subscribe(),
        }
    }
}

impl ShutdownSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        let (_sender, receiver) = watch::channel(false);
        Self { receiver }
    }

    /// Check whether shutdown was requested
    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Wait until shutdown is requested.
    ///
    /// Pends forever if every [`Shutdown`] handle was dropped untriggered.
    pub async fn triggered(&mut self) {
        while !*self.receiver.borrow_and_update() {
            if self.receiver.changed().await.is_err() {
                futures::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_trigger_is_visible() {
        let (shutdown, signal) = shutdown_channel();
        assert!(!signal.is_triggered());
        shutdown.trigger();
        assert!(signal.is_triggered());
        assert!(shutdown.signal().is_triggered());
    }

    #[tokio::test]
    async fn test_triggered_wakes_waiter() {
        let (shutdown, mut signal) = shutdown_channel();
        let waiter = tokio::spawn(async move { signal.triggered().await });
        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_does_not_fire() {
        let mut signal = ShutdownSignal::never();
        assert!(!signal.is_triggered());
        let waited = tokio::time::timeout(Duration::from_secs(5), signal.triggered()).await;
        assert!(waited.is_err());
    }
}
