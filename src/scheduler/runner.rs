//! Single-threaded cooperative run loop
//!
//! Actions run to completion, network I/O included, before the next due
//! event is considered. Firing is never early; it is late by however long
//! earlier actions kept the loop busy.

use futures::FutureExt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

use super::error::{SchedulerError, SchedulerResult};
use super::queue::EventQueue;
use super::shutdown::ShutdownSignal;

/// Stand-in horizon for delays past the end of the clock
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

struct Shared {
    queue: Mutex<EventQueue>,
    wake: Notify,
    shutdown: ShutdownSignal,
    running: AtomicBool,
}

/// Cloneable handle to the delayed-event scheduler
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Shared>,
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Scheduler {
    /// Create a scheduler that stops when `shutdown` fires
    pub fn new(shutdown: ShutdownSignal) -> Self {
        Self {
            inner: Arc::new(Shared {
                queue: Mutex::new(EventQueue::new()),
                wake: Notify::new(),
                shutdown,
                running: AtomicBool::new(false),
            }),
        }
    }

    /// Scheduler without an external stop signal
    pub fn without_shutdown() -> Self {
        Self::new(ShutdownSignal::never())
    }

    fn queue(&self) -> MutexGuard<'_, EventQueue> {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue `action` to fire no earlier than `now + delay`.
    ///
    /// Delays that overflow the clock are clamped to a far-future instant.
    pub fn schedule<F, Fut>(
        &self,
        delay: Duration,
        priority: i32,
        label: impl Into<String>,
        action: F,
    ) -> u64
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = crate::error::Result<()>> + Send + 'static,
    {
        let now = Instant::now();
        let due = now.checked_add(delay).unwrap_or_else(|| now + FAR_FUTURE);
        self.schedule_at(due, priority, label, action)
    }

    /// Enqueue `action` to fire no earlier than `due`
    pub fn schedule_at<F, Fut>(
        &self,
        due: Instant,
        priority: i32,
        label: impl Into<String>,
        action: F,
    ) -> u64
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = crate::error::Result<()>> + Send + 'static,
    {
        let label = label.into();
        let seq = self
            .queue()
            .push(due, priority, label.clone(), Box::new(move || action().boxed()));
        tracing::trace!(label = %label, seq, priority, "Event scheduled");
        self.inner.wake.notify_one();
        seq
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.queue().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }

    /// Whether the shutdown signal has fired
    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutdown.is_triggered()
    }

    /// Run due events until shutdown is requested.
    ///
    /// An action error unwinds the loop and is returned as
    /// [`SchedulerError::ActionFailed`]; the failed event is not re-enqueued.
    pub async fn run(&self) -> SchedulerResult<()> {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.inner.running);
        let mut shutdown = self.inner.shutdown.clone();

        tracing::info!(pending = self.len(), "Scheduler started");

        loop {
            if shutdown.is_triggered() {
                tracing::info!(pending = self.len(), "Scheduler stopped by shutdown signal");
                return Ok(());
            }

            let next_due = self.queue().next_due();
            match next_due {
                None => {
                    tracing::debug!("Queue empty, idling");
                    tokio::select! {
                        _ = self.inner.wake.notified() => {}
                        _ = shutdown.triggered() => {}
                    }
                    continue;
                }
                Some(due) if due > Instant::now() => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(due) => {}
                        _ = self.inner.wake.notified() => {}
                        _ = shutdown.triggered() => {}
                    }
                    continue;
                }
                Some(_) => {}
            }

            let Some(event) = self.queue().pop_due(Instant::now()) else {
                continue;
            };

            let label = event.label.clone();
            let lateness = Instant::now().saturating_duration_since(event.due);
            tracing::debug!(
                label = %label,
                seq = event.seq,
                lateness_ms = lateness.as_millis() as u64,
                "Firing event"
            );

            if let Err(e) = event.fire().await {
                tracing::error!(label = %label, error = %e, "Event action failed, stopping scheduler");
                return Err(SchedulerError::action_failed(label, e));
            }
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.len())
            .field("running", &self.inner.running.load(Ordering::SeqCst))
            .finish()
    }
}
