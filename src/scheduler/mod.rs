//! Delayed-event scheduling
//!
//! A single-threaded, cooperative, priority-ordered event queue. Pollers enqueue
//! their own successor events from inside a running action, so each tracked
//! product keeps an independent cadence with at most one pending event.
//!
//! # Ordering
//!
//! Events fire by due time, then priority (lower first), then insertion order.
//!
//! # Modules
//!
//! - [`queue`] - Ordered event set and the event record
//! - [`runner`] - [`Scheduler`] handle and its run loop
//! - [`shutdown`] - External stop signal checked between cycles
//! - [`error`] - Scheduler-specific error types
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use stockpoll::scheduler::{shutdown_channel, Scheduler};
//!
//! # async fn example() -> stockpoll::scheduler::SchedulerResult<()> {
//! let (shutdown, signal) = shutdown_channel();
//! let scheduler = Scheduler::new(signal);
//!
//! scheduler.schedule(Duration::from_secs(5), 1, "hello", move || async move {
//!     println!("fired");
//!     shutdown.trigger();
//!     Ok(())
//! });
//!
//! scheduler.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod queue;
pub mod runner;
pub mod shutdown;

pub use error::{SchedulerError, SchedulerResult};
pub use queue::{Action, ActionFuture, EventQueue, ScheduledEvent};
pub use runner::Scheduler;
pub use shutdown::{shutdown_channel, Shutdown, ShutdownSignal};
