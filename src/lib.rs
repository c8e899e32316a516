//! stockpoll - Recurring product availability poller
//!
//! Periodically re-fetches a fixed set of bookstore product pages, extracts
//! availability, price and quantity from each store's payload format, and
//! reports a normalized record per poll.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - HTTP transport, URL classification and request headers
//! - [`parser`] - Embedded JSON slicing and payload record types
//! - [`sources`] - Per-store extraction adapters
//! - [`dispatch`] - Target seeding and the self-rescheduling poll cycle
//! - [`scheduler`] - Single-threaded delayed-event scheduler
//! - [`report`] - Reporting sink for normalized statuses
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stockpoll::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let (_shutdown, signal) = shutdown_channel();
//!     let scheduler = Scheduler::new(signal);
//!     let dispatcher = Dispatcher::new(PollContext {
//!         scheduler: scheduler.clone(),
//!         transport: Arc::new(HttpFetcher::new()?),
//!         reporter: Arc::new(ConsoleReporter::new()),
//!         registry: AdapterRegistry::default(),
//!         interval: std::time::Duration::from_secs(60),
//!         fail_fast: false,
//!     });
//!
//!     let target = TrackedTarget::parse("https://ipm.vn/products/horimiya-tap-8")?;
//!     dispatcher.seed(&target).await?;
//!     scheduler.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod parser;
pub mod report;
pub mod scheduler;
pub mod sources;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{HttpFetcher, Transport};
    pub use crate::dispatch::{Dispatcher, PollContext};
    pub use crate::error::{Error, ErrorCategory, Result, StockpollErrorTrait};
    pub use crate::models::{NormalizedStatus, SourceKind, TrackedTarget, Variant};
    pub use crate::report::{ConsoleReporter, Reporter};
    pub use crate::scheduler::{shutdown_channel, Scheduler, Shutdown, ShutdownSignal};
    pub use crate::sources::{AdapterRegistry, SourceAdapter};
}

// Direct re-exports for convenience
pub use models::{NormalizedStatus, SourceKind, TrackedTarget, Variant};
