//! Target dispatch and the self-rescheduling poll cycle
//!
//! Every tracked target owns exactly one pending scheduler event. When that
//! event fires it:
//! - obtains the payload (carried in the event, or fetched now after a failure)
//! - extracts a [`NormalizedStatus`](crate::models::NormalizedStatus) and reports it
//! - fetches the follow-up request for the next cycle
//! - enqueues its own successor at `now + interval`, unless shutdown was requested
//!
//! Failures are isolated per target by default: the error is logged and the
//! chain continues. With `fail_fast` the error unwinds the scheduler instead.

use std::sync::Arc;
use std::time::Duration;

use crate::crawler::Transport;
use crate::error::{Error, Result, StockpollErrorTrait};
use crate::models::{RawResponse, RequestDescriptor, SourceKind, TrackedTarget};
use crate::report::Reporter;
use crate::scheduler::Scheduler;
use crate::sources::{AdapterRegistry, SourceAdapter};
use crate::utils::error::ParseError;

/// Priority shared by every poll event; ties fall back to seeding order
pub const POLL_PRIORITY: i32 = 1;

/// Everything a poll cycle needs, passed explicitly instead of shared globals
pub struct PollContext {
    pub scheduler: Scheduler,
    pub transport: Arc<dyn Transport>,
    pub reporter: Arc<dyn Reporter>,
    pub registry: AdapterRegistry,
    pub interval: Duration,
    pub fail_fast: bool,
}

/// Work carried from one cycle to the next
enum Pending {
    /// Payload already fetched
    Response(RawResponse),
    /// Payload still to be fetched when the event fires
    Request(RequestDescriptor),
}

struct CycleFailure {
    error: Error,
    retry: Pending,
}

/// Seeds tracked targets into the scheduler
#[derive(Clone)]
pub struct Dispatcher {
    ctx: Arc<PollContext>,
}

impl Dispatcher {
    pub fn new(ctx: PollContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    /// Store family for `url` by longest prefix match
    pub fn classify(url: &str) -> std::result::Result<SourceKind, ParseError> {
        crate::crawler::url::classify(url)
    }

    /// Perform the initial fetch for `target` and register its first poll event
    pub async fn seed(&self, target: &TrackedTarget) -> Result<()> {
        let adapter = self
            .ctx
            .registry
            .get(target.source)
            .ok_or_else(|| ParseError::UnsupportedSource(target.url.clone()))?;

        let pending = match adapter.initial_fetch(target, self.ctx.transport.as_ref()).await {
            Ok(raw) => Pending::Response(raw),
            Err(e) if !self.ctx.fail_fast => {
                tracing::warn!(
                    url = %target.url,
                    source = %target.source,
                    category = e.category().as_str(),
                    error = %e,
                    "Initial fetch failed, first poll will retry"
                );
                Pending::Request(adapter.initial_request(target)?)
            }
            Err(e) => return Err(e),
        };

        tracing::info!(url = %target.url, source = %target.source, "Target seeded");
        schedule_poll(
            self.ctx.clone(),
            adapter,
            target.clone(),
            pending,
            Duration::ZERO,
        );
        Ok(())
    }

    /// Seed every target in order; returns how many were seeded
    pub async fn seed_all(&self, targets: &[TrackedTarget]) -> Result<usize> {
        for target in targets {
            self.seed(target).await?;
        }
        Ok(targets.len())
    }
}

fn schedule_poll(
    ctx: Arc<PollContext>,
    adapter: Arc<dyn SourceAdapter>,
    target: TrackedTarget,
    pending: Pending,
    delay: Duration,
) {
    let label = format!("poll:{}:{}", target.source, target.url);
    let scheduler = ctx.scheduler.clone();
    scheduler.schedule(delay, POLL_PRIORITY, label, move || {
        poll(ctx, adapter, target, pending)
    });
}

async fn poll(
    ctx: Arc<PollContext>,
    adapter: Arc<dyn SourceAdapter>,
    target: TrackedTarget,
    pending: Pending,
) -> Result<()> {
    let next = match cycle(&ctx, adapter.as_ref(), pending).await {
        Ok(next) => next,
        Err(failure) if ctx.fail_fast => return Err(failure.error),
        Err(failure) => {
            tracing::warn!(
                url = %target.url,
                source = %target.source,
                category = failure.error.category().as_str(),
                recoverable = failure.error.is_recoverable(),
                error = %failure.error,
                "Poll failed, retrying next cycle"
            );
            failure.retry
        }
    };

    if ctx.scheduler.is_shutting_down() {
        tracing::info!(url = %target.url, "Shutdown requested, not rescheduling");
        return Ok(());
    }

    tracing::debug!(
        url = %target.url,
        interval_secs = ctx.interval.as_secs(),
        "Rescheduled"
    );
    let interval = ctx.interval;
    schedule_poll(ctx, adapter, target, next, interval);
    Ok(())
}

async fn cycle(
    ctx: &PollContext,
    adapter: &dyn SourceAdapter,
    pending: Pending,
) -> std::result::Result<Pending, CycleFailure> {
    let raw = match pending {
        Pending::Response(raw) => raw,
        Pending::Request(request) => match ctx.transport.fetch(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                return Err(CycleFailure {
                    error: e.into(),
                    retry: Pending::Request(request),
                })
            }
        },
    };

    let extraction = match adapter.extract(&raw) {
        Ok(extraction) => extraction,
        Err(e) => {
            return Err(CycleFailure {
                error: e.into(),
                retry: Pending::Request(raw.request),
            })
        }
    };

    ctx.reporter.report(&extraction.status);

    if ctx.scheduler.is_shutting_down() {
        return Ok(Pending::Request(extraction.follow_up));
    }

    match ctx.transport.fetch(&extraction.follow_up).await {
        Ok(next) => Ok(Pending::Response(next)),
        Err(e) => Err(CycleFailure {
            error: e.into(),
            retry: Pending::Request(extraction.follow_up),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NormalizedStatus;
    use crate::scheduler::shutdown_channel;
    use crate::utils::error::FetchError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const KIMDONG_JSON: &str = r#"{"handle":"doraemon-tap-1","available":true,"variants":[{"title":"Default","available":true,"price":2200000,"inventory_quantity":5}]}"#;

    /// Transport answering from a fixed script, recording every URL requested
    struct ScriptedTransport {
        bodies: Mutex<Vec<std::result::Result<String, u16>>>,
        requested: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(bodies: Vec<std::result::Result<&str, u16>>) -> Self {
            Self {
                bodies: Mutex::new(
                    bodies
                        .into_iter()
                        .rev()
                        .map(|b| b.map(str::to_string))
                        .collect(),
                ),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn fetch(
            &self,
            request: &RequestDescriptor,
        ) -> std::result::Result<RawResponse, FetchError> {
            self.requested.lock().unwrap().push(request.url.clone());
            let next = self.bodies.lock().unwrap().pop().unwrap_or(Ok(KIMDONG_JSON.to_string()));
            match next {
                Ok(body) => Ok(RawResponse::new(request.clone(), 200, body)),
                Err(status) => Err(FetchError::ServerError(status)),
            }
        }
    }

    #[derive(Default)]
    struct CountingReporter {
        seen: Mutex<Vec<NormalizedStatus>>,
    }

    impl Reporter for CountingReporter {
        fn report(&self, status: &NormalizedStatus) {
            self.seen.lock().unwrap().push(status.clone());
        }
    }

    fn dispatcher(
        scheduler: Scheduler,
        transport: Arc<ScriptedTransport>,
        reporter: Arc<CountingReporter>,
        fail_fast: bool,
    ) -> Dispatcher {
        Dispatcher::new(PollContext {
            scheduler,
            transport,
            reporter,
            registry: AdapterRegistry::default(),
            interval: Duration::from_secs(5),
            fail_fast,
        })
    }

    fn kimdong_target() -> TrackedTarget {
        TrackedTarget::parse("https://nxbkimdong.com.vn/products/doraemon-tap-1").unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            Dispatcher::classify("https://tiki.vn/x-p1.html").unwrap(),
            SourceKind::Tiki
        );
        assert!(Dispatcher::classify("https://example.com/products/x").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_seed_registers_one_event() {
        let scheduler = Scheduler::without_shutdown();
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let reporter = Arc::new(CountingReporter::default());
        let d = dispatcher(scheduler.clone(), transport.clone(), reporter, false);

        d.seed(&kimdong_target()).await.unwrap();

        assert_eq!(scheduler.len(), 1);
        assert_eq!(
            transport.requested(),
            vec!["https://nxbkimdong.com.vn/products/doraemon-tap-1.js".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_payload_is_isolated_and_retried() {
        let (shutdown, signal) = shutdown_channel();
        let scheduler = Scheduler::new(signal);
        let transport = Arc::new(ScriptedTransport::new(vec![Ok("<html>oops</html>")]));
        let reporter = Arc::new(CountingReporter::default());
        let d = dispatcher(scheduler.clone(), transport.clone(), reporter.clone(), false);

        d.seed(&kimdong_target()).await.unwrap();

        let runner = scheduler.clone();
        let handle = tokio::spawn(async move { runner.run().await });
        tokio::time::sleep(Duration::from_secs(6)).await;
        shutdown.trigger();
        handle.await.unwrap().unwrap();

        // First cycle failed to extract, second cycle re-fetched and reported
        assert_eq!(reporter.seen.lock().unwrap().len(), 1);
        let requested = transport.requested();
        assert_eq!(requested[0], requested[1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_fast_unwinds_scheduler() {
        let scheduler = Scheduler::without_shutdown();
        let transport = Arc::new(ScriptedTransport::new(vec![Ok("<html>oops</html>")]));
        let reporter = Arc::new(CountingReporter::default());
        let d = dispatcher(scheduler.clone(), transport, reporter.clone(), true);

        d.seed(&kimdong_target()).await.unwrap();
        let err = scheduler.run().await.unwrap_err();

        assert!(err.to_string().contains("poll:kimdong:"));
        assert!(reporter.seen.lock().unwrap().is_empty());
        assert!(scheduler.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_seed_fetch_is_retried_by_first_poll() {
        let (shutdown, signal) = shutdown_channel();
        let scheduler = Scheduler::new(signal);
        let transport = Arc::new(ScriptedTransport::new(vec![Err(503)]));
        let reporter = Arc::new(CountingReporter::default());
        let d = dispatcher(scheduler.clone(), transport.clone(), reporter.clone(), false);

        d.seed(&kimdong_target()).await.unwrap();
        assert_eq!(scheduler.len(), 1);

        let runner = scheduler.clone();
        let handle = tokio::spawn(async move { runner.run().await });
        tokio::time::sleep(Duration::from_secs(1)).await;
        shutdown.trigger();
        handle.await.unwrap().unwrap();

        assert_eq!(reporter.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_fast_seed_error_propagates() {
        let scheduler = Scheduler::without_shutdown();
        let transport = Arc::new(ScriptedTransport::new(vec![Err(500)]));
        let reporter = Arc::new(CountingReporter::default());
        let d = dispatcher(scheduler.clone(), transport, reporter, true);

        assert!(d.seed(&kimdong_target()).await.is_err());
        assert!(scheduler.is_empty());
    }
}
