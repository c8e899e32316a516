//! Common test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use stockpoll::crawler::Transport;
use stockpoll::dispatch::{Dispatcher, PollContext};
use stockpoll::models::NormalizedStatus;
use stockpoll::report::Reporter;
use stockpoll::scheduler::{Scheduler, Shutdown};
use stockpoll::sources::AdapterRegistry;

/// IPM product page carrying the option-selector script
pub const IPM_RICH_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <link rel="canonical" href="https://ipm.vn/products/horimiya-tap-8" />
  <script>
    jQuery(function($) {
      new Haravan.OptionSelectors('product-select', { product: {"available":true,"handle":"horimiya-tap-8","variants":[{"title":"Default","available":true,"price":15000000,"inventory_quantity":3}]},
        onVariantSelected: selectCallback,
        enableHistoryState: true
      });
    });
  </script>
</head>
<body><h1>Horimiya - Tập 8</h1></body>
</html>"#;

/// IPM product page with only the analytics meta blob
pub const IPM_PARTIAL_PAGE: &str = r#"<html><head>
<script>
var meta = {"page":{"pageType":"product"},"product":{"title":"Horimiya - Tập 8","available":true,"price":4500000,"handle":"horimiya-tap-8"}};
for (var attr in meta) { window.HaravanAnalytics.meta[attr] = meta[attr]; }
</script>
</head><body></body></html>"#;

/// Kim Dong product `.js` payload for `handle`
pub fn kimdong_json(handle: &str, available: bool, price_minor: u64) -> String {
    format!(
        r#"{{"id":1,"title":"{handle}","handle":"{handle}","available":{available},"variants":[{{"id":11,"title":"Default Title","available":{available},"price":{price_minor},"inventory_quantity":8}}]}}"#
    )
}

/// Tiki product API payload
pub fn tiki_json(inventory_type: &str, price: u64) -> String {
    format!(
        r#"{{"id":123456,"name":"Horimiya - Tập 8","url_path":"horimiya-tap-8-p123456.html?spid=789","url_key":"horimiya-tap-8","price":{price},"inventory_type":"{inventory_type}"}}"#
    )
}

/// Reporter that keeps every status, optionally triggering shutdown after `limit` reports
#[derive(Default)]
pub struct CollectingReporter {
    seen: Mutex<Vec<NormalizedStatus>>,
    stop: Option<(usize, Shutdown)>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stopping_after(limit: usize, shutdown: Shutdown) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            stop: Some((limit, shutdown)),
        }
    }

    pub fn statuses(&self) -> Vec<NormalizedStatus> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, status: &NormalizedStatus) {
        let mut seen = self.seen.lock().unwrap();
        seen.push(status.clone());
        if let Some((limit, shutdown)) = &self.stop {
            if seen.len() >= *limit {
                shutdown.trigger();
            }
        }
    }
}

/// Dispatcher over `transport` with the built-in adapters
pub fn dispatcher(
    scheduler: &Scheduler,
    transport: Arc<dyn Transport>,
    reporter: Arc<CollectingReporter>,
    interval: Duration,
    fail_fast: bool,
) -> Dispatcher {
    Dispatcher::new(PollContext {
        scheduler: scheduler.clone(),
        transport,
        reporter,
        registry: AdapterRegistry::with_defaults(Some("Mozilla/5.0 (stockpoll test)".to_string())),
        interval,
        fail_fast,
    })
}
