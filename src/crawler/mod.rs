//! Outbound fetching
//!
//! This module holds the transport the poller uses to reach the stores and
//! the URL logic that decides what to fetch for each of them.

pub mod fetcher;
pub mod headers;
pub mod url;

pub use fetcher::{HttpFetcher, Transport};
