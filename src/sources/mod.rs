//! Per-store extraction adapters
//!
//! Each store family implements [`SourceAdapter`]: it knows which request to
//! issue first, how to turn a raw payload into a [`NormalizedStatus`], and which
//! request to issue on the next cycle. The dispatcher looks adapters up by
//! [`SourceKind`] through an [`AdapterRegistry`] instead of branching on the kind.
//!
//! # Modules
//!
//! - [`ipm`] - IPM storefront HTML (option-selector script, analytics meta fallback)
//! - [`kimdong`] - NXB Kim Dong product `.js` JSON endpoint
//! - [`tiki`] - Tiki product API

pub mod ipm;
pub mod kimdong;
pub mod tiki;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::crawler::Transport;
use crate::error::Result;
use crate::models::{NormalizedStatus, RawResponse, RequestDescriptor, SourceKind, TrackedTarget};
use crate::utils::error::ParseError;

pub use ipm::IpmAdapter;
pub use kimdong::KimDongAdapter;
pub use tiki::{TikiAdapter, TikiInventory};

/// Result of one extraction: the status to report and the next request to issue
#[derive(Debug, Clone)]
pub struct Extraction {
    pub status: NormalizedStatus,
    pub follow_up: RequestDescriptor,
}

/// Store-specific fetch and extraction capability
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Store family handled by this adapter
    fn kind(&self) -> SourceKind;

    /// First request for a freshly tracked target
    fn initial_request(&self, target: &TrackedTarget) -> std::result::Result<RequestDescriptor, ParseError>;

    /// Parse a payload into a normalized status plus the next request
    fn extract(&self, raw: &RawResponse) -> std::result::Result<Extraction, ParseError>;

    /// Fetch the first payload for `target`
    async fn initial_fetch(
        &self,
        target: &TrackedTarget,
        transport: &dyn Transport,
    ) -> Result<RawResponse> {
        let request = self.initial_request(target)?;
        Ok(transport.fetch(&request).await?)
    }
}

/// Lookup table from store family to adapter
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<SourceKind, Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Registry with every built-in adapter
    ///
    /// `user_agent` pins the User-Agent sent to the Tiki API; a random browser
    /// agent is used when absent.
    pub fn with_defaults(user_agent: Option<String>) -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(IpmAdapter::new()));
        registry.register(Arc::new(KimDongAdapter::new()));
        registry.register(Arc::new(TikiAdapter::new(user_agent)));
        registry
    }

    /// Add or replace the adapter for its kind
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    /// Adapter for `kind`
    pub fn get(&self, kind: SourceKind) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_every_kind() {
        let registry = AdapterRegistry::default();
        assert_eq!(registry.len(), SourceKind::all().len());
        for kind in SourceKind::all() {
            let adapter = registry.get(kind).expect("adapter registered");
            assert_eq!(adapter.kind(), kind);
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = AdapterRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.get(SourceKind::Tiki).is_none());
    }
}
