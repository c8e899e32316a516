//! Tiki adapter
//!
//! Storefront URLs are mapped onto the product API, which answers with a flat
//! record: no per-variant data, no quantity, price already in VND, and an
//! `inventory_type` code describing how the item is fulfilled.

use crate::crawler::headers::with_browser_headers;
use crate::crawler::url::tiki_api_url;
use crate::models::{NormalizedStatus, RawResponse, RequestDescriptor, SourceKind, TrackedTarget};
use crate::parser::TikiProduct;
use crate::utils::error::ParseError;
use crate::utils::normalize_whitespace;

use super::{Extraction, SourceAdapter};

const SOURCE_NAME: &str = "Tiki";
const STORE_BASE: &str = "https://tiki.vn";

/// Known `inventory_type` codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TikiInventory {
    CrossBorder,
    InStock,
    Backorder,
    SellerBackorder,
    DropShip,
    Preorder,
}

impl TikiInventory {
    /// Parse an API code; `None` for codes outside the known set
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "cross-border" => Some(Self::CrossBorder),
            "instock" => Some(Self::InStock),
            "backorder" => Some(Self::Backorder),
            "seller_backorder" => Some(Self::SellerBackorder),
            "drop_ship" => Some(Self::DropShip),
            "preorder" => Some(Self::Preorder),
            _ => None,
        }
    }

    /// Human readable status line
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::CrossBorder => "In stock - shipped from abroad by Tiki Global",
            Self::InStock => "In stock - fulfilled by TIKI",
            Self::Backorder => "Backorder - TIKI will order from the supplier",
            Self::SellerBackorder => "Backorder - the seller will order from the supplier",
            Self::DropShip => "In stock - shipped by the seller",
            Self::Preorder => "Pre-order",
        }
    }

    /// Whether the item can ship now
    pub fn is_available(&self) -> bool {
        matches!(self, Self::CrossBorder | Self::InStock | Self::DropShip)
    }
}

/// Adapter for `tiki.vn`
#[derive(Debug, Default, Clone)]
pub struct TikiAdapter {
    user_agent: Option<String>,
}

impl TikiAdapter {
    /// Create the adapter; `user_agent` pins the API User-Agent
    pub fn new(user_agent: Option<String>) -> Self {
        Self { user_agent }
    }
}

impl SourceAdapter for TikiAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Tiki
    }

    fn initial_request(&self, target: &TrackedTarget) -> Result<RequestDescriptor, ParseError> {
        let api = tiki_api_url(&target.url)?;
        Ok(with_browser_headers(
            RequestDescriptor::get(api),
            self.user_agent.as_deref(),
            target.url.trim(),
        ))
    }

    fn extract(&self, raw: &RawResponse) -> Result<Extraction, ParseError> {
        let product: TikiProduct = serde_json::from_str(&raw.body)?;

        let canonical_url = match (&product.url_path, &product.url_key) {
            (Some(path), _) if !path.is_empty() => {
                format!("{STORE_BASE}/{}", path.trim_start_matches('/'))
            }
            (_, Some(key)) if !key.is_empty() => format!("{STORE_BASE}/{key}.html"),
            _ => raw
                .request
                .header("referer")
                .unwrap_or(raw.request.url.as_str())
                .to_string(),
        };

        let inventory = TikiInventory::parse(&product.inventory_type);
        if inventory.is_none() {
            tracing::warn!(
                inventory_type = %product.inventory_type,
                url = %canonical_url,
                "Unrecognized Tiki inventory type, no status line"
            );
        }

        let available = inventory.is_some_and(|i| i.is_available());
        let status = NormalizedStatus::single(
            SOURCE_NAME,
            canonical_url,
            normalize_whitespace(&product.name),
            available,
            product.price,
        )
        .with_status_text(inventory.map(|i| i.phrase().to_string()));

        Ok(Extraction {
            status,
            follow_up: raw.request.clone(),
        })
    }
}
