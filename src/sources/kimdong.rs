//! NXB Kim Dong adapter
//!
//! The store exposes the Haravan product record as JSON at `<product-url>.js`,
//! so every cycle requests that endpoint rather than the page the operator typed.

use crate::crawler::url::product_js_url;
use crate::models::{
    minor_to_major, NormalizedStatus, RawResponse, RequestDescriptor, SourceKind, TrackedTarget,
    Variant,
};
use crate::parser::HaravanProduct;
use crate::utils::error::ParseError;

use super::{Extraction, SourceAdapter};

const SOURCE_NAME: &str = "NXB Kim Đồng";
const PRODUCT_BASE: &str = "https://nxbkimdong.com.vn/products";

/// Adapter for `nxbkimdong.com.vn`
#[derive(Debug, Default, Clone)]
pub struct KimDongAdapter;

impl KimDongAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl SourceAdapter for KimDongAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::KimDong
    }

    fn initial_request(&self, target: &TrackedTarget) -> Result<RequestDescriptor, ParseError> {
        Ok(RequestDescriptor::get(product_js_url(&target.url)?))
    }

    fn extract(&self, raw: &RawResponse) -> Result<Extraction, ParseError> {
        let product: HaravanProduct = serde_json::from_str(&raw.body)?;
        let canonical_url = format!("{PRODUCT_BASE}/{}", product.handle);

        let variants = product
            .variants
            .iter()
            .map(|v| Variant {
                title: v.title.clone(),
                available: v.available,
                price: v.price.map(minor_to_major),
                quantity_available: v.inventory_quantity,
            })
            .collect();

        let follow_up = RequestDescriptor::get(product_js_url(&canonical_url)?);
        let status =
            NormalizedStatus::from_variants(SOURCE_NAME, canonical_url, product.handle, variants);

        Ok(Extraction { status, follow_up })
    }
}
