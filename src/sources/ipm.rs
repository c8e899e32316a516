//! IPM storefront adapter
//!
//! IPM product pages are Haravan HTML. The option-selector script carries the
//! full product with per-variant stock; when it is missing, the analytics meta
//! blob still carries a single top-level availability flag.

use crate::models::{
    minor_to_major, NormalizedStatus, RawResponse, RequestDescriptor, SourceKind, TrackedTarget,
    Variant,
};
use crate::parser::{
    canonical_link, find_script_block, parse_leading_json, slice_embedded_json, HaravanMeta,
    HaravanProduct,
};
use crate::utils::error::ParseError;
use crate::utils::normalize_whitespace;

use super::{Extraction, SourceAdapter};

/// Script marker identifying the option-selector block
pub const RICH_MARKER: &str = "Haravan.OptionSelectors";
/// Start of the product object inside the option-selector call
pub const RICH_START: &str = "{\"available\":";
/// Token following the product object in the option-selector call
pub const RICH_END: &str = "onVariantSelected";
/// Start of the analytics meta object
pub const PARTIAL_START: &str = "{\"page\"";
/// Statement following the analytics meta object
pub const PARTIAL_END: &str = "for (var attr in meta)";

const SOURCE_NAME: &str = "IPM";
const PRODUCT_BASE: &str = "https://ipm.vn/products";

/// Adapter for `ipm.vn`
#[derive(Debug, Default, Clone)]
pub struct IpmAdapter;

impl IpmAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl SourceAdapter for IpmAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Ipm
    }

    fn initial_request(&self, target: &TrackedTarget) -> Result<RequestDescriptor, ParseError> {
        Ok(RequestDescriptor::get(target.url.trim()))
    }

    fn extract(&self, raw: &RawResponse) -> Result<Extraction, ParseError> {
        let status = match find_script_block(&raw.body, RICH_MARKER) {
            Some(block) => extract_rich(&raw.body, &block, &raw.request.url)?,
            None => {
                tracing::debug!(url = %raw.request.url, "Option selector missing, using analytics meta");
                extract_partial(&raw.body, &raw.request.url)?
            }
        };

        let follow_up = RequestDescriptor::get(status.canonical_url.clone());
        Ok(Extraction { status, follow_up })
    }
}

/// Extract per-variant status from the option-selector script block
pub fn extract_rich(
    html: &str,
    block: &str,
    request_url: &str,
) -> Result<NormalizedStatus, ParseError> {
    let slice = slice_embedded_json(block, RICH_START, RICH_END)?;
    let product: HaravanProduct = parse_leading_json(slice)?;

    let canonical_url = canonical_link(html, request_url)
        .unwrap_or_else(|| format!("{PRODUCT_BASE}/{}", product.handle));

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

    Ok(NormalizedStatus::from_variants(
        SOURCE_NAME,
        canonical_url,
        product.handle,
        variants,
    ))
}

/// Extract the single top-level status from the analytics meta blob
pub fn extract_partial(html: &str, request_url: &str) -> Result<NormalizedStatus, ParseError> {
    let slice = slice_embedded_json(html, PARTIAL_START, PARTIAL_END)?;
    let meta: HaravanMeta = parse_leading_json(slice)?;
    let product = meta.product;

    let canonical_url = match (canonical_link(html, request_url), &product.handle) {
        (Some(link), _) => link,
        (None, Some(handle)) => format!("{PRODUCT_BASE}/{handle}"),
        (None, None) => crate::crawler::url::without_query(request_url)?,
    };

    Ok(NormalizedStatus::single(
        SOURCE_NAME,
        canonical_url,
        normalize_whitespace(&product.title),
        product.available,
        product.price.map(minor_to_major),
    ))
}
