//! Payload parsing helpers
//!
//! This module holds the pure, network-free parts of extraction: slicing JSON
//! objects out of store HTML and decoding the vendor product records.

pub mod embedded;
pub mod records;

// Re-export main helpers and public types
pub use embedded::{canonical_link, find_script_block, parse_leading_json, slice_embedded_json};
pub use records::{HaravanMeta, HaravanMetaProduct, HaravanProduct, HaravanVariant, TikiProduct};
