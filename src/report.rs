//! Reporting sink for normalized statuses
//!
//! The poller hands every fresh [`NormalizedStatus`] to a [`Reporter`] and moves
//! on; nothing is returned and nothing is retained.

use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::io::Write as _;

use crate::models::NormalizedStatus;

const SEPARATOR: &str = "#################";

/// Consumer of normalized statuses
pub trait Reporter: Send + Sync {
    /// Deliver one status; fire-and-forget
    fn report(&self, status: &NormalizedStatus);
}

/// Prints a human readable block per poll to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, status: &NormalizedStatus) {
        let block = render(status, status.checked_at.with_timezone(&Local));
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout
            .write_all(block.as_bytes())
            .and_then(|_| stdout.flush())
        {
            tracing::warn!(error = %e, url = %status.canonical_url, "Failed to write report");
        }
    }
}

/// Render one status block
///
/// Layout:
/// ```text
///
/// #################2026-10-18 09:30:00
/// Product name: horimiya-tap-8
/// Status: Some specific variants are in stock
/// Variants:
///
/// 1
/// Title: Default
/// Status: In stock
/// Current price: 150000 VND
/// Available quantity: 3
///
/// ```
pub fn render(status: &NormalizedStatus, at: DateTime<Local>) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out);
    let _ = writeln!(out, "{SEPARATOR}{}", at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Product name: {}", status.name);

    if let Some(line) = status_line(status) {
        let _ = writeln!(out, "Status: {line}");
    }

    if status.per_variant && !status.available {
        return out;
    }

    let _ = writeln!(out, "Variants:");
    let _ = writeln!(out);
    for (index, variant) in status.variants.iter().enumerate() {
        let _ = writeln!(out, "{}", index + 1);
        let _ = writeln!(out, "Title: {}", variant.title);
        let stock = if variant.available { "In stock" } else { "Out of stock" };
        let _ = writeln!(out, "Status: {stock}");
        if variant.available {
            match variant.price {
                Some(price) => {
                    let _ = writeln!(out, "Current price: {price} VND");
                }
                None => {
                    let _ = writeln!(out, "Current price: Unknown");
                }
            }
            match variant.quantity_available {
                Some(quantity) => {
                    let _ = writeln!(out, "Available quantity: {quantity}");
                }
                None => {
                    let _ = writeln!(out, "Available quantity: Unknown");
                }
            }
        }
        let _ = writeln!(out);
    }

    out
}

/// Top-level status line; `None` for single-flag sources without a phrase
fn status_line(status: &NormalizedStatus) -> Option<String> {
    if let Some(text) = &status.status_text {
        return Some(text.clone());
    }
    if !status.per_variant {
        return None;
    }
    Some(if status.available {
        "Some specific variants are in stock".to_string()
    } else {
        "Out of stock".to_string()
    })
}
