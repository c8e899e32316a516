// Core data structures for the stockpoll poller

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store family a tracked URL belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Ipm,
    KimDong,
    Tiki,
}

impl SourceKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ipm => "ipm",
            Self::KimDong => "kimdong",
            Self::Tiki => "tiki",
        }
    }

    /// Get all source kinds
    pub fn all() -> Vec<Self> {
        vec![Self::Ipm, Self::KimDong, Self::Tiki]
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One product URL the operator asked to poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedTarget {
    pub url: String,
    pub source: SourceKind,
}

impl TrackedTarget {
    /// Classify `url` and build a target, rejecting unknown stores and
    /// Tiki URLs that carry no product id
    pub fn parse(url: &str) -> Result<Self, crate::utils::error::ParseError> {
        let source = crate::crawler::url::classify(url)?;
        if source == SourceKind::Tiki {
            crate::crawler::url::tiki_product_ids(url)?;
        }
        Ok(Self {
            url: url.trim().to_string(),
            source,
        })
    }
}

/// Request to issue on the next poll cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// Plain GET with no extra headers
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Body of one fetch plus the request that produced it
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub request: RequestDescriptor,
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(request: RequestDescriptor, status: u16, body: impl Into<String>) -> Self {
        Self {
            request,
            status,
            body: body.into(),
        }
    }
}

/// Per-variant availability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub title: String,
    pub available: bool,
    /// Price in major currency units (VND)
    pub price: Option<f64>,
    pub quantity_available: Option<i64>,
}

/// Common availability record every source adapter produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedStatus {
    pub source_name: String,
    pub canonical_url: String,
    /// Product display name (handle or title)
    pub name: String,
    pub available: bool,
    /// Source-provided status phrase, if any
    pub status_text: Option<String>,
    pub variants: Vec<Variant>,
    /// False when `variants` holds one synthetic entry mirroring a single flag
    #[serde(default)]
    pub per_variant: bool,
    pub checked_at: DateTime<Utc>,
}

impl NormalizedStatus {
    /// Build a status whose top-level flag is derived from its variants
    pub fn from_variants(
        source_name: impl Into<String>,
        canonical_url: impl Into<String>,
        name: impl Into<String>,
        variants: Vec<Variant>,
    ) -> Self {
        let available = variants.iter().any(|v| v.available);
        Self {
            source_name: source_name.into(),
            canonical_url: canonical_url.into(),
            name: name.into(),
            available,
            status_text: None,
            variants,
            per_variant: true,
            checked_at: Utc::now(),
        }
    }

    /// Build a status for sources that only expose one availability flag.
    ///
    /// The single synthetic variant mirrors the top-level status.
    pub fn single(
        source_name: impl Into<String>,
        canonical_url: impl Into<String>,
        name: impl Into<String>,
        available: bool,
        price: Option<f64>,
    ) -> Self {
        let name = name.into();
        let variant = Variant {
            title: name.clone(),
            available,
            price,
            quantity_available: None,
        };
        Self {
            source_name: source_name.into(),
            canonical_url: canonical_url.into(),
            name,
            available,
            status_text: None,
            variants: vec![variant],
            per_variant: false,
            checked_at: Utc::now(),
        }
    }

    /// Attach a status phrase
    pub fn with_status_text(mut self, text: Option<String>) -> Self {
        self.status_text = text;
        self
    }
}

/// Convert a minor-unit price (x100) into major units
pub fn minor_to_major(minor: f64) -> f64 {
    minor / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(title: &str, available: bool) -> Variant {
        Variant {
            title: title.to_string(),
            available,
            price: Some(1000.0),
            quantity_available: Some(1),
        }
    }

    #[test]
    fn test_available_derived_from_variants() {
        let status = NormalizedStatus::from_variants(
            "IPM",
            "https://ipm.vn/products/a",
            "a",
            vec![variant("x", false), variant("y", true)],
        );
        assert!(status.available);
        assert_eq!(status.variants.iter().filter(|v| v.available).count(), 1);

        let status = NormalizedStatus::from_variants(
            "IPM",
            "https://ipm.vn/products/a",
            "a",
            vec![variant("x", false)],
        );
        assert!(!status.available);
    }

    #[test]
    fn test_single_variant_mirrors_top_level() {
        let status = NormalizedStatus::single("Tiki", "https://tiki.vn/x", "X", true, Some(50.0));
        assert!(status.available);
        assert_eq!(status.variants.len(), 1);
        assert!(status.variants[0].available);
        assert_eq!(status.variants[0].price, Some(50.0));
        assert_eq!(status.variants[0].quantity_available, None);
        assert!(!status.per_variant);
    }

    #[test]
    fn test_minor_to_major() {
        assert_eq!(minor_to_major(15_000_000.0), 150_000.0);
        assert_eq!(minor_to_major(0.0), 0.0);
    }

    #[test]
    fn test_request_header_lookup() {
        let req = RequestDescriptor::get("https://tiki.vn").with_header("User-Agent", "Mozilla");
        assert_eq!(req.header("user-agent"), Some("Mozilla"));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn test_source_kind_display() {
        assert_eq!(SourceKind::KimDong.to_string(), "kimdong");
        assert_eq!(SourceKind::all().len(), 3);
    }

    #[test]
    fn test_target_parse_requires_tiki_product_id() {
        let target = TrackedTarget::parse(" https://tiki.vn/horimiya-tap-8-p123456.html ").unwrap();
        assert_eq!(target.source, SourceKind::Tiki);
        assert_eq!(target.url, "https://tiki.vn/horimiya-tap-8-p123456.html");

        assert!(matches!(
            TrackedTarget::parse("https://tiki.vn/search?q=horimiya"),
            Err(crate::utils::error::ParseError::ProductKeyNotFound(_))
        ));
        assert!(TrackedTarget::parse("https://ipm.vn/collections/all").is_ok());
    }
}
