//! URL classification and vendor URL derivation
//!
//! This module maps operator-supplied product URLs onto a store family and
//! derives the follow-up request URLs each store needs.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use crate::models::SourceKind;
use crate::utils::error::ParseError;

/// Known `host/path` prefixes, matched longest-first
const SOURCE_PREFIXES: &[(&str, SourceKind)] = &[
    ("ipm.vn/products/", SourceKind::Ipm),
    ("ipm.vn/collections/", SourceKind::Ipm),
    ("nxbkimdong.com.vn/products/", SourceKind::KimDong),
    ("nxbkimdong.com.vn/collections/", SourceKind::KimDong),
    ("tiki.vn/", SourceKind::Tiki),
];

/// Base of the Tiki product API
pub const TIKI_API_BASE: &str = "https://tiki.vn/api/v2/products";

/// Classify a product URL by longest matching `host/path` prefix.
///
/// The scheme must be http(s); a leading `www.` on the host is ignored.
///
/// # Errors
///
/// Returns `ParseError::InvalidUrl` for unparsable input and
/// `ParseError::UnsupportedSource` for URLs outside the prefix table.
///
/// # Examples
///
/// ```
/// use stockpoll::crawler::url::classify;
/// use stockpoll::models::SourceKind;
///
/// assert_eq!(classify("https://ipm.vn/products/horimiya-tap-8").unwrap(), SourceKind::Ipm);
/// assert!(classify("https://example.com/products/x").is_err());
/// ```
pub fn classify(url: &str) -> Result<SourceKind, ParseError> {
    let parsed = parse_http_url(url)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| ParseError::InvalidUrl(url.to_string()))?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let key = format!("{}{}", host.to_ascii_lowercase(), parsed.path());

    SOURCE_PREFIXES
        .iter()
        .filter(|(prefix, _)| key.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, kind)| *kind)
        .ok_or_else(|| ParseError::UnsupportedSource(url.to_string()))
}

fn parse_http_url(url: &str) -> Result<Url, ParseError> {
    let parsed = Url::parse(url.trim()).map_err(|_| ParseError::InvalidUrl(url.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(ParseError::InvalidUrl(url.to_string())),
    }
}

/// Strip query string and fragment from a URL
pub fn without_query(url: &str) -> Result<String, ParseError> {
    let mut parsed = parse_http_url(url)?;
    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok(parsed.to_string())
}

/// Haravan product JSON endpoint: `<product-url>.js`
///
/// # Examples
///
/// ```
/// use stockpoll::crawler::url::product_js_url;
///
/// let url = product_js_url("https://nxbkimdong.com.vn/products/doraemon-1?variant=2").unwrap();
/// assert_eq!(url, "https://nxbkimdong.com.vn/products/doraemon-1.js");
/// ```
pub fn product_js_url(url: &str) -> Result<String, ParseError> {
    let base = without_query(url)?;
    let base = base.trim_end_matches('/');
    if base.ends_with(".js") {
        Ok(base.to_string())
    } else {
        Ok(format!("{base}.js"))
    }
}

/// Numeric product key and optional seller product id from a Tiki URL.
///
/// The key is the number in the `-p<digits>.html` path suffix; the seller id is
/// the `pid` query parameter, with `spid` accepted as an alias.
pub fn tiki_product_ids(url: &str) -> Result<(u64, Option<u64>), ParseError> {
    static PRODUCT_KEY_RE: OnceLock<Regex> = OnceLock::new();
    let re = PRODUCT_KEY_RE
        .get_or_init(|| Regex::new(r"-p(\d+)\.html").expect("Invalid regex pattern"));

    let parsed = parse_http_url(url)?;
    let key = re
        .captures(parsed.path())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .ok_or_else(|| ParseError::ProductKeyNotFound(url.to_string()))?;

    let pid = ["pid", "spid"].iter().find_map(|name| {
        parsed
            .query_pairs()
            .find(|(k, _)| k == *name)
            .and_then(|(_, v)| v.parse::<u64>().ok())
    });

    Ok((key, pid))
}

/// Tiki product API URL for a storefront product URL
///
/// # Examples
///
/// ```
/// use stockpoll::crawler::url::tiki_api_url;
///
/// let api = tiki_api_url("https://tiki.vn/horimiya-tap-8-p123456.html?pid=789").unwrap();
/// assert_eq!(api, "https://tiki.vn/api/v2/products/123456?platform=web&spid=789");
/// ```
pub fn tiki_api_url(url: &str) -> Result<String, ParseError> {
    let (key, pid) = tiki_product_ids(url)?;
    Ok(match pid {
        Some(pid) => format!("{TIKI_API_BASE}/{key}?platform=web&spid={pid}"),
        None => format!("{TIKI_API_BASE}/{key}?platform=web"),
    })
}
