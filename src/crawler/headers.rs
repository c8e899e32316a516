use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};

use crate::models::RequestDescriptor;
use crate::utils::error::FetchError;

/// Pool of realistic User-Agent strings
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Get a random browser user agent from the pool
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS.choose(&mut rng).copied().unwrap_or(USER_AGENTS[0])
}

/// Attach browser-like headers for the Tiki product API.
///
/// The API rejects requests that do not look like they come from a browser.
///
/// # Examples
///
/// ```
/// use stockpoll::crawler::headers::with_browser_headers;
/// use stockpoll::models::RequestDescriptor;
///
/// let req = with_browser_headers(
///     RequestDescriptor::get("https://tiki.vn/api/v2/products/1"),
///     None,
///     "https://tiki.vn/x-p1.html",
/// );
/// assert!(req.header("user-agent").unwrap().starts_with("Mozilla/5.0"));
/// ```
pub fn with_browser_headers(
    request: RequestDescriptor,
    user_agent: Option<&str>,
    referer: &str,
) -> RequestDescriptor {
    let user_agent = user_agent.unwrap_or_else(|| random_user_agent());
    request
        .with_header(USER_AGENT.as_str(), user_agent)
        .with_header(ACCEPT.as_str(), "application/json, text/plain, */*")
        .with_header(ACCEPT_LANGUAGE.as_str(), "vi-VN,vi;q=0.9,en-US;q=0.8,en;q=0.7")
        .with_header(REFERER.as_str(), referer)
}

/// Convert descriptor headers into a reqwest `HeaderMap`
pub fn to_header_map(request: &RequestDescriptor) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &request.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| FetchError::InvalidUrl(format!("invalid header name: {name}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| FetchError::InvalidUrl(format!("invalid header value for {name}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
