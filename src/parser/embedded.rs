//! Extraction of JSON objects embedded in HTML script blocks
//!
//! Store pages inline product data inside JavaScript that is not valid JSON
//! as a whole, so the object has to be cut out between two marker tokens.

use scraper::{Html, Selector};
use serde::de::DeserializeOwned;
use url::Url;

use crate::utils::error::ParseError;

/// Slice the text between `start_marker` (inclusive) and the first
/// `end_marker` after it (exclusive).
///
/// # Errors
///
/// Returns `ParseError::MarkerNotFound` naming whichever marker is absent.
///
/// # Examples
///
/// ```
/// use stockpoll::parser::slice_embedded_json;
///
/// let text = r#"var x = {"a":1}; done"#;
/// assert_eq!(slice_embedded_json(text, "{\"a\"", "; done").unwrap(), r#"{"a":1}"#);
/// ```
pub fn slice_embedded_json<'a>(
    text: &'a str,
    start_marker: &str,
    end_marker: &str,
) -> Result<&'a str, ParseError> {
    let start = text
        .find(start_marker)
        .ok_or_else(|| ParseError::marker(start_marker))?;
    let end = text[start..]
        .find(end_marker)
        .map(|offset| start + offset)
        .ok_or_else(|| ParseError::marker(end_marker))?;
    Ok(&text[start..end])
}

/// Decode the first JSON value in `slice`, ignoring anything after it.
///
/// Marker slicing leaves script punctuation (`,`, `;`, whitespace) behind the
/// object; only the leading value is meaningful.
pub fn parse_leading_json<T: DeserializeOwned>(slice: &str) -> Result<T, ParseError> {
    let mut stream = serde_json::Deserializer::from_str(slice).into_iter::<T>();
    match stream.next() {
        Some(value) => Ok(value?),
        None => Err(ParseError::MissingField("json object")),
    }
}

/// Return the text of the first `<script>` whose content contains `marker`.
///
/// Falls back to the raw text from the marker onwards when the payload is not
/// a document with script elements.
pub fn find_script_block(html: &str, marker: &str) -> Option<String> {
    if !html.contains(marker) {
        return None;
    }

    let document = Html::parse_document(html);
    if let Ok(selector) = Selector::parse("script") {
        for script in document.select(&selector) {
            let text: String = script.text().collect();
            if text.contains(marker) {
                return Some(text);
            }
        }
    }

    html.find(marker).map(|idx| html[idx..].to_string())
}

/// Read `<link rel="canonical" href="...">` from a document, resolved
/// against `base` (the URL the document was fetched from).
///
/// Returns `None` when the tag is missing or the href cannot be made absolute.
pub fn canonical_link(html: &str, base: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"link[rel="canonical"]"#).ok()?;
    let href = document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())?;

    let resolved = match Url::parse(base) {
        Ok(base) => base.join(href),
        Err(_) => Url::parse(href),
    };
    resolved.ok().map(String::from)
}
