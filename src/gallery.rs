//! Card gallery page fetching and payload extraction.
//!
//! The gallery page embeds its data as a JSON payload in a
//! `<script id="__NEXT_DATA__">` tag. The card-variant list is located with a
//! known structural path first and a recursive search as a fallback, so minor
//! page-layout changes degrade gracefully instead of breaking the worker.

use scraper::{Html, Selector};
use serde_json::Value;
use std::time::Duration;

use crate::error::{Result, SyncError};

/// Source page for the card catalog.
pub const GALLERY_URL: &str = "https://riftbound.leagueoflegends.com/en-us/card-gallery/";

/// Page-section type marker for the card gallery blade.
const GALLERY_SECTION_TYPE: &str = "riftboundCardGallery";

const NEXT_DATA_SELECTOR: &str = "script#__NEXT_DATA__";
const PAGE_USER_AGENT: &str = "Mozilla/5.0 (compatible; card-scraper/1.0)";
const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

/// Fetches the gallery page HTML. Non-success status codes are fatal here:
/// without the page there is nothing safe to publish.
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .header("User-Agent", PAGE_USER_AGENT)
        .timeout(HTTP_TIMEOUT)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SyncError::HttpStatus(response.status()));
    }

    Ok(response.text().await?)
}

/// Extracts and parses the embedded `__NEXT_DATA__` payload.
pub fn extract_page_data(html: &str) -> Result<Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(NEXT_DATA_SELECTOR)
        .map_err(|e| SyncError::SourceFormat(format!("invalid payload selector: {e}")))?;

    let script = document.select(&selector).next().ok_or_else(|| {
        SyncError::SourceFormat("could not find __NEXT_DATA__ script tag".to_string())
    })?;

    let body: String = script.text().collect();
    if body.trim().is_empty() {
        return Err(SyncError::SourceFormat(
            "__NEXT_DATA__ script tag is empty".to_string(),
        ));
    }

    Ok(serde_json::from_str(&body)?)
}

/// Locates the raw card-variant items: known structural path first, recursive
/// search second. `None` means neither strategy found a list.
pub fn card_items(data: &Value) -> Option<&Vec<Value>> {
    items_from_gallery_section(data).or_else(|| find_card_items(data))
}

/// Known structure: `props.pageProps.page.blades`, the blade whose `type` is
/// the card-gallery marker, then `blade.cards.items`. Absent keys and wrong
/// types return `None` rather than failing.
pub fn items_from_gallery_section(data: &Value) -> Option<&Vec<Value>> {
    let blades = data
        .get("props")?
        .get("pageProps")?
        .get("page")?
        .get("blades")?
        .as_array()?;

    blades.iter().find_map(|blade| {
        if blade.get("type").and_then(Value::as_str) == Some(GALLERY_SECTION_TYPE) {
            blade.get("cards")?.get("items")?.as_array()
        } else {
            None
        }
    })
}

/// Fallback: depth-first search for any `"cards": {"items": [...]}` container,
/// mappings before their child values, lists in order. First match wins, which
/// tolerates page-layout drift at the cost of determinism when a page carries
/// several such containers.
pub fn find_card_items(node: &Value) -> Option<&Vec<Value>> {
    match node {
        Value::Object(map) => {
            if let Some(items) = map
                .get("cards")
                .and_then(|cards| cards.get("items"))
                .and_then(Value::as_array)
            {
                return Some(items);
            }
            map.values().find_map(find_card_items)
        }
        Value::Array(list) => list.iter().find_map(find_card_items),
        _ => None,
    }
}

#[cfg(test)]
#[path = "gallery_tests.rs"]
mod tests;
