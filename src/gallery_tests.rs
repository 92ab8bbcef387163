//! Tests for page fetching, payload extraction and card-item location.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn page_html(payload: &serde_json::Value) -> String {
    format!(
        "<html><head><script id=\"__NEXT_DATA__\" type=\"application/json\">{payload}</script></head><body></body></html>"
    )
}

fn gallery_payload() -> serde_json::Value {
    json!({
        "props": {
            "pageProps": {
                "page": {
                    "blades": [
                        { "type": "hero", "title": "Riftbound" },
                        {
                            "type": "riftboundCardGallery",
                            "cards": { "items": [{ "name": "Ashe" }, { "name": "Braum" }] }
                        }
                    ]
                }
            }
        }
    })
}

// ── payload extraction ───────────────────────────────────────────────

#[test]
fn embedded_payload_is_extracted() {
    let data = extract_page_data(&page_html(&gallery_payload())).unwrap();
    assert!(data.get("props").is_some());
}

#[test]
fn missing_script_tag_is_a_source_format_error() {
    let err = extract_page_data("<html><body>no payload here</body></html>").unwrap_err();
    assert!(matches!(err, SyncError::SourceFormat(_)));
}

#[test]
fn empty_script_tag_is_a_source_format_error() {
    let html = "<html><head><script id=\"__NEXT_DATA__\"></script></head></html>";
    let err = extract_page_data(html).unwrap_err();
    assert!(matches!(err, SyncError::SourceFormat(_)));
}

#[test]
fn invalid_json_payload_is_a_parse_error() {
    let html = "<html><head><script id=\"__NEXT_DATA__\">{not json</script></head></html>";
    let err = extract_page_data(html).unwrap_err();
    assert!(matches!(err, SyncError::Parse(_)));
}

// ── item location ────────────────────────────────────────────────────

#[test]
fn known_path_finds_the_gallery_blade() {
    let payload = gallery_payload();
    let items = items_from_gallery_section(&payload).unwrap();
    assert_eq!(items.len(), 2);
}

#[test]
fn known_path_ignores_other_blades() {
    let payload = json!({
        "props": { "pageProps": { "page": { "blades": [
            { "type": "hero", "cards": { "items": [{ "name": "Wrong" }] } }
        ] } } }
    });
    assert!(items_from_gallery_section(&payload).is_none());
}

#[test]
fn known_path_tolerates_missing_keys() {
    assert!(items_from_gallery_section(&json!({})).is_none());
    assert!(items_from_gallery_section(&json!({ "props": { "pageProps": {} } })).is_none());
    assert!(
        items_from_gallery_section(&json!({ "props": { "pageProps": { "page": { "blades": "nope" } } } }))
            .is_none()
    );
}

#[test]
fn recursive_search_finds_relocated_items() {
    let payload = json!({
        "data": { "sections": [
            { "kind": "other" },
            { "gallery": { "cards": { "items": [{ "name": "Ashe" }] } } }
        ] }
    });
    let items = find_card_items(&payload).unwrap();
    assert_eq!(items.len(), 1);
}

#[test]
fn recursive_search_requires_an_items_list() {
    let payload = json!({ "cards": { "items": "not a list" } });
    assert!(find_card_items(&payload).is_none());
}

#[test]
fn locator_prefers_the_known_path() {
    let payload = gallery_payload();
    let items = card_items(&payload).unwrap();
    assert_eq!(items[0].get("name").unwrap(), "Ashe");
}

#[test]
fn locator_falls_back_when_the_layout_drifts() {
    let payload = json!({
        "props": { "somewhereElse": { "cards": { "items": [{ "name": "Ashe" }] } } }
    });
    assert_eq!(card_items(&payload).unwrap().len(), 1);
}

#[test]
fn locator_gives_up_when_nothing_matches() {
    assert!(card_items(&json!({ "props": {} })).is_none());
}

// ── page fetch ───────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_html_returns_the_page_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/card-gallery/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let url = format!("{}/card-gallery/", server.uri());
    let html = fetch_html(&client, &url).await.unwrap();

    assert_eq!(html, "<html>ok</html>");
}

#[tokio::test]
async fn fetch_html_fails_on_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let err = fetch_html(&client, &server.uri()).await.unwrap_err();

    assert!(matches!(err, SyncError::HttpStatus(status) if status.as_u16() == 500));
}
