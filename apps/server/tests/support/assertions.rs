use anyhow::Context as _;
use axum::http::StatusCode;
use serde_json::Value;

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "{context}: unexpected status");
}

pub fn parse_json(bytes: &[u8]) -> anyhow::Result<Value> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).context("response body is JSON")
}

/// Ids of the `items` of a listing response, in order.
pub fn item_ids(listing: &Value) -> anyhow::Result<Vec<String>> {
    let items = listing["items"].as_array().context("listing has items")?;
    Ok(items
        .iter()
        .filter_map(|item| item["id"].as_str().map(str::to_string))
        .collect())
}

/// Assert an error envelope with the given status and a message containing `needle`.
pub fn assert_error(status: StatusCode, body: &Value, expected: StatusCode, needle: &str) {
    assert_eq!(status, expected, "unexpected status, body: {body}");
    let message = body["error"].as_str().unwrap_or_default().to_lowercase();
    assert!(
        message.contains(&needle.to_lowercase()),
        "error message {message:?} should mention {needle:?}"
    );
}
