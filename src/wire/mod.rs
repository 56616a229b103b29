//! Event encoder for the server-sent-events stream sent to clients.
//!
//! Each event becomes one self-delimited frame:
//!
//! ```text
//! event: <kind>
//! data: <json>
//!
//! ```
//!
//! The JSON is written with non-ASCII characters as-is (UTF-8), never as
//! `\u` escapes, so Hebrew text reaches the browser unchanged.

use crate::error::Result;
use crate::types::AgentEvent;

/// MIME type of the encoded stream.
pub const CONTENT_TYPE: &str = "text/event-stream";

/// Encode a kind and JSON payload into one frame.
pub fn encode(kind: &str, payload: &serde_json::Value) -> Vec<u8> {
    format!("event: {kind}\ndata: {payload}\n\n").into_bytes()
}

/// Encode an [`AgentEvent`] into one frame.
pub fn encode_event(event: &AgentEvent) -> Result<Vec<u8>> {
    let payload = serde_json::to_string(event)?;
    Ok(format!("event: {}\ndata: {payload}\n\n", event.kind()).into_bytes())
}

/// Split a stream body back into `(kind, payload)` pairs.
///
/// Frames without an `event:` line are reported with kind `message`, the
/// server-sent-events default. Frames whose data is not JSON are skipped.
pub fn decode_frames(body: &str) -> Vec<(String, serde_json::Value)> {
    body.split("\n\n")
        .filter(|frame| !frame.trim().is_empty())
        .filter_map(|frame| {
            let mut kind = "message".to_string();
            let mut data = String::new();
            for line in frame.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    kind = value.trim().to_string();
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push_str(value.trim_start());
                }
            }
            let payload = serde_json::from_str(&data).ok()?;
            Some((kind, payload))
        })
        .collect()
}
