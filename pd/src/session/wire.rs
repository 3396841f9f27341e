//! Server-sent event framing for stream events
//!
//! The outbound boundary contract: each stream event becomes one or two
//! `data:` lines that any SSE-speaking transport forwards unchanged.
//! Existing clients parse these byte-for-byte, so the shapes here must not
//! drift.

use serde_json::json;

use super::StreamEvent;

/// Terminator frame closing every exchange
pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// Render one stream event as its wire frames
///
/// `Fragment` and `Done` each produce a single frame; `Failure` produces
/// the error payload followed by the terminator, so consumers always see
/// the stream close.
pub fn sse_frames(event: &StreamEvent) -> String {
    match event {
        StreamEvent::Fragment(text) => format!("data: {}\n\n", json!({ "content": text })),
        StreamEvent::Done => DONE_FRAME.to_string(),
        StreamEvent::Failure(message) => {
            format!("data: {}\n\n{}", json!({ "error": message }), DONE_FRAME)
        }
    }
}
