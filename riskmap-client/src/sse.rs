//! SSE consumer
//!
//! Connects to the server's `/api/events` stream, parses the SSE line
//! protocol out of the byte stream, and hands decoded feed events to the
//! caller one at a time. Each event is fully applied before the next is
//! parsed, so cache updates never interleave.

use futures::StreamExt;
use tracing::{debug, warn};

use riskmap_common::events::FeedEvent;

use crate::error::Result;

/// Incremental SSE line-protocol parser.
///
/// Feed it one line at a time; a blank line completes the pending event
/// and returns its `(event, data)` pair. Comment lines (leading ':') are
/// ignored. An event without an explicit `event:` field uses the protocol
/// default name "message".
#[derive(Debug, Default)]
pub struct SseParser {
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) -> Option<(String, String)> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            if self.data.is_empty() && self.event.is_none() {
                return None;
            }
            let event = self.event.take().unwrap_or_else(|| "message".to_string());
            let data = std::mem::take(&mut self.data).join("\n");
            return Some((event, data));
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id and retry are irrelevant to this feed
            _ => {}
        }
        None
    }
}

/// Consume the server's event stream until it ends or errors.
///
/// `apply` is called once per decoded event, in arrival order.
pub async fn run_event_loop<F>(base_url: &str, mut apply: F) -> Result<()>
where
    F: FnMut(FeedEvent),
{
    let url = format!("{}/api/events", base_url.trim_end_matches('/'));
    let response = reqwest::get(&url).await?.error_for_status()?;
    debug!("connected to event stream at {url}");

    let mut stream = response.bytes_stream();
    let mut parser = SseParser::new();
    let mut buffer = String::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(newline) = buffer.find('\n') {
            let line: String = buffer.drain(..=newline).collect();
            let Some((event, data)) = parser.push_line(line.trim_end_matches('\n')) else {
                continue;
            };
            match FeedEvent::from_wire(&event, &data) {
                Ok(Some(feed_event)) => apply(feed_event),
                Ok(None) => debug!("ignoring unknown event {event}"),
                Err(e) => warn!("undecodable {event} payload: {e}"),
            }
        }
    }

    debug!("event stream ended");
    Ok(())
}
