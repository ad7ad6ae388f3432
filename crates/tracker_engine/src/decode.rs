use std::collections::VecDeque;

use bytes::Bytes;
use futures_util::{stream, Stream, StreamExt};
use serde::Deserialize;
use tracker_core::{Decision, RunMessage};
use tracker_logging::{tracker_debug, tracker_trace, tracker_warn};

use crate::StreamError;

/// Marker that precedes the JSON payload of every event line.
pub const DATA_PREFIX: &str = "data:";

/// Every field any event shape may carry. Classification happens in
/// [`WirePayload::into_message`].
#[derive(Debug, Default, Deserialize)]
struct WirePayload {
    #[serde(rename = "type")]
    kind: Option<String>,
    log: Option<String>,
    #[serde(default)]
    done: bool,
    error: Option<String>,
    count: Option<u64>,
    folder: Option<String>,
    link: Option<String>,
    file: Option<String>,
    path: Option<String>,
    decision: Option<String>,
    reason: Option<String>,
    current: Option<u64>,
    total: Option<u64>,
    s3_link: Option<String>,
    s3_links: Option<Vec<String>>,
    report: Option<Vec<String>>,
}

impl WirePayload {
    fn into_message(self) -> Option<RunMessage> {
        match self.kind.as_deref() {
            Some("set_total") => Some(RunMessage::SetTotal {
                count: self.count?,
                folder: self.folder,
            }),
            Some("upload_start") => Some(RunMessage::UploadStart {
                folder: self.folder,
            }),
            Some("link_result") => Some(RunMessage::LinkResult {
                folder_label: self.folder,
                link: self.link?,
            }),
            Some("image_result") => Some(RunMessage::ImageResult {
                decision: Decision::parse(self.decision.as_deref()?)?,
                file: self.file?,
                path: self.path?,
                reason: self.reason,
                current: self.current.unwrap_or_default(),
                total: self.total.unwrap_or_default(),
            }),
            Some(_) => None,
            None if self.error.is_some() => self.error.map(|text| RunMessage::Error { text }),
            None if self.done => Some(RunMessage::Done {
                text: self.log,
                s3_link: self.s3_link,
                s3_links: self.s3_links,
                report: self.report.unwrap_or_default(),
            }),
            None => self.log.map(|text| RunMessage::Log { text }),
        }
    }
}

/// Incremental decoder for the newline-delimited event feed.
///
/// Bytes are buffered until a full line is available, so chunk boundaries may
/// fall anywhere, including inside a multi-byte character.
#[derive(Debug, Default)]
pub struct EventDecoder {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to hold no newline.
    scanned: usize,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers `chunk` and returns the messages of every line it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<RunMessage> {
        self.buffer.extend_from_slice(chunk);
        let Some(offset) = self.buffer[self.scanned..]
            .iter()
            .rposition(|byte| *byte == b'\n')
        else {
            self.scanned = self.buffer.len();
            return Vec::new();
        };
        let complete: Vec<u8> = self.buffer.drain(..=self.scanned + offset).collect();
        self.scanned = self.buffer.len();
        complete
            .split(|byte| *byte == b'\n')
            .filter_map(decode_unit)
            .collect()
    }

    /// Bytes waiting for their terminating newline.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drops an unterminated trailing line at end of stream.
    pub fn finish(&mut self) {
        if !self.buffer.is_empty() {
            tracker_debug!(
                "Discarding {} bytes of unterminated trailing event",
                self.buffer.len()
            );
            self.buffer.clear();
        }
        self.scanned = 0;
    }
}

/// Decodes one line of the feed. Lines without the data marker, with an empty
/// payload, with a malformed payload or of an unknown shape yield nothing.
pub fn decode_unit(raw: &[u8]) -> Option<RunMessage> {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text,
        Err(err) => {
            tracker_warn!("Skipping event line with invalid UTF-8: {}", err);
            return None;
        }
    };
    let payload = text.trim().strip_prefix(DATA_PREFIX)?.trim();
    if payload.is_empty() {
        return None;
    }
    match serde_json::from_str::<WirePayload>(payload) {
        Ok(wire) => {
            let message = wire.into_message();
            if message.is_none() {
                tracker_trace!("Ignoring unrecognized event: {}", payload);
            }
            message
        }
        Err(err) => {
            tracker_warn!("Skipping malformed event payload ({}): {}", err, payload);
            None
        }
    }
}

struct DecodeState<S> {
    bytes: S,
    decoder: EventDecoder,
    pending: VecDeque<RunMessage>,
    exhausted: bool,
}

/// Turns a byte stream into a lazy stream of run messages.
///
/// The stream ends when the input ends. A transport error is yielded once and
/// ends the stream as well.
pub fn decode_stream<S>(bytes: S) -> impl Stream<Item = Result<RunMessage, StreamError>> + Send
where
    S: Stream<Item = Result<Bytes, StreamError>> + Unpin + Send + 'static,
{
    let state = DecodeState {
        bytes,
        decoder: EventDecoder::new(),
        pending: VecDeque::new(),
        exhausted: false,
    };
    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(message) = state.pending.pop_front() {
                return Some((Ok(message), state));
            }
            if state.exhausted {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let messages = state.decoder.feed(&chunk);
                    state.pending.extend(messages);
                }
                Some(Err(err)) => {
                    state.exhausted = true;
                    state.pending.clear();
                    return Some((Err(err), state));
                }
                None => {
                    state.decoder.finish();
                    state.exhausted = true;
                }
            }
        }
    })
}
