use std::time::Instant;

use crate::Decision;

pub type RunId = u64;

/// Parameters of the trigger request for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub project_id: String,
    /// Inclusive start date, `YYYY-MM-DD`.
    pub date_from: String,
    /// Inclusive end date, `YYYY-MM-DD`.
    pub date_to: String,
}

/// One decoded event of the backend feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMessage {
    /// Human-readable status line.
    Log { text: String },
    /// Announces `count` more items for the current sub-batch.
    SetTotal { count: u64, folder: Option<String> },
    /// Upload of the current sub-batch begins.
    UploadStart { folder: Option<String> },
    /// Link generated for one sub-batch.
    LinkResult {
        folder_label: Option<String>,
        link: String,
    },
    /// One classified item. `current`/`total` are the backend's own counters
    /// for the sub-batch and are advisory only.
    ImageResult {
        file: String,
        path: String,
        decision: Decision,
        reason: Option<String>,
        current: u64,
        total: u64,
    },
    /// Terminal message of a successful run.
    Done {
        text: Option<String>,
        s3_link: Option<String>,
        s3_links: Option<Vec<String>>,
        report: Vec<String>,
    },
    /// Terminal failure reported by the backend itself.
    Error { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User triggered a new run; the request is about to be sent.
    RunRequested { request: RunRequest, at: Instant },
    /// A decoded feed message for `run_id`.
    Received {
        run_id: RunId,
        message: RunMessage,
        at: Instant,
    },
    /// Reading the feed failed.
    StreamFailed {
        run_id: RunId,
        error: String,
        at: Instant,
    },
    /// The feed closed.
    StreamEnded { run_id: RunId, at: Instant },
    /// User jumped to a bucket page.
    PageRequested { bucket: Decision, page: usize },
    /// User clicked previous/next on a bucket.
    PageStepped { bucket: Decision, delta: isize },
    /// Periodic UI tick; expires transient notices.
    Tick { at: Instant },
    /// Fallback for placeholder wiring.
    NoOp,
}
