use std::time::Duration;

use crate::{RunId, RunRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the trigger request and stream its events back tagged with `run_id`.
    StartRun { run_id: RunId, request: RunRequest },
    /// Stop observing a run that is being replaced.
    AbandonRun { run_id: RunId },
    /// The backend packed an archive; show a notice for `dismiss_after`.
    ArchiveReady {
        name: String,
        dismiss_after: Duration,
    },
    /// The run completed with the resolved final link set.
    RunFinished { final_links: Vec<String> },
    /// The run stopped without completing.
    RunFailed { error: String },
}
