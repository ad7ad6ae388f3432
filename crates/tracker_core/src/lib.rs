//! Tracker core: pure run state machine and view-model helpers.
mod bucket;
mod effect;
mod links;
mod msg;
mod state;
mod timer;
mod update;
mod view_model;

pub use bucket::{Bucket, BucketPage, Buckets, Decision, Item, DEFAULT_PAGE_SIZE};
pub use effect::Effect;
pub use links::{compose_mail, LinkCollector, LinkEntry, DEFAULT_LINK_LABEL};
pub use msg::{Msg, RunId, RunMessage, RunRequest};
pub use state::{ArchiveNotice, RunPhase, RunState, TrackerSettings, DEFAULT_NOTICE_DELAY};
pub use timer::{format_elapsed, PhaseTimers, TimerPhase};
pub use update::{resolve_final_links, update, ZIP_CREATED_MARKER};
pub use view_model::{BucketView, RunViewModel, TimersView};
