use crate::{Decision, Item, LinkEntry, RunId, RunPhase, TimerPhase};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunViewModel {
    pub run_id: Option<RunId>,
    pub phase: RunPhase,
    pub timers: TimersView,
    pub processed: u64,
    pub total: u64,
    pub percent: u64,
    pub keep: BucketView,
    pub trash: BucketView,
    pub links: Vec<LinkEntry>,
    pub final_links: Vec<String>,
    pub status: Option<String>,
    /// Name of a freshly created archive while its notice is still up.
    pub notice: Option<String>,
    pub last_archive: Option<String>,
    pub report: Vec<String>,
    pub error: Option<String>,
    pub dirty: bool,
}

impl RunViewModel {
    pub fn bucket(&self, decision: Decision) -> &BucketView {
        match decision {
            Decision::Keep => &self.keep,
            Decision::Trash => &self.trash,
        }
    }
}

/// Formatted `mm:ss` per phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimersView {
    pub download: String,
    pub ai: String,
    pub upload: String,
    /// Sum of the three phases.
    pub total: String,
    pub active: Option<TimerPhase>,
}

impl Default for TimersView {
    fn default() -> Self {
        Self {
            download: "00:00".to_string(),
            ai: "00:00".to_string(),
            upload: "00:00".to_string(),
            total: "00:00".to_string(),
            active: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketView {
    pub count: usize,
    pub page: usize,
    pub total_pages: usize,
    /// Rendered items of the current page, newest first.
    pub items: Vec<Item>,
}

impl Default for BucketView {
    fn default() -> Self {
        Self {
            count: 0,
            page: 1,
            total_pages: 1,
            items: Vec::new(),
        }
    }
}
