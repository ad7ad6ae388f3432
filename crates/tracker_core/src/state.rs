use std::time::{Duration, Instant};

use crate::bucket::{Bucket, Buckets, Item, DEFAULT_PAGE_SIZE};
use crate::links::LinkCollector;
use crate::timer::{format_elapsed, PhaseTimers, TimerPhase};
use crate::view_model::{BucketView, RunViewModel, TimersView};
use crate::{Decision, RunId};

/// How long the "archive ready" notice stays up by default.
pub const DEFAULT_NOTICE_DELAY: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Downloading,
    Analyzing,
    Uploading,
    Finished,
    Errored,
}

impl RunPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunPhase::Finished | RunPhase::Errored)
    }

    pub fn is_running(self) -> bool {
        matches!(
            self,
            RunPhase::Downloading | RunPhase::Analyzing | RunPhase::Uploading
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    pub page_size: usize,
    pub notice_delay: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            notice_delay: DEFAULT_NOTICE_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveNotice {
    pub name: String,
    pub expires_at: Instant,
}

/// Everything the tracker knows about the run being observed.
///
/// Only [`crate::update`] mutates it; renderers work from [`RunState::view`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunState {
    settings: TrackerSettings,
    last_run_id: RunId,
    run_id: Option<RunId>,
    phase: RunPhase,
    grand_total: u64,
    grand_processed: u64,
    timers: PhaseTimers,
    buckets: Buckets,
    links: LinkCollector,
    final_links: Vec<String>,
    status: Option<String>,
    report: Vec<String>,
    notice: Option<ArchiveNotice>,
    last_archive: Option<String>,
    error: Option<String>,
    dirty: bool,
}

impl RunState {
    pub fn new() -> Self {
        Self::with_settings(TrackerSettings::default())
    }

    pub fn with_settings(settings: TrackerSettings) -> Self {
        Self {
            settings,
            buckets: Buckets::new(settings.page_size),
            ..Self::default()
        }
    }

    pub fn settings(&self) -> TrackerSettings {
        self.settings
    }

    pub fn run_id(&self) -> Option<RunId> {
        self.run_id
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn grand_total(&self) -> u64 {
        self.grand_total
    }

    pub fn grand_processed(&self) -> u64 {
        self.grand_processed
    }

    pub fn timers(&self) -> &PhaseTimers {
        &self.timers
    }

    pub fn bucket(&self, decision: Decision) -> &Bucket {
        self.buckets.get(decision)
    }

    pub fn links(&self) -> &LinkCollector {
        &self.links
    }

    pub fn final_links(&self) -> &[String] {
        &self.final_links
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// `round(processed / max(total, 1) * 100)`, forced to 100 once finished.
    /// Not capped.
    pub fn percent(&self) -> u64 {
        if self.phase == RunPhase::Finished {
            return 100;
        }
        let denominator = self.grand_total.max(1) as f64;
        ((self.grand_processed as f64 / denominator) * 100.0).round() as u64
    }

    /// Returns whether state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self, now: Instant) -> RunViewModel {
        RunViewModel {
            run_id: self.run_id,
            phase: self.phase,
            timers: TimersView {
                download: format_elapsed(self.timers.elapsed(TimerPhase::Download, now)),
                ai: format_elapsed(self.timers.elapsed(TimerPhase::Ai, now)),
                upload: format_elapsed(self.timers.elapsed(TimerPhase::Upload, now)),
                total: format_elapsed(self.timers.total(now)),
                active: self.timers.active(),
            },
            processed: self.grand_processed,
            total: self.grand_total,
            percent: self.percent(),
            keep: bucket_view(&self.buckets.keep),
            trash: bucket_view(&self.buckets.trash),
            links: self.links.all().to_vec(),
            final_links: self.final_links.clone(),
            status: self.status.clone(),
            notice: self
                .notice
                .as_ref()
                .filter(|notice| notice.expires_at > now)
                .map(|notice| notice.name.clone()),
            last_archive: self.last_archive.clone(),
            report: self.report.clone(),
            error: self.error.clone(),
            dirty: self.dirty,
        }
    }

    /// True when an event tagged `run_id` belongs to the live run.
    pub(crate) fn accepts(&self, run_id: RunId) -> bool {
        self.run_id == Some(run_id) && !self.phase.is_terminal()
    }

    /// Discards the previous run and starts a new one in `Downloading`.
    pub(crate) fn begin_run(&mut self, at: Instant) -> RunId {
        let run_id = self.last_run_id + 1;
        *self = Self {
            last_run_id: run_id,
            run_id: Some(run_id),
            phase: RunPhase::Downloading,
            ..Self::with_settings(self.settings)
        };
        self.timers.start(TimerPhase::Download, at);
        self.dirty = true;
        run_id
    }

    pub(crate) fn enter_phase(&mut self, phase: RunPhase, at: Instant) {
        let timer = match phase {
            RunPhase::Downloading => Some(TimerPhase::Download),
            RunPhase::Analyzing => Some(TimerPhase::Ai),
            RunPhase::Uploading => Some(TimerPhase::Upload),
            RunPhase::Idle | RunPhase::Finished | RunPhase::Errored => None,
        };
        match timer {
            Some(timer) => self.timers.switch_to(timer, at),
            None => self.timers.stop_all(at),
        }
        if self.phase != phase {
            self.phase = phase;
            self.dirty = true;
        }
    }

    pub(crate) fn add_to_total(&mut self, count: u64) {
        self.grand_total = self.grand_total.saturating_add(count);
        self.dirty = true;
    }

    pub(crate) fn record_item(&mut self, item: Item) {
        self.grand_processed += 1;
        let bucket = self.buckets.get_mut(item.decision);
        bucket.append(item.clone());
        bucket.render_newest(item);
        self.dirty = true;
    }

    pub(crate) fn add_link(&mut self, label: String, url: String) {
        self.links.add(label, url);
        self.dirty = true;
    }

    pub(crate) fn set_status(&mut self, text: String) {
        self.status = Some(text);
        self.dirty = true;
    }

    pub(crate) fn show_archive_notice(&mut self, name: String, at: Instant) {
        self.notice = Some(ArchiveNotice {
            name: name.clone(),
            expires_at: at + self.settings.notice_delay,
        });
        self.last_archive = Some(name);
        self.dirty = true;
    }

    pub(crate) fn expire_notice(&mut self, now: Instant) {
        if self
            .notice
            .as_ref()
            .is_some_and(|notice| notice.expires_at <= now)
        {
            self.notice = None;
            self.dirty = true;
        }
    }

    pub(crate) fn finish(&mut self, final_links: Vec<String>, report: Vec<String>, at: Instant) {
        self.enter_phase(RunPhase::Finished, at);
        self.final_links = final_links;
        self.report = report;
        self.dirty = true;
    }

    pub(crate) fn fail(&mut self, error: String, at: Instant) {
        self.enter_phase(RunPhase::Errored, at);
        self.error = Some(error);
        self.dirty = true;
    }

    pub(crate) fn go_to_page(&mut self, decision: Decision, page: usize) {
        if self.buckets.get_mut(decision).go_to(page) {
            self.dirty = true;
        }
    }

    pub(crate) fn step_page(&mut self, decision: Decision, delta: isize) {
        if self.buckets.get_mut(decision).step(delta) {
            self.dirty = true;
        }
    }
}

fn bucket_view(bucket: &Bucket) -> BucketView {
    BucketView {
        count: bucket.len(),
        page: bucket.current_page(),
        total_pages: bucket.total_pages(bucket.page_size()),
        items: bucket.rendered(),
    }
}
