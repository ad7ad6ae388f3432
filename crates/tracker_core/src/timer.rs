use std::time::{Duration, Instant};

/// One of the three mutually exclusive timed phases of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPhase {
    Download,
    Ai,
    Upload,
}

impl TimerPhase {
    pub const ALL: [TimerPhase; 3] = [TimerPhase::Download, TimerPhase::Ai, TimerPhase::Upload];

    fn index(self) -> usize {
        match self {
            TimerPhase::Download => 0,
            TimerPhase::Ai => 1,
            TimerPhase::Upload => 2,
        }
    }
}

/// Per-phase stopwatch with pause/resume semantics.
///
/// At most one phase runs at a time. All operations take the current instant
/// explicitly, so the multiplexer never reads the clock itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhaseTimers {
    accumulated: [Duration; 3],
    active: Option<(TimerPhase, Instant)>,
}

impl PhaseTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh measurement with `phase` running and all accumulators at zero.
    pub fn start(&mut self, phase: TimerPhase, now: Instant) {
        self.accumulated = [Duration::ZERO; 3];
        self.active = Some((phase, now));
    }

    /// Pauses the running phase and resumes `phase` from its own accumulator.
    pub fn switch_to(&mut self, phase: TimerPhase, now: Instant) {
        if self.active().is_some_and(|current| current == phase) {
            return;
        }
        self.flush(now);
        self.active = Some((phase, now));
    }

    /// Freezes every accumulator; nothing runs afterwards.
    pub fn stop_all(&mut self, now: Instant) {
        self.flush(now);
        self.active = None;
    }

    pub fn active(&self) -> Option<TimerPhase> {
        self.active.map(|(phase, _)| phase)
    }

    pub fn elapsed(&self, phase: TimerPhase, now: Instant) -> Duration {
        let base = self.accumulated[phase.index()];
        match self.active {
            Some((running, since)) if running == phase => {
                base + now.saturating_duration_since(since)
            }
            _ => base,
        }
    }

    pub fn total(&self, now: Instant) -> Duration {
        TimerPhase::ALL
            .iter()
            .map(|phase| self.elapsed(*phase, now))
            .sum()
    }

    fn flush(&mut self, now: Instant) {
        if let Some((phase, since)) = self.active.take() {
            self.accumulated[phase.index()] += now.saturating_duration_since(since);
        }
    }
}

/// Formats whole elapsed seconds as `mm:ss`.
///
/// Minutes are never wrapped into hours: 2 hours and 5 seconds renders as `120:05`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
