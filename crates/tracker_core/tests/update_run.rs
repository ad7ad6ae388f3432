use std::sync::Once;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use tracker_core::{
    update, Decision, Effect, LinkEntry, Msg, RunId, RunMessage, RunPhase, RunRequest, RunState,
    TimerPhase, DEFAULT_LINK_LABEL,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(tracker_logging::initialize_for_tests);
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn request() -> RunRequest {
    RunRequest {
        project_id: "p-1".to_string(),
        date_from: "2025-03-01".to_string(),
        date_to: "2025-03-02".to_string(),
    }
}

fn image(n: usize, decision: Decision) -> RunMessage {
    RunMessage::ImageResult {
        file: format!("img_{n}.jpg"),
        path: format!("/tmp/sorted/img_{n}.jpg"),
        decision,
        reason: None,
        current: 1,
        total: 1,
    }
}

fn done(s3_link: Option<&str>, s3_links: Option<Vec<&str>>) -> RunMessage {
    RunMessage::Done {
        text: Some("Wszystkie zadania zakończone!".to_string()),
        s3_link: s3_link.map(str::to_string),
        s3_links: s3_links.map(|links| links.into_iter().map(str::to_string).collect()),
        report: Vec::new(),
    }
}

fn start(at: Instant) -> (RunState, RunId) {
    let (state, effects) = update(RunState::new(), Msg::RunRequested { request: request(), at });
    let run_id = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::StartRun { run_id, .. } => Some(*run_id),
            _ => None,
        })
        .expect("start effect");
    (state, run_id)
}

fn feed(state: RunState, run_id: RunId, message: RunMessage, at: Instant) -> (RunState, Vec<Effect>) {
    update(
        state,
        Msg::Received {
            run_id,
            message,
            at,
        },
    )
}

#[test]
fn full_run_ends_finished_with_everything_accounted() {
    init_logging();
    let t0 = Instant::now();
    let (state, run_id) = start(t0);
    assert_eq!(state.phase(), RunPhase::Downloading);
    assert_eq!(state.timers().active(), Some(TimerPhase::Download));

    let (mut state, _) = feed(
        state,
        run_id,
        RunMessage::SetTotal {
            count: 10,
            folder: Some("Sklepy".to_string()),
        },
        t0 + secs(5),
    );
    assert_eq!(state.phase(), RunPhase::Analyzing);

    let pattern = [
        Decision::Keep,
        Decision::Trash,
        Decision::Keep,
        Decision::Keep,
        Decision::Trash,
        Decision::Keep,
        Decision::Trash,
        Decision::Keep,
        Decision::Keep,
        Decision::Trash,
    ];
    for (n, decision) in pattern.iter().enumerate() {
        let (next, effects) = feed(state, run_id, image(n + 1, *decision), t0 + secs(6 + n as u64));
        assert!(effects.is_empty());
        state = next;
    }

    let (state, effects) = feed(state, run_id, done(Some("https://x"), None), t0 + secs(30));
    assert_eq!(
        effects,
        vec![Effect::RunFinished {
            final_links: vec!["https://x".to_string()],
        }]
    );

    let view = state.view(t0 + secs(90));
    assert_eq!(view.phase, RunPhase::Finished);
    assert_eq!(view.total, 10);
    assert_eq!(view.processed, 10);
    assert_eq!(view.percent, 100);
    assert_eq!(view.keep.count, 6);
    assert_eq!(view.trash.count, 4);
    assert_eq!(view.keep.total_pages, 1);
    let keep_files: Vec<_> = view.keep.items.iter().map(|item| item.file.as_str()).collect();
    assert_eq!(
        keep_files,
        vec!["img_9.jpg", "img_8.jpg", "img_6.jpg", "img_4.jpg", "img_3.jpg", "img_1.jpg"]
    );
    assert_eq!(view.final_links, vec!["https://x".to_string()]);
    assert_eq!(view.timers.download, "00:05");
    assert_eq!(view.timers.ai, "00:25");
    assert_eq!(view.timers.upload, "00:00");
    assert_eq!(view.timers.total, "00:30");
    assert_eq!(view.timers.active, None);
    assert_eq!(view.status.as_deref(), Some("Wszystkie zadania zakończone!"));
}

#[test]
fn totals_accumulate_across_sub_batches() {
    init_logging();
    let t0 = Instant::now();
    let (mut state, run_id) = start(t0);

    let script = vec![
        RunMessage::SetTotal { count: 4, folder: None },
        image(1, Decision::Keep),
        RunMessage::UploadStart { folder: None },
        RunMessage::Log {
            text: "Pobieranie plików: B...".to_string(),
        },
        RunMessage::SetTotal { count: 0, folder: None },
        image(2, Decision::Trash),
        RunMessage::SetTotal { count: 7, folder: None },
        image(3, Decision::Trash),
    ];
    for (n, message) in script.into_iter().enumerate() {
        let (next, _) = feed(state, run_id, message, t0 + secs(n as u64));
        state = next;
    }

    assert_eq!(state.grand_total(), 11);
    assert_eq!(state.grand_processed(), 3);
    assert_eq!(
        state.bucket(Decision::Keep).len() + state.bucket(Decision::Trash).len(),
        3
    );
    assert_eq!(state.phase(), RunPhase::Analyzing);
    assert_eq!(state.percent(), 27);
}

#[test]
fn advisory_counters_do_not_drive_processed() {
    let t0 = Instant::now();
    let (state, run_id) = start(t0);
    let (state, _) = feed(state, run_id, RunMessage::SetTotal { count: 2, folder: None }, t0);
    let message = RunMessage::ImageResult {
        file: "a.jpg".to_string(),
        path: "/a.jpg".to_string(),
        decision: Decision::Keep,
        reason: Some("blurry".to_string()),
        current: 40,
        total: 50,
    };
    let (state, _) = feed(state, run_id, message, t0);

    assert_eq!(state.grand_processed(), 1);
    assert_eq!(state.grand_total(), 2);
    assert_eq!(state.percent(), 50);
    let page = state.bucket(Decision::Keep).page(1, 15);
    let stored = &page.items[0];
    assert_eq!(stored.reason.as_deref(), Some("blurry"));
    assert_eq!(stored.source_path, "/a.jpg");
}

#[test]
fn percent_before_total_uses_unit_denominator() {
    let t0 = Instant::now();
    let (state, run_id) = start(t0);
    let (state, _) = feed(state, run_id, image(1, Decision::Keep), t0);
    assert_eq!(state.percent(), 100);
    let (state, _) = feed(state, run_id, image(2, Decision::Keep), t0);
    assert_eq!(state.percent(), 200);

    let (state, _) = feed(state, run_id, RunMessage::SetTotal { count: 8, folder: None }, t0);
    assert_eq!(state.percent(), 25);
}

#[test]
fn upload_and_analysis_alternate_across_batches() {
    let t0 = Instant::now();
    let (state, run_id) = start(t0);
    let (state, _) = feed(state, run_id, RunMessage::SetTotal { count: 1, folder: None }, t0 + secs(2));
    let (state, _) = feed(state, run_id, RunMessage::UploadStart { folder: None }, t0 + secs(4));
    assert_eq!(state.phase(), RunPhase::Uploading);
    let (state, _) = feed(state, run_id, RunMessage::SetTotal { count: 1, folder: None }, t0 + secs(7));
    assert_eq!(state.phase(), RunPhase::Analyzing);
    let (state, _) = feed(state, run_id, RunMessage::UploadStart { folder: None }, t0 + secs(8));

    let timers = state.timers();
    assert_eq!(timers.elapsed(TimerPhase::Download, t0 + secs(10)), secs(2));
    assert_eq!(timers.elapsed(TimerPhase::Ai, t0 + secs(10)), secs(3));
    assert_eq!(timers.elapsed(TimerPhase::Upload, t0 + secs(10)), secs(5));
}

#[test]
fn multi_link_form_wins_over_legacy_link() {
    let t0 = Instant::now();
    let (state, run_id) = start(t0);
    let (state, _) = feed(state, run_id, done(Some("legacy"), Some(vec!["a", "b"])), t0);
    assert_eq!(state.final_links(), ["a".to_string(), "b".to_string()]);
}

#[test]
fn empty_multi_link_form_falls_back_to_legacy_link() {
    let t0 = Instant::now();
    let (state, run_id) = start(t0);
    let (state, _) = feed(state, run_id, done(Some("legacy"), Some(Vec::new())), t0);
    assert_eq!(state.final_links(), ["legacy".to_string()]);
}

#[test]
fn done_without_links_resolves_to_empty() {
    let t0 = Instant::now();
    let (state, run_id) = start(t0);
    let (state, effects) = feed(state, run_id, done(None, None), t0);
    assert!(state.final_links().is_empty());
    assert_eq!(effects, vec![Effect::RunFinished { final_links: Vec::new() }]);
    assert!(state.view(t0).final_links.is_empty());
}

#[test]
fn messages_after_finish_are_ignored() {
    let t0 = Instant::now();
    let (state, run_id) = start(t0);
    let (state, _) = feed(state, run_id, done(None, None), t0);
    let snapshot = state.clone();

    let (state, effects) = feed(state, run_id, image(1, Decision::Keep), t0 + secs(1));
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::StreamEnded { run_id, at: t0 + secs(2) });
    assert!(effects.is_empty());
    assert_eq!(state, snapshot);
}

#[test]
fn link_results_keep_order_and_default_label() {
    let t0 = Instant::now();
    let (state, run_id) = start(t0);
    let (state, _) = feed(
        state,
        run_id,
        RunMessage::LinkResult {
            folder_label: Some("Raport B".to_string()),
            link: "https://b".to_string(),
        },
        t0,
    );
    let (state, _) = feed(
        state,
        run_id,
        RunMessage::LinkResult {
            folder_label: None,
            link: "https://a".to_string(),
        },
        t0,
    );
    let (state, _) = feed(
        state,
        run_id,
        RunMessage::LinkResult {
            folder_label: Some("  ".to_string()),
            link: "not a url".to_string(),
        },
        t0,
    );

    assert_eq!(state.phase(), RunPhase::Downloading);
    assert_eq!(
        state.links().all(),
        [
            LinkEntry {
                label: "Raport B".to_string(),
                url: "https://b".to_string(),
            },
            LinkEntry {
                label: DEFAULT_LINK_LABEL.to_string(),
                url: "https://a".to_string(),
            },
            LinkEntry {
                label: DEFAULT_LINK_LABEL.to_string(),
                url: "not a url".to_string(),
            },
        ]
    );
}

#[test]
fn zip_marker_shows_notice_until_it_expires() {
    let t0 = Instant::now();
    let (state, run_id) = start(t0);
    let (state, effects) = feed(
        state,
        run_id,
        RunMessage::Log {
            text: "Utworzono ZIP: Nivea 2025-03-01_2025-03-02.zip".to_string(),
        },
        t0,
    );
    assert_eq!(
        effects,
        vec![Effect::ArchiveReady {
            name: "Nivea 2025-03-01_2025-03-02.zip".to_string(),
            dismiss_after: secs(6),
        }]
    );
    assert_eq!(
        state.view(t0 + secs(1)).notice.as_deref(),
        Some("Nivea 2025-03-01_2025-03-02.zip")
    );

    let (mut state, _) = update(state, Msg::Tick { at: t0 + secs(3) });
    assert!(state.view(t0 + secs(3)).notice.is_some());
    state.consume_dirty();

    let (mut state, _) = update(state, Msg::Tick { at: t0 + secs(6) });
    assert!(state.consume_dirty());
    let view = state.view(t0 + secs(6));
    assert_eq!(view.notice, None);
    assert_eq!(view.last_archive.as_deref(), Some("Nivea 2025-03-01_2025-03-02.zip"));
    assert_eq!(view.phase, RunPhase::Downloading);
}

#[test]
fn plain_log_only_updates_status() {
    let t0 = Instant::now();
    let (state, run_id) = start(t0);
    let (state, effects) = feed(
        state,
        run_id,
        RunMessage::Log {
            text: "Łączenie z FTP...".to_string(),
        },
        t0,
    );
    assert!(effects.is_empty());
    let view = state.view(t0);
    assert_eq!(view.status.as_deref(), Some("Łączenie z FTP..."));
    assert_eq!(view.notice, None);
}

#[test]
fn transport_failure_moves_to_errored_and_stops_timers() {
    init_logging();
    let t0 = Instant::now();
    let (state, run_id) = start(t0);
    let (state, _) = feed(state, run_id, RunMessage::SetTotal { count: 3, folder: None }, t0 + secs(1));
    let (state, effects) = update(
        state,
        Msg::StreamFailed {
            run_id,
            error: "connection reset".to_string(),
            at: t0 + secs(4),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::RunFailed {
            error: "connection reset".to_string(),
        }]
    );
    assert_eq!(state.phase(), RunPhase::Errored);
    assert_eq!(state.error(), Some("connection reset"));
    assert_eq!(state.timers().active(), None);
    assert_eq!(state.timers().elapsed(TimerPhase::Ai, t0 + secs(60)), secs(3));
    assert_eq!(state.grand_total(), 3);
}

#[test]
fn stream_closing_without_done_is_an_error() {
    let t0 = Instant::now();
    let (state, run_id) = start(t0);
    let (state, effects) = update(state, Msg::StreamEnded { run_id, at: t0 });
    assert_eq!(state.phase(), RunPhase::Errored);
    assert_eq!(
        effects,
        vec![Effect::RunFailed {
            error: "stream ended before completion".to_string(),
        }]
    );
}

#[test]
fn backend_error_payload_is_terminal() {
    let t0 = Instant::now();
    let (state, run_id) = start(t0);
    let (state, _) = feed(
        state,
        run_id,
        RunMessage::Error {
            text: "Brak hasła FTP".to_string(),
        },
        t0,
    );
    assert_eq!(state.phase(), RunPhase::Errored);
    assert_eq!(state.view(t0).error.as_deref(), Some("Brak hasła FTP"));

    let (state, _) = feed(state, run_id, done(Some("x"), None), t0);
    assert_eq!(state.phase(), RunPhase::Errored);
}

#[test]
fn new_run_abandons_previous_and_drops_stale_events() {
    let t0 = Instant::now();
    let (state, first) = start(t0);
    let (state, _) = feed(state, first, image(1, Decision::Keep), t0);

    let (state, effects) = update(
        state,
        Msg::RunRequested {
            request: request(),
            at: t0 + secs(1),
        },
    );
    let second = first + 1;
    assert_eq!(
        effects,
        vec![
            Effect::AbandonRun { run_id: first },
            Effect::StartRun {
                run_id: second,
                request: request(),
            },
        ]
    );
    assert_eq!(state.grand_processed(), 0);
    assert!(state.bucket(Decision::Keep).is_empty());

    let (state, effects) = feed(state, first, image(2, Decision::Keep), t0 + secs(2));
    assert!(effects.is_empty());
    assert_eq!(state.grand_processed(), 0);
    assert_eq!(state.run_id(), Some(second));
}

#[test]
fn rerun_after_finish_does_not_abandon() {
    let t0 = Instant::now();
    let (state, run_id) = start(t0);
    let (state, _) = feed(state, run_id, done(None, None), t0);
    let (state, effects) = update(state, Msg::RunRequested { request: request(), at: t0 });
    assert_eq!(effects.len(), 1);
    assert_eq!(state.phase(), RunPhase::Downloading);
    assert!(state.final_links().is_empty());
}

#[test]
fn paging_through_a_growing_bucket() {
    let t0 = Instant::now();
    let (mut state, run_id) = start(t0);
    for n in 1..=18 {
        let (next, _) = feed(state, run_id, image(n, Decision::Keep), t0);
        state = next;
    }
    let view = state.view(t0);
    assert_eq!(view.keep.items.len(), 15);
    assert_eq!(view.keep.items[0].file, "img_18.jpg");
    assert_eq!(view.keep.total_pages, 2);

    let (state, _) = update(
        state,
        Msg::PageStepped {
            bucket: Decision::Keep,
            delta: 1,
        },
    );
    let files: Vec<_> = state
        .view(t0)
        .keep
        .items
        .iter()
        .map(|item| item.file.clone())
        .collect();
    assert_eq!(files, vec!["img_3.jpg", "img_2.jpg", "img_1.jpg"]);

    let (state, _) = update(
        state,
        Msg::PageStepped {
            bucket: Decision::Keep,
            delta: 1,
        },
    );
    assert_eq!(state.view(t0).keep.page, 2);

    let (state, _) = feed(state, run_id, image(19, Decision::Keep), t0);
    assert_eq!(state.view(t0).keep.items.len(), 3);

    let (state, _) = update(
        state,
        Msg::PageRequested {
            bucket: Decision::Keep,
            page: 1,
        },
    );
    let view = state.view(t0);
    assert_eq!(view.keep.page, 1);
    assert_eq!(view.keep.items[0].file, "img_19.jpg");
    assert_eq!(view.keep.items[14].file, "img_5.jpg");
}
