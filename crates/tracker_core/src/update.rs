use std::time::Instant;

use crate::links::DEFAULT_LINK_LABEL;
use crate::{Effect, Item, Msg, RunMessage, RunPhase, RunState};

/// Log prefix the backend uses when an archive has been written.
pub const ZIP_CREATED_MARKER: &str = "Utworzono ZIP: ";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: RunState, msg: Msg) -> (RunState, Vec<Effect>) {
    let effects = match msg {
        Msg::RunRequested { request, at } => {
            let previous = state.run_id().filter(|_| state.phase().is_running());
            let run_id = state.begin_run(at);
            let mut effects = Vec::with_capacity(2);
            if let Some(previous) = previous {
                effects.push(Effect::AbandonRun { run_id: previous });
            }
            effects.push(Effect::StartRun { run_id, request });
            effects
        }
        Msg::Received {
            run_id,
            message,
            at,
        } => {
            if !state.accepts(run_id) {
                return (state, Vec::new());
            }
            apply_message(&mut state, message, at)
        }
        Msg::StreamFailed { run_id, error, at } => {
            if !state.accepts(run_id) {
                return (state, Vec::new());
            }
            state.fail(error.clone(), at);
            vec![Effect::RunFailed { error }]
        }
        Msg::StreamEnded { run_id, at } => {
            if !state.accepts(run_id) {
                return (state, Vec::new());
            }
            let error = "stream ended before completion".to_string();
            state.fail(error.clone(), at);
            vec![Effect::RunFailed { error }]
        }
        Msg::PageRequested { bucket, page } => {
            state.go_to_page(bucket, page);
            Vec::new()
        }
        Msg::PageStepped { bucket, delta } => {
            state.step_page(bucket, delta);
            Vec::new()
        }
        Msg::Tick { at } => {
            state.expire_notice(at);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn apply_message(state: &mut RunState, message: RunMessage, at: Instant) -> Vec<Effect> {
    match message {
        RunMessage::Log { text } => {
            let effect = archive_notice(state, &text, at);
            state.set_status(text);
            effect.into_iter().collect()
        }
        RunMessage::SetTotal { count, .. } => {
            state.enter_phase(RunPhase::Analyzing, at);
            state.add_to_total(count);
            Vec::new()
        }
        RunMessage::UploadStart { .. } => {
            state.enter_phase(RunPhase::Uploading, at);
            Vec::new()
        }
        RunMessage::LinkResult { folder_label, link } => {
            let label = folder_label
                .filter(|label| !label.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LINK_LABEL.to_string());
            state.add_link(label, link);
            Vec::new()
        }
        RunMessage::ImageResult {
            file,
            path,
            decision,
            reason,
            ..
        } => {
            state.record_item(Item {
                file,
                source_path: path,
                decision,
                reason,
            });
            Vec::new()
        }
        RunMessage::Done {
            text,
            s3_link,
            s3_links,
            report,
        } => {
            let mut effects = Vec::new();
            if let Some(text) = text {
                effects.extend(archive_notice(state, &text, at));
                state.set_status(text);
            }
            let final_links = resolve_final_links(s3_link, s3_links);
            state.finish(final_links.clone(), report, at);
            effects.push(Effect::RunFinished { final_links });
            effects
        }
        RunMessage::Error { text } => {
            state.fail(text.clone(), at);
            vec![Effect::RunFailed { error: text }]
        }
    }
}

fn archive_notice(state: &mut RunState, text: &str, at: Instant) -> Option<Effect> {
    let name = text.strip_prefix(ZIP_CREATED_MARKER)?.trim();
    if name.is_empty() {
        return None;
    }
    state.show_archive_notice(name.to_string(), at);
    Some(Effect::ArchiveReady {
        name: name.to_string(),
        dismiss_after: state.settings().notice_delay,
    })
}

/// Multi-link form wins when non-empty, then the legacy single link, then nothing.
pub fn resolve_final_links(s3_link: Option<String>, s3_links: Option<Vec<String>>) -> Vec<String> {
    match s3_links {
        Some(links) if !links.is_empty() => links,
        _ => s3_link
            .filter(|link| !link.is_empty())
            .into_iter()
            .collect(),
    }
}
