use tracker_core::{BucketView, Decision, LinkEntry, RunPhase, RunViewModel, DEFAULT_LINK_LABEL};
use tracker_engine::{archive_download_url, thumbnail_url};

/// Folder the backend writes archives into, as shown to the user.
const ARCHIVE_FOLDER: &str = "Dokumenty/Sorted Photos";

/// One-line live progress, redrawn once per tick.
pub fn status_line(view: &RunViewModel) -> String {
    let mut line = format!(
        "[{}] DL {} | AI {} | UP {} | {} / {} ({}%) | keep {} | trash {}",
        phase_label(view.phase),
        view.timers.download,
        view.timers.ai,
        view.timers.upload,
        format_with_commas(view.processed),
        format_with_commas(view.total),
        view.percent,
        view.keep.count,
        view.trash.count,
    );
    if let Some(status) = &view.status {
        line.push_str(" | ");
        line.push_str(status);
    }
    line
}

pub fn archive_notice(api_url: &str, name: &str) -> String {
    match archive_download_url(api_url, name) {
        Ok(url) => format!("Archive ready: {ARCHIVE_FOLDER}/{name} ({url})"),
        Err(_) => format!("Archive ready: {ARCHIVE_FOLDER}/{name}"),
    }
}

/// Lines opening the final report: last status, failure and backend report.
pub fn outcome(view: &RunViewModel) -> Vec<String> {
    let mut lines = vec![status_line(view)];
    lines.push(format!("Total time {}", view.timers.total));
    if let Some(error) = &view.error {
        lines.push(format!("Run failed: {error}"));
    }
    lines.extend(view.report.iter().cloned());
    lines
}

/// Lines closing the final report: labelled links, final links and the archive.
pub fn link_report(api_url: &str, view: &RunViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    if !view.links.is_empty() {
        lines.push("Links:".to_string());
        lines.extend(view.links.iter().map(|entry| format!("  {}", entry.mail_line())));
    }
    match view.final_links.as_slice() {
        [] if view.phase == RunPhase::Finished => lines.push("No photo link generated.".to_string()),
        [] => {}
        links => {
            lines.push("Final links:".to_string());
            lines.extend(links.iter().map(|link| format!("  {link}")));
        }
    }
    if let Some(archive) = &view.last_archive {
        lines.push(archive_notice(api_url, archive));
    }
    lines
}

pub fn bucket_title(decision: Decision) -> &'static str {
    match decision {
        Decision::Keep => "Keep",
        Decision::Trash => "Trash",
    }
}

/// Header and items of the page `bucket` currently shows.
pub fn bucket_lines(api_url: &str, decision: Decision, bucket: &BucketView) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}) - page {} / {}",
        bucket_title(decision),
        bucket.count,
        bucket.page,
        bucket.total_pages
    )];
    for item in &bucket.items {
        let source = thumbnail_url(api_url, &item.source_path)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| item.source_path.clone());
        match &item.reason {
            Some(reason) => lines.push(format!("  {} [{reason}] {source}", item.file)),
            None => lines.push(format!("  {} {source}", item.file)),
        }
    }
    lines
}

pub fn missing_page(decision: Decision, page: usize, bucket: &BucketView) -> String {
    format!(
        "{} ({}) - no page {page}, {} available",
        bucket_title(decision),
        bucket.count,
        bucket.total_pages
    )
}

/// Links to hand to the mail composer: the labelled ones, or the final links
/// under the default label when the backend sent no labelled link.
pub fn mail_links(view: &RunViewModel) -> Vec<LinkEntry> {
    if !view.links.is_empty() {
        return view.links.clone();
    }
    view.final_links
        .iter()
        .map(|url| LinkEntry {
            label: DEFAULT_LINK_LABEL.to_string(),
            url: url.clone(),
        })
        .collect()
}

pub fn phase_label(phase: RunPhase) -> &'static str {
    match phase {
        RunPhase::Idle => "Idle",
        RunPhase::Downloading => "Downloading",
        RunPhase::Analyzing => "Analyzing",
        RunPhase::Uploading => "Uploading",
        RunPhase::Finished => "Finished",
        RunPhase::Errored => "Errored",
    }
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
