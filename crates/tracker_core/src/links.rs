use once_cell::sync::Lazy;
use regex::Regex;

/// Label used when the backend reports a link without a folder name.
pub const DEFAULT_LINK_LABEL: &str = "Zdjęcia";

static BLANK_LINE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[ \t]*\r?\n){2,}").expect("valid blank line regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub label: String,
    pub url: String,
}

impl LinkEntry {
    /// The `label: url` line substituted into outgoing mail.
    pub fn mail_line(&self) -> String {
        format!("{}: {}", self.label, self.url)
    }
}

/// Ordered, append-only list of generated resource links.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkCollector {
    entries: Vec<LinkEntry>,
}

impl LinkCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: impl Into<String>, url: impl Into<String>) {
        self.entries.push(LinkEntry {
            label: label.into(),
            url: url.into(),
        });
    }

    pub fn all(&self) -> &[LinkEntry] {
        &self.entries
    }
}

/// Fills a mail template with collected links.
///
/// Each `{label}` placeholder is replaced by `label: url` for the first link
/// carrying that label. Links without a matching placeholder are appended at
/// the end, one per line. Runs of blank lines collapse to a single blank line.
pub fn compose_mail(template: &str, links: &[LinkEntry]) -> String {
    let mut body = template.to_string();
    let mut unmatched = Vec::new();

    for entry in links {
        let placeholder = format!("{{{}}}", entry.label);
        if body.contains(&placeholder) {
            body = body.replacen(&placeholder, &entry.mail_line(), 1);
        } else {
            unmatched.push(entry.mail_line());
        }
    }

    if !unmatched.is_empty() {
        if !body.is_empty() && !body.ends_with('\n') {
            body.push('\n');
        }
        for line in unmatched {
            body.push_str(&line);
            body.push('\n');
        }
    }

    BLANK_LINE_RUNS.replace_all(&body, "\n\n").into_owned()
}
