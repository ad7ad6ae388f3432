use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use tracker_core::RunRequest;

use super::config::DEFAULT_CONFIG_FILENAME;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Trigger a photo sorting run and follow its progress.
#[derive(Debug, Parser)]
#[command(name = "tracker", version)]
pub struct Cli {
    /// Project to run.
    #[arg(long)]
    pub project_id: String,

    /// First day of the range (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last day of the range (YYYY-MM-DD). Defaults to the first day.
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    /// RON config file.
    #[arg(long, default_value = DEFAULT_CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Backend base URL, overriding the config file.
    #[arg(long)]
    pub api_url: Option<String>,

    /// Mail template to fill with the generated links once the run finishes.
    #[arg(long)]
    pub mail_template: Option<PathBuf>,

    /// Show only this page of each bucket in the final report instead of all pages.
    #[arg(long)]
    pub page: Option<usize>,
}

impl Cli {
    /// Builds the trigger request, defaulting missing dates relative to `today`.
    pub fn run_request(&self, today: NaiveDate) -> Result<RunRequest, String> {
        let from = self.from.unwrap_or(today);
        let to = self.to.unwrap_or(from);
        if to < from {
            return Err(format!("date range is reversed: {from} > {to}"));
        }
        Ok(RunRequest {
            project_id: self.project_id.trim().to_string(),
            date_from: from.format(DATE_FORMAT).to_string(),
            date_to: to.format(DATE_FORMAT).to_string(),
        })
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|err| format!("expected YYYY-MM-DD, got {raw:?}: {err}"))
}
