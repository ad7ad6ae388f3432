use std::fs;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use chrono::Local;
use tracker_core::{compose_mail, update, Decision, Msg, RunPhase, RunState};
use tracker_engine::{EngineHandle, EngineStopped};
use tracker_logging::{tracker_error, tracker_info, tracker_warn};

use super::cli::Cli;
use super::config::load_config;
use super::effects::EffectRunner;
use super::{logging, render};

/// How often timers are redrawn and notices expired.
const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Longest wait for an engine event before checking the tick.
const POLL_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(&cli.config)?;
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    logging::initialize(config.log_destination, config.level(), &config.log_file);
    tracker_info!("Using config {:?} api_url={}", cli.config, config.api_url);

    let request = cli
        .run_request(Local::now().date_naive())
        .map_err(|err| anyhow!(err))?;
    let template = cli
        .mail_template
        .as_ref()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("reading mail template {}", path.display()))
        })
        .transpose()?;

    let runner = EffectRunner::new(EngineHandle::new(config.run_settings()), &config.api_url);
    let mut state = RunState::with_settings(config.tracker_settings());
    state = dispatch(
        state,
        Msg::RunRequested {
            request,
            at: Instant::now(),
        },
        &runner,
    );

    let mut last_tick = Instant::now();
    println!("{}", render::status_line(&state.view(last_tick)));
    while !state.phase().is_terminal() {
        match runner.next_msg(POLL_INTERVAL) {
            Ok(Some(msg)) => state = dispatch(state, msg, &runner),
            Ok(None) => {}
            Err(stopped) => {
                tracker_error!("{}", stopped);
                let msg = stopped_msg(&state, stopped, Instant::now())
                    .ok_or_else(|| anyhow!(stopped))?;
                state = dispatch(state, msg, &runner);
            }
        }
        let now = Instant::now();
        if now.duration_since(last_tick) >= TICK_INTERVAL {
            state = dispatch(state, Msg::Tick { at: now }, &runner);
            if state.consume_dirty() || state.phase().is_running() {
                println!("{}", render::status_line(&state.view(now)));
            }
            last_tick = now;
        }
    }

    let view = state.view(Instant::now());
    let (_, buckets) = bucket_report(state, cli.page, &config.api_url);
    for line in render::outcome(&view)
        .into_iter()
        .chain(buckets)
        .chain(render::link_report(&config.api_url, &view))
    {
        println!("{line}");
    }

    match view.phase {
        RunPhase::Finished => {
            if let Some(template) = template {
                println!();
                println!("{}", compose_mail(&template, &render::mail_links(&view)));
            }
            Ok(())
        }
        _ => {
            let error = view.error.unwrap_or_else(|| "run stopped".to_string());
            tracker_warn!("Run ended in {:?}: {}", view.phase, error);
            Err(anyhow!("run failed: {error}"))
        }
    }
}

fn dispatch(state: RunState, msg: Msg, runner: &EffectRunner) -> RunState {
    let (state, effects) = update(state, msg);
    runner.enqueue(effects);
    state
}

/// Failure message for the live run once the engine is gone.
fn stopped_msg(state: &RunState, stopped: EngineStopped, at: Instant) -> Option<Msg> {
    Some(Msg::StreamFailed {
        run_id: state.run_id()?,
        error: stopped.to_string(),
        at,
    })
}

/// Pages through both buckets and renders every page, or only `only_page`.
fn bucket_report(
    mut state: RunState,
    only_page: Option<usize>,
    api_url: &str,
) -> (RunState, Vec<String>) {
    let mut lines = Vec::new();
    for decision in [Decision::Keep, Decision::Trash] {
        let total_pages = state
            .bucket(decision)
            .total_pages(state.settings().page_size);
        let pages = match only_page {
            Some(page) if page == 0 || page > total_pages => {
                let view = state.view(Instant::now());
                lines.push(render::missing_page(decision, page, view.bucket(decision)));
                continue;
            }
            Some(page) => page..=page,
            None => 1..=total_pages,
        };
        for page in pages {
            (state, _) = update(
                state,
                Msg::PageRequested {
                    bucket: decision,
                    page,
                },
            );
            let view = state.view(Instant::now());
            lines.extend(render::bucket_lines(api_url, decision, view.bucket(decision)));
        }
    }
    (state, lines)
}
