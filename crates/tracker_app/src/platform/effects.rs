use std::time::{Duration, Instant};

use tracker_core::{Effect, Msg};
use tracker_engine::{EngineEvent, EngineHandle, EngineStopped};
use tracker_logging::{tracker_error, tracker_info, tracker_warn};

use super::render;

pub struct EffectRunner {
    engine: EngineHandle,
    api_url: String,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, api_url: impl Into<String>) -> Self {
        Self {
            engine,
            api_url: api_url.into(),
        }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartRun { run_id, request } => {
                    tracker_info!(
                        "StartRun run_id={} project_id={} range={}..{}",
                        run_id,
                        request.project_id,
                        request.date_from,
                        request.date_to
                    );
                    if let Err(err) = self.engine.start_run(run_id, request) {
                        tracker_warn!("StartRun run_id={} not delivered: {}", run_id, err);
                    }
                }
                Effect::AbandonRun { run_id } => {
                    tracker_info!("AbandonRun run_id={}", run_id);
                    if let Err(err) = self.engine.abandon(run_id) {
                        tracker_warn!("AbandonRun run_id={} not delivered: {}", run_id, err);
                    }
                }
                Effect::ArchiveReady {
                    name,
                    dismiss_after,
                } => {
                    tracker_info!(
                        "ArchiveReady name={} dismiss_after={}s",
                        name,
                        dismiss_after.as_secs()
                    );
                    println!("{}", render::archive_notice(&self.api_url, &name));
                }
                Effect::RunFinished { final_links } => {
                    tracker_info!("RunFinished links={}", final_links.len());
                }
                Effect::RunFailed { error } => {
                    tracker_error!("RunFailed error={}", error);
                }
            }
        }
    }

    /// Waits up to `wait` for the next engine event, as a message.
    pub fn next_msg(&self, wait: Duration) -> Result<Option<Msg>, EngineStopped> {
        Ok(self
            .engine
            .recv_timeout(wait)?
            .map(|event| to_msg(event, Instant::now())))
    }
}

fn to_msg(event: EngineEvent, at: Instant) -> Msg {
    match event {
        EngineEvent::Message { run_id, message } => Msg::Received {
            run_id,
            message,
            at,
        },
        EngineEvent::Failed { run_id, error } => Msg::StreamFailed {
            run_id,
            error: error.to_string(),
            at,
        },
        EngineEvent::Ended { run_id } => Msg::StreamEnded { run_id, at },
    }
}
