use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracker_core::{RunId, RunRequest};
use tracker_logging::{tracker_debug, tracker_error, tracker_info, tracker_warn};

use crate::client::{ReqwestRunClient, RunClient, RunSettings};
use crate::{EngineEvent, EngineStopped};

enum EngineCommand {
    Start { run_id: RunId, request: RunRequest },
    Abandon { run_id: RunId },
}

/// Runs feeds on a background tokio runtime and hands their events back over a channel.
///
/// Only one run is observed at a time: starting a run stops reading any
/// earlier one. The backend is not told; the client just stops listening.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: RunSettings) -> Self {
        Self::with_client(Arc::new(ReqwestRunClient::new(settings)))
    }

    pub fn with_client(client: Arc<dyn RunClient>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    tracker_error!("Engine could not build its tokio runtime: {}", err);
                    return;
                }
            };
            let mut active: HashMap<RunId, CancellationToken> = HashMap::new();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Start { run_id, request } => {
                        for (previous, token) in active.drain() {
                            tracker_debug!("Run {} superseded by run {}", previous, run_id);
                            token.cancel();
                        }
                        let token = CancellationToken::new();
                        active.insert(run_id, token.clone());
                        let client = client.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            drive_run(client.as_ref(), run_id, request, token, event_tx).await;
                        });
                    }
                    EngineCommand::Abandon { run_id } => {
                        if let Some(token) = active.remove(&run_id) {
                            token.cancel();
                        }
                    }
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn start_run(&self, run_id: RunId, request: RunRequest) -> Result<(), EngineStopped> {
        self.cmd_tx
            .send(EngineCommand::Start { run_id, request })
            .map_err(|_| EngineStopped)
    }

    pub fn abandon(&self, run_id: RunId) -> Result<(), EngineStopped> {
        self.cmd_tx
            .send(EngineCommand::Abandon { run_id })
            .map_err(|_| EngineStopped)
    }

    /// Waits up to `timeout` for the next event. `Ok(None)` means nothing
    /// arrived in time.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineStopped> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(EngineStopped),
        }
    }
}

async fn drive_run(
    client: &dyn RunClient,
    run_id: RunId,
    request: RunRequest,
    token: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    tracker_info!("Run {} started for project {}", run_id, request.project_id);
    let opened = tokio::select! {
        _ = token.cancelled() => {
            tracker_info!("Run {} abandoned before the feed opened", run_id);
            return;
        }
        opened = client.open(&request) => opened,
    };
    let mut events = match opened {
        Ok(events) => events,
        Err(error) => {
            tracker_warn!("Run {} could not start: {}", run_id, error);
            let _ = event_tx.send(EngineEvent::Failed { run_id, error });
            return;
        }
    };

    let mut received = 0usize;
    loop {
        let next = tokio::select! {
            _ = token.cancelled() => {
                tracker_info!("Run {} abandoned after {} events", run_id, received);
                return;
            }
            next = events.next() => next,
        };
        let event = match next {
            Some(Ok(message)) => {
                received += 1;
                EngineEvent::Message { run_id, message }
            }
            Some(Err(error)) => {
                tracker_warn!("Run {} feed failed after {} events: {}", run_id, received, error);
                EngineEvent::Failed { run_id, error }
            }
            None => {
                tracker_info!("Run {} feed closed after {} events", run_id, received);
                EngineEvent::Ended { run_id }
            }
        };
        let last = !matches!(event, EngineEvent::Message { .. });
        if event_tx.send(event).is_err() || last {
            return;
        }
    }
}
