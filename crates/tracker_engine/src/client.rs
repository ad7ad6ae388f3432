use std::time::Duration;

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use serde::Serialize;
use tracker_core::{RunMessage, RunRequest};
use tracker_logging::tracker_info;

use crate::decode::decode_stream;
use crate::endpoints::execute_url;
use crate::{FailureKind, StreamError};

/// Backend address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub type RunEventStream = BoxStream<'static, Result<RunMessage, StreamError>>;

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Longest silence tolerated between two chunks. `None` waits forever,
    /// which suits long classification batches.
    pub read_timeout: Option<Duration>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ExecuteBody<'a> {
    project_id: &'a str,
    date_from: &'a str,
    date_to: &'a str,
}

/// Opens the event feed of one run.
#[async_trait::async_trait]
pub trait RunClient: Send + Sync {
    async fn open(&self, request: &RunRequest) -> Result<RunEventStream, StreamError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestRunClient {
    settings: RunSettings,
}

impl ReqwestRunClient {
    pub fn new(settings: RunSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, StreamError> {
        let mut builder = reqwest::Client::builder().connect_timeout(self.settings.connect_timeout);
        if let Some(read_timeout) = self.settings.read_timeout {
            builder = builder.read_timeout(read_timeout);
        }
        builder
            .build()
            .map_err(|err| StreamError::new(FailureKind::Network, err.to_string()))
    }
}

#[async_trait::async_trait]
impl RunClient for ReqwestRunClient {
    async fn open(&self, request: &RunRequest) -> Result<RunEventStream, StreamError> {
        let url = execute_url(&self.settings.base_url)?;
        let client = self.build_client()?;
        let body = ExecuteBody {
            project_id: &request.project_id,
            date_from: &request.date_from,
            date_to: &request.date_to,
        };

        tracker_info!(
            "POST {} project_id={} range={}..{}",
            url,
            request.project_id,
            request.date_from,
            request.date_to
        );
        let response = client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let bytes = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(map_reqwest_error)),
        );
        Ok(decode_stream(bytes).boxed())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> StreamError {
    if err.is_timeout() {
        return StreamError::new(FailureKind::Timeout, err.to_string());
    }
    StreamError::new(FailureKind::Network, err.to_string())
}
