//! Tracker engine: feed decoding, HTTP transport and the background run loop.
mod client;
mod decode;
mod endpoints;
mod engine;
mod types;

pub use client::{
    ReqwestRunClient, RunClient, RunEventStream, RunSettings, DEFAULT_BASE_URL,
};
pub use decode::{decode_stream, decode_unit, EventDecoder, DATA_PREFIX};
pub use endpoints::{archive_download_url, execute_url, thumbnail_url};
pub use engine::EngineHandle;
pub use types::{EngineEvent, EngineStopped, FailureKind, StreamError};
