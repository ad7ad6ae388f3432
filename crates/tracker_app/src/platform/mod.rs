mod app;
pub mod cli;
mod config;
mod effects;
mod logging;
mod render;

pub use app::run_app;
