//! wavepetal binary entry point.

mod app;
mod audio;
mod commands;
mod config;
mod fetch;
mod logging;
mod pipeline;
mod render;
mod waveform;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
