//! Print stream and envelope statistics for an audio source.
//!
//! Fetches and decodes the source like `render` does, but prints the decoded
//! stream properties and envelope statistics instead of painting an image.
//! Useful for checking what the renderer would be working with.

use std::time::Duration;

use crate::config::WavepetalConfig;
use crate::fetch::LoadState;
use crate::pipeline::{AudioPipeline, Source};
use crate::waveform::{extract, normalize, SAMPLES};

/// Handles the `info` command.
///
/// # Arguments
/// * `source` - URL or local path of the audio resource
///
/// # Errors
/// - If the configuration is malformed
/// - If the load fails (transport or decode)
pub async fn handle_info(source: String) -> anyhow::Result<()> {
    tracing::info!("=== wavepetal Info Command ===");

    let config = WavepetalConfig::load()?;
    let source = Source::parse(&source);

    let mut pipeline = AudioPipeline::new(Duration::from_secs(config.fetch.timeout_secs));
    let (generation, signal) = pipeline.restart();

    if let Some(handle) = pipeline.cancel_handle() {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.cancel();
            }
        });
    }

    let audio = match pipeline.run(generation, &source, signal).await {
        LoadState::Loaded(audio) => audio.clone(),
        LoadState::Failed(message) => return Err(anyhow::anyhow!("{message}")),
        _ => return Ok(()),
    };

    let envelope = extract(&audio);
    let envelope_max = envelope.max();
    let envelope_mean = if envelope.is_empty() {
        0.0
    } else {
        envelope.values().iter().sum::<f32>() / envelope.len() as f32
    };
    let normalized = normalize(envelope);
    let silent_blocks = normalized.values().iter().filter(|v| **v == 0.0).count();

    println!();
    println!("Source:          {source}");
    println!("Sample rate:     {} Hz", audio.sample_rate());
    println!("Channels:        {}", audio.channel_count());
    println!("Frames:          {}", audio.frames());
    println!("Duration:        {:.2} s", audio.duration_secs());
    println!("Peak amplitude:  {:.4}", audio.peak());
    println!();
    println!("Envelope blocks: {SAMPLES}");
    println!("Envelope max:    {envelope_max:.4}");
    println!("Envelope mean:   {envelope_mean:.4}");
    println!("Silent blocks:   {silent_blocks}");

    Ok(())
}
