//! Render a waveform image from an audio source.
//!
//! Runs the full pipeline — fetch, decode, extract, normalize, paint — and
//! writes the result as a PNG. The output path is printed to stdout so it
//! can be piped into other commands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay};

use crate::config::WavepetalConfig;
use crate::pipeline::{AudioPipeline, Source};
use crate::render::{draw_waveform, PetalStyle, Viewport};
use crate::waveform::{extract, normalize, NormalizedEnvelope};

/// Command-line overrides applied on top of the configuration file.
#[derive(Debug, Default, Clone)]
pub struct RenderOptions {
    pub output: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pixel_scale: Option<f32>,
    pub color: Option<String>,
}

/// Handles the `render` command.
///
/// # Arguments
/// * `source` - URL or local path of the audio resource
/// * `options` - CLI overrides for output path, viewport, and color
///
/// # Errors
/// - If the configuration is malformed
/// - If the load fails (transport or decode)
/// - If the image cannot be written
///
/// Cancellation via Ctrl-C is not an error; the command exits quietly.
pub async fn handle_render(source: String, options: RenderOptions) -> anyhow::Result<()> {
    tracing::info!("=== wavepetal Render Command ===");

    let mut config = WavepetalConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {e}");
        anyhow::anyhow!("Configuration error: {e}")
    })?;
    apply_overrides(&mut config, &options);

    let viewport = config.viewport();
    let style = config.petal_style()?;
    let output = options
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.render.output));

    let source = Source::parse(&source);
    tracing::info!("Rendering waveform for {source}");

    let mut pipeline = AudioPipeline::new(Duration::from_secs(config.fetch.timeout_secs));
    let (generation, signal) = pipeline.restart();

    // Ctrl-C aborts the load instead of killing the process mid-write.
    if let Some(handle) = pipeline.cancel_handle() {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, cancelling load");
                handle.cancel();
            }
        });
    }

    let state = pipeline.run(generation, &source, signal).await;

    let audio = match state {
        crate::fetch::LoadState::Loaded(audio) => audio.clone(),
        crate::fetch::LoadState::Failed(message) => {
            return Err(anyhow::anyhow!("{message}"));
        }
        _ => {
            // Cancelled before completion; nothing to render, nothing to report.
            return Ok(());
        }
    };

    let envelope = normalize(extract(&audio));
    render_to_png(&envelope, &viewport, &style, &output)?;

    tracing::info!("Waveform written to {}", output.display());
    println!("{}", output.display());

    Ok(())
}

/// Paints the envelope into an off-screen surface and writes it as a PNG.
///
/// # Errors
/// - If the PNG cannot be encoded or written
pub fn render_to_png(
    envelope: &NormalizedEnvelope,
    viewport: &Viewport,
    style: &PetalStyle,
    path: &Path,
) -> anyhow::Result<()> {
    let mut display: SimulatorDisplay<Rgb888> =
        SimulatorDisplay::with_default_color(viewport.buffer_size(), style.background);

    draw_waveform(&mut display, viewport, envelope, style)?;

    let output_settings = OutputSettingsBuilder::new().scale(1).build();
    display
        .to_rgb_output_image(&output_settings)
        .save_png(path)
        .map_err(|e| anyhow::anyhow!("Failed to write image to {}: {e}", path.display()))?;

    Ok(())
}

fn apply_overrides(config: &mut WavepetalConfig, options: &RenderOptions) {
    if let Some(width) = options.width {
        config.render.width = width;
    }
    if let Some(height) = options.height {
        config.render.height = height;
    }
    if let Some(pixel_scale) = options.pixel_scale {
        config.render.pixel_scale = pixel_scale;
    }
    if let Some(color) = &options.color {
        config.render.color = color.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_to_png_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waveform.png");

        let viewport = Viewport::new(140, 60, 2.0);
        let style = PetalStyle::default();
        let envelope = NormalizedEnvelope::from_values(vec![0.0, 0.3, 0.6, 1.0, 0.6, 0.3, 0.0]);

        render_to_png(&envelope, &viewport, &style, &path).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0, "PNG file should not be empty");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = WavepetalConfig::default();
        let options = RenderOptions {
            width: Some(1024),
            color: Some("#123456".to_string()),
            ..RenderOptions::default()
        };

        apply_overrides(&mut config, &options);

        assert_eq!(config.render.width, 1024);
        assert_eq!(config.render.color, "#123456");
        assert_eq!(config.render.height, 120, "untouched fields keep defaults");
    }
}
