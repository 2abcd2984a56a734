//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate
//! command handlers.

use crate::commands;
use crate::commands::RenderOptions;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// Render static petal-style waveform images from audio files and URLs
#[derive(Parser)]
#[command(name = "wavepetal")]
#[command(version)]
#[command(about = "Render static petal-style waveform images from audio files and URLs")]
#[command(
    long_about = "Fetches an audio resource (URL or local file), decodes it, reduces it to a\n\
        70-block amplitude envelope, and paints the envelope as mirrored petal\n\
        segments into a PNG image.\n\n\
        DEFAULT COMMAND:\n    \
        If no command is specified, 'render' is used by default.\n\n\
        EXAMPLES:\n    \
        # Render a local file to waveform.png\n    \
        $ wavepetal clip.mp3\n\n    \
        # Render a remote file with a custom size and output path\n    \
        $ wavepetal render https://example.com/clip.mp3 -o clip.png --width 1024\n\n    \
        # Inspect a stream without rendering\n    \
        $ wavepetal info clip.wav\n\n    \
        # Edit configuration file\n    \
        $ wavepetal config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/wavepetal/wavepetal.toml\n    Logs:               stderr, controlled by RUST_LOG (default: info)"
)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Audio source to render (render default command)
    #[arg(value_name = "SOURCE")]
    source: Option<String>,

    /// Write the image to this file (render default command)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a waveform image from an audio source (default)
    ///
    /// Fetches and decodes the source, then writes a PNG whose path is
    /// printed to stdout. Viewport and colors come from the config file
    /// unless overridden here.
    #[command(visible_alias = "r")]
    Render {
        /// URL or local path of the audio resource
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Write the image to this file instead of the configured default
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Logical width of the waveform in pixels
        #[arg(long, value_name = "PIXELS")]
        width: Option<u32>,

        /// Logical height of the waveform in pixels
        #[arg(long, value_name = "PIXELS")]
        height: Option<u32>,

        /// Device pixel scale of the backing buffer (e.g. 2.0)
        #[arg(long, value_name = "FACTOR")]
        scale: Option<f32>,

        /// Accent color as "#rrggbb"
        #[arg(long, value_name = "COLOR")]
        color: Option<String>,
    },

    /// Print stream and envelope statistics for an audio source
    ///
    /// Runs fetch + decode + envelope extraction and reports what the
    /// renderer would be working with, without writing an image.
    #[command(visible_alias = "i")]
    Info {
        /// URL or local path of the audio resource
        #[arg(value_name = "SOURCE")]
        source: String,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Edit viewport size, colors, and fetch settings. Uses $EDITOR or
    /// falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   wavepetal completions bash > wavepetal.bash
    ///   wavepetal completions zsh > _wavepetal
    ///   wavepetal completions fish > wavepetal.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Completions don't need logging or config
    if let Some(Commands::Completions { shell }) = &cli.command {
        generate(*shell, &mut Cli::command(), "wavepetal", &mut io::stdout());
        return Ok(());
    }

    logging::init_logging()?;

    match cli.command {
        None => {
            // Default command is render; a bare source argument is required
            let source = cli.source.ok_or_else(|| {
                anyhow::anyhow!("No audio source given. Try 'wavepetal render <SOURCE>'.")
            })?;
            let options = RenderOptions {
                output: cli.output,
                ..RenderOptions::default()
            };
            commands::handle_render(source, options).await?;
        }
        Some(Commands::Render {
            source,
            output,
            width,
            height,
            scale,
            color,
        }) => {
            let options = RenderOptions {
                output,
                width,
                height,
                pixel_scale: scale,
                color,
            };
            commands::handle_render(source, options).await?;
        }
        Some(Commands::Info { source }) => {
            commands::handle_info(source).await?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) => {
            unreachable!("Completions are handled earlier")
        }
    }

    Ok(())
}
