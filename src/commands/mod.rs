//! Application command handlers for wavepetal.
//!
//! This module organizes command handling into separate submodules, each
//! responsible for a specific application command.
//!
//! # Commands
//! - `render`: Fetch, decode, and paint a waveform image (default command)
//! - `info`: Print stream and envelope statistics for a source
//! - `config`: Open configuration file in user's preferred editor

pub mod config;
pub mod info;
pub mod render;

pub use config::handle_config;
pub use info::handle_info;
pub use render::{handle_render, RenderOptions};
