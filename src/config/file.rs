//! Configuration file management for wavepetal.
//!
//! Loads and saves application configuration from a TOML file in the user's
//! config directory. Every field has a default, and a missing config file is
//! not an error — the tool works out of the box.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::render::{parse_hex_color, PetalStyle, Viewport};

/// Rendering configuration: viewport, pixel scale, and colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Logical width of the rendered waveform in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Logical height of the rendered waveform in pixels
    #[serde(default = "default_height")]
    pub height: u32,
    /// Device pixel scale of the backing buffer (2.0 for a retina-sharp image)
    #[serde(default = "default_pixel_scale")]
    pub pixel_scale: f32,
    /// Accent color the petals are stroked with, as "#rrggbb"
    #[serde(default = "default_color")]
    pub color: String,
    /// Background fill color, as "#rrggbb"
    #[serde(default = "default_background")]
    pub background: String,
    /// Default output file for rendered images
    #[serde(default = "default_output")]
    pub output: String,
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    120
}

fn default_pixel_scale() -> f32 {
    1.0
}

fn default_color() -> String {
    "#ffc0cb".to_string()
}

fn default_background() -> String {
    "#000000".to_string()
}

fn default_output() -> String {
    "waveform.png".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            pixel_scale: default_pixel_scale(),
            color: default_color(),
            background: default_background(),
            output: default_output(),
        }
    }
}

/// Resource fetching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds for remote sources
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WavepetalConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl WavepetalConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// A missing file yields the defaults; a malformed file is an error.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file exists but cannot be read or parsed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: WavepetalConfig = toml::from_str(&config_content)
            .map_err(|e| anyhow::anyhow!("Malformed config {}: {e}", config_path.display()))?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }

    /// Viewport described by the render section.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.render.width,
            self.render.height,
            self.render.pixel_scale,
        )
    }

    /// Petal style described by the render section.
    ///
    /// # Errors
    /// - If a color is not a valid "#rrggbb" value
    pub fn petal_style(&self) -> anyhow::Result<PetalStyle> {
        let color = parse_hex_color(&self.render.color)
            .ok_or_else(|| anyhow::anyhow!("Invalid accent color: '{}'", self.render.color))?;
        let background = parse_hex_color(&self.render.background).ok_or_else(|| {
            anyhow::anyhow!("Invalid background color: '{}'", self.render.background)
        })?;

        Ok(PetalStyle {
            color,
            background,
            ..PetalStyle::default()
        })
    }
}

/// Retrieves the path to the config file, creating the directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("wavepetal");

    fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("wavepetal.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::Rgb888;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: WavepetalConfig = toml::from_str("").unwrap();
        assert_eq!(config.render.width, 640);
        assert_eq!(config.render.height, 120);
        assert_eq!(config.render.pixel_scale, 1.0);
        assert_eq!(config.fetch.timeout_secs, 30);
    }

    #[test]
    fn test_partial_toml_fills_missing_fields() {
        let config: WavepetalConfig = toml::from_str(
            r##"
            [render]
            width = 1024
            color = "#00ff00"
            "##,
        )
        .unwrap();

        assert_eq!(config.render.width, 1024);
        assert_eq!(config.render.height, 120);
        assert_eq!(config.render.color, "#00ff00");
        assert_eq!(config.render.background, "#000000");
    }

    #[test]
    fn test_petal_style_parses_colors() {
        let mut config = WavepetalConfig::default();
        config.render.color = "#00ff00".to_string();

        let style = config.petal_style().unwrap();
        assert_eq!(style.color, Rgb888::new(0, 255, 0));
        assert_eq!(style.background, Rgb888::new(0, 0, 0));
        assert_eq!(style.stroke_width, 2);
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let mut config = WavepetalConfig::default();
        config.render.color = "salmon".to_string();

        assert!(config.petal_style().is_err());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = WavepetalConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: WavepetalConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.render.width, config.render.width);
        assert_eq!(parsed.render.color, config.render.color);
    }
}
