//! Configuration persistence for crop engine tuning and styling

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::render::geometry::{handle, outline};

/// Current configuration file format version
pub const CONFIG_VERSION: u32 = 1;

/// Serializable RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbaColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl RgbaColor {
    pub const WHITE: RgbaColor = RgbaColor::new(255, 255, 255, 255);
    pub const YELLOW: RgbaColor = RgbaColor::new(255, 255, 0, 255);
    pub const TRANSPARENT: RgbaColor = RgbaColor::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Convert to image crate RGBA format
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<RgbaColor> for tiny_skia::Color {
    fn from(c: RgbaColor) -> Self {
        tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a)
    }
}

/// Colors and stroke widths used by the render pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropStyle {
    /// Outline width for unselected regions
    pub outline_width: f32,
    /// Outline width for the selected region
    pub selected_outline_width: f32,
    pub outline_color: RgbaColor,
    pub selected_outline_color: RgbaColor,
    /// Fill color of the selected region's corner handles
    pub handle_color: RgbaColor,
    /// Translucent mask drawn outside all regions
    pub dim_color: RgbaColor,
    /// Color behind the image (visible around the fit rectangle)
    pub background: RgbaColor,
}

impl Default for CropStyle {
    fn default() -> Self {
        Self {
            outline_width: outline::WIDTH,
            selected_outline_width: outline::SELECTED_WIDTH,
            outline_color: RgbaColor::WHITE,
            selected_outline_color: RgbaColor::YELLOW,
            handle_color: RgbaColor::YELLOW,
            dim_color: RgbaColor::new(0, 0, 0, outline::DIM_ALPHA),
            background: RgbaColor::TRANSPARENT,
        }
    }
}

/// Crop engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Version of the configuration file format
    pub version: u32,
    /// Visual diameter of a corner handle, in view pixels
    pub corner_size: f32,
    /// Corner touch radius as a multiple of `corner_size`
    pub corner_touch_factor: f32,
    /// Padding around a region's bounding box for selection, as a multiple of `corner_size`
    pub select_padding_factor: f32,
    /// Detected regions must be larger than this (view pixels) in both dimensions
    pub min_detected_size: f32,
    /// Minimum width/height of an extracted crop, in source pixels
    pub min_output_size: u32,
    /// Inset fraction for the default region
    pub default_margin: f32,
    /// Size of a manually added region relative to the fit rectangle
    pub add_size_fraction: f32,
    /// Inset fraction for the first manually added region
    pub add_margin: f32,
    /// Offset applied per existing region so added regions don't stack exactly
    pub add_cascade_offset: f32,
    pub style: CropStyle,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            corner_size: handle::SIZE,
            corner_touch_factor: handle::TOUCH_FACTOR,
            select_padding_factor: handle::SELECT_PADDING_FACTOR,
            min_detected_size: 20.0,
            min_output_size: 100,
            default_margin: 0.1,
            add_size_fraction: 0.6,
            add_margin: 0.2,
            add_cascade_offset: 50.0,
            style: CropStyle::default(),
        }
    }
}

impl CropConfig {
    /// Touch radius around a corner that starts a corner drag
    pub fn corner_touch_radius(&self) -> f32 {
        self.corner_size * self.corner_touch_factor
    }

    /// Padding added around bounding boxes when selecting regions
    pub fn select_padding(&self) -> f32 {
        self.corner_size * self.select_padding_factor
    }

    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("quadcrop").join("config.json"))
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: CropConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        if config.version != CONFIG_VERSION {
            log::warn!(
                "Config version mismatch (expected {}, found {}), loading anyway",
                CONFIG_VERSION,
                config.version
            );
        }
        Ok(config)
    }

    /// Load from `path` (or the default path), falling back to defaults on any error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Self::default(),
            },
        };
        match Self::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:#}", err);
                Self::default()
            }
        }
    }

    /// Save configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_radii() {
        let config = CropConfig::default();
        assert_eq!(config.corner_touch_radius(), 60.0);
        assert_eq!(config.select_padding(), 80.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CropConfig = serde_json::from_str(r#"{ "corner_size": 20.0 }"#).unwrap();
        assert_eq!(config.corner_size, 20.0);
        assert_eq!(config.min_output_size, 100);
        assert_eq!(config.style, CropStyle::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = CropConfig::default();
        config.min_output_size = 64;
        config.style.dim_color = RgbaColor::new(10, 20, 30, 40);
        config.save(&path).unwrap();

        let loaded = CropConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_on_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(CropConfig::load_or_default(Some(&path)), CropConfig::default());
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(RgbaColor::YELLOW.to_rgba_u8(), [255, 255, 0, 255]);
    }
}
