//! Startup configuration: an optional TOML file, then environment overrides,
//! then command-line flags. Everything resolves into [`Settings`] before the
//! terminal is touched.

use crate::emitter::DEFAULT_PALETTE;
use crate::particle::Rgb;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("config validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

const DEFAULT_BACKGROUND: Rgb = (2, 6, 23);

/// Smallest accepted `display.pixel_scale`.
pub const MIN_PIXEL_SCALE: f32 = 0.25;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub display: DisplayConfig,
    pub palette: PaletteConfig,
    pub ambient: AmbientConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Logical units per half-block pixel.
    pub pixel_scale: f32,
    /// Hex color the trails fade towards.
    pub background: String,
    pub fade_alpha: f32,
    pub controls: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            pixel_scale: 4.0,
            background: to_hex(DEFAULT_BACKGROUND),
            fade_alpha: 0.28,
            controls: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaletteConfig {
    pub colors: Vec<String>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.iter().map(|&c| to_hex(c)).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AmbientConfig {
    /// Start with auto fireworks running.
    pub auto: bool,
    pub launch_interval_ms: f32,
    /// Chance per interval of a rocket while auto mode is off.
    pub launch_chance: f32,
    pub warmup_ms: Vec<f32>,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            auto: false,
            launch_interval_ms: 800.0,
            launch_chance: 0.06,
            warmup_ms: vec![500.0, 850.0, 1200.0],
        }
    }
}

/// Validated values the fireworks scene runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub pixel_scale: f32,
    pub background: Rgb,
    pub fade_alpha: f32,
    pub controls: bool,
    pub palette: Vec<Rgb>,
    pub auto: bool,
    pub launch_interval_ms: f32,
    pub launch_chance: f32,
    pub warmup_ms: Vec<f32>,
}

impl Default for Settings {
    fn default() -> Self {
        let display = DisplayConfig::default();
        let ambient = AmbientConfig::default();
        Self {
            pixel_scale: display.pixel_scale,
            background: DEFAULT_BACKGROUND,
            fade_alpha: display.fade_alpha,
            controls: display.controls,
            palette: DEFAULT_PALETTE.to_vec(),
            auto: ambient.auto,
            launch_interval_ms: ambient.launch_interval_ms,
            launch_chance: ambient.launch_chance,
            warmup_ms: ambient.warmup_ms,
        }
    }
}

impl Config {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::File {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Loads `path` if given, otherwise starts from defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::from_toml_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies `SKYBURST_*` overrides looked up through `var`. Values that do
    /// not parse are ignored.
    pub fn apply_overrides_from<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(scale) = var("SKYBURST_PIXEL_SCALE").and_then(|v| v.parse().ok()) {
            self.display.pixel_scale = scale;
        }
        if let Some(bg) = var("SKYBURST_BG_COLOR") {
            self.display.background = bg;
        }
        if let Some(auto) = var("SKYBURST_AUTO").and_then(|v| v.parse().ok()) {
            self.ambient.auto = auto;
        }
    }

    pub fn resolve(&self) -> ConfigResult<Settings> {
        let display = &self.display;
        if !(display.pixel_scale.is_finite() && display.pixel_scale >= MIN_PIXEL_SCALE) {
            return Err(ConfigError::Validation(format!(
                "display.pixel_scale must be at least {MIN_PIXEL_SCALE}, got {}",
                display.pixel_scale
            )));
        }
        if !(0.0..=1.0).contains(&display.fade_alpha) {
            return Err(ConfigError::Validation(format!(
                "display.fade_alpha must be within 0..=1, got {}",
                display.fade_alpha
            )));
        }
        let background = parse_hex_color(&display.background).ok_or_else(|| {
            ConfigError::Validation(format!(
                "display.background: invalid hex color `{}`, expected RRGGBB",
                display.background
            ))
        })?;

        if self.palette.colors.is_empty() {
            return Err(ConfigError::Validation("palette.colors must not be empty".to_string()));
        }
        let palette = self
            .palette
            .colors
            .iter()
            .map(|hex| {
                parse_hex_color(hex).ok_or_else(|| {
                    ConfigError::Validation(format!("palette.colors: invalid hex color `{hex}`"))
                })
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        let ambient = &self.ambient;
        if !(0.0..=1.0).contains(&ambient.launch_chance) {
            return Err(ConfigError::Validation(format!(
                "ambient.launch_chance must be within 0..=1, got {}",
                ambient.launch_chance
            )));
        }
        if ambient.launch_interval_ms <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "ambient.launch_interval_ms must be positive, got {}",
                ambient.launch_interval_ms
            )));
        }

        Ok(Settings {
            pixel_scale: display.pixel_scale,
            background,
            fade_alpha: display.fade_alpha,
            controls: display.controls,
            palette,
            auto: ambient.auto,
            launch_interval_ms: ambient.launch_interval_ms,
            launch_chance: ambient.launch_chance,
            warmup_ms: ambient.warmup_ms.clone(),
        })
    }
}

pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

fn to_hex(color: Rgb) -> String {
    format!("{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_resolve() {
        let settings = Config::default().resolve().unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.pixel_scale, 4.0);
        assert_eq!(settings.background, (2, 6, 23));
        assert_eq!(settings.fade_alpha, 0.28);
        assert_eq!(settings.palette, DEFAULT_PALETTE.to_vec());
        assert_eq!(settings.warmup_ms, vec![500.0, 850.0, 1200.0]);
        assert!(!settings.auto);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r##"
            [display]
            background = "#101010"

            [palette]
            colors = ["ff0000", "00ff00"]
            "##,
        )
        .unwrap();
        let settings = config.resolve().unwrap();
        assert_eq!(settings.background, (16, 16, 16));
        assert_eq!(settings.palette, vec![(255, 0, 0), (0, 255, 0)]);
        assert_eq!(settings.pixel_scale, 4.0);
        assert_eq!(settings.launch_chance, 0.06);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("[display]\nscale = 2.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn bad_values_fail_validation() {
        let mut config = Config::default();
        config.palette.colors.push("nothex".to_string());
        assert!(matches!(config.resolve(), Err(ConfigError::Validation(_))));

        let mut config = Config::default();
        config.palette.colors.clear();
        assert!(matches!(config.resolve(), Err(ConfigError::Validation(_))));

        let mut config = Config::default();
        config.display.pixel_scale = 0.0;
        assert!(matches!(config.resolve(), Err(ConfigError::Validation(_))));

        let mut config = Config::default();
        config.ambient.launch_chance = 1.5;
        assert!(matches!(config.resolve(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn pixel_scale_has_a_floor() {
        let mut config = Config::default();
        config.display.pixel_scale = 0.001;
        assert!(matches!(config.resolve(), Err(ConfigError::Validation(_))));

        config.display.pixel_scale = MIN_PIXEL_SCALE;
        assert_eq!(config.resolve().unwrap().pixel_scale, MIN_PIXEL_SCALE);
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("SKYBURST_PIXEL_SCALE", "2.5"),
            ("SKYBURST_BG_COLOR", "1a1b26"),
            ("SKYBURST_AUTO", "not-a-bool"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));
        let settings = config.resolve().unwrap();
        assert_eq!(settings.pixel_scale, 2.5);
        assert_eq!(settings.background, (0x1a, 0x1b, 0x26));
        assert!(!settings.auto);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::from_toml_file("/nonexistent/skyburst.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/skyburst.toml"));
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex_color("ffdd57"), Some((0xff, 0xdd, 0x57)));
        assert_eq!(parse_hex_color("#7afcff"), Some((0x7a, 0xfc, 0xff)));
        assert_eq!(parse_hex_color("fff"), None);
        assert_eq!(parse_hex_color("zzzzzz"), None);
    }
}
