// config.rs - Settings file and environment overrides

use std::{fs, path::Path};

use anyhow::Context;
use life::{DEFAULT_BOARD_SIZE, DEFAULT_SPEED};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "life.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub board_size: usize,
    pub animation_speed: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            animation_speed: DEFAULT_SPEED,
        }
    }
}

/// File values over defaults, then `LIFE_*` environment overrides.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = read_file(path)?;
    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn read_file(path: &Path) -> anyhow::Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("LIFE_BOARD_SIZE") {
        if let Ok(parsed) = v.parse() {
            settings.board_size = parsed;
        }
    }
    if let Some(v) = var("LIFE_ANIMATION_SPEED") {
        if let Ok(parsed) = v.parse() {
            settings.animation_speed = parsed;
        }
    }
}

/// Rewrites `animation_speed` in the settings file, keeping its other values.
pub fn save_speed(path: &Path, speed: f64) -> anyhow::Result<()> {
    let mut settings = read_file(path)?;
    settings.animation_speed = speed;
    let raw = toml::to_string_pretty(&settings).context("failed to encode settings")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create settings directory '{}'", parent.display())
        })?;
    }
    fs::write(path, raw)
        .with_context(|| format!("failed to write settings file '{}'", path.display()))
}
