use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::engine::SyncSettings;
use crate::error::ConfigError;
use clipsync_types::{GridDims, MAX_LANES, MAX_ROWS};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

const MAX_COLUMNS: usize = 1024;
const MAX_INTERVAL_MS: u64 = 10_000;

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    grid: GridConfig,
    #[serde(default)]
    sync: SyncConfig,
    #[serde(default)]
    defaults: DefaultsConfig,
}

#[derive(Deserialize, Default)]
struct GridConfig {
    lanes: Option<usize>,
    columns: Option<usize>,
    rows: Option<usize>,
}

#[derive(Deserialize, Default)]
struct SyncConfig {
    reassert_interval_ms: Option<u64>,
    secondary_write_delay_ms: Option<u64>,
    poll_resolution_ms: Option<u64>,
}

#[derive(Deserialize, Default)]
struct DefaultsConfig {
    step_length: Option<f64>,
    toggle_velocity: Option<f64>,
}

pub struct Config {
    grid: GridConfig,
    sync: SyncConfig,
    defaults: DefaultsConfig,
}

impl Config {
    /// Embedded defaults overlaid by the user config file, if one exists and parses.
    pub fn load() -> Self {
        let mut config = Self::embedded();

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => config.merge(user),
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        config
    }

    /// Only the built-in defaults.
    pub fn embedded() -> Self {
        let base: ConfigFile = match toml::from_str(DEFAULT_CONFIG) {
            Ok(base) => base,
            Err(e) => {
                log::error!(target: "config", "embedded config.toml is invalid: {}", e);
                ConfigFile::default()
            }
        };
        Config {
            grid: base.grid,
            sync: base.sync,
            defaults: base.defaults,
        }
    }

    /// Built-in defaults overlaid by `contents`.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let user: ConfigFile = toml::from_str(contents)?;
        let mut config = Self::embedded();
        config.merge(user);
        Ok(config)
    }

    /// Built-in defaults overlaid by the file at `path`.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    fn merge(&mut self, user: ConfigFile) {
        merge_grid(&mut self.grid, user.grid);
        merge_sync(&mut self.sync, user.sync);
        merge_defaults(&mut self.defaults, user.defaults);
    }

    /// Grid capacity (lanes 1..=16, columns 1..=1024, rows 1..=128).
    pub fn grid_dims(&self) -> GridDims {
        let fallback = GridDims::default();
        GridDims {
            lanes: self.grid.lanes.unwrap_or(fallback.lanes).clamp(1, MAX_LANES),
            columns: self
                .grid
                .columns
                .unwrap_or(fallback.columns)
                .clamp(1, MAX_COLUMNS),
            rows: self.grid.rows.unwrap_or(fallback.rows).clamp(1, MAX_ROWS),
        }
    }

    pub fn reassert_interval(&self) -> Duration {
        interval_ms(self.sync.reassert_interval_ms, 100)
    }

    pub fn secondary_write_delay(&self) -> Duration {
        interval_ms(self.sync.secondary_write_delay_ms, 100)
    }

    pub fn poll_resolution(&self) -> Duration {
        interval_ms(self.sync.poll_resolution_ms, 10)
    }

    /// Beats per column; non-positive or non-finite values fall back to 0.25.
    pub fn step_length(&self) -> f64 {
        match self.defaults.step_length {
            Some(len) if len.is_finite() && len > 0.0 => len,
            _ => 0.25,
        }
    }

    pub fn toggle_velocity(&self) -> f64 {
        clipsync_types::range::UNIT.clamp(self.defaults.toggle_velocity.unwrap_or(0.8))
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            dims: self.grid_dims(),
            reassert_interval: self.reassert_interval(),
            secondary_write_delay: self.secondary_write_delay(),
            step_length: self.step_length(),
            toggle_velocity: self.toggle_velocity(),
        }
    }
}

fn interval_ms(value: Option<u64>, fallback: u64) -> Duration {
    Duration::from_millis(value.unwrap_or(fallback).clamp(1, MAX_INTERVAL_MS))
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("clipsync").join("config.toml"))
}

fn merge_grid(base: &mut GridConfig, user: GridConfig) {
    if user.lanes.is_some() {
        base.lanes = user.lanes;
    }
    if user.columns.is_some() {
        base.columns = user.columns;
    }
    if user.rows.is_some() {
        base.rows = user.rows;
    }
}

fn merge_sync(base: &mut SyncConfig, user: SyncConfig) {
    if user.reassert_interval_ms.is_some() {
        base.reassert_interval_ms = user.reassert_interval_ms;
    }
    if user.secondary_write_delay_ms.is_some() {
        base.secondary_write_delay_ms = user.secondary_write_delay_ms;
    }
    if user.poll_resolution_ms.is_some() {
        base.poll_resolution_ms = user.poll_resolution_ms;
    }
}

fn merge_defaults(base: &mut DefaultsConfig, user: DefaultsConfig) {
    if user.step_length.is_some() {
        base.step_length = user.step_length;
    }
    if user.toggle_velocity.is_some() {
        base.toggle_velocity = user.toggle_velocity;
    }
}
