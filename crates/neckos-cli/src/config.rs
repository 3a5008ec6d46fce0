//! Configuration vault – reads/writes `~/.neckos/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use neckos_controller::ControllerConfig;
use neckos_teleop::SynthesizerConfig;
use neckos_types::NeckError;

/// Persisted tuning for both halves of the pipeline.
///
/// Every field has a default, so a partial (or missing) file always loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Producer tuning: gains, offsets, smoothing, pacing.
    pub teleop: SynthesizerConfig,
    /// Consumer calibration: scales, clamps, base speed/accel.
    pub controller: ControllerConfig,
}

/// Return the path to `~/.neckos/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".neckos").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, NeckError> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, NeckError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        NeckError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;
    let mut cfg: Config = toml::from_str(&raw)
        .map_err(|e| NeckError::Config(format!("failed to parse config: {e}")))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `NECKOS_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `NECKOS_BASE_SPEED_HZ` | `controller.base_speed_hz` |
/// | `NECKOS_BASE_ACCEL` | `controller.base_accel` |
/// | `NECKOS_COMMAND_INTERVAL_MS` | `teleop.command_interval_ms` |
/// | `NECKOS_SENSITIVITY` | `teleop.sensitivity` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("NECKOS_BASE_SPEED_HZ")
        && let Ok(hz) = v.parse::<f32>()
    {
        cfg.controller.base_speed_hz = hz;
    }
    if let Ok(v) = std::env::var("NECKOS_BASE_ACCEL")
        && let Ok(accel) = v.parse::<f32>()
    {
        cfg.controller.base_accel = accel;
    }
    if let Ok(v) = std::env::var("NECKOS_COMMAND_INTERVAL_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.teleop.command_interval_ms = ms;
    }
    if let Ok(v) = std::env::var("NECKOS_SENSITIVITY")
        && let Ok(s) = v.parse::<f32>()
    {
        cfg.teleop.sensitivity = s;
    }
}

/// Save the config to disk, creating `~/.neckos/` if necessary.
pub fn save(cfg: &Config) -> Result<(), NeckError> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), NeckError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            NeckError::Config(format!("failed to create config directory: {e}"))
        })?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| NeckError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw).map_err(|e| {
        NeckError::Config(format!("failed to write config at {}: {e}", path.display()))
    })
}
