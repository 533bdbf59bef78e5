use std::path::{Path, PathBuf};
use std::time::Duration;

use chirp_types::{PerformanceDefaults, RatioLimits};
use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    limits: LimitsConfig,
    #[serde(default)]
    defaults: DefaultsConfig,
    #[serde(default)]
    playback: PlaybackConfig,
}

#[derive(Deserialize, Default)]
struct LimitsConfig {
    max_freq_ratio: Option<f32>,
    max_vol_ratio: Option<f32>,
}

#[derive(Deserialize, Default)]
struct DefaultsConfig {
    freq: Option<f32>,
    vol: Option<f32>,
    ms: Option<u32>,
}

#[derive(Deserialize, Default)]
struct PlaybackConfig {
    builtins: Option<bool>,
    wait_timeout_ms: Option<u64>,
}

pub struct Config {
    limits: LimitsConfig,
    defaults: DefaultsConfig,
    playback: PlaybackConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(embedded())
    }
}

impl Config {
    /// Embedded defaults overlaid with the user's config file, if any.
    /// A missing or malformed user file is logged and ignored.
    pub fn load() -> Self {
        let mut base = embedded();
        if let Some(path) = user_config_path() {
            if path.exists() {
                match read_file(&path) {
                    Ok(user) => merge(&mut base, user),
                    Err(e) => log::warn!(target: "config", "ignoring {}", e),
                }
            }
        }
        Self::from_file(base)
    }

    /// Embedded defaults overlaid with an explicit file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let mut base = embedded();
        merge(&mut base, read_file(path)?);
        Ok(Self::from_file(base))
    }

    /// Embedded defaults overlaid with TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut base = embedded();
        merge(&mut base, toml::from_str(contents)?);
        Ok(Self::from_file(base))
    }

    fn from_file(file: ConfigFile) -> Self {
        Config {
            limits: file.limits,
            defaults: file.defaults,
            playback: file.playback,
        }
    }

    /// Ratio ceilings; non-finite or negative values fall back to the default.
    pub fn ratio_limits(&self) -> RatioLimits {
        let fallback = RatioLimits::default();
        RatioLimits {
            max_freq_ratio: sane_ceiling(self.limits.max_freq_ratio, fallback.max_freq_ratio),
            max_vol_ratio: sane_ceiling(self.limits.max_vol_ratio, fallback.max_vol_ratio),
        }
    }

    /// Performance defaults for recipes defined without their own.
    pub fn fallback_defaults(&self) -> PerformanceDefaults {
        let fallback = PerformanceDefaults::default();
        PerformanceDefaults::new(
            self.defaults.freq.unwrap_or(fallback.freq),
            self.defaults.vol.unwrap_or(fallback.vol),
            self.defaults.ms.unwrap_or(fallback.ms),
        )
        .or(fallback)
    }

    pub fn register_builtins(&self) -> bool {
        self.playback.builtins.unwrap_or(true)
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.playback.wait_timeout_ms.map(Duration::from_millis)
    }
}

fn sane_ceiling(value: Option<f32>, fallback: f32) -> f32 {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => fallback,
    }
}

fn embedded() -> ConfigFile {
    toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
        log::error!(target: "config", "embedded config.toml is malformed: {}", e);
        ConfigFile::default()
    })
}

fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&contents)?)
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chirp").join("config.toml"))
}

fn merge(base: &mut ConfigFile, user: ConfigFile) {
    if user.limits.max_freq_ratio.is_some() {
        base.limits.max_freq_ratio = user.limits.max_freq_ratio;
    }
    if user.limits.max_vol_ratio.is_some() {
        base.limits.max_vol_ratio = user.limits.max_vol_ratio;
    }
    if user.defaults.freq.is_some() {
        base.defaults.freq = user.defaults.freq;
    }
    if user.defaults.vol.is_some() {
        base.defaults.vol = user.defaults.vol;
    }
    if user.defaults.ms.is_some() {
        base.defaults.ms = user.defaults.ms;
    }
    if user.playback.builtins.is_some() {
        base.playback.builtins = user.playback.builtins;
    }
    if user.playback.wait_timeout_ms.is_some() {
        base.playback.wait_timeout_ms = user.playback.wait_timeout_ms;
    }
}
