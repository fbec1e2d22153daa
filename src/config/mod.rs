use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio::parameters::MAX_VOLUME;
use crate::audio::stream::MIN_BUFFER_DURATION;
use crate::audio::{BufferSettings, DeviceSelector, OverrunPolicy, PlaybackOptions};
use crate::dsp::PresetSettings;
use crate::types::preset::{NoisePreset, WhiteDistribution};
use crate::types::sample_rate::SampleRate;

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_device")]
    pub device: String,

    #[serde(default)]
    pub sample_rate: SampleRate,

    #[serde(default = "default_volume")]
    pub volume: u8,

    #[serde(default)]
    pub preset: NoisePreset,

    #[serde(default)]
    pub white_distribution: WhiteDistribution,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default)]
    pub buffer: BufferConfig,

    #[serde(default)]
    pub presets: PresetSettings,

    #[serde(default)]
    pub log: LogConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: SampleRate::default(),
            volume: default_volume(),
            preset: NoisePreset::default(),
            white_distribution: WhiteDistribution::default(),
            seed: None,
            buffer: BufferConfig::default(),
            presets: PresetSettings::default(),
            log: LogConfig::default(),
        }
    }
}

impl PlayerConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: PlayerConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.volume > MAX_VOLUME {
            return Err(anyhow!("Volume must be between 0 and {}", MAX_VOLUME));
        }

        self.buffer.validate().context("Invalid buffer configuration")?;
        self.log.validate().context("Invalid log configuration")?;

        Ok(())
    }

    pub fn device_selector(&self) -> DeviceSelector {
        DeviceSelector::parse(&self.device)
    }

    /// Engine options described by this config
    pub fn playback_options(&self) -> PlaybackOptions {
        PlaybackOptions {
            sample_rate: self.sample_rate,
            buffer: self.buffer.settings(),
            presets: self.presets,
            preset: self.preset,
            volume: self.volume,
        }
    }
}

/// What to do when the producer finds the buffer full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrunSpec {
    #[default]
    Block,
    DropOldest,
}

/// Sample buffer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BufferConfig {
    #[serde(default = "default_capacity_ms")]
    pub capacity_ms: u64,

    #[serde(default)]
    pub overrun: OverrunSpec,

    #[serde(default = "default_block_timeout_ms")]
    pub block_timeout_ms: u64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity_ms: default_capacity_ms(),
            overrun: OverrunSpec::default(),
            block_timeout_ms: default_block_timeout_ms(),
        }
    }
}

impl BufferConfig {
    pub fn validate(&self) -> Result<()> {
        let min_ms = MIN_BUFFER_DURATION.as_millis() as u64;
        if self.capacity_ms < min_ms || self.capacity_ms > 5_000 {
            return Err(anyhow!(
                "Buffer capacity must be between {} and 5000 ms",
                min_ms
            ));
        }
        if self.block_timeout_ms == 0 || self.block_timeout_ms > 1_000 {
            return Err(anyhow!("Block timeout must be between 1 and 1000 ms"));
        }
        Ok(())
    }

    pub fn settings(&self) -> BufferSettings {
        let policy = match self.overrun {
            OverrunSpec::Block => OverrunPolicy::Block {
                timeout: Duration::from_millis(self.block_timeout_ms),
            },
            OverrunSpec::DropOldest => OverrunPolicy::DropOldest,
        };

        BufferSettings {
            capacity: Duration::from_millis(self.capacity_ms),
            policy,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl LogConfig {
    pub fn validate(&self) -> Result<()> {
        match self.level.to_lowercase().as_str() {
            "off" | "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            other => Err(anyhow!("Unknown log level: {}", other)),
        }
    }
}

// Default value functions for serde
fn default_device() -> String {
    "default".to_string()
}

fn default_volume() -> u8 {
    70
}

fn default_capacity_ms() -> u64 {
    200
}

fn default_block_timeout_ms() -> u64 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("noise-player.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
device: "usb"
sample_rate: 44100
volume: 35
preset: blue
white_distribution: gaussian
seed: 42
buffer:
  capacity_ms: 300
  overrun: drop_oldest
presets:
  white: { amplitude: 0.4, randomness: 1.0, smoothing: 0.0 }
  brownian: { amplitude: 0.9, randomness: 0.02, smoothing: 0.5 }
  blue: { amplitude: 0.5, randomness: 0.6, smoothing: 0.1 }
log:
  level: debug
  file: /tmp/noise.log
"#;

        let config: PlayerConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_rate, SampleRate::Hz44100);
        assert_eq!(config.preset, NoisePreset::Blue);
        assert_eq!(config.white_distribution, WhiteDistribution::Gaussian);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.device_selector(), DeviceSelector::Search("usb".to_string()));

        let options = config.playback_options();
        assert_eq!(options.volume, 35);
        assert_eq!(options.buffer.policy, OverrunPolicy::DropOldest);
        assert_eq!(options.buffer.capacity, Duration::from_millis(300));
        assert_eq!(options.presets.get(NoisePreset::Brownian).smoothing(), 0.5);
    }

    #[test]
    fn test_defaults() {
        let config: PlayerConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.device_selector(), DeviceSelector::Default);
        assert_eq!(config.sample_rate, SampleRate::Hz48000);
        assert_eq!(config.volume, 70);
        assert_eq!(config.preset, NoisePreset::Brownian);
        assert_eq!(config.buffer.capacity_ms, 200);
        assert_eq!(
            config.buffer.settings().policy,
            OverrunPolicy::Block {
                timeout: Duration::from_millis(20)
            }
        );
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_rejects_unsupported_sample_rate() {
        let result: Result<PlayerConfig, _> = serde_yaml::from_str("sample_rate: 22050");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_out_of_range_noise_settings() {
        let yaml = r#"
presets:
  white: { amplitude: 1.2, randomness: 1.0 }
"#;
        let result: Result<PlayerConfig, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_volume_range() {
        let config: PlayerConfig = serde_yaml::from_str("volume: 150").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_buffer_ranges() {
        let config: PlayerConfig = serde_yaml::from_str("buffer: { capacity_ms: 50 }").unwrap();
        assert!(config.validate().is_err());

        let config: PlayerConfig =
            serde_yaml::from_str("buffer: { block_timeout_ms: 0 }").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_log_level() {
        let config: PlayerConfig = serde_yaml::from_str("log: { level: loud }").unwrap();
        assert!(config.validate().is_err());
    }
}
