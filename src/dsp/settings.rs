use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::preset::NoisePreset;

/// Errors raised while building noise parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NoiseError {
    #[error("{name} must be within {range}, got {value}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        range: &'static str,
    },
}

/// Immutable parameter bundle shared by every noise colour
///
/// All fields are in `[0, 1]`; construction rejects anything else, so a
/// `NoiseSettings` value is always safe to hand to a generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSettings", into = "RawSettings")]
pub struct NoiseSettings {
    amplitude: f64,
    randomness: f64,
    smoothing: f64,
}

impl NoiseSettings {
    /// Build settings, failing on any field outside `[0, 1]` (NaN included)
    pub fn new(amplitude: f64, randomness: f64, smoothing: f64) -> Result<Self, NoiseError> {
        Ok(Self {
            amplitude: check_unit("amplitude", amplitude)?,
            randomness: check_unit("randomness", randomness)?,
            smoothing: check_unit("smoothing", smoothing)?,
        })
    }

    /// Peak output scale
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Size of the per-sample random perturbation
    pub fn randomness(&self) -> f64 {
        self.randomness
    }

    /// One-pole blending factor (0 = no smoothing)
    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            amplitude: 0.5,
            randomness: 0.5,
            smoothing: 0.0,
        }
    }
}

/// Per-preset settings, one entry per noise colour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresetSettings {
    #[serde(default = "default_white")]
    pub white: NoiseSettings,
    #[serde(default = "default_brownian")]
    pub brownian: NoiseSettings,
    #[serde(default = "default_blue")]
    pub blue: NoiseSettings,
}

impl PresetSettings {
    pub fn get(&self, preset: NoisePreset) -> NoiseSettings {
        match preset {
            NoisePreset::White => self.white,
            NoisePreset::Brownian => self.brownian,
            NoisePreset::Blue => self.blue,
        }
    }

    pub fn set(&mut self, preset: NoisePreset, settings: NoiseSettings) {
        match preset {
            NoisePreset::White => self.white = settings,
            NoisePreset::Brownian => self.brownian = settings,
            NoisePreset::Blue => self.blue = settings,
        }
    }
}

impl Default for PresetSettings {
    fn default() -> Self {
        Self {
            white: default_white(),
            brownian: default_brownian(),
            blue: default_blue(),
        }
    }
}

// Default value functions for serde
fn default_white() -> NoiseSettings {
    NoiseSettings {
        amplitude: 0.4,
        randomness: 1.0,
        smoothing: 0.0,
    }
}

fn default_brownian() -> NoiseSettings {
    NoiseSettings {
        amplitude: 0.8,
        randomness: 0.05,
        smoothing: 0.2,
    }
}

fn default_blue() -> NoiseSettings {
    NoiseSettings {
        amplitude: 0.6,
        randomness: 0.5,
        smoothing: 0.3,
    }
}

fn check_unit(name: &'static str, value: f64) -> Result<f64, NoiseError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(NoiseError::InvalidParameter {
            name,
            value,
            range: "[0, 1]",
        })
    }
}

/// Unchecked wire shape used by serde
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawSettings {
    amplitude: f64,
    randomness: f64,
    #[serde(default)]
    smoothing: f64,
}

impl TryFrom<RawSettings> for NoiseSettings {
    type Error = NoiseError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        NoiseSettings::new(raw.amplitude, raw.randomness, raw.smoothing)
    }
}

impl From<NoiseSettings> for RawSettings {
    fn from(settings: NoiseSettings) -> Self {
        RawSettings {
            amplitude: settings.amplitude,
            randomness: settings.randomness,
            smoothing: settings.smoothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_bounds() {
        let settings = NoiseSettings::new(0.0, 1.0, 0.5).unwrap();
        assert_eq!(settings.amplitude(), 0.0);
        assert_eq!(settings.randomness(), 1.0);
        assert_eq!(settings.smoothing(), 0.5);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = NoiseSettings::new(1.5, 0.5, 0.5).unwrap_err();
        assert_eq!(
            err,
            NoiseError::InvalidParameter {
                name: "amplitude",
                value: 1.5,
                range: "[0, 1]",
            }
        );

        assert!(NoiseSettings::new(0.5, -0.1, 0.5).is_err());
        assert!(NoiseSettings::new(0.5, 0.5, 1.01).is_err());
    }

    #[test]
    fn test_rejects_nan() {
        assert!(NoiseSettings::new(f64::NAN, 0.5, 0.5).is_err());
    }

    #[test]
    fn test_preset_table_get_set() {
        let mut table = PresetSettings::default();
        let quiet = NoiseSettings::new(0.1, 0.1, 0.1).unwrap();
        table.set(NoisePreset::Blue, quiet);
        assert_eq!(table.get(NoisePreset::Blue), quiet);
        assert_eq!(table.get(NoisePreset::White), default_white());
    }

    #[test]
    fn test_preset_table_partial_yaml() {
        let table: PresetSettings =
            serde_yaml::from_str("white: { amplitude: 0.2, randomness: 0.9 }").unwrap();
        assert_eq!(table.white.amplitude(), 0.2);
        assert_eq!(table.brownian, default_brownian());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: NoiseSettings =
            serde_yaml::from_str("{ amplitude: 0.3, randomness: 0.2 }").unwrap();
        assert_eq!(ok.smoothing(), 0.0);

        let bad: Result<NoiseSettings, _> =
            serde_yaml::from_str("{ amplitude: 3.0, randomness: 0.2 }");
        assert!(bad.is_err());
    }
}
