use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Noise colour selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoisePreset {
    White,
    #[default]
    Brownian,
    Blue,
}

impl NoisePreset {
    pub const ALL: [NoisePreset; 3] =
        [NoisePreset::White, NoisePreset::Brownian, NoisePreset::Blue];

    /// Human readable name
    pub fn label(self) -> &'static str {
        match self {
            NoisePreset::White => "White",
            NoisePreset::Brownian => "Brownian",
            NoisePreset::Blue => "Blue",
        }
    }

    /// Cycle to the next preset
    pub fn next(self) -> Self {
        match self {
            NoisePreset::White => NoisePreset::Brownian,
            NoisePreset::Brownian => NoisePreset::Blue,
            NoisePreset::Blue => NoisePreset::White,
        }
    }
}

impl fmt::Display for NoisePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NoisePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "white" => Ok(NoisePreset::White),
            "brownian" | "brown" | "red" => Ok(NoisePreset::Brownian),
            "blue" => Ok(NoisePreset::Blue),
            other => Err(format!("unknown noise preset '{}'", other)),
        }
    }
}

/// Distribution white noise draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhiteDistribution {
    #[default]
    Uniform,
    Gaussian,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("White".parse::<NoisePreset>().unwrap(), NoisePreset::White);
        assert_eq!("red".parse::<NoisePreset>().unwrap(), NoisePreset::Brownian);
        assert_eq!("blue".parse::<NoisePreset>().unwrap(), NoisePreset::Blue);
        assert!("pink".parse::<NoisePreset>().is_err());
    }

    #[test]
    fn test_next_cycles_all() {
        let mut preset = NoisePreset::White;
        for expected in [NoisePreset::Brownian, NoisePreset::Blue, NoisePreset::White] {
            preset = preset.next();
            assert_eq!(preset, expected);
        }
    }

    #[test]
    fn test_serde_lowercase() {
        let preset: NoisePreset = serde_yaml::from_str("blue").unwrap();
        assert_eq!(preset, NoisePreset::Blue);
    }
}
