use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Output sample rates offered to the user, in Hz
pub const SUPPORTED_SAMPLE_RATES: [u32; 2] = [44_100, 48_000];

/// Sample rate the output stream is opened with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SampleRate {
    Hz44100,
    #[default]
    Hz48000,
}

impl SampleRate {
    pub fn hz(self) -> u32 {
        match self {
            SampleRate::Hz44100 => 44_100,
            SampleRate::Hz48000 => 48_000,
        }
    }

    /// Number of mono samples covering `duration`, rounded up
    pub fn samples_for(self, duration: Duration) -> usize {
        let nanos = duration.as_nanos() * self.hz() as u128;
        nanos.div_ceil(1_000_000_000) as usize
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = String;

    fn try_from(hz: u32) -> Result<Self, Self::Error> {
        match hz {
            44_100 => Ok(SampleRate::Hz44100),
            48_000 => Ok(SampleRate::Hz48000),
            other => Err(format!(
                "unsupported sample rate {} Hz (supported: {:?})",
                other, SUPPORTED_SAMPLE_RATES
            )),
        }
    }
}

impl From<SampleRate> for u32 {
    fn from(rate: SampleRate) -> Self {
        rate.hz()
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.hz())
    }
}
