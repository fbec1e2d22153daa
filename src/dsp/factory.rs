use rand::{rngs::SmallRng, SeedableRng};

use super::noise::{Blue, Brownian, NoiseGenerator, White};
use super::settings::NoiseSettings;
use crate::types::preset::{NoisePreset, WhiteDistribution};

/// Builds generators for the playback controller
pub trait GeneratorFactory: Send {
    fn create(&mut self, preset: NoisePreset, settings: NoiseSettings) -> Box<dyn NoiseGenerator>;
}

/// Default factory producing `SmallRng`-backed generators
///
/// With a seed, the n-th generator created uses `seed + n`, so a whole
/// session is reproducible while successive presets still differ.
#[derive(Debug, Clone, Default)]
pub struct NoiseFactory {
    seed: Option<u64>,
    white_distribution: WhiteDistribution,
    created: u64,
}

impl NoiseFactory {
    pub fn new(seed: Option<u64>, white_distribution: WhiteDistribution) -> Self {
        Self {
            seed,
            white_distribution,
            created: 0,
        }
    }

    fn next_rng(&mut self) -> SmallRng {
        let rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(self.created)),
            None => SmallRng::from_entropy(),
        };
        self.created += 1;
        rng
    }
}

impl GeneratorFactory for NoiseFactory {
    fn create(&mut self, preset: NoisePreset, settings: NoiseSettings) -> Box<dyn NoiseGenerator> {
        let rng = self.next_rng();
        match preset {
            NoisePreset::White => {
                Box::new(White::new_with_rng(settings, self.white_distribution, rng))
            }
            NoisePreset::Brownian => Box::new(Brownian::new_with_rng(settings, rng)),
            NoisePreset::Blue => Box::new(Blue::new_with_rng(settings, rng)),
        }
    }
}
