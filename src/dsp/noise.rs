//! Noise colours rendered straight to 16-bit PCM.
//!
//! Every generator is an infinite iterator of `i16` samples and also
//! implements [`NoiseGenerator`] so the producer loop can hold any colour
//! behind one boxed trait object. Generators are generic over the RNG; pass a
//! seeded RNG to get reproducible output.

use rand::{rngs::SmallRng, Rng};
use rand_distr::StandardNormal;

use super::settings::NoiseSettings;
use crate::types::preset::{NoisePreset, WhiteDistribution};

/// Snapshot of a generator's running state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeneratorState {
    /// Random-walk position in `[-1, 1]` (always 0 for white noise)
    pub accumulator: f64,
    /// Last normalized output before amplitude scaling
    pub previous_output: f64,
}

/// Source of PCM samples for one noise colour
pub trait NoiseGenerator: Send {
    /// Which colour this generator produces
    fn preset(&self) -> NoisePreset;

    /// Produce the next sample
    fn generate_sample(&mut self) -> i16;

    /// Current parameters
    fn settings(&self) -> NoiseSettings;

    /// Replace the parameters; running state is kept so the waveform stays continuous
    fn set_settings(&mut self, settings: NoiseSettings);

    /// Running state snapshot
    fn state(&self) -> GeneratorState;

    /// Fill `out` with consecutive samples
    fn fill(&mut self, out: &mut [i16]) {
        for sample in out.iter_mut() {
            *sample = self.generate_sample();
        }
    }
}

/// Convert a normalized value to PCM, rounding and saturating
#[inline]
pub(crate) fn to_pcm(value: f64) -> i16 {
    (value * i16::MAX as f64)
        .round()
        .clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// Bounded random walk shared by brownian and blue noise
///
/// Each step adds a uniform perturbation in `[-randomness, randomness)` and
/// reflects the position back into `[-1, 1]` instead of clipping it, which
/// keeps the walk free of flat plateaus at the rails.
#[derive(Clone, Debug)]
struct RandomWalk<R: Rng> {
    rng: R,
    position: f64,
}

impl<R: Rng> RandomWalk<R> {
    fn new(rng: R) -> Self {
        Self { rng, position: 0.0 }
    }

    #[inline]
    fn step(&mut self, randomness: f64) -> f64 {
        let delta = (self.rng.r#gen::<f64>() * 2.0 - 1.0) * randomness;
        let mut next = self.position + delta;

        // |delta| <= 1, so one reflection always lands back in range
        if next > 1.0 {
            next = 2.0 - next;
        } else if next < -1.0 {
            next = -2.0 - next;
        }

        self.position = next;
        next
    }
}

/// White noise - independent draws, no memory between samples
#[derive(Clone, Debug)]
pub struct White<R: Rng = SmallRng> {
    rng: R,
    settings: NoiseSettings,
    distribution: WhiteDistribution,
    last: f64,
}

impl<R: Rng> White<R> {
    pub fn new_with_rng(settings: NoiseSettings, distribution: WhiteDistribution, rng: R) -> Self {
        Self {
            rng,
            settings,
            distribution,
            last: 0.0,
        }
    }

    #[inline]
    fn draw(&mut self) -> f64 {
        match self.distribution {
            WhiteDistribution::Uniform => self.rng.gen_range(-1.0..=1.0),
            WhiteDistribution::Gaussian => {
                // sigma = 1/3 keeps 99.7% of draws inside the rails before clamping
                let z: f64 = self.rng.sample(StandardNormal);
                (z / 3.0).clamp(-1.0, 1.0)
            }
        }
    }
}

impl<R: Rng> Iterator for White<R> {
    type Item = i16;

    #[inline]
    fn next(&mut self) -> Option<i16> {
        let value = self.draw() * self.settings.randomness();
        self.last = value;
        Some(to_pcm(value * self.settings.amplitude()))
    }
}

impl<R: Rng + Send> NoiseGenerator for White<R> {
    fn preset(&self) -> NoisePreset {
        NoisePreset::White
    }

    fn generate_sample(&mut self) -> i16 {
        self.next().unwrap_or(0)
    }

    fn settings(&self) -> NoiseSettings {
        self.settings
    }

    fn set_settings(&mut self, settings: NoiseSettings) {
        self.settings = settings;
    }

    fn state(&self) -> GeneratorState {
        GeneratorState {
            accumulator: 0.0,
            previous_output: self.last,
        }
    }
}

/// Brownian (red) noise - a reflected random walk, low-passed by `smoothing`
#[derive(Clone, Debug)]
pub struct Brownian<R: Rng = SmallRng> {
    walk: RandomWalk<R>,
    settings: NoiseSettings,
    smoothed: f64,
}

impl<R: Rng> Brownian<R> {
    pub fn new_with_rng(settings: NoiseSettings, rng: R) -> Self {
        Self {
            walk: RandomWalk::new(rng),
            settings,
            smoothed: 0.0,
        }
    }

    /// Current walk position
    #[cfg(test)]
    pub fn accumulator(&self) -> f64 {
        self.walk.position
    }
}

impl<R: Rng> Iterator for Brownian<R> {
    type Item = i16;

    #[inline]
    fn next(&mut self) -> Option<i16> {
        let position = self.walk.step(self.settings.randomness());
        let smoothing = self.settings.smoothing();
        self.smoothed = smoothing * self.smoothed + (1.0 - smoothing) * position;
        Some(to_pcm(self.smoothed * self.settings.amplitude()))
    }
}

impl<R: Rng + Send> NoiseGenerator for Brownian<R> {
    fn preset(&self) -> NoisePreset {
        NoisePreset::Brownian
    }

    fn generate_sample(&mut self) -> i16 {
        self.next().unwrap_or(0)
    }

    fn settings(&self) -> NoiseSettings {
        self.settings
    }

    fn set_settings(&mut self, settings: NoiseSettings) {
        self.settings = settings;
    }

    fn state(&self) -> GeneratorState {
        GeneratorState {
            accumulator: self.walk.position,
            previous_output: self.smoothed,
        }
    }
}

/// Blue noise - first difference of the brownian walk
///
/// `smoothing` blends each raw difference with the previous output, trading
/// some of the high-frequency tilt for a softer sound.
#[derive(Clone, Debug)]
pub struct Blue<R: Rng = SmallRng> {
    walk: RandomWalk<R>,
    settings: NoiseSettings,
    prev_position: f64,
    prev_output: f64,
}

impl<R: Rng> Blue<R> {
    pub fn new_with_rng(settings: NoiseSettings, rng: R) -> Self {
        Self {
            walk: RandomWalk::new(rng),
            settings,
            prev_position: 0.0,
            prev_output: 0.0,
        }
    }
}

impl<R: Rng> Iterator for Blue<R> {
    type Item = i16;

    #[inline]
    fn next(&mut self) -> Option<i16> {
        let position = self.walk.step(self.settings.randomness());
        let diff = position - self.prev_position;
        self.prev_position = position;

        let smoothing = self.settings.smoothing();
        self.prev_output = smoothing * self.prev_output + (1.0 - smoothing) * diff;
        Some(to_pcm(self.prev_output * self.settings.amplitude()))
    }
}

impl<R: Rng + Send> NoiseGenerator for Blue<R> {
    fn preset(&self) -> NoisePreset {
        NoisePreset::Blue
    }

    fn generate_sample(&mut self) -> i16 {
        self.next().unwrap_or(0)
    }

    fn settings(&self) -> NoiseSettings {
        self.settings
    }

    fn set_settings(&mut self, settings: NoiseSettings) {
        self.settings = settings;
    }

    fn state(&self) -> GeneratorState {
        GeneratorState {
            accumulator: self.walk.position,
            previous_output: self.prev_output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn settings(amplitude: f64, randomness: f64, smoothing: f64) -> NoiseSettings {
        NoiseSettings::new(amplitude, randomness, smoothing).unwrap()
    }

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn variance(samples: &[i16]) -> f64 {
        let n = samples.len() as f64;
        let mean = samples.iter().map(|&s| s as f64).sum::<f64>() / n;
        samples.iter().map(|&s| (s as f64 - mean).powi(2)).sum::<f64>() / n
    }

    #[test]
    fn test_to_pcm_saturates() {
        assert_eq!(to_pcm(1.0), i16::MAX);
        assert_eq!(to_pcm(-1.0), -i16::MAX);
        assert_eq!(to_pcm(2.0), i16::MAX);
        assert_eq!(to_pcm(-2.0), i16::MIN);
        assert_eq!(to_pcm(0.0), 0);
    }

    #[test]
    fn test_all_colours_stay_in_pcm_range() {
        // Extreme corners of the parameter space
        for &(a, r, s) in &[(1.0, 1.0, 0.0), (1.0, 1.0, 1.0), (1.0, 0.5, 0.5), (0.3, 1.0, 0.9)] {
            let cfg = settings(a, r, s);
            let generators: Vec<Box<dyn NoiseGenerator>> = vec![
                Box::new(White::new_with_rng(cfg, WhiteDistribution::Uniform, seeded(1))),
                Box::new(White::new_with_rng(cfg, WhiteDistribution::Gaussian, seeded(2))),
                Box::new(Brownian::new_with_rng(cfg, seeded(3))),
                Box::new(Blue::new_with_rng(cfg, seeded(4))),
            ];

            for mut generator in generators {
                for _ in 0..20_000 {
                    let sample = generator.generate_sample() as i32;
                    assert!(
                        (i16::MIN as i32..=i16::MAX as i32).contains(&sample),
                        "{:?} produced {}",
                        generator.preset(),
                        sample
                    );
                }
            }
        }
    }

    #[test]
    fn test_white_variance_grows_with_randomness() {
        let mut previous = -1.0;
        for randomness in [0.0, 0.1, 0.25, 0.5, 0.75, 1.0] {
            let cfg = settings(1.0, randomness, 0.0);
            let mut white = White::new_with_rng(cfg, WhiteDistribution::Uniform, seeded(9));
            let samples: Vec<i16> = (&mut white).take(50_000).collect();
            let v = variance(&samples);
            assert!(v >= previous, "variance {} at r={} dropped below {}", v, randomness, previous);
            previous = v;
        }
    }

    #[test]
    fn test_white_zero_randomness_is_silent() {
        let cfg = settings(1.0, 0.0, 0.0);
        let mut white = White::new_with_rng(cfg, WhiteDistribution::Uniform, seeded(5));
        assert!((&mut white).take(1000).all(|s| s == 0));
    }

    #[test]
    fn test_zero_amplitude_is_silent() {
        let cfg = settings(0.0, 1.0, 0.3);
        let mut brownian = Brownian::new_with_rng(cfg, seeded(6));
        let mut blue = Blue::new_with_rng(cfg, seeded(6));
        let mut white = White::new_with_rng(cfg, WhiteDistribution::Gaussian, seeded(6));

        for _ in 0..1000 {
            assert_eq!(brownian.generate_sample(), 0);
            assert_eq!(blue.generate_sample(), 0);
            assert_eq!(white.generate_sample(), 0);
        }
    }

    #[test]
    fn test_brownian_accumulator_bounded() {
        let mut brownian = Brownian::new_with_rng(settings(1.0, 1.0, 0.0), seeded(11));
        for _ in 0..100_000 {
            brownian.generate_sample();
            let acc = brownian.accumulator();
            assert!((-1.0..=1.0).contains(&acc), "accumulator escaped: {}", acc);
        }
    }

    #[test]
    fn test_brownian_without_perturbation_is_flat_zero() {
        let mut brownian = Brownian::new_with_rng(settings(1.0, 0.0, 0.0), seeded(12));
        for _ in 0..10_000 {
            assert_eq!(brownian.generate_sample(), 0);
        }
        assert_eq!(brownian.accumulator(), 0.0);
    }

    #[test]
    fn test_brownian_output_tracks_accumulator_without_smoothing() {
        let mut brownian = Brownian::new_with_rng(settings(0.5, 0.2, 0.0), seeded(13));
        for _ in 0..1000 {
            let sample = brownian.generate_sample();
            assert_eq!(sample, to_pcm(brownian.accumulator() * 0.5));
        }
    }

    #[test]
    fn test_blue_is_blended_brownian_difference() {
        let smoothing = 0.4;
        let mut brownian = Brownian::new_with_rng(settings(1.0, 0.3, 0.0), seeded(7));
        let mut blue = Blue::new_with_rng(settings(1.0, 0.3, smoothing), seeded(7));

        let mut prev_position = 0.0;
        let mut prev_output = 0.0;
        for n in 0..5000 {
            brownian.generate_sample();
            let position = brownian.accumulator();

            let diff = position - prev_position;
            prev_position = position;
            prev_output = smoothing * prev_output + (1.0 - smoothing) * diff;

            let expected = to_pcm(prev_output * 1.0);
            assert_eq!(blue.generate_sample(), expected, "mismatch at sample {}", n);
        }
    }

    #[test]
    fn test_settings_update_keeps_accumulator() {
        let mut brownian = Brownian::new_with_rng(settings(1.0, 0.5, 0.0), seeded(21));
        for _ in 0..100 {
            brownian.generate_sample();
        }
        let before = brownian.state();

        brownian.set_settings(settings(0.2, 0.01, 0.5));
        assert_eq!(brownian.state(), before);

        // Next step moves at most `randomness` away
        brownian.generate_sample();
        assert!((brownian.accumulator() - before.accumulator).abs() <= 0.01 + f64::EPSILON);
    }

    #[test]
    fn test_random_walk_steps_within_randomness() {
        let mut walk = RandomWalk::new(seeded(21));
        let mut previous = 0.0;
        let mut moved = false;

        for _ in 0..10_000 {
            let position = walk.step(0.25);
            assert!((-1.0..=1.0).contains(&position), "walk escaped: {}", position);
            // Reflection can only shorten a step
            assert!((position - previous).abs() <= 0.25 + f64::EPSILON);
            moved |= position != previous;
            previous = position;
        }

        assert!(moved, "walk never left the origin");
    }

    #[test]
    fn test_seeded_generators_are_reproducible() {
        let cfg = settings(0.8, 0.6, 0.1);
        let a: Vec<i16> = Blue::new_with_rng(cfg, seeded(42)).take(256).collect();
        let b: Vec<i16> = Blue::new_with_rng(cfg, seeded(42)).take(256).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fill_matches_generate() {
        let cfg = settings(1.0, 1.0, 0.0);
        let mut a = White::new_with_rng(cfg, WhiteDistribution::Uniform, seeded(3));
        let mut b = White::new_with_rng(cfg, WhiteDistribution::Uniform, seeded(3));

        let mut buffer = [0i16; 64];
        a.fill(&mut buffer);
        for sample in buffer {
            assert_eq!(sample, b.generate_sample());
        }
    }
}
