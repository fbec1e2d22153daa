pub mod factory;
pub mod noise;
pub mod settings;

pub use factory::{GeneratorFactory, NoiseFactory};
pub use noise::{GeneratorState, NoiseGenerator};
pub use settings::{NoiseError, NoiseSettings, PresetSettings};
