pub mod events;
pub mod preset;
pub mod sample_rate;
