pub mod controller;
pub mod cpal_sink;
pub mod device;
pub mod error;
pub mod parameters;
pub mod producer;
pub mod sink;
pub mod stream;

pub use controller::{PlaybackController, PlaybackOptions, PlaybackState};
pub use cpal_sink::CpalSink;
pub use device::DeviceSelector;
pub use error::PlaybackError;
pub use stream::{BufferSettings, OverrunPolicy};
