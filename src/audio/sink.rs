use std::sync::Arc;

use super::error::PlaybackError;
use super::stream::SampleStream;
use crate::types::sample_rate::SampleRate;

/// Platform audio output the controller plays through
///
/// `open` starts pulling mono samples from `stream` at `sample_rate`; the
/// device stays open for as long as the returned handle lives.
pub trait AudioSink {
    fn open(
        &mut self,
        sample_rate: SampleRate,
        stream: Arc<SampleStream>,
    ) -> Result<Box<dyn OutputHandle>, PlaybackError>;
}

/// An open output device. Dropping it closes the device.
pub trait OutputHandle {
    fn device_name(&self) -> &str;
}
