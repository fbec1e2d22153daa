use cpal::traits::{DeviceTrait, StreamTrait};
use std::sync::Arc;

use super::device::{resolve_device, DeviceSelector};
use super::error::PlaybackError;
use super::sink::{AudioSink, OutputHandle};
use super::stream::SampleStream;
use crate::types::sample_rate::SampleRate;

/// Mono samples pulled per callback before the scratch buffer grows
const SCRATCH_FRAMES: usize = 4096;

/// Output through the platform audio host
pub struct CpalSink {
    selector: DeviceSelector,
}

impl CpalSink {
    pub fn new(selector: DeviceSelector) -> Self {
        Self { selector }
    }
}

impl AudioSink for CpalSink {
    fn open(
        &mut self,
        sample_rate: SampleRate,
        stream: Arc<SampleStream>,
    ) -> Result<Box<dyn OutputHandle>, PlaybackError> {
        let device = resolve_device(&self.selector).map_err(PlaybackError::device)?;
        let device_name = device
            .description()
            .map(|desc| desc.name().to_string())
            .unwrap_or_else(|_| "Unknown".to_string());

        let default_config = device.default_output_config().map_err(PlaybackError::device)?;
        let channels = default_config.channels();
        let config = cpal::StreamConfig {
            channels,
            sample_rate: sample_rate.hz(),
            buffer_size: cpal::BufferSize::Default,
        };

        log::info!(
            "Opening output '{}' at {} with {} channel(s), {:?}",
            device_name,
            sample_rate,
            channels,
            default_config.sample_format()
        );

        let output = match default_config.sample_format() {
            cpal::SampleFormat::F32 => build_output_stream::<f32>(&device, &config, stream),
            cpal::SampleFormat::I16 => build_output_stream::<i16>(&device, &config, stream),
            cpal::SampleFormat::U16 => build_output_stream::<u16>(&device, &config, stream),
            other => Err(PlaybackError::device(format!("unsupported sample format {:?}", other))),
        }?;

        output.play().map_err(PlaybackError::device)?;

        Ok(Box::new(CpalOutput {
            _stream: output,
            device_name,
        }))
    }
}

/// Build a stream that duplicates the mono noise onto every channel
fn build_output_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    stream: Arc<SampleStream>,
) -> Result<cpal::Stream, PlaybackError>
where
    T: cpal::Sample + cpal::SizedSample + cpal::FromSample<i16>,
{
    let channels = config.channels.max(1) as usize;
    let mut scratch = vec![0i16; SCRATCH_FRAMES];

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let frames = data.len() / channels;

                if scratch.len() < frames {
                    scratch.resize(frames, 0);
                }

                stream.pull(&mut scratch[..frames]);

                for (frame, &sample) in data.chunks_mut(channels).zip(&scratch[..frames]) {
                    frame.fill(T::from_sample(sample));
                }
            },
            |err| log::error!("Audio stream error: {}", err),
            None,
        )
        .map_err(PlaybackError::device)
}

struct CpalOutput {
    _stream: cpal::Stream,
    device_name: String,
}

impl OutputHandle for CpalOutput {
    fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        log::info!("Closing output '{}'", self.device_name);
    }
}
