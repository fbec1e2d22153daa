use std::sync::Arc;

use super::error::PlaybackError;
use super::parameters::{volume_to_gain, MAX_VOLUME};
use super::producer::{prefill, ProducerHandle};
use super::sink::{AudioSink, OutputHandle};
use super::stream::{BufferSettings, SampleStream, StreamStats};
use crate::dsp::{GeneratorFactory, GeneratorState, NoiseError, NoiseSettings, PresetSettings};
use crate::types::events::EngineCommand;
use crate::types::preset::NoisePreset;
use crate::types::sample_rate::SampleRate;

/// Playback lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// Everything a controller needs besides its collaborators
#[derive(Debug, Clone, Copy)]
pub struct PlaybackOptions {
    pub sample_rate: SampleRate,
    pub buffer: BufferSettings,
    pub presets: PresetSettings,
    pub preset: NoisePreset,
    pub volume: u8,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            sample_rate: SampleRate::default(),
            buffer: BufferSettings::default(),
            presets: PresetSettings::default(),
            preset: NoisePreset::default(),
            volume: 70,
        }
    }
}

/// Resources that only exist while playing or paused
struct Session {
    stream: Arc<SampleStream>,
    producer: ProducerHandle,
    output: Box<dyn OutputHandle>,
}

/// Start/pause/stop state machine sitting between the UI and the engine
///
/// The controller owns the sample stream, the producer thread and the open
/// output device. Generator state is only ever touched by the producer
/// thread; every change travels as an [`EngineCommand`].
pub struct PlaybackController {
    factory: Box<dyn GeneratorFactory>,
    sink: Box<dyn AudioSink>,
    sample_rate: SampleRate,
    buffer: BufferSettings,
    presets: PresetSettings,
    preset: NoisePreset,
    volume: u8,
    state: PlaybackState,
    session: Option<Session>,
    last_state: Option<GeneratorState>,
    last_stats: StreamStats,
}

impl PlaybackController {
    pub fn new(
        factory: Box<dyn GeneratorFactory>,
        sink: Box<dyn AudioSink>,
        options: PlaybackOptions,
    ) -> Self {
        Self {
            factory,
            sink,
            sample_rate: options.sample_rate,
            buffer: options.buffer,
            presets: options.presets,
            preset: options.preset,
            volume: options.volume.min(MAX_VOLUME),
            state: PlaybackState::Stopped,
            session: None,
            last_state: None,
            last_stats: StreamStats::default(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn preset(&self) -> NoisePreset {
        self.preset
    }

    /// Settings of the selected preset
    pub fn settings(&self) -> NoiseSettings {
        self.presets.get(self.preset)
    }

    pub fn presets(&self) -> &PresetSettings {
        &self.presets
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Name of the open output device, if any
    pub fn device_name(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.output.device_name())
    }

    /// Buffer counters of the running session, or of the last one
    pub fn stats(&self) -> StreamStats {
        match &self.session {
            Some(session) => session.stream.stats(),
            None => self.last_stats,
        }
    }

    /// Recent output for display
    pub fn scope(&self) -> Option<Vec<i16>> {
        self.session.as_ref().map(|session| session.stream.scope())
    }

    /// State reported with the most recent producer acknowledgement
    #[cfg(test)]
    pub fn last_reported_state(&self) -> Option<GeneratorState> {
        self.last_state
    }

    /// Stopped -> Playing. Resumes when paused, no-op when already playing.
    pub fn start(&mut self) -> Result<(), PlaybackError> {
        match self.state {
            PlaybackState::Playing => return Ok(()),
            PlaybackState::Paused => return self.resume(),
            PlaybackState::Stopped => {}
        }

        let stream = Arc::new(SampleStream::new(self.sample_rate, self.buffer));
        stream.set_gain(volume_to_gain(self.volume));

        let mut generator = self.factory.create(self.preset, self.settings());
        prefill(generator.as_mut(), &stream, stream.capacity() / 2);

        let output = self.sink.open(self.sample_rate, stream.clone()).map_err(|err| {
            log::warn!("Could not start playback: {}", err);
            err
        })?;

        // Dropping `output` on failure closes the device again
        let producer = ProducerHandle::spawn(generator, stream.clone())?;

        log::info!(
            "Playing {} noise on '{}' at {} ({} sample buffer)",
            self.preset,
            output.device_name(),
            self.sample_rate,
            stream.capacity()
        );

        self.session = Some(Session {
            stream,
            producer,
            output,
        });
        self.state = PlaybackState::Playing;
        Ok(())
    }

    /// Playing -> Paused
    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        if self.state != PlaybackState::Playing {
            return Ok(());
        }

        self.send(EngineCommand::Pause)?;
        self.state = PlaybackState::Paused;
        log::info!("Paused");
        Ok(())
    }

    /// Paused -> Playing, continuing the waveform where it stopped
    pub fn resume(&mut self) -> Result<(), PlaybackError> {
        if self.state != PlaybackState::Paused {
            return Ok(());
        }

        self.send(EngineCommand::Resume)?;
        self.state = PlaybackState::Playing;
        log::info!("Resumed");
        Ok(())
    }

    /// Play/pause button semantics
    pub fn toggle(&mut self) -> Result<(), PlaybackError> {
        match self.state {
            PlaybackState::Stopped => self.start(),
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
        }
    }

    /// Any state -> Stopped. Closes the device, then joins the producer.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            self.state = PlaybackState::Stopped;
            return;
        };

        let Session {
            stream,
            producer,
            output,
        } = session;

        drop(output);

        match producer.shutdown() {
            Ok(state) => self.last_state = Some(state),
            Err(err) => log::warn!("Producer did not shut down cleanly: {}", err),
        }

        self.last_stats = stream.stats();
        self.state = PlaybackState::Stopped;
        log::info!(
            "Stopped ({} underruns, {} overruns)",
            self.last_stats.underruns,
            self.last_stats.overruns
        );
        log::debug!("Generator state at stop: {:?}", self.last_state);
    }

    /// Switch noise colour; a running session swaps generators and flushes
    pub fn select_preset(&mut self, preset: NoisePreset) -> Result<(), PlaybackError> {
        if self.session.is_some() {
            let generator = self.factory.create(preset, self.presets.get(preset));
            self.send(EngineCommand::SwapGenerator(generator))?;
        }

        self.preset = preset;
        log::info!("Selected {} noise", preset);
        Ok(())
    }

    /// Replace the selected preset's settings without resetting the waveform
    pub fn update_settings(&mut self, settings: NoiseSettings) -> Result<(), PlaybackError> {
        if self.session.is_some() {
            self.send(EngineCommand::UpdateSettings(settings))?;
        }

        self.presets.set(self.preset, settings);

        log::debug!("Updated {} settings: {:?}", self.preset, settings);
        Ok(())
    }

    /// Validate raw values, then apply them like [`Self::update_settings`]
    pub fn update_settings_from(
        &mut self,
        amplitude: f64,
        randomness: f64,
        smoothing: f64,
    ) -> Result<(), PlaybackError> {
        let settings = NoiseSettings::new(amplitude, randomness, smoothing)?;
        self.update_settings(settings)
    }

    /// Output volume 0..=100, applied when the sink pulls
    pub fn set_volume(&mut self, volume: u32) -> Result<(), PlaybackError> {
        if volume > MAX_VOLUME as u32 {
            return Err(NoiseError::InvalidParameter {
                name: "volume",
                value: volume as f64,
                range: "0..=100",
            }
            .into());
        }

        self.volume = volume as u8;
        if let Some(session) = &self.session {
            session.stream.set_gain(volume_to_gain(self.volume));
        }
        Ok(())
    }

    /// Ask the producer for the generator's current state
    pub fn generator_state(&mut self) -> Result<Option<GeneratorState>, PlaybackError> {
        if self.session.is_none() {
            return Ok(None);
        }
        self.send(EngineCommand::Snapshot).map(Some)
    }

    fn send(&mut self, command: EngineCommand) -> Result<GeneratorState, PlaybackError> {
        let session = self.session.as_ref().ok_or(PlaybackError::EngineDisconnected)?;
        let state = session.producer.send(command)?;
        self.last_state = Some(state);
        Ok(state)
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.stop();
    }
}
