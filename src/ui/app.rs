use crate::audio::{PlaybackController, PlaybackError};
use crate::types::preset::NoisePreset;

/// Amount a settings field moves per key press
const SETTING_STEP: f64 = 0.05;
/// Amount volume moves per key press
const VOLUME_STEP: u32 = 5;

/// Editable values on the control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    Amplitude,
    Randomness,
    Smoothing,
    Volume,
}

/// UI application state
pub struct App {
    /// Engine driven by this panel
    pub controller: PlaybackController,
    /// Currently selected parameter for editing
    pub selected_param: Parameter,
    /// Last error shown in the status line
    pub status: Option<String>,
    /// Whether to quit the application
    pub should_quit: bool,
    /// Whether to show help screen
    pub show_help: bool,
}

impl App {
    pub fn new(controller: PlaybackController) -> Self {
        Self {
            controller,
            selected_param: Parameter::Amplitude,
            status: None,
            should_quit: false,
            show_help: false,
        }
    }

    /// Space bar: start, pause or resume
    pub fn toggle_playback(&mut self) {
        let result = self.controller.toggle();
        self.report(result);
    }

    pub fn stop(&mut self) {
        self.controller.stop();
        self.status = None;
    }

    pub fn select_preset(&mut self, preset: NoisePreset) {
        if self.controller.preset() == preset {
            return;
        }
        let result = self.controller.select_preset(preset);
        self.report(result);
    }

    /// Cycle to next parameter
    pub fn next_parameter(&mut self) {
        self.selected_param = match self.selected_param {
            Parameter::Amplitude => Parameter::Randomness,
            Parameter::Randomness => Parameter::Smoothing,
            Parameter::Smoothing => Parameter::Volume,
            Parameter::Volume => Parameter::Amplitude,
        };
    }

    /// Cycle to previous parameter
    pub fn prev_parameter(&mut self) {
        self.selected_param = match self.selected_param {
            Parameter::Amplitude => Parameter::Volume,
            Parameter::Randomness => Parameter::Amplitude,
            Parameter::Smoothing => Parameter::Randomness,
            Parameter::Volume => Parameter::Smoothing,
        };
    }

    /// Increase selected parameter value
    pub fn increase_value(&mut self) {
        self.adjust(1.0);
    }

    /// Decrease selected parameter value
    pub fn decrease_value(&mut self) {
        self.adjust(-1.0);
    }

    fn adjust(&mut self, direction: f64) {
        let settings = self.controller.settings();
        let (amplitude, randomness, smoothing) =
            (settings.amplitude(), settings.randomness(), settings.smoothing());

        let result = match self.selected_param {
            Parameter::Volume => {
                let volume = self.controller.volume() as u32;
                let next = if direction > 0.0 {
                    (volume + VOLUME_STEP).min(100)
                } else {
                    volume.saturating_sub(VOLUME_STEP)
                };
                self.controller.set_volume(next)
            }
            Parameter::Amplitude => {
                let next = step(amplitude, direction);
                self.controller.update_settings_from(next, randomness, smoothing)
            }
            Parameter::Randomness => {
                let next = step(randomness, direction);
                self.controller.update_settings_from(amplitude, next, smoothing)
            }
            Parameter::Smoothing => {
                let next = step(smoothing, direction);
                self.controller.update_settings_from(amplitude, randomness, next)
            }
        };

        self.report(result);
    }

    fn report(&mut self, result: Result<(), PlaybackError>) {
        match result {
            Ok(()) => self.status = None,
            Err(err) => {
                log::warn!("{}", err);
                self.status = Some(err.to_string());
            }
        }
    }

    /// Mark app for quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Toggle help screen visibility
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

/// Move a unit-range value one step, snapped to the step grid
fn step(value: f64, direction: f64) -> f64 {
    let next = value + direction * SETTING_STEP;
    ((next / SETTING_STEP).round() * SETTING_STEP).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::sink::testing::ManualSink;
    use crate::audio::{PlaybackOptions, PlaybackState};
    use crate::dsp::NoiseFactory;
    use crate::types::preset::WhiteDistribution;

    fn app(sink: &ManualSink) -> App {
        let controller = PlaybackController::new(
            Box::new(NoiseFactory::new(Some(1), WhiteDistribution::Uniform)),
            Box::new(sink.clone()),
            PlaybackOptions::default(),
        );
        App::new(controller)
    }

    #[test]
    fn test_step_snaps_and_clamps() {
        assert!((step(0.5, 1.0) - 0.55).abs() < 1e-9);
        assert_eq!(step(0.98, 1.0), 1.0);
        assert_eq!(step(0.02, -1.0), 0.0);
    }

    #[test]
    fn test_parameter_cycle() {
        let sink = ManualSink::new();
        let mut app = app(&sink);
        for _ in 0..4 {
            app.next_parameter();
        }
        assert_eq!(app.selected_param, Parameter::Amplitude);
        app.prev_parameter();
        assert_eq!(app.selected_param, Parameter::Volume);
    }

    #[test]
    fn test_adjust_volume_and_settings() {
        let sink = ManualSink::new();
        let mut app = app(&sink);

        app.selected_param = Parameter::Volume;
        app.increase_value();
        assert_eq!(app.controller.volume(), 75);
        for _ in 0..30 {
            app.decrease_value();
        }
        assert_eq!(app.controller.volume(), 0);

        app.selected_param = Parameter::Smoothing;
        let before = app.controller.settings().smoothing();
        app.increase_value();
        assert!((app.controller.settings().smoothing() - step(before, 1.0)).abs() < 1e-9);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_toggle_reports_device_errors() {
        let sink = ManualSink::new();
        let mut app = app(&sink);

        sink.fail_next_open();
        app.toggle_playback();
        assert!(app.status.is_some());
        assert_eq!(app.controller.state(), PlaybackState::Stopped);

        app.toggle_playback();
        assert!(app.status.is_none());
        assert_eq!(app.controller.state(), PlaybackState::Playing);

        app.stop();
        assert!(!sink.is_open());
    }
}
