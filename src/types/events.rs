use crate::dsp::{NoiseGenerator, NoiseSettings};

/// Commands sent from the controller to the producer thread
///
/// The producer acknowledges every command with the generator state as of
/// after the command was applied and before any further samples are made.
pub enum EngineCommand {
    /// Replace the generator and flush whatever the old one buffered
    SwapGenerator(Box<dyn NoiseGenerator>),
    /// Live parameter change; the running state is kept
    UpdateSettings(NoiseSettings),
    /// Stop pushing; the stream is flushed and goes idle
    Pause,
    /// Continue from the current generator state
    Resume,
    /// Report state only
    Snapshot,
    /// Exit the producer loop
    Shutdown,
}

impl EngineCommand {
    pub fn name(&self) -> &'static str {
        match self {
            EngineCommand::SwapGenerator(_) => "swap-generator",
            EngineCommand::UpdateSettings(_) => "update-settings",
            EngineCommand::Pause => "pause",
            EngineCommand::Resume => "resume",
            EngineCommand::Snapshot => "snapshot",
            EngineCommand::Shutdown => "shutdown",
        }
    }
}

impl std::fmt::Debug for EngineCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineCommand::SwapGenerator(generator) => f
                .debug_tuple("SwapGenerator")
                .field(&generator.preset())
                .finish(),
            EngineCommand::UpdateSettings(settings) => {
                f.debug_tuple("UpdateSettings").field(settings).finish()
            }
            other => f.write_str(other.name()),
        }
    }
}
