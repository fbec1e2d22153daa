mod audio;
mod config;
mod dsp;
mod types;
mod ui;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, path::PathBuf, time::Duration};

use audio::{device, CpalSink, PlaybackController};
use config::PlayerConfig;
use dsp::NoiseFactory;
use types::preset::NoisePreset;
use types::sample_rate::{SampleRate, SUPPORTED_SAMPLE_RATES};
use ui::{app::App, events, render};

/// Procedural white, brownian and blue noise player
#[derive(Parser, Debug)]
#[command(name = "noise-player")]
#[command(about = "Procedural noise player", long_about = None)]
struct Args {
    /// Configuration file (YAML)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// List available audio output devices and exit
    #[arg(short = 'l', long = "list")]
    list_devices: bool,

    /// Print supported sample rates and exit
    #[arg(long = "rates")]
    list_rates: bool,

    /// Noise preset to start with (white, brownian, blue)
    #[arg(short = 'p', long = "preset")]
    preset: Option<NoisePreset>,

    /// Output sample rate in Hz
    #[arg(short = 'r', long = "sample-rate", value_parser = parse_sample_rate)]
    sample_rate: Option<SampleRate>,

    /// Log file, overrides the config
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Start playing immediately
    #[arg(short = 'a', long = "autoplay")]
    autoplay: bool,
}

fn parse_sample_rate(value: &str) -> Result<SampleRate, String> {
    let hz: u32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    SampleRate::try_from(hz)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_rates {
        println!("Supported sample rates:");
        for hz in SUPPORTED_SAMPLE_RATES {
            println!("  {} Hz", hz);
        }
        return Ok(());
    }

    if args.list_devices {
        println!("Available Audio Output Devices:");
        for (i, device) in device::list_audio_devices()?.iter().enumerate() {
            println!("  {}: {}", i, device);
        }
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => PlayerConfig::load(path)?,
        None => PlayerConfig::default(),
    };

    if let Some(preset) = args.preset {
        config.preset = preset;
    }
    if let Some(sample_rate) = args.sample_rate {
        config.sample_rate = sample_rate;
    }
    if let Some(log_file) = args.log_file {
        config.log.file = log_file;
    }

    init_logging(&config)?;
    log::info!(
        "Starting noise-player: {} noise at {}, device '{}'",
        config.preset,
        config.sample_rate,
        config.device
    );

    let controller = PlaybackController::new(
        Box::new(NoiseFactory::new(config.seed, config.white_distribution)),
        Box::new(CpalSink::new(config.device_selector())),
        config.playback_options(),
    );

    let mut app = App::new(controller);
    if args.autoplay {
        app.toggle_playback();
    }

    run_terminal(&mut app)
}

/// Route `log` output to a file; the terminal belongs to the UI
fn init_logging(config: &PlayerConfig) -> Result<()> {
    let path = config.log.file.display().to_string();
    simple_log::file(path.clone(), &config.log.level, 10, 2)
        .map_err(|err| anyhow!("Failed to initialise logging to {}: {}", path, err))
}

/// Set up the terminal, run the UI, and always restore the terminal
fn run_terminal(app: &mut App) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_ui_loop(&mut terminal, app);

    app.controller.stop();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Run UI loop
fn run_ui_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| render::render(f, app))?;

        events::handle_events(app)?;

        if app.should_quit {
            break;
        }

        // Small sleep to reduce CPU usage
        std::thread::sleep(Duration::from_millis(16)); // ~60 FPS
    }

    Ok(())
}
