use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use super::app::{App, Parameter};
use crate::audio::stream::StreamCondition;
use crate::audio::PlaybackState;
use crate::types::preset::NoisePreset;

/// Render the TUI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Title
            Constraint::Length(5),  // Transport / preset
            Constraint::Length(4),  // Settings
            Constraint::Length(15), // Scope (13 lines + 2 borders)
            Constraint::Length(3),  // Buffer stats
            Constraint::Min(5),     // Help / status
        ])
        .split(frame.size());

    render_title(frame, chunks[0]);
    render_transport(frame, chunks[1], app);
    render_settings(frame, chunks[2], app);
    render_scope(frame, chunks[3], app);
    render_stats(frame, chunks[4], app);
    if app.show_help {
        render_help(frame, chunks[5]);
    } else {
        render_status(frame, chunks[5], app);
    }
}

/// Render title bar
fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new("Noise Player")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(title, area);
}

/// Render playback state and preset selector
fn render_transport(frame: &mut Frame, area: Rect, app: &App) {
    let controller = &app.controller;

    let (state_text, state_color) = match controller.state() {
        PlaybackState::Playing => ("▶ Playing", Color::Green),
        PlaybackState::Paused => ("⏸ Paused", Color::Yellow),
        PlaybackState::Stopped => ("■ Stopped", Color::Red),
    };

    let mut presets = Vec::new();
    for (i, preset) in NoisePreset::ALL.iter().enumerate() {
        let style = if *preset == controller.preset() {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        presets.push(Span::styled(format!(" {}={} ", i + 1, preset), style));
    }

    let device = controller.device_name().unwrap_or("-");
    let lines = vec![
        Line::from(Span::styled(
            state_text,
            Style::default().fg(state_color).add_modifier(Modifier::BOLD),
        )),
        Line::from(presets),
        Line::from(format!("{}  |  Device: {}", controller.sample_rate(), device)),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Playback").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Render noise settings and volume gauges
fn render_settings(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(format!("{} Settings", app.controller.preset()))
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let param_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(inner);

    let settings = app.controller.settings();
    let volume = app.controller.volume() as f64 / 100.0;

    let gauges = [
        (Parameter::Amplitude, "Amplitude", settings.amplitude()),
        (Parameter::Randomness, "Randomness", settings.randomness()),
        (Parameter::Smoothing, "Smoothing", settings.smoothing()),
        (Parameter::Volume, "Volume", volume),
    ];

    for ((param, name, value), area) in gauges.into_iter().zip(param_chunks.iter()) {
        render_parameter(frame, *area, name, value, app.selected_param == param);
    }
}

/// Render a single unit-range parameter with gauge
fn render_parameter(frame: &mut Frame, area: Rect, name: &str, value: f64, selected: bool) {
    let color = if selected { Color::Yellow } else { Color::Green };
    let style = if selected {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    };

    let gauge = Gauge::default()
        .block(Block::default())
        .gauge_style(style)
        .label(format!("{}: {:.2}", name, value))
        .ratio(value.clamp(0.0, 1.0));

    frame.render_widget(gauge, area);
}

/// Render the last output samples
/// 13 lines: line 7 = silence, lines 1-6 positive, lines 8-13 negative
fn render_scope(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title("Output").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(samples) = app.controller.scope() else {
        return;
    };

    let width = inner.width as usize;
    const HEIGHT: usize = 13;

    if width == 0 || samples.is_empty() {
        return;
    }

    let mut grid = vec![vec![' '; width]; HEIGHT];

    // Downsample to fit width
    let step = if samples.len() >= width {
        samples.len() as f32 / width as f32
    } else {
        1.0
    };

    for x in 0..width.min(samples.len()) {
        let index = (x as f32 * step) as usize;
        let Some(&sample) = samples.get(index) else {
            break;
        };

        let normalized = sample as f32 / i16::MAX as f32;
        let line = ((1.0 - normalized) * 6.0).clamp(0.0, 12.0).round() as usize;
        grid[line][x] = '.';
    }

    let lines: Vec<Line> = grid
        .iter()
        .map(|row| {
            let text: String = row.iter().collect();
            Line::from(Span::styled(text, Style::default().fg(Color::Green)))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render buffer counters
fn render_stats(frame: &mut Frame, area: Rect, app: &App) {
    let stats = app.controller.stats();
    let text = format!(
        "Underruns: {}  |  Overruns: {}  |  Written: {}  |  Read: {}",
        stats.count(StreamCondition::Underrun),
        stats.count(StreamCondition::Overrun),
        stats.samples_written,
        stats.samples_read
    );

    let paragraph = Paragraph::new(text)
        .block(Block::default().title("Buffer").borders(Borders::ALL))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));

    frame.render_widget(paragraph, area);
}

/// Render last error, or the short key summary
fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let line = match &app.status {
        Some(message) => Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from("Space: Play/Pause  |  S: Stop  |  1-3: Preset  |  ?: Help  |  Q: Quit"),
    };

    let paragraph = Paragraph::new(vec![line])
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray));

    frame.render_widget(paragraph, area);
}

/// Render help text
fn render_help(frame: &mut Frame, area: Rect) {
    let help_text = vec![
        Line::from("Controls:"),
        Line::from("  Space: Play/Pause  |  S: Stop  |  1/2/3 or Tab: White/Brownian/Blue"),
        Line::from("  ←/→ or H/L: Select parameter  |  ↑/↓, K/J or +/-: Adjust"),
        Line::from("  ?: Toggle help  |  Q/Esc: Quit"),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray));

    frame.render_widget(paragraph, area);
}
