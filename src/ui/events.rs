use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use super::app::App;
use crate::types::preset::NoisePreset;

/// Handle keyboard events and update app state
pub fn handle_events(app: &mut App) -> anyhow::Result<()> {
    // Poll for events with timeout
    if event::poll(Duration::from_millis(50))? {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Release {
                handle_key_event(app, key);
            }
        }
    }
    Ok(())
}

/// Process individual key press
fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
        app.quit();
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('?') => app.toggle_help(),

        // Transport
        KeyCode::Char(' ') => app.toggle_playback(),
        KeyCode::Char('s') => app.stop(),

        // Presets
        KeyCode::Char('1') => app.select_preset(NoisePreset::White),
        KeyCode::Char('2') => app.select_preset(NoisePreset::Brownian),
        KeyCode::Char('3') => app.select_preset(NoisePreset::Blue),
        KeyCode::Tab => {
            let next = app.controller.preset().next();
            app.select_preset(next);
        }

        // Navigate parameters (vim-style: h=left, l=right)
        KeyCode::Char('l') | KeyCode::Right => app.next_parameter(),
        KeyCode::Char('h') | KeyCode::Left => app.prev_parameter(),

        // Adjust values (vim-style: k=up, j=down)
        KeyCode::Char('k') | KeyCode::Up | KeyCode::Char('+') => app.increase_value(),
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Char('-') => app.decrease_value(),

        _ => {}
    }
}
