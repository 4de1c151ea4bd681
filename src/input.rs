//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  What a key does depends on
//! what has focus: an open preview captures everything, the form takes
//! text, and the posts list takes navigation keys.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in the handler for the right focus.
//! 3. Update the help text in the `status` section of the locale bundles.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Focus};

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.  Errors are unclassified
/// submission failures.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> anyhow::Result<()> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return Ok(());
    }

    if app.modal_open() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            app.close_modal();
        }
        return Ok(());
    }

    match app.focus {
        Focus::Form => handle_form_key(app, key),
        Focus::Posts => {
            handle_posts_key(app, key);
            Ok(())
        }
    }
}

fn handle_form_key(app: &mut App, key: KeyEvent) -> anyhow::Result<()> {
    match key.code {
        KeyCode::Enter => app.submit_input()?,
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Tab | KeyCode::Esc => app.toggle_focus(),
        KeyCode::Char(c) => app.push_char(c),
        _ => {}
    }
    Ok(())
}

fn handle_posts_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit = true,
        KeyCode::Tab | KeyCode::Char('a') => app.toggle_focus(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Enter => app.preview_selected(),
        KeyCode::Char('r') | KeyCode::Char(' ') => app.mark_selected_read(),
        _ => {}
    }
}
