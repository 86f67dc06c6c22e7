use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use spark_chat::session::{DictationResult, SessionEvent};

use crate::state::{AppState, Composer};

/// Actions that can result from key input.
#[derive(Debug, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    /// Forward to the session.
    Session(SessionEvent),
}

/// Process a key event and return the resulting action.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> InputAction {
    // Ctrl+C → quit, from anywhere
    if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
        return InputAction::Quit;
    }

    // The setup screen takes no input
    if !state.ready {
        return InputAction::None;
    }

    if state.composer.is_some() {
        return handle_composer_key(key, state);
    }

    let event = match key.code {
        KeyCode::Up => SessionEvent::ScrollUp,
        KeyCode::Down => SessionEvent::ScrollDown,
        KeyCode::Enter => SessionEvent::Select,
        KeyCode::Esc | KeyCode::Backspace => SessionEvent::Back,
        _ => return InputAction::None,
    };
    InputAction::Session(event)
}

fn handle_composer_key(key: KeyEvent, state: &mut AppState) -> InputAction {
    let Some(composer) = state.composer.as_mut() else {
        return InputAction::None;
    };

    match (key.modifiers, key.code) {
        // Enter → transcription done
        (_, KeyCode::Enter) => {
            let Some(done) = state.composer.take() else {
                return InputAction::None;
            };
            let text = done.input.trim().to_string();
            let result = if text.is_empty() {
                DictationResult::Failed
            } else {
                DictationResult::Transcribed(text)
            };
            InputAction::Session(SessionEvent::DictationResult { id: done.id, result })
        }

        // Esc → dictation cancelled
        (_, KeyCode::Esc) => {
            let Some(done) = state.composer.take() else {
                return InputAction::None;
            };
            InputAction::Session(SessionEvent::DictationResult {
                id: done.id,
                result: DictationResult::Cancelled,
            })
        }

        // Backspace
        (_, KeyCode::Backspace) => {
            if composer.cursor_pos > 0 {
                let idx = byte_index(composer, composer.cursor_pos - 1);
                let end_idx = byte_index(composer, composer.cursor_pos);
                composer.input.replace_range(idx..end_idx, "");
                composer.cursor_pos -= 1;
            }
            InputAction::None
        }

        // Delete
        (_, KeyCode::Delete) => {
            let char_count = composer.input.chars().count();
            if composer.cursor_pos < char_count {
                let idx = byte_index(composer, composer.cursor_pos);
                let end_idx = byte_index(composer, composer.cursor_pos + 1);
                composer.input.replace_range(idx..end_idx, "");
            }
            InputAction::None
        }

        (_, KeyCode::Left) => {
            composer.cursor_pos = composer.cursor_pos.saturating_sub(1);
            InputAction::None
        }

        (_, KeyCode::Right) => {
            let char_count = composer.input.chars().count();
            if composer.cursor_pos < char_count {
                composer.cursor_pos += 1;
            }
            InputAction::None
        }

        // Home / Ctrl+A
        (_, KeyCode::Home) | (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
            composer.cursor_pos = 0;
            InputAction::None
        }

        // End / Ctrl+E
        (_, KeyCode::End) | (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
            composer.cursor_pos = composer.input.chars().count();
            InputAction::None
        }

        // Ctrl+U → clear input line
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
            composer.input.clear();
            composer.cursor_pos = 0;
            InputAction::None
        }

        // Ctrl+W → delete word backwards
        (KeyModifiers::CONTROL, KeyCode::Char('w')) => {
            if composer.cursor_pos > 0 {
                let before: String = composer.input.chars().take(composer.cursor_pos).collect();
                let trimmed = before.trim_end();
                let new_end = trimmed.rfind(' ').map(|i| trimmed[..=i].chars().count()).unwrap_or(0);
                let after: String = composer.input.chars().skip(composer.cursor_pos).collect();
                let new_before: String = composer.input.chars().take(new_end).collect();
                composer.input = format!("{}{}", new_before, after);
                composer.cursor_pos = new_end;
            }
            InputAction::None
        }

        // Regular character
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            let idx = byte_index(composer, composer.cursor_pos);
            composer.input.insert(idx, c);
            composer.cursor_pos += 1;
            InputAction::None
        }

        _ => InputAction::None,
    }
}

/// Byte offset of the `char_pos`-th char, or the end of the input.
fn byte_index(composer: &Composer, char_pos: usize) -> usize {
    composer
        .input
        .char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(composer.input.len())
}

#[cfg(test)]
mod tests {
    use spark_chat::session::Capabilities;

    use super::*;
    use crate::state::tests::test_state;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            assert_eq!(handle_key(key(KeyCode::Char(c)), state), InputAction::None);
        }
    }

    #[test]
    fn test_navigation_keys_map_to_session_events() {
        let mut state = test_state(Capabilities::browse());
        assert_eq!(handle_key(key(KeyCode::Up), &mut state), InputAction::Session(SessionEvent::ScrollUp));
        assert_eq!(handle_key(key(KeyCode::Down), &mut state), InputAction::Session(SessionEvent::ScrollDown));
        assert_eq!(handle_key(key(KeyCode::Enter), &mut state), InputAction::Session(SessionEvent::Select));
        assert_eq!(handle_key(key(KeyCode::Esc), &mut state), InputAction::Session(SessionEvent::Back));
        assert_eq!(
            handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &mut state),
            InputAction::Quit
        );
    }

    #[test]
    fn test_composer_submits_transcription() {
        let mut state = test_state(Capabilities::browse());
        state.dispatch(SessionEvent::Select);
        let id = state.composer.as_ref().unwrap().id;

        type_text(&mut state, "hellp");
        handle_key(key(KeyCode::Backspace), &mut state);
        type_text(&mut state, "o");
        assert_eq!(state.composer.as_ref().unwrap().input, "hello");

        let action = handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(
            action,
            InputAction::Session(SessionEvent::DictationResult {
                id,
                result: DictationResult::Transcribed("hello".into()),
            })
        );
        assert!(state.composer.is_none());
    }

    #[test]
    fn test_composer_escape_and_empty_submit() {
        let mut state = test_state(Capabilities::browse());
        state.dispatch(SessionEvent::Select);
        let id = state.composer.as_ref().unwrap().id;
        let cancelled = SessionEvent::DictationResult {
            id,
            result: DictationResult::Cancelled,
        };
        assert_eq!(
            handle_key(key(KeyCode::Esc), &mut state),
            InputAction::Session(cancelled.clone())
        );
        state.dispatch(cancelled);
        assert!(state.composer.is_none());
        assert!(!state.should_quit);

        state.dispatch(SessionEvent::Select);
        let id = state.composer.as_ref().unwrap().id;
        type_text(&mut state, "   ");
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            InputAction::Session(SessionEvent::DictationResult {
                id,
                result: DictationResult::Failed,
            })
        );
    }

    #[test]
    fn test_ctrl_w_deletes_previous_word() {
        let mut state = test_state(Capabilities::browse());
        state.dispatch(SessionEvent::Select);
        type_text(&mut state, "what time is");
        handle_key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL), &mut state);
        let composer = state.composer.as_ref().unwrap();
        assert_eq!(composer.input, "what time ");
        assert_eq!(composer.cursor_pos, 10);
    }

    #[test]
    fn test_setup_screen_swallows_keys() {
        let mut state = test_state(Capabilities::browse());
        state.set_ready(false);
        assert_eq!(handle_key(key(KeyCode::Enter), &mut state), InputAction::None);
        assert_eq!(
            handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &mut state),
            InputAction::Quit
        );
    }

    #[test]
    fn test_quick_launch_opens_composer_on_start() {
        let mut state = test_state(Capabilities::quick_launch());
        let effects = state.session.open();
        state.apply(effects);
        assert!(state.composer.is_some());
    }
}
