use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::speech::Speaker;
use crate::terminal::state::AppState;

/// Returns true when the app should quit.
pub fn handle_key(key: KeyEvent, state: &mut AppState, speaker: &dyn Speaker) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Enter | KeyCode::Char(' ') => state.speak_selected(speaker),
        KeyCode::Down | KeyCode::Char('j') => state.move_selection(1),
        KeyCode::Up | KeyCode::Char('k') => state.move_selection(-1),
        KeyCode::Home => state.move_selection(i32::MIN / 2),
        KeyCode::End => state.move_selection(i32::MAX / 2),
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::domain::email::MailRecord;
    use crate::speech::PrintSpeaker;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn navigation_and_quit() {
        let records = vec![MailRecord::default(), MailRecord::default(), MailRecord::default()];
        let mut s = AppState::new("t", records);
        assert!(!handle_key(press(KeyCode::End), &mut s, &PrintSpeaker));
        assert_eq!(s.list_state.selected(), Some(2));
        assert!(!handle_key(press(KeyCode::Char('k')), &mut s, &PrintSpeaker));
        assert_eq!(s.list_state.selected(), Some(1));
        assert!(!handle_key(press(KeyCode::Home), &mut s, &PrintSpeaker));
        assert_eq!(s.list_state.selected(), Some(0));
        assert!(handle_key(press(KeyCode::Char('q')), &mut s, &PrintSpeaker));
        assert!(handle_key(press(KeyCode::Esc), &mut s, &PrintSpeaker));
    }
}
