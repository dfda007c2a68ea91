use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    JumpToTop,
    JumpToBottom,
    ToggleMenu,
    NextStage,
    PrevStage,
    ActivateStage,
    ToggleTheme,
    NextSlide,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Esc, _) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        (KeyCode::Char('j'), KeyModifiers::NONE) => Action::ScrollDown,
        (KeyCode::Down, _) => Action::ScrollDown,
        (KeyCode::Char('k'), KeyModifiers::NONE) => Action::ScrollUp,
        (KeyCode::Up, _) => Action::ScrollUp,

        (KeyCode::Char('d'), KeyModifiers::CONTROL) => Action::PageDown,
        (KeyCode::PageDown, _) => Action::PageDown,
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => Action::PageUp,
        (KeyCode::PageUp, _) => Action::PageUp,

        (KeyCode::Char('g'), KeyModifiers::NONE) => Action::JumpToTop,
        (KeyCode::Home, _) => Action::JumpToTop,
        (KeyCode::Char('G'), KeyModifiers::SHIFT) => Action::JumpToBottom,
        (KeyCode::Char('G'), KeyModifiers::NONE) => Action::JumpToBottom,
        (KeyCode::End, _) => Action::JumpToBottom,

        (KeyCode::Char(' '), _) => Action::ToggleMenu,
        (KeyCode::Char('l'), KeyModifiers::NONE) => Action::NextStage,
        (KeyCode::Right, _) => Action::NextStage,
        (KeyCode::Tab, _) => Action::NextStage,
        (KeyCode::Char('h'), KeyModifiers::NONE) => Action::PrevStage,
        (KeyCode::Left, _) => Action::PrevStage,
        (KeyCode::BackTab, _) => Action::PrevStage,
        (KeyCode::Enter, _) => Action::ActivateStage,

        (KeyCode::Char('t'), KeyModifiers::NONE) => Action::ToggleTheme,
        (KeyCode::Char('n'), KeyModifiers::NONE) => Action::NextSlide,

        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_scroll_keys() {
        assert_eq!(handle_key_event(key(KeyCode::Char('j'), KeyModifiers::NONE)), Action::ScrollDown);
        assert_eq!(handle_key_event(key(KeyCode::Up, KeyModifiers::NONE)), Action::ScrollUp);
        assert_eq!(handle_key_event(key(KeyCode::Char('d'), KeyModifiers::CONTROL)), Action::PageDown);
        assert_eq!(handle_key_event(key(KeyCode::Char('G'), KeyModifiers::SHIFT)), Action::JumpToBottom);
    }

    #[test]
    fn test_menu_keys() {
        assert_eq!(handle_key_event(key(KeyCode::Char(' '), KeyModifiers::NONE)), Action::ToggleMenu);
        assert_eq!(handle_key_event(key(KeyCode::Enter, KeyModifiers::NONE)), Action::ActivateStage);
        assert_eq!(handle_key_event(key(KeyCode::Char('t'), KeyModifiers::NONE)), Action::ToggleTheme);
        assert_eq!(handle_key_event(key(KeyCode::Char('n'), KeyModifiers::NONE)), Action::NextSlide);
    }

    #[test]
    fn test_quit_and_unbound() {
        assert_eq!(handle_key_event(key(KeyCode::Char('q'), KeyModifiers::NONE)), Action::Quit);
        assert_eq!(handle_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Action::Quit);
        assert_eq!(handle_key_event(key(KeyCode::Char('z'), KeyModifiers::NONE)), Action::None);
    }
}
