use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use suggest_core::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    /// Navigation and commit keys, forwarded to the controller
    Nav(Key),
    Dropdown,
    Insert(char),
    Backspace,
    Delete,
    DeleteWord,
    Clear,
    Left,
    Right,
    Home,
    End,
}

impl InputAction {
    /// Whether the action may change the input text.
    pub fn edits(self) -> bool {
        matches!(
            self,
            Self::Insert(_) | Self::Backspace | Self::Delete | Self::DeleteWord | Self::Clear
        )
    }
}

/// Resolve a key event into an input action
pub fn resolve(key: KeyEvent) -> Option<InputAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl {
        return match key.code {
            KeyCode::Char('c') => Some(InputAction::Quit),
            KeyCode::Char('d') => Some(InputAction::Dropdown),
            KeyCode::Char('w') | KeyCode::Backspace => Some(InputAction::DeleteWord),
            KeyCode::Char('u') => Some(InputAction::Clear),
            KeyCode::Char('a') => Some(InputAction::Home),
            KeyCode::Char('e') => Some(InputAction::End),
            KeyCode::Char('p') => Some(InputAction::Nav(Key::Up)),
            KeyCode::Char('n') => Some(InputAction::Nav(Key::Down)),
            _ => None,
        };
    }

    match key.code {
        // Terminals differ in which modifier they report with Enter
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            Some(InputAction::Nav(Key::ShiftEnter))
        }
        KeyCode::Enter => Some(InputAction::Nav(Key::Enter)),
        KeyCode::Tab => Some(InputAction::Nav(Key::Tab)),
        KeyCode::Up => Some(InputAction::Nav(Key::Up)),
        KeyCode::Down => Some(InputAction::Nav(Key::Down)),
        KeyCode::Esc => Some(InputAction::Nav(Key::Escape)),
        KeyCode::Backspace => Some(InputAction::Backspace),
        KeyCode::Delete => Some(InputAction::Delete),
        KeyCode::Left => Some(InputAction::Left),
        KeyCode::Right => Some(InputAction::Right),
        KeyCode::Home => Some(InputAction::Home),
        KeyCode::End => Some(InputAction::End),
        KeyCode::Char(c) => Some(InputAction::Insert(c)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Option<InputAction> {
        resolve(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_ctrl_c_quits() {
        assert_eq!(
            press(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(InputAction::Quit)
        );
    }

    #[test]
    fn test_plain_chars_insert() {
        assert_eq!(
            press(KeyCode::Char('c'), KeyModifiers::NONE),
            Some(InputAction::Insert('c'))
        );
        assert_eq!(
            press(KeyCode::Char('L'), KeyModifiers::SHIFT),
            Some(InputAction::Insert('L'))
        );
    }

    #[test]
    fn test_enter_variants() {
        assert_eq!(
            press(KeyCode::Enter, KeyModifiers::NONE),
            Some(InputAction::Nav(Key::Enter))
        );
        assert_eq!(
            press(KeyCode::Enter, KeyModifiers::SHIFT),
            Some(InputAction::Nav(Key::ShiftEnter))
        );
        assert_eq!(
            press(KeyCode::Enter, KeyModifiers::ALT),
            Some(InputAction::Nav(Key::ShiftEnter))
        );
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(
            press(KeyCode::Up, KeyModifiers::NONE),
            Some(InputAction::Nav(Key::Up))
        );
        assert_eq!(
            press(KeyCode::Char('n'), KeyModifiers::CONTROL),
            Some(InputAction::Nav(Key::Down))
        );
        assert_eq!(
            press(KeyCode::Tab, KeyModifiers::NONE),
            Some(InputAction::Nav(Key::Tab))
        );
        assert_eq!(
            press(KeyCode::Esc, KeyModifiers::NONE),
            Some(InputAction::Nav(Key::Escape))
        );
    }

    #[test]
    fn test_edit_actions() {
        assert_eq!(
            press(KeyCode::Char('w'), KeyModifiers::CONTROL),
            Some(InputAction::DeleteWord)
        );
        assert!(InputAction::DeleteWord.edits());
        assert!(!InputAction::Left.edits());
        assert!(!InputAction::Nav(Key::Enter).edits());
        assert_eq!(press(KeyCode::F(1), KeyModifiers::NONE), None);
    }
}
