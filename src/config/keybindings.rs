use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::core::{Key, KeyBinding};

/// Keys shared by the demo programs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindingsConfig {
    /// Leave a program that has no text entry.
    pub quit: KeyBinding,
    /// Leave a program that is reading text.
    pub cancel: KeyBinding,
    /// Switch between inline and alternate screen.
    pub toggle_screen: KeyBinding,
    /// Accept the current input.
    pub submit: KeyBinding,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            quit: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('q')),
                Key::with_ctrl(KeyCode::Char('c')),
                Key::new(KeyCode::Esc),
            ]),
            cancel: KeyBinding::multiple(vec![
                Key::with_ctrl(KeyCode::Char('c')),
                Key::new(KeyCode::Esc),
            ]),
            toggle_screen: Key::new(KeyCode::Char(' ')).into(),
            submit: Key::new(KeyCode::Enter).into(),
        }
    }
}
