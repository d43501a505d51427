use std::time::Duration;

use crossterm::event::{KeyCode, KeyModifiers};

use crate::core::{Command, Key, Message, TickId};
use crate::theme::Styles;

const BLINK_INTERVAL: Duration = Duration::from_millis(530);

/// Single-line text entry with a blinking cursor.
#[derive(Debug, Clone)]
pub struct TextInput {
    pub prompt: String,
    pub placeholder: String,
    /// Maximum number of characters. Zero means unlimited.
    pub char_limit: usize,
    /// Visible width of the value. Zero means unlimited.
    pub width: usize,
    value: Vec<char>,
    pos: usize,
    /// First visible character when the value is wider than `width`.
    offset: usize,
    focused: bool,
    cursor_visible: bool,
    blink_id: TickId,
}

impl TextInput {
    pub const BLINK_ID: &'static str = "cursor-blink";

    pub fn new() -> Self {
        Self {
            prompt: "> ".to_string(),
            placeholder: String::new(),
            char_limit: 0,
            width: 0,
            value: Vec::new(),
            pos: 0,
            offset: 0,
            focused: false,
            cursor_visible: true,
            blink_id: TickId::from(Self::BLINK_ID),
        }
    }

    pub fn value(&self) -> String {
        self.value.iter().collect()
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.chars().collect();
        if self.char_limit > 0 {
            self.value.truncate(self.char_limit);
        }
        self.pos = self.value.len();
        self.scroll();
    }

    pub const fn position(&self) -> usize {
        self.pos
    }

    pub const fn focused(&self) -> bool {
        self.focused
    }

    pub const fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub const fn focus(&mut self) {
        self.focused = true;
        self.cursor_visible = true;
    }

    pub const fn blur(&mut self) {
        self.focused = false;
    }

    /// Command starting the cursor blink.
    pub fn blink<M: Send + 'static>(&self) -> Command<M> {
        Command::every(self.blink_id.clone(), BLINK_INTERVAL)
    }

    /// Handle key presses and blink ticks. Returns whether anything changed.
    pub fn update<M>(&mut self, msg: &Message<M>) -> bool {
        match msg {
            Message::Tick(tick) if tick.id == self.blink_id => {
                if !self.focused {
                    return false;
                }
                self.cursor_visible = !self.cursor_visible;
                true
            }
            Message::Key(key) if self.focused => {
                let changed = self.handle_key(*key);
                if changed {
                    self.cursor_visible = true;
                }
                changed
            }
            _ => false,
        }
    }

    fn handle_key(&mut self, key: Key) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('a') if ctrl => self.move_to(0),
            KeyCode::Char('e') if ctrl => self.move_to(self.value.len()),
            KeyCode::Char('b') if ctrl => self.move_to(self.pos.saturating_sub(1)),
            KeyCode::Char('f') if ctrl => self.move_to(self.pos + 1),
            KeyCode::Char('u') if ctrl => self.delete_range(0, self.pos),
            KeyCode::Char('k') if ctrl => self.delete_range(self.pos, self.value.len()),
            KeyCode::Char('w') if ctrl => self.delete_range(self.word_start(), self.pos),
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.insert(c)
            }
            KeyCode::Backspace => self.delete_range(self.pos.saturating_sub(1), self.pos),
            KeyCode::Delete => self.delete_range(self.pos, self.pos + 1),
            KeyCode::Left => self.move_to(self.pos.saturating_sub(1)),
            KeyCode::Right => self.move_to(self.pos + 1),
            KeyCode::Home => self.move_to(0),
            KeyCode::End => self.move_to(self.value.len()),
            _ => false,
        }
    }

    fn insert(&mut self, c: char) -> bool {
        if self.char_limit > 0 && self.value.len() >= self.char_limit {
            return false;
        }
        self.value.insert(self.pos, c);
        self.pos += 1;
        self.scroll();
        true
    }

    fn delete_range(&mut self, start: usize, end: usize) -> bool {
        let end = end.min(self.value.len());
        if start >= end {
            return false;
        }
        self.value.drain(start..end);
        self.pos = start;
        self.scroll();
        true
    }

    fn move_to(&mut self, pos: usize) -> bool {
        let pos = pos.min(self.value.len());
        if pos == self.pos {
            return false;
        }
        self.pos = pos;
        self.scroll();
        true
    }

    fn scroll(&mut self) {
        self.offset = self.window_start();
    }

    /// Start of the visible window: the previous one, moved only as far as
    /// needed to keep the cursor in view and the window filled.
    fn window_start(&self) -> usize {
        if self.width == 0 {
            return 0;
        }
        let start = self
            .offset
            .min(self.pos)
            .max(self.pos.saturating_sub(self.width));
        start.min(self.value.len().saturating_sub(self.width))
    }

    /// Start of the word before the cursor, skipping trailing spaces.
    fn word_start(&self) -> usize {
        let mut i = self.pos;
        while i > 0 && self.value[i - 1].is_whitespace() {
            i -= 1;
        }
        while i > 0 && !self.value[i - 1].is_whitespace() {
            i -= 1;
        }
        i
    }

    pub fn view(&self, styles: &Styles) -> String {
        let mut out = styles.accent(&self.prompt);
        if self.value.is_empty() {
            out.push_str(&self.placeholder_view(styles));
            return out;
        }

        let start = self.window_start();
        let end = if self.width > 0 {
            (start + self.width).min(self.value.len())
        } else {
            self.value.len()
        };

        let before: String = self.value[start..self.pos.min(end)].iter().collect();
        out.push_str(&before);
        if self.pos < self.value.len() {
            out.push_str(&self.cursor_view(styles, self.value[self.pos]));
            let after: String = self.value[(self.pos + 1).min(end)..end].iter().collect();
            out.push_str(&after);
        } else {
            out.push_str(&self.cursor_view(styles, ' '));
        }
        out
    }

    fn placeholder_view(&self, styles: &Styles) -> String {
        let mut chars = self.placeholder.chars();
        let Some(first) = chars.next() else {
            return self.cursor_view(styles, ' ');
        };
        let rest: String = chars.collect();
        format!("{}{}", self.cursor_view(styles, first), styles.muted(&rest))
    }

    fn cursor_view(&self, styles: &Styles, c: char) -> String {
        let s = c.to_string();
        if self.focused && self.cursor_visible {
            styles.cursor(&s)
        } else {
            s
        }
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}
