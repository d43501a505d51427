//! Messages delivered to the update function.
//!
//! Every value the loop consumes travels as a [`Message`]: terminal input,
//! periodic ticks, results of commands (wrapped in [`Message::App`]) and the
//! runtime's own control requests.
//!
//! # Terminology
//! - **Message**: a discrete event handed to [`Model::update`](crate::core::Model::update)
//! - **Command**: deferred async work that yields at most one message, see [`crate::core::command::Command`]

use std::fmt;

use super::key::Key;

/// Identifies a periodic task registered with [`Command::every`](crate::core::Command::every).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TickId(String);

impl TickId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TickId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TickId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One firing of a periodic task. `seq` starts at 1 for every registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub id: TickId,
    pub seq: u64,
}

/// Terminal state changes requested through a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenRequest {
    EnterAltScreen,
    ExitAltScreen,
    HideCursor,
    ShowCursor,
    ClearScreen,
}

/// A message delivered to the update function.
///
/// `M` is the application's own message type. Results of commands arrive as
/// [`Message::App`]; a failed command is still just data inside `M`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<M> {
    /// Key pressed
    Key(Key),
    /// Terminal resized
    Resize { width: u16, height: u16 },
    /// Periodic task fired
    Tick(Tick),
    /// Stop the program. Handled by the loop, never passed to update.
    Quit,
    /// Terminal mode change. Applied by the loop, then passed to update.
    Screen(ScreenRequest),
    /// Application message
    App(M),
}

impl<M> Message<M> {
    /// Whether this is a key press printing as `key`, e.g. `"ctrl+c"`.
    pub fn is_key(&self, key: &str) -> bool {
        matches!(self, Self::Key(k) if k.display() == key)
    }

    /// Whether this is a tick of the periodic task `id`.
    pub fn is_tick(&self, id: &TickId) -> bool {
        matches!(self, Self::Tick(tick) if &tick.id == id)
    }

    pub fn map<N>(self, f: impl FnOnce(M) -> N) -> Message<N> {
        match self {
            Self::Key(key) => Message::Key(key),
            Self::Resize { width, height } => Message::Resize { width, height },
            Self::Tick(tick) => Message::Tick(tick),
            Self::Quit => Message::Quit,
            Self::Screen(request) => Message::Screen(request),
            Self::App(msg) => Message::App(f(msg)),
        }
    }

    /// Short variant name for log lines.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Key(_) => "key",
            Self::Resize { .. } => "resize",
            Self::Tick(_) => "tick",
            Self::Quit => "quit",
            Self::Screen(_) => "screen",
            Self::App(_) => "app",
        }
    }
}

impl<M> From<Key> for Message<M> {
    fn from(key: Key) -> Self {
        Self::Key(key)
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;

    use super::*;

    #[test]
    fn test_is_key_uses_key_strings() {
        let msg: Message<()> = Key::with_ctrl(KeyCode::Char('c')).into();
        assert!(msg.is_key("ctrl+c"));
        assert!(!msg.is_key("c"));
    }

    #[test]
    fn test_map_only_touches_app_payload() {
        let msg: Message<u8> = Message::App(7);
        assert_eq!(msg.map(u16::from), Message::App(7u16));

        let resize: Message<u8> = Message::Resize {
            width: 80,
            height: 24,
        };
        assert_eq!(
            resize.map(u16::from),
            Message::Resize {
                width: 80,
                height: 24
            }
        );
    }

    #[test]
    fn test_is_tick_matches_id() {
        let msg: Message<()> = Message::Tick(Tick {
            id: TickId::from("spinner"),
            seq: 1,
        });
        assert!(msg.is_tick(&TickId::from("spinner")));
        assert!(!msg.is_tick(&TickId::from("blink")));
    }
}
