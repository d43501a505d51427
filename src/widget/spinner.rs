use std::time::Duration;

use crate::core::{Command, Message, TickId};
use crate::theme::Styles;

const LINE: &[&str] = &["|", "/", "-", "\\"];
const DOT: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Activity indicator driven by a periodic tick.
///
/// Start it with [`Spinner::tick`] from `init()` and forward every message
/// to [`Spinner::update`].
#[derive(Debug, Clone)]
pub struct Spinner {
    id: TickId,
    frames: &'static [&'static str],
    interval: Duration,
    frame: usize,
}

impl Spinner {
    pub const DEFAULT_ID: &'static str = "spinner";

    /// `| / - \` at ten frames per second.
    pub fn new() -> Self {
        Self {
            id: TickId::from(Self::DEFAULT_ID),
            frames: LINE,
            interval: Duration::from_millis(100),
            frame: 0,
        }
    }

    /// Braille dots at ten frames per second.
    pub fn dot() -> Self {
        Self {
            frames: DOT,
            ..Self::new()
        }
    }

    /// Use a different tick id, for more than one spinner per program.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<TickId>) -> Self {
        self.id = id.into();
        self
    }

    pub const fn id(&self) -> &TickId {
        &self.id
    }

    /// Command starting the animation.
    pub fn tick<M: Send + 'static>(&self) -> Command<M> {
        Command::every(self.id.clone(), self.interval)
    }

    /// Command stopping the animation.
    pub fn stop<M: Send + 'static>(&self) -> Command<M> {
        Command::cancel(self.id.clone())
    }

    /// Advance on this spinner's ticks. Returns whether the frame changed.
    pub fn update<M>(&mut self, msg: &Message<M>) -> bool {
        let Message::Tick(tick) = msg else {
            return false;
        };
        if tick.id != self.id {
            return false;
        }
        // Follow the sequence number so skipped ticks are skipped frames.
        let len = self.frames.len() as u64;
        self.frame = usize::try_from(tick.seq % len).unwrap_or_default();
        true
    }

    pub fn frame(&self) -> &'static str {
        self.frames[self.frame]
    }

    pub fn view(&self, styles: &Styles) -> String {
        styles.accent(self.frame())
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Tick;

    fn tick(id: &str, seq: u64) -> Message<()> {
        Message::Tick(Tick {
            id: TickId::from(id),
            seq,
        })
    }

    #[test]
    fn test_advances_on_own_ticks() {
        let mut spinner = Spinner::new();
        assert_eq!(spinner.frame(), "|");
        assert!(spinner.update(&tick("spinner", 1)));
        assert_eq!(spinner.frame(), "/");
        assert!(spinner.update(&tick("spinner", 2)));
        assert_eq!(spinner.frame(), "-");
    }

    #[test]
    fn test_ignores_other_messages() {
        let mut spinner = Spinner::new();
        assert!(!spinner.update(&tick("cursor-blink", 1)));
        assert!(!spinner.update(&Message::<()>::Quit));
        assert_eq!(spinner.frame(), "|");
    }

    #[test]
    fn test_wraps_around() {
        let mut spinner = Spinner::dot().with_id("dots");
        spinner.update(&tick("dots", 8));
        assert_eq!(spinner.frame(), "⣾");
        spinner.update(&tick("dots", 11));
        assert_eq!(spinner.frame(), "⢿");
    }

    #[test]
    fn test_tick_command_registers_own_id() {
        let spinner = Spinner::new().with_id("busy");
        let cmd: Command<()> = spinner.tick();
        assert!(matches!(
            cmd,
            Command::Every { ref id, interval } if id.as_str() == "busy" && interval == Duration::from_millis(100)
        ));
    }

    #[test]
    fn test_plain_view_is_frame() {
        assert_eq!(Spinner::new().view(&Styles::plain()), "|");
    }
}
