//! The application contract.

use super::command::Command;
use super::message::Message;
use crate::theme::Styles;

/// An application run by [`Program`](crate::core::Program).
///
/// The program calls methods in this order:
///
/// 1. `init()` once, dispatching the returned command
/// 2. `view()` for the first frame
/// 3. For each message: `update()`, then `view()`
///
/// `update` consumes the current model and returns its replacement, so the
/// loop only ever holds one value. It is never called concurrently.
pub trait Model: Sized {
    /// The application's own message type. Command results arrive as
    /// [`Message::App`] values of this type.
    type Message: Send + 'static;

    /// Initial command to run when the program starts.
    fn init(&self) -> Command<Self::Message> {
        Command::none()
    }

    /// Apply `message` and return the next model plus a command to run.
    fn update(self, message: Message<Self::Message>) -> (Self, Command<Self::Message>);

    /// Render the model to text. Styling comes from `styles`, never from
    /// global state.
    fn view(&self, styles: &Styles) -> String;
}
