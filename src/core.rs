//! Core runtime for tealeaf.
//!
//! This module contains the pieces that drive an application:
//! - [`Model`] - The application contract (init, update, view)
//! - [`Message`] - Everything the update function can receive
//! - [`Command`] - Side effects that run off the loop
//! - [`MessageBus`] / [`Executor`] - Delivery and scheduling
//! - [`Renderer`] - Line-diffing terminal output
//! - [`Program`] - The loop tying them together

pub mod bus;
pub mod command;
pub mod executor;
pub mod key;
pub mod message;
pub mod model;
pub mod program;
pub mod renderer;

// Re-export commonly used types
pub use bus::{BusSender, MessageBus};
pub use command::Command;
pub use executor::Executor;
pub use key::{Key, KeyBinding};
pub use message::{Message, ScreenRequest, Tick, TickId};
pub use model::Model;
pub use program::{Program, ProgramError, ProgramHandle, ProgramOptions};
pub use renderer::{Renderer, ScreenMode};
