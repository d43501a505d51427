//! A small model-update-view runtime for terminal applications.
//!
//! Implement [`core::Model`] and hand it to [`core::Program`]. The program
//! owns the model, feeds it messages one at a time, runs the commands it
//! returns off the loop and redraws after every update.

pub mod apps;
pub mod bake;
pub mod config;
pub mod core;
pub mod theme;
pub mod tui;
pub mod widget;

#[cfg(test)]
mod testing;

pub use theme::{Styles, Theme};
