//! Demo programs shipped with the binary.

pub mod altscreen;
pub mod check;
pub mod repos;

pub use altscreen::AltScreen;
pub use check::Check;
pub use repos::Repos;
