pub mod keybindings;
pub mod loader;

use keybindings::KeybindingsConfig;
pub use loader::{config_path, load, save};
use serde::{Deserialize, Serialize};

use crate::core::ProgramOptions;
use crate::theme::{ColorProfile, Styles, Theme, theme_from_name};

/// `[program]`: how demos treat the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramConfig {
    pub alt_screen: bool,
    pub hide_cursor: bool,
    pub input: bool,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        let options = ProgramOptions::default();
        Self {
            alt_screen: options.alt_screen,
            hide_cursor: options.hide_cursor,
            input: options.input,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "ansi".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub program: ProgramConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl AppConfig {
    /// Options for [`Program`](crate::core::Program). Input and raw mode go
    /// together: without a listener nothing could read the keys.
    pub fn program_options(&self) -> ProgramOptions {
        ProgramOptions {
            alt_screen: self.program.alt_screen,
            hide_cursor: self.program.hide_cursor,
            input: self.program.input,
            raw_mode: self.program.input,
            size: None,
        }
    }

    /// Styles for the configured theme. Unknown names fall back to the
    /// default theme.
    pub fn styles(&self) -> Styles {
        let theme = theme_from_name(&self.theme.name).unwrap_or_else(|| {
            tracing::warn!(name = %self.theme.name, "unknown theme, using default");
            Theme::default()
        });
        Styles::new(&theme, ColorProfile::from_env())
    }
}
