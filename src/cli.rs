use clap::{Parser, Subcommand};
use tealeaf::apps::check::DEFAULT_URL;
use tealeaf::apps::repos::REPOS_URL;
use tealeaf::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "tealeaf", version, about = "Model-update-view demos for the terminal")]
pub struct Args {
    #[command(subcommand)]
    pub demo: Demo,

    /// Start in the alternate screen
    #[arg(long, global = true)]
    pub alt_screen: bool,

    /// Theme name (e.g., "ansi", "Catppuccin Mocha")
    #[arg(short, long, global = true)]
    pub theme: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Demo {
    /// Toggle between inline and alternate screen
    Altscreen,
    /// Check a server's status while a spinner runs
    Check {
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },
    /// Pick a repository while the list loads in the background
    Repos {
        #[arg(long, default_value = REPOS_URL)]
        url: String,
    },
    /// Structured logging demo
    Bake,
    /// List the built-in themes
    Themes,
    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

impl Args {
    /// Command line flags win over the config file.
    pub fn apply(&self, config: &mut AppConfig) {
        if self.alt_screen {
            config.program.alt_screen = true;
        }
        if let Some(theme) = &self.theme {
            config.theme.name.clone_from(theme);
        }
    }
}
