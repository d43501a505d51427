use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::AppConfig;

const CONFIG_DIR: &str = "tealeaf";
const CONFIG_FILE: &str = "config.toml";

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Load the user's config file, or defaults when there is none.
pub fn load() -> color_eyre::Result<AppConfig> {
    let Some(path) = config_path() else {
        debug!("No config directory found, using defaults");
        return Ok(AppConfig::default());
    };
    load_from(&path)
}

pub fn load_from(path: &Path) -> color_eyre::Result<AppConfig> {
    if !path.exists() {
        debug!(?path, "Config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    debug!(?path, "Loaded config");
    Ok(config)
}

/// Write `config` to the user's config file. Returns the path written.
pub fn save(config: &AppConfig) -> color_eyre::Result<Option<PathBuf>> {
    let Some(dir) = config_dir() else {
        warn!("Could not determine config directory");
        return Ok(None);
    };
    let path = dir.join(CONFIG_FILE);
    save_to(config, &path)?;
    Ok(Some(path))
}

pub fn save_to(config: &AppConfig, path: &Path) -> color_eyre::Result<()> {
    if let Some(dir) = path.parent()
        && !dir.exists()
    {
        fs::create_dir_all(dir)?;
    }

    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    debug!(?path, "Saved config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tealeaf-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = scratch_dir("missing");
        let config = load_from(&dir.join(CONFIG_FILE)).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = scratch_dir("save");
        let path = dir.join("nested").join(CONFIG_FILE);

        let mut config = AppConfig::default();
        config.theme.name = "Catppuccin Mocha".to_string();
        config.program.alt_screen = true;
        save_to(&config, &path).unwrap();

        assert_eq!(load_from(&path).unwrap(), config);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = scratch_dir("invalid");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        fs::write(&path, "[program]\nalt_screen = \"maybe\"").unwrap();

        assert!(load_from(&path).is_err());
        fs::remove_dir_all(&dir).unwrap();
    }
}
