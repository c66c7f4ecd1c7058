use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::settings::BackendConfig;

/// Configuration for sangeet.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (SANGEET_* prefix)
/// 3. Config file (~/.config/sangeet/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the local storage partition.
    ///
    /// Can be set via:
    /// - CLI: --storage-dir /path/to/dir
    /// - ENV: SANGEET_STORAGE_DIR
    /// - Config: storage_dir = "/path/to/dir"
    /// - Default: ~/.local/share/sangeet/storage
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Service credential file used by the admin commands.
    ///
    /// Can be set via:
    /// - CLI: sangeet admin ... --credentials /path/to/file.json
    /// - ENV: SANGEET_CREDENTIALS_PATH
    /// - Config: credentials_path = "/path/to/file.json"
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Identifiers of the hosted backend project.
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            credentials_path: default_credentials_path(),
            backend: BackendConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/sangeet/config.toml
    /// Reads environment variables with SANGEET_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new()
            .context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path.to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder.add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("sangeet");
        builder.add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build()
            .context("Failed to build configuration")?;

        log::debug!("Loaded configuration (storage_dir = {})", config.storage_dir.display());
        Ok(config)
    }

    /// Load configuration with a custom storage directory.
    ///
    /// This is used when the --storage-dir CLI flag is provided.
    pub fn load_with_storage_dir(storage_dir: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.storage_dir = storage_dir;
        Ok(config)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration")
    }
}

/// Get the default storage directory.
///
/// Returns: ~/.local/share/sangeet/storage (or platform equivalent)
fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sangeet")
        .join("storage")
}

fn default_credentials_path() -> PathBuf {
    config_dir().join("service-account.json")
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sangeet")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/sangeet/config.toml
/// - macOS: ~/Library/Application Support/sangeet/config.toml
/// - Windows: %APPDATA%\sangeet\config.toml
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Sangeet Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (SANGEET_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Directory holding the local storage partition (saved compositions)
#
# Can also be set via:
# - CLI: sangeet --storage-dir /custom/dir compositions list
# - Environment: SANGEET_STORAGE_DIR=/custom/dir
#
# Default: Platform-specific data directory
#storage_dir = "/path/to/storage"

# Service credential file for the admin commands
#
# A JSON file with project_id, client_email and access_token.
# Keep it out of version control.
#credentials_path = "/path/to/service-account.json"

# Hosted backend project identifiers (same values the web client uses)
[backend]
project_id = "your-project-id"
api_key = "your-web-api-key"
auth_domain = "your-project-id.firebaseapp.com"
storage_bucket = "your-project-id.appspot.com"
messaging_sender_id = ""
app_id = ""

# Point these at local emulators during development
#auth_url = "http://localhost:9099/identitytoolkit.googleapis.com"
#database_url = "http://localhost:8080"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config())
        .context("Failed to write config file")?;

    log::info!("Created config file at {}", config_path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.storage_dir.as_os_str().is_empty());
        assert!(config.credentials_path.ends_with("service-account.json"));
        assert!(config.backend.project_id.is_empty());
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_with_custom_storage_dir() {
        let custom_dir = PathBuf::from("/tmp/sangeet-storage");
        let config = Config::load_with_storage_dir(custom_dir.clone());
        assert!(config.is_ok());
        assert_eq!(config.unwrap().storage_dir, custom_dir);
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.backend.project_id, "your-project-id");
        assert!(config.backend.auth_url.starts_with("https://"));
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = Config::default();
        let rendered = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.storage_dir, config.storage_dir);
        assert_eq!(parsed.backend, config.backend);
    }
}
