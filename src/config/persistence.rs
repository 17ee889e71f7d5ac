//! Configuration file persistence
//!
//! This module handles loading and saving the engine settings to the
//! platform-specific config directory with graceful fallback to defaults.

use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "ferrite-spans";

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Backup configuration file name (used during atomic writes)
const CONFIG_BACKUP_NAME: &str = "config.json.bak";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific configuration directory.
///
/// - **Windows**: `%APPDATA%\ferrite-spans\`
/// - **macOS**: `~/Library/Application Support/ferrite-spans/`
/// - **Linux**: `~/.config/ferrite-spans/`
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the directory cannot be determined.
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the configuration file.
pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

// ─────────────────────────────────────────────────────────────────────────────
// Load Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Load configuration from the default location.
///
/// A missing, empty or corrupted file yields default settings; corruption is
/// logged at warning level.
pub fn load_config() -> Settings {
    get_config_file_path()
        .and_then(|path| load_config_at(&path))
        .unwrap_or_warn_default(Settings::default(), "Failed to load configuration")
}

/// Load configuration from an explicit file path.
///
/// A missing or empty file is not an error and yields defaults.
pub fn load_config_at(config_path: &Path) -> Result<Settings> {
    if !config_path.exists() {
        debug!(
            "Config file not found at {}, using defaults",
            config_path.display()
        );
        return Ok(Settings::default());
    }

    debug!("Loading config from: {}", config_path.display());

    let contents = fs::read_to_string(config_path).map_err(|e| Error::ConfigLoad {
        path: config_path.to_path_buf(),
        source: Box::new(e),
    })?;

    if contents.trim().is_empty() {
        debug!("Config file is empty, using defaults");
        return Ok(Settings::default());
    }

    let settings = Settings::from_json_sanitized(&contents).map_err(|e| {
        warn!(
            "Config file at {} contains invalid JSON: {}",
            config_path.display(),
            e
        );
        Error::ConfigParse {
            message: format!("Failed to parse config file: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    info!(
        "Configuration loaded successfully from {}",
        config_path.display()
    );
    Ok(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Save Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Save configuration to the default location.
pub fn save_config(settings: &Settings) -> Result<()> {
    save_config_at(settings, &get_config_file_path()?)
}

/// Save configuration to an explicit file path.
///
/// Writes a backup file next to the target first and renames it over the
/// target, creating the parent directory when needed.
pub fn save_config_at(settings: &Settings, config_path: &Path) -> Result<()> {
    let config_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
        debug!("Creating config directory: {}", config_dir.display());
        fs::create_dir_all(&config_dir).map_err(|e| Error::ConfigSave {
            path: config_dir.clone(),
            source: Box::new(e),
        })?;
    }

    let backup_path = config_dir.join(CONFIG_BACKUP_NAME);
    debug!("Saving config to: {}", config_path.display());

    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::ConfigSave {
        path: config_path.to_path_buf(),
        source: Box::new(e),
    })?;

    fs::write(&backup_path, &json).map_err(|e| Error::ConfigSave {
        path: backup_path.clone(),
        source: Box::new(e),
    })?;

    fs::rename(&backup_path, config_path).map_err(|e| Error::ConfigSave {
        path: config_path.to_path_buf(),
        source: Box::new(e),
    })?;

    info!(
        "Configuration saved successfully to {}",
        config_path.display()
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use tempfile::TempDir;

    /// Helper to create a test environment with a temporary config directory.
    struct TestEnv {
        _temp_dir: TempDir,
        config_file: PathBuf,
    }

    impl TestEnv {
        fn new() -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let config_file = temp_dir.path().join(APP_NAME).join(CONFIG_FILE_NAME);
            Self {
                _temp_dir: temp_dir,
                config_file,
            }
        }

        fn write_config(&self, content: &str) {
            fs::create_dir_all(self.config_file.parent().unwrap()).unwrap();
            fs::write(&self.config_file, content).expect("Failed to write config");
        }
    }

    #[test]
    fn test_get_config_file_path() {
        if let Ok(path) = get_config_file_path() {
            assert!(path.to_string_lossy().contains(APP_NAME));
            assert!(path.to_string_lossy().ends_with(CONFIG_FILE_NAME));
        }
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let env = TestEnv::new();
        let settings = load_config_at(&env.config_file).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        let env = TestEnv::new();
        env.write_config("   \n");
        let settings = load_config_at(&env.config_file).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_corrupted_config_returns_error() {
        let env = TestEnv::new();
        env.write_config("{ invalid json }");
        let result = load_config_at(&env.config_file);
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_load_sanitizes_values() {
        let env = TestEnv::new();
        env.write_config(r#"{"theme": "dark", "disabled_variants": ["nope", "image"]}"#);
        let settings = load_config_at(&env.config_file).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.disabled_variants, vec!["image"]);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let env = TestEnv::new();
        let original = Settings {
            theme: Theme::Dark,
            strict_unwrap: false,
            dim_markers: false,
            disabled_variants: vec!["highlight".to_string()],
            reparse_debounce_ms: 40,
        };

        save_config_at(&original, &env.config_file).unwrap();
        assert!(env.config_file.exists());
        assert!(!env.config_file.with_file_name(CONFIG_BACKUP_NAME).exists());

        let loaded = load_config_at(&env.config_file).unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_config_with_wrong_types() {
        let env = TestEnv::new();
        env.write_config(r#"{"strict_unwrap": "yes"}"#);
        assert!(load_config_at(&env.config_file).is_err());
    }
}
