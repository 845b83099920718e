use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{LockboxError, Result};

/// Project-level configuration, loaded from `.lockbox.toml`.
///
/// Every field has a sensible default so Lockbox works out-of-the-box
/// without any config file at all.  Nothing here affects how blobs are
/// encrypted; the key derivation cost is fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) holding the slot files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Inactivity timeout before the vault locks itself.
    #[serde(default = "default_auto_lock_minutes")]
    pub auto_lock_minutes: u64,

    /// Seconds before a copied secret is cleared from the clipboard.
    #[serde(default = "default_clipboard_clear_seconds")]
    pub clipboard_clear_seconds: u64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_data_dir() -> String {
    ".lockbox".to_string()
}

fn default_auto_lock_minutes() -> u64 {
    5
}

fn default_clipboard_clear_seconds() -> u64 {
    30
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            auto_lock_minutes: default_auto_lock_minutes(),
            clipboard_clear_seconds: default_clipboard_clear_seconds(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".lockbox.toml";

    /// Load settings from `<project_dir>/.lockbox.toml`.
    ///
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        toml::from_str(&contents).map_err(|e| {
            LockboxError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })
    }

    /// Directory holding the slot files, e.g. `project_dir/.lockbox`.
    pub fn data_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.data_dir)
    }

    pub fn auto_lock_timeout(&self) -> Duration {
        Duration::from_secs(self.auto_lock_minutes.saturating_mul(60))
    }

    pub fn clipboard_clear_after(&self) -> Duration {
        Duration::from_secs(self.clipboard_clear_seconds)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.data_dir, ".lockbox");
        assert_eq!(s.auto_lock_minutes, 5);
        assert_eq!(s.clipboard_clear_seconds, 30);
        assert_eq!(s.auto_lock_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.data_dir, ".lockbox");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
data_dir = "secrets"
auto_lock_minutes = 15
clipboard_clear_seconds = 10
"#;
        fs::write(tmp.path().join(".lockbox.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.data_dir, "secrets");
        assert_eq!(settings.auto_lock_timeout(), Duration::from_secs(900));
        assert_eq!(settings.clipboard_clear_after(), Duration::from_secs(10));
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".lockbox.toml"), "auto_lock_minutes = 1\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.auto_lock_minutes, 1);
        assert_eq!(settings.data_dir, ".lockbox");
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".lockbox.toml"), "not valid {{toml").unwrap();

        assert!(matches!(
            Settings::load(tmp.path()),
            Err(LockboxError::Config(_))
        ));
    }

    #[test]
    fn kdf_cost_is_not_configurable() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".lockbox.toml"), "kdf_iterations = 1000\n").unwrap();

        // Unknown keys are ignored; the toml has no say in the blob format.
        let settings = Settings::load(tmp.path()).unwrap();
        let reparsed = toml::to_string(&settings).unwrap();
        assert!(!reparsed.contains("kdf"));
    }

    #[test]
    fn data_path_respects_custom_dir() {
        let s = Settings {
            data_dir: "secrets".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            s.data_path(Path::new("/home/user/project")),
            PathBuf::from("/home/user/project/secrets")
        );
    }
}
