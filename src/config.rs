use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that moves the data directory away from `~/.rollcall`.
pub const HOME_ENV: &str = "ROLLCALL_HOME";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Clear the screen when entering a page or redrawing a menu
    #[serde(default = "default_clear_screen")]
    pub clear_screen: bool,

    /// Initial content for a new accounts file
    #[serde(default)]
    pub accounts_seed: Option<PathBuf>,

    /// Initial content for a new settings file
    #[serde(default)]
    pub settings_seed: Option<PathBuf>,

    /// Initial content for a new students file
    #[serde(default)]
    pub students_seed: Option<PathBuf>,

    /// Wrong passwords allowed per log-in before giving up
    #[serde(default = "default_max_password_attempts")]
    pub max_password_attempts: u32,
}

fn default_clear_screen() -> bool {
    true
}

fn default_max_password_attempts() -> u32 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clear_screen: default_clear_screen(),
            accounts_seed: None,
            settings_seed: None,
            students_seed: None,
            max_password_attempts: default_max_password_attempts(),
        }
    }
}

impl Config {
    pub fn data_dir() -> Result<PathBuf> {
        let dir = match std::env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".rollcall"),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(dir)
    }

    pub fn config_path(dir: &Path) -> PathBuf {
        dir.join("config.toml")
    }

    pub fn accounts_path(dir: &Path) -> PathBuf {
        dir.join("accounts.json")
    }

    pub fn settings_path(dir: &Path) -> PathBuf {
        dir.join("settings.json")
    }

    pub fn students_path(dir: &Path) -> PathBuf {
        dir.join("students.json")
    }

    /// Load `config.toml` from `dir`, or defaults if there isn't one.
    /// Relative seed paths are taken relative to `dir`.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let path = Self::config_path(dir);
        let mut config: Self = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config at {}", path.display()))?;
            toml::from_str(&contents).context("Failed to parse config.toml")?
        } else {
            Self::default()
        };

        for seed in [
            &mut config.accounts_seed,
            &mut config.settings_seed,
            &mut config.students_seed,
        ] {
            if let Some(p) = seed.as_mut().filter(|p| p.is_relative()) {
                *p = dir.join(&*p);
            }
        }

        Ok(config)
    }

    pub fn save_to(&self, dir: &Path) -> Result<()> {
        let path = Self::config_path(dir);
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config at {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = Config::load_from(tmp.path()).unwrap();
        assert!(cfg.clear_screen);
        assert_eq!(cfg.max_password_attempts, 5);
        assert!(cfg.accounts_seed.is_none());
    }

    #[test]
    fn test_partial_file_and_relative_seed() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "clear_screen = false\naccounts_seed = \"seed/accounts.json\"\n\
             students_seed = \"/srv/students.json\"\n",
        )
        .unwrap();

        let cfg = Config::load_from(tmp.path()).unwrap();
        assert!(!cfg.clear_screen);
        assert_eq!(cfg.max_password_attempts, 5);
        assert_eq!(
            cfg.accounts_seed.unwrap(),
            tmp.path().join("seed/accounts.json")
        );
        assert_eq!(
            cfg.students_seed.unwrap(),
            PathBuf::from("/srv/students.json")
        );
    }

    #[test]
    fn test_save_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = Config {
            max_password_attempts: 2,
            ..Config::default()
        };
        cfg.save_to(tmp.path()).unwrap();
        assert_eq!(Config::load_from(tmp.path()).unwrap().max_password_attempts, 2);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("config.toml"), "clear_screen = [").unwrap();
        assert!(Config::load_from(tmp.path()).is_err());
    }
}
