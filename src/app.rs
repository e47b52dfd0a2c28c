//! Application state shared by every page: the data files and who is signed in.

use anyhow::Result;
use std::path::Path;

use crate::accounts::{Account, AccountStore};
use crate::config::Config;
use crate::settings::Settings;
use crate::students::StudentStore;

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub accounts: AccountStore,
    pub settings: Settings,
    pub students: StudentStore,
    pub current_account: Option<Account>,
}

impl App {
    /// Open (or create) the data files inside `dir`.
    pub fn open(dir: &Path, config: Config) -> Result<Self> {
        let accounts = AccountStore::open(
            Config::accounts_path(dir),
            config.accounts_seed.as_deref(),
        )?;
        let settings = Settings::open(
            Config::settings_path(dir),
            config.settings_seed.as_deref(),
        )?;
        let students = StudentStore::open(
            Config::students_path(dir),
            config.students_seed.as_deref(),
        )?;

        tracing::debug!("Opened data files in {}", dir.display());
        Ok(Self {
            config,
            accounts,
            settings,
            students,
            current_account: None,
        })
    }

    pub fn signed_in(&self) -> bool {
        self.current_account.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.current_account.as_ref().map(|a| a.username.as_str())
    }
}
