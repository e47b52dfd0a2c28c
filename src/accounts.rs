use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AccountError, StoreError, is_cancelled};
use crate::inputs;
use crate::password;
use crate::store::DocumentStore;
use crate::term::{Terminal, error_line, hint};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Always lowercase; unique across the document.
    pub username: String,
    /// Opaque, base64-encoded.
    pub password_hash: String,
}

/// The accounts document: a JSON array of [`Account`] records.
#[derive(Debug)]
pub struct AccountStore {
    store: DocumentStore<Vec<Account>>,
}

impl AccountStore {
    pub fn open(path: impl Into<PathBuf>, seed: Option<&Path>) -> Result<Self, StoreError> {
        Ok(Self {
            store: DocumentStore::open(path, Vec::new(), seed)?,
        })
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    pub fn get(&self, username: &str) -> Option<&Account> {
        let wanted = username.to_lowercase();
        self.store
            .data()
            .iter()
            .find(|account| account.username == wanted)
    }

    pub fn exists(&self, username: &str) -> bool {
        self.get(username).is_some()
    }

    pub fn usernames(&self) -> Vec<&str> {
        self.store
            .data()
            .iter()
            .map(|account| account.username.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.store.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.data().is_empty()
    }

    /// Add an account and save. The username is stored lowercased.
    pub fn add(&mut self, username: &str, password_hash: &str) -> Result<&Account> {
        let username = username.to_lowercase();
        if self.exists(&username) {
            return Err(AccountError::Duplicate(username).into());
        }

        self.store.data_mut().push(Account {
            username,
            password_hash: password_hash.to_string(),
        });
        self.store.save()?;

        let added = self.store.data().last();
        added.ok_or_else(|| anyhow::anyhow!("account vanished after save"))
    }

    /// Ask for `username`'s password until it's right, the operator cancels,
    /// or `max_attempts` wrong answers have been given.
    ///
    /// Returns `Ok(false)` unless the operator proved who they are. The caller
    /// must check that the account exists first; an unknown username is an
    /// [`AccountError::NotFound`].
    pub fn authenticate(
        &self,
        term: &mut dyn Terminal,
        username: &str,
        max_attempts: u32,
    ) -> Result<bool> {
        let account = self
            .get(username)
            .ok_or_else(|| AccountError::NotFound(username.to_string()))?;

        for attempt in 1..=max_attempts.max(1) {
            let typed = match inputs::password(
                term,
                "Password",
                "Enter a password to authenticate",
            ) {
                Ok(typed) => typed,
                Err(e) if is_cancelled(&e) => return Ok(false),
                Err(e) => return Err(e),
            };

            if password::verify(&typed, &account.password_hash) {
                return Ok(true);
            }

            error_line(term, "Incorrect password");
            if attempt == 1 {
                hint(term, "Tip: Try again or press Ctrl+C to cancel");
            }
            tracing::debug!(username = %account.username, attempt, "password rejected");
        }

        error_line(term, "Too many incorrect attempts");
        Ok(false)
    }
}
