use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the JSON document files. Never recovered locally.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("{} does not contain a valid document: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize document for {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Setting does not exist: {0}")]
    NotFound(String),
    #[error("Cannot set {0}: a parent container is missing")]
    MissingContainer(String),
    #[error("Setting {path} is not a {expected}")]
    WrongType { path: String, expected: &'static str },
    #[error("Setting path is empty")]
    EmptyPath,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Username {0} already exists")]
    Duplicate(String),
    #[error("User doesn't exist: {0}")]
    NotFound(String),
}

/// The operator aborted a prompt (Ctrl+C, end of input).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Cancelled by the operator")]
pub struct Cancelled;

pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.is::<Cancelled>()
}

/// A data file could not be read or written, whether it surfaced directly or
/// through a settings write.
pub fn is_store_failure(err: &anyhow::Error) -> bool {
    err.is::<StoreError>()
        || matches!(
            err.downcast_ref::<SettingsError>(),
            Some(SettingsError::Store(_))
        )
}

/// Short name of the error's kind, used in on-screen diagnostics.
pub fn kind_name(err: &anyhow::Error) -> &'static str {
    if err.is::<StoreError>() {
        "StoreError"
    } else if err.is::<SettingsError>() {
        "SettingsError"
    } else if err.is::<AccountError>() {
        "AccountError"
    } else if err.is::<io::Error>() {
        "IoError"
    } else if err.is::<serde_json::Error>() {
        "JsonError"
    } else {
        "Error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_survives_context() {
        use anyhow::Context;
        let err: anyhow::Result<()> = Err(Cancelled.into());
        let err = err.context("while asking for a username").unwrap_err();
        assert!(is_cancelled(&err));
    }

    #[test]
    fn test_kind_name() {
        let err = anyhow::Error::from(AccountError::Duplicate("alice".into()));
        assert_eq!(kind_name(&err), "AccountError");
        assert_eq!(kind_name(&anyhow::anyhow!("boom")), "Error");
    }

    #[test]
    fn test_store_failure_through_settings() {
        let io = io::Error::other("disk full");
        let wrapped = SettingsError::Store(StoreError::Write {
            path: "settings.json".into(),
            source: io,
        });
        assert!(is_store_failure(&wrapped.into()));
        assert!(!is_store_failure(&SettingsError::EmptyPath.into()));
        assert!(!is_store_failure(&anyhow::anyhow!("boom")));
    }
}
