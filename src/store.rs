//! Whole-file JSON document persistence.
//!
//! A [`DocumentStore`] keeps one document in memory and mirrors it to a single
//! file. Callers mutate the in-memory value and then call [`DocumentStore::save`],
//! which rewrites the entire file. Writes go through a temporary file in the
//! same directory that is renamed over the target, so a crash mid-save leaves
//! either the old or the new document on disk.
//!
//! There is no locking: two processes sharing a path will overwrite each
//! other's changes.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;

#[derive(Debug)]
pub struct DocumentStore<T> {
    path: PathBuf,
    data: T,
}

impl<T: Serialize + DeserializeOwned> DocumentStore<T> {
    /// Open the document at `path`, creating it if it doesn't exist yet.
    ///
    /// A new file is filled from `seed` when that file exists, otherwise from
    /// `fallback`, and written straight away. A file that exists but can't be
    /// parsed is an error.
    pub fn open(
        path: impl Into<PathBuf>,
        fallback: T,
        seed: Option<&Path>,
    ) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(data) = read_document(&path)? {
            return Ok(Self { path, data });
        }

        let seeded = match seed {
            Some(seed_path) => read_document(seed_path)?,
            None => None,
        };
        let data = match seeded {
            Some(data) => {
                tracing::info!(
                    "Created {} from seed {}",
                    path.display(),
                    seed.map(|s| s.display().to_string()).unwrap_or_default()
                );
                data
            }
            None => {
                tracing::info!("Created {} with default content", path.display());
                fallback
            }
        };

        let store = Self { path, data };
        store.save()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    /// Serialize the whole document and replace the file with it.
    pub fn save(&self) -> Result<(), StoreError> {
        let contents =
            serde_json::to_string_pretty(&self.data).map_err(|source| StoreError::Serialize {
                path: self.path.clone(),
                source,
            })?;

        self.write_atomic(contents.as_bytes())
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!("Saved {}", self.path.display());
        Ok(())
    }

    /// Replace the in-memory document with the file's current contents.
    pub fn load(&mut self) -> Result<(), StoreError> {
        match read_document(&self.path)? {
            Some(data) => {
                self.data = data;
                Ok(())
            }
            None => Err(StoreError::Read {
                path: self.path.clone(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        }
    }

    fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(bytes)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Read and parse a document; `Ok(None)` when the file doesn't exist.
fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}
