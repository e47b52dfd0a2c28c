//! Path-addressable settings on top of a JSON [`DocumentStore`].
//!
//! Lookups consult the live document first and fall back to a compiled-in
//! default tree of the same shape. Writes only ever touch the live document,
//! and only through containers that already exist in it.

use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, StoreError};
use crate::store::DocumentStore;

pub const ONBOARDING_SHOW: &[&str] = &["tui", "onboarding", "show"];
pub const ONBOARDING_STAGE: &[&str] = &["tui", "onboarding", "stage"];

pub fn default_settings() -> Value {
    json!({
        "tui": {
            "onboarding": {
                "show": true,
                "stage": null
            }
        }
    })
}

#[derive(Debug)]
pub struct Settings {
    store: DocumentStore<Value>,
    defaults: Value,
}

impl Settings {
    /// Open the settings file, seeding a new one with the defaults.
    ///
    /// Containers present in the defaults but missing from the file (an older
    /// file, or a sparse seed) are added empty, so every default path can be
    /// set. Leaf values are never copied in.
    pub fn open(path: impl Into<PathBuf>, seed: Option<&Path>) -> Result<Self, StoreError> {
        let mut store = DocumentStore::open(path, default_settings(), seed)?;
        let defaults = default_settings();
        if merge_containers(store.data_mut(), &defaults) {
            tracing::info!("Added missing containers to {}", store.path().display());
            store.save()?;
        }
        Ok(Self::with_defaults(store, defaults))
    }

    pub fn with_defaults(store: DocumentStore<Value>, defaults: Value) -> Self {
        Self { store, defaults }
    }

    pub fn store(&self) -> &DocumentStore<Value> {
        &self.store
    }

    /// Re-read the settings file from disk.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.store.load()
    }

    /// Value stored in the live document, ignoring defaults.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        resolve(self.store.data(), path)
    }

    /// Value at `path`, falling back to the compiled-in default.
    pub fn get(&self, path: &[&str]) -> Result<&Value, SettingsError> {
        self.lookup(path)
            .or_else(|| resolve(&self.defaults, path))
            .ok_or_else(|| SettingsError::NotFound(path.join(".")))
    }

    /// Write `value` at `path` and save the document.
    ///
    /// Every parent of the terminal key must already be an object in the live
    /// document; nothing is created on the way down.
    pub fn set(&mut self, path: &[&str], value: Value) -> Result<(), SettingsError> {
        let (key, parents) = path.split_last().ok_or(SettingsError::EmptyPath)?;
        let missing = || SettingsError::MissingContainer(path.join("."));

        let mut node = self.store.data_mut();
        for segment in parents {
            node = node
                .as_object_mut()
                .and_then(|map| map.get_mut(*segment))
                .ok_or_else(missing)?;
        }
        let container: &mut Map<String, Value> = node.as_object_mut().ok_or_else(missing)?;
        container.insert((*key).to_string(), value);

        tracing::debug!("Setting {} updated", path.join("."));
        self.store.save()?;
        Ok(())
    }

    pub fn get_bool(&self, path: &[&str]) -> Result<bool, SettingsError> {
        self.get(path)?
            .as_bool()
            .ok_or_else(|| SettingsError::WrongType {
                path: path.join("."),
                expected: "boolean",
            })
    }

    /// A string setting where `null` means "not set".
    pub fn get_optional_str(&self, path: &[&str]) -> Result<Option<String>, SettingsError> {
        match self.get(path)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(SettingsError::WrongType {
                path: path.join("."),
                expected: "string",
            }),
        }
    }

    pub fn onboarding_show(&self) -> Result<bool, SettingsError> {
        self.get_bool(ONBOARDING_SHOW)
    }

    pub fn set_onboarding_show(&mut self, show: bool) -> Result<(), SettingsError> {
        self.set(ONBOARDING_SHOW, Value::Bool(show))
    }

    pub fn onboarding_stage(&self) -> Result<Option<String>, SettingsError> {
        self.get_optional_str(ONBOARDING_STAGE)
    }

    pub fn set_onboarding_stage(&mut self, stage: Option<&str>) -> Result<(), SettingsError> {
        let value = stage.map_or(Value::Null, |s| Value::String(s.to_string()));
        self.set(ONBOARDING_STAGE, value)
    }
}

/// Give `live` an empty object wherever `defaults` has one and `live` has
/// nothing. Returns whether anything was added.
fn merge_containers(live: &mut Value, defaults: &Value) -> bool {
    let (Some(live), Some(defaults)) = (live.as_object_mut(), defaults.as_object()) else {
        return false;
    };

    let mut changed = false;
    for (key, default) in defaults {
        if !default.is_object() {
            continue;
        }
        let child = live.entry(key.as_str()).or_insert_with(|| {
            changed = true;
            Value::Object(Map::new())
        });
        if !child.is_object() {
            tracing::warn!("Setting {key} should be an object but holds {child}");
            continue;
        }
        changed |= merge_containers(child, default);
    }
    changed
}

fn resolve<'v>(root: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter()
        .try_fold(root, |node, key| node.as_object()?.get(*key))
}
