//! Draft slot for the pending-item collection.
//!
//! The slot is opportunistic: writes are last-writer-wins and any failure to
//! read or parse a draft is logged and treated as "no draft".

use std::{fmt::Debug, fs, io::Write, path::PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::core::pending::PendingItem;

pub const DEFAULT_DRAFT_KEY: &str = "PLM_CATEGORY_CART_DRAFT";

/// A simple string key-value slot.
pub trait DraftStore: Debug {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
    fn clear(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    slots: IndexMap<String, String>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<()> {
        self.slots.shift_remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per slot under `dir`.
///
/// Writes land in a temp file in the same directory and are renamed into
/// place, so a reader never sees a half-written draft.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl DraftStore for FileDraftStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .with_context(|| format!("read draft: {}", path.display()))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create draft dir: {}", self.dir.display()))?;

        let path = self.slot_path(key);
        let mut tmp = NamedTempFile::new_in(&self.dir).context("create draft temp file")?;
        tmp.write_all(value.as_bytes())
            .context("write draft temp file")?;
        tmp.persist(&path)
            .with_context(|| format!("persist draft: {}", path.display()))?;
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<()> {
        let path = self.slot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove draft: {}", path.display())),
        }
    }
}

/// What gets written to the slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub saved_at: DateTime<Utc>,
    pub items: Vec<PendingItem>,
}

pub fn save_draft(store: &mut dyn DraftStore, key: &str, items: &[PendingItem]) -> Result<()> {
    let snapshot = DraftSnapshot {
        saved_at: Utc::now(),
        items: items.to_vec(),
    };
    let body = serde_json::to_string(&snapshot).context("serialize draft")?;
    store.write(key, &body)?;
    debug!(key, items = items.len(), "draft saved");
    Ok(())
}

/// Reads the draft back. Missing, unreadable, and malformed drafts all come
/// back as `None`.
pub fn load_draft(store: &dyn DraftStore, key: &str) -> Option<DraftSnapshot> {
    let body = match store.read(key) {
        Ok(Some(body)) => body,
        Ok(None) => return None,
        Err(err) => {
            warn!(key, error = %format!("{err:#}"), "draft unreadable, ignoring");
            return None;
        }
    };

    serde_json::from_str(&body)
        .inspect_err(|err| warn!(key, %err, "draft malformed, ignoring"))
        .ok()
}
