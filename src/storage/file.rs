//! File-backed storage backend
//!
//! Keeps the whole store in memory and writes it through to a single JSON
//! file after every mutation, so entries survive restarts.

use std::collections::HashSet;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Availability, OrderedEntries, StorageBackend};
use crate::error::{StorageError, StorageResult};

/// One persisted key-value pair. The file holds an array of these in order.
#[derive(Debug, Serialize, Deserialize)]
struct Record {
    key: String,
    value: String,
}

fn records(entries: &OrderedEntries) -> Vec<Record> {
    entries
        .iter()
        .map(|(key, value)| Record {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

fn write_synced(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

// == File Storage ==
#[derive(Debug)]
pub struct FileStorage {
    name: String,
    path: PathBuf,
    entries: Mutex<OrderedEntries>,
}

impl FileStorage {
    /// Opens the store at `path`, creating parent directories as needed.
    ///
    /// A missing file starts an empty store. An unreadable or corrupt file is
    /// an error.
    pub fn open(name: impl Into<String>, path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut entries = OrderedEntries::new();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let records: Vec<Record> = serde_json::from_str(&contents)?;
            entries = records.into_iter().map(|r| (r.key, r.value)).collect();
            debug!(path = %path.display(), entries = entries.len(), "Loaded file storage");
        }

        Ok(Self {
            name: name.into(),
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the scratch file a new store image is written to before it
    /// replaces the store.
    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    /// Writes the store image to a scratch file, then renames it over the
    /// store so the file on disk is always a complete image.
    fn persist(&self, entries: &OrderedEntries) -> StorageResult<()> {
        let contents = serde_json::to_vec(&records(entries))?;
        let temp_path = self.temp_path();

        let written = write_synced(&temp_path, &contents)
            .and_then(|()| std::fs::rename(&temp_path, &self.path));
        if written.is_err() {
            let _ = std::fs::remove_file(&temp_path);
        }
        written.map_err(StorageError::from)
    }

    /// Checks, under the store lock and without writing, that the store file
    /// can be replaced.
    fn check_writable(&self) -> StorageResult<()> {
        let _entries = self.entries.lock()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let meta = std::fs::metadata(parent)?;
            if !meta.is_dir() || meta.permissions().readonly() {
                return Err(StorageError::Unavailable(format!(
                    "{} is not a writable directory",
                    parent.display()
                )));
            }
        }

        match std::fs::metadata(&self.path) {
            Ok(meta) if meta.is_dir() => Err(StorageError::Unavailable(format!(
                "{} is a directory",
                self.path.display()
            ))),
            Ok(meta) if meta.permissions().readonly() => Err(StorageError::Unavailable(format!(
                "{} is read-only",
                self.path.display()
            ))),
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl StorageBackend for FileStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock()?;
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock()?;

        let previous = entries.set(key, value);
        if let Err(e) = self.persist(&entries) {
            // Memory never runs ahead of the file
            match previous {
                Some(old) => {
                    entries.set(key, &old);
                }
                None => {
                    entries.remove(key);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock()?;

        let Some((index, old)) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.persist(&entries) {
            entries.restore(index, key.to_string(), old);
            return Err(e);
        }
        Ok(())
    }

    fn key(&self, index: usize) -> StorageResult<Option<String>> {
        let entries = self.entries.lock()?;
        Ok(entries.key_at(index).cloned())
    }

    fn len(&self) -> StorageResult<usize> {
        let entries = self.entries.lock()?;
        Ok(entries.len())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let entries = self.entries.lock()?;
        Ok(entries.keys().cloned().collect())
    }

    /// Removes all of `keys` with a single write of the store file.
    fn remove_items(&self, keys: &[String]) -> StorageResult<()> {
        let mut entries = self.entries.lock()?;

        let doomed: HashSet<&str> = keys.iter().map(String::as_str).collect();
        let before = entries.clone();
        entries.retain(|key, _| !doomed.contains(key));
        if entries.len() == before.len() {
            return Ok(());
        }

        if let Err(e) = self.persist(&entries) {
            *entries = before;
            return Err(e);
        }
        Ok(())
    }

    fn probe(&self) -> Availability {
        match self.check_writable() {
            Ok(()) => Availability::Available,
            Err(e) => Availability::Unavailable(e.to_string()),
        }
    }
}
