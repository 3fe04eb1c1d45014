//! JSON-backed key-value store.
//!
//! Every persistent map in the pipeline is a flat JSON object on disk,
//! pretty-printed with four-space indentation and sorted keys so that
//! successive saves diff cleanly and the files stay hand-editable.
//!
//! Saves go through a temporary file in the target directory followed by a
//! rename, so an interrupted write never clobbers the previous file. There
//! is no locking: a single writer process is assumed.

use std::collections::btree_map::{self, BTreeMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{LusociteError, Result};

/// Read and decode `path`; a missing file yields `T::default()`.
pub fn load_json<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => return Err(LusociteError::Io { path: path.to_path_buf(), source }),
    };
    serde_json::from_slice(&bytes)
        .map_err(|source| LusociteError::CacheDecode { path: path.to_path_buf(), source })
}

/// Serialize `value` and atomically replace `path` with it.
pub fn save_json<T>(value: &T, path: &Path) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let io_err = |source| LusociteError::Io { path: path.to_path_buf(), source };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(io_err)?;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
    tmp.write_all(&buf).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    debug!(path = %path.display(), bytes = buf.len(), "Saved JSON");
    Ok(())
}

pub fn load_map<V: DeserializeOwned>(path: &Path) -> Result<BTreeMap<String, V>> {
    load_json(path)
}

pub fn save_map<V: Serialize>(map: &BTreeMap<String, V>, path: &Path) -> Result<()> {
    save_json(map, path)
}

/// A string-keyed map loaded from disk once and saved back on demand.
///
/// Mutating accessors mark the cache dirty; `save` is a no-op when nothing
/// changed since the last save.
#[derive(Debug, Clone)]
pub struct Cache<V> {
    path: Option<PathBuf>,
    entries: BTreeMap<String, V>,
    dirty: bool,
}

impl<V> Cache<V>
where
    V: Serialize + DeserializeOwned,
{
    /// Load the cache at `path` (empty if the file does not exist yet).
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = load_map(&path)?;
        debug!(path = %path.display(), n = entries.len(), "Loaded cache");
        Ok(Self { path: Some(path), entries, dirty: false })
    }

    /// A cache with no backing file; `save` does nothing.
    pub fn in_memory() -> Self {
        Self { path: None, entries: BTreeMap::new(), dirty: false }
    }

    pub fn from_entries(entries: BTreeMap<String, V>) -> Self {
        Self { path: None, entries, dirty: false }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let entry = self.entries.get_mut(key);
        if entry.is_some() {
            self.dirty = true;
        }
        entry
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.dirty = true;
        self.entries.insert(key.into(), value)
    }

    /// Existing entry, or a freshly inserted default.
    pub fn entry_or_default(&mut self, key: &str) -> &mut V
    where
        V: Default,
    {
        self.dirty = true;
        self.entries.entry(key.to_string()).or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, V> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn entries(&self) -> &BTreeMap<String, V> {
        &self.entries
    }

    /// Persist pending changes to the backing file.
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(path) = &self.path {
            save_map(&self.entries, path)?;
        }
        self.dirty = false;
        Ok(())
    }
}
