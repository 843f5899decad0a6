//! # Persistent Storage Layer
//!
//! The registry is persisted as a single pretty-printed JSON array of
//! `{"mid": .., "uname": ..}` objects, by default at
//! `<cache_dir>/vtb_list.json`.
//!
//! ## Failure Handling
//!
//! | Condition | `load` result |
//! |-----------|---------------|
//! | File missing | empty list |
//! | File unparsable | file deleted, empty list |
//! | Other I/O error | error |
//!
//! Writes go to a uniquely named temporary file in the same directory and
//! are renamed into place, so a crash mid-write never leaves a truncated
//! registry behind and concurrent writers never share a temporary file.

use crate::models::{RegistryEntry, Result};
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// File name of the persisted registry inside the cache directory.
pub const REGISTRY_FILE: &str = "vtb_list.json";

/// JSON-file storage for the registry.
///
/// # Example
///
/// ```rust,no_run
/// use ddcheck_registry::storage::Storage;
/// use ddcheck_registry::RegistryEntry;
///
/// let storage = Storage::in_dir("./cache/ddcheck");
/// storage.store(&[RegistryEntry::new(1, "first")]).unwrap();
///
/// let entries = storage.load().unwrap();
/// assert_eq!(entries.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Storage backed by an explicit file path.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Storage backed by [`REGISTRY_FILE`] inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(dir.as_ref().join(REGISTRY_FILE))
    }

    /// Path of the persisted file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the persisted file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the persisted registry.
    ///
    /// A missing file yields an empty list. A corrupted file is deleted and
    /// also yields an empty list, so the caller knows to re-fetch.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Io` for I/O failures other than a missing file.
    pub fn load(&self) -> Result<Vec<RegistryEntry>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Vec<RegistryEntry>>(&bytes) {
            Ok(entries) => {
                debug!("Loaded {} registry entries from {}", entries.len(), self.path.display());
                Ok(entries)
            }
            Err(e) => {
                warn!(
                    "Registry file {} is corrupted ({}), removing it",
                    self.path.display(),
                    e
                );
                self.remove()?;
                Ok(Vec::new())
            }
        }
    }

    /// Replaces the persisted registry with `entries`.
    ///
    /// Output uses four-space indentation and keeps non-ASCII names as-is.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Io` if the directory or file cannot be written.
    pub fn store(&self, entries: &[RegistryEntry]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        entries.serialize(&mut serializer)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&buf)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!("Stored {} registry entries to {}", entries.len(), self.path.display());
        Ok(())
    }

    /// Deletes the persisted file. Missing files are not an error.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Io` if the file exists but cannot be removed.
    pub fn remove(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Vec<RegistryEntry> {
        vec![
            RegistryEntry::new(672328094, "嘉然今天吃什么"),
            RegistryEntry::new(1, "alpha"),
            RegistryEntry::new(1, "alpha-dup"),
        ]
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::in_dir(dir.path());
        assert!(!storage.exists());
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_store_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::in_dir(dir.path());

        storage.store(&sample()).unwrap();
        assert_eq!(storage.load().unwrap(), sample());
    }

    #[test]
    fn test_store_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::in_dir(dir.path().join("nested").join("cache"));

        storage.store(&sample()).unwrap();
        assert!(storage.exists());
    }

    #[test]
    fn test_store_format() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::in_dir(dir.path());

        storage.store(&[RegistryEntry::new(7, "名前")]).unwrap();
        let text = fs::read_to_string(storage.path()).unwrap();

        assert_eq!(text, "[\n    {\n        \"mid\": 7,\n        \"uname\": \"名前\"\n    }\n]");
    }

    #[test]
    fn test_corrupted_file_is_removed() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::in_dir(dir.path());
        fs::write(storage.path(), b"[{\"mid\": 1, \"uname\":").unwrap();

        assert!(storage.load().unwrap().is_empty());
        assert!(!storage.exists());
    }

    #[test]
    fn test_wrong_shape_counts_as_corruption() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::in_dir(dir.path());
        fs::write(storage.path(), b"{\"mid\": 1}").unwrap();

        assert!(storage.load().unwrap().is_empty());
        assert!(!storage.exists());
    }

    #[test]
    fn test_overwrite_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::in_dir(dir.path());

        storage.store(&sample()).unwrap();
        storage.store(&[RegistryEntry::new(9, "only")]).unwrap();

        assert_eq!(storage.load().unwrap(), vec![RegistryEntry::new(9, "only")]);
    }

    #[test]
    fn test_store_leaves_no_temporary_files() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::in_dir(dir.path());

        storage.store(&sample()).unwrap();
        storage.store(&sample()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(REGISTRY_FILE)]);
    }

    #[test]
    fn test_remove() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::in_dir(dir.path());

        assert!(!storage.remove().unwrap());
        storage.store(&sample()).unwrap();
        assert!(storage.remove().unwrap());
        assert!(!storage.exists());
    }
}
