//! The record store: a blob store addressed by `/`-separated paths, holding every CSV table.
//!
//! Reads never fail from the caller's point of view. A table that is missing, unreadable or not
//! valid CSV is reported as absent, and the page that needed it decides whether that blocks it.

use crate::error::{Error, Result};
use crate::schema::Table;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

pub trait RecordStore {
    /// Returns the blob at `path`, or `None` if nothing is stored there.
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `bytes` at `path`, replacing whatever was there.
    fn write(&self, path: &str, bytes: &[u8]) -> Result<()>;

    fn exists(&self, path: &str) -> bool;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        (**self).read(path)
    }

    fn write(&self, path: &str, bytes: &[u8]) -> Result<()> {
        (**self).write(path, bytes)
    }

    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }
}

/// Loads and parses the table at `path`. Any failure is logged and treated as absence.
pub fn read_table<S: RecordStore + ?Sized>(store: &S, path: &str) -> Option<Table> {
    let bytes = match store.read(path) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!(path, "table not found");
            return None;
        }
        Err(e) => {
            warn!(path, error = %e, "failed to read table");
            return None;
        }
    };

    match Table::from_reader(bytes.as_slice()) {
        Ok(table) => Some(table),
        Err(e) => {
            warn!(path, error = %e, "stored table is not valid CSV");
            None
        }
    }
}

pub fn write_table<S: RecordStore + ?Sized>(store: &S, path: &str, table: &Table) -> Result<()> {
    let bytes = table.to_csv()?;
    store.write(path, &bytes)?;
    debug!(path, rows = table.len(), "table written");
    Ok(())
}

/// Rejects paths that could escape the store root.
pub fn validate_path(path: &str) -> Result<()> {
    let valid = !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidPath(path.to_string()))
    }
}

/// Where each kind of table lives.
pub mod paths {
    use crate::models::Year;
    use chrono::NaiveDate;

    pub fn students(year: Year) -> String {
        format!("students/students_{year}.csv")
    }

    pub fn timetable(year: Year) -> String {
        format!("timetable/{year}_timetable.csv")
    }

    pub fn daily_attendance(date: NaiveDate, year: Year) -> String {
        format!("attendance/{}/{year}.csv", date.format("%Y-%m-%d"))
    }

    pub fn cumulative_attendance(year: Year) -> String {
        format!("attendance/attendance_{year}.csv")
    }

    pub fn document(year: Year, file_name: &str) -> String {
        format!("documents/{year}/{file_name}")
    }
}

/// A store rooted at a directory on the local file system.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        validate_path(path)?;
        Ok(path.split('/').fold(self.root.clone(), |p, s| p.join(s)))
    }
}

impl RecordStore for FsStore {
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let full = self.resolve(path)?;
        match fs::read(&full) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let full = self.resolve(path)?;
        let to_store_error = |source| Error::StoreWrite {
            path: path.to_string(),
            source,
        };

        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(to_store_error)?;
        }
        fs::write(&full, bytes).map_err(to_store_error)
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|p| p.is_file())
    }
}

/// An in-memory store, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.blobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RecordStore for MemoryStore {
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        validate_path(path)?;
        Ok(self.lock().get(path).cloned())
    }

    fn write(&self, path: &str, bytes: &[u8]) -> Result<()> {
        validate_path(path)?;
        self.lock().insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        validate_path(path).is_ok() && self.lock().contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Year;
    use chrono::NaiveDate;

    #[test]
    fn path_conventions() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(paths::students(Year::Se), "students/students_SE.csv");
        assert_eq!(paths::timetable(Year::Te), "timetable/TE_timetable.csv");
        assert_eq!(
            paths::daily_attendance(date, Year::Be),
            "attendance/2025-01-09/BE.csv"
        );
        assert_eq!(
            paths::cumulative_attendance(Year::Be),
            "attendance/attendance_BE.csv"
        );
        assert_eq!(paths::document(Year::Se, "a.pdf"), "documents/SE/a.pdf");
    }

    #[test]
    fn escaping_paths_are_rejected() {
        for path in ["", "/etc/passwd", "a/../b", "a//b", "./a", "a\\b"] {
            assert!(validate_path(path).is_err(), "{path}");
        }
        assert!(validate_path("attendance/2025-01-09/BE.csv").is_ok());
    }

    #[test]
    fn unreadable_tables_read_as_absent() {
        let store = MemoryStore::new();
        store.write("good.csv", b"Roll,Name\n1,A\n").unwrap();

        assert!(read_table(&store, "missing.csv").is_none());
        assert!(read_table(&store, "../escape.csv").is_none());
        let good = read_table(&store, "good.csv").unwrap();
        assert_eq!(good.headers(), ["roll", "name"]);
    }

    #[test]
    fn fs_store_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        assert!(!store.exists("documents/SE/notes.txt"));
        assert_eq!(store.read("documents/SE/notes.txt").unwrap(), None);

        store.write("documents/SE/notes.txt", b"hello").unwrap();
        assert!(store.exists("documents/SE/notes.txt"));
        assert_eq!(
            store.read("documents/SE/notes.txt").unwrap().as_deref(),
            Some(&b"hello"[..])
        );
        assert!(dir.path().join("documents").join("SE").is_dir());
    }
}
