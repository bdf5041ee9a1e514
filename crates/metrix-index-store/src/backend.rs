//! Durable key-value backend.
//!
//! The index store talks to durable storage through [`Backend`]. The
//! production implementation is [`RedbBackend`]; every write runs in its
//! own write transaction and is committed before the call returns.

use crate::tables;
use redb::{Database, ReadableTable};
use std::ops::ControlFlow;
use std::path::Path;

/// Error type for backend operations
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::DatabaseError),
    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("redb transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),
    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<redb::TransactionError> for BackendError {
    fn from(e: redb::TransactionError) -> Self {
        Self::Transaction(Box::new(e))
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Ordered, crash-durable key-value storage for encoded index records
pub trait Backend: Send + Sync {
    /// Durably write `value` under `key`, replacing any previous value
    fn put(&self, key: &str, value: &[u8]) -> BackendResult<()>;

    /// Read the value stored under `key`
    fn get(&self, key: &str) -> BackendResult<Option<Vec<u8>>>;

    /// Durably remove `key`. Returns whether the key existed; removing an
    /// absent key is not an error.
    fn delete(&self, key: &str) -> BackendResult<bool>;

    /// Visit every stored entry in key order until `visit` breaks
    fn scan(&self, visit: &mut dyn FnMut(&str, &[u8]) -> ControlFlow<()>) -> BackendResult<()>;
}

/// Backend storing all indexes in one redb table
pub struct RedbBackend {
    db: Database,
}

impl RedbBackend {
    /// Open (or create) the redb database at the given path.
    pub fn open(path: impl AsRef<Path>, create_parent_dirs: bool) -> BackendResult<Self> {
        let path = path.as_ref();
        if create_parent_dirs {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Create the table eagerly so later read txns don't fail
        let write_txn = db.begin_write()?;
        {
            let _t = write_txn.open_table(tables::INDEXES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

impl Backend for RedbBackend {
    fn put(&self, key: &str, value: &[u8]) -> BackendResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(tables::INDEXES)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get(&self, key: &str) -> BackendResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(tables::INDEXES)?;
        Ok(table.get(key)?.map(|v| v.value().to_vec()))
    }

    fn delete(&self, key: &str) -> BackendResult<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(tables::INDEXES)?;
            let removed = table.remove(key)?;
            removed.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }

    fn scan(&self, visit: &mut dyn FnMut(&str, &[u8]) -> ControlFlow<()>) -> BackendResult<()> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(tables::INDEXES)?;
        for entry in table.iter()? {
            let entry = entry?;
            if visit(entry.0.value(), entry.1.value()).is_break() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_backend_put_get_delete() {
        let dir = tempdir().unwrap();
        let backend = RedbBackend::open(dir.path().join("index.redb"), false).unwrap();

        assert_eq!(backend.get("foo").unwrap(), None);

        backend.put("foo", b"v1").unwrap();
        assert_eq!(backend.get("foo").unwrap(), Some(b"v1".to_vec()));

        backend.put("foo", b"v2").unwrap();
        assert_eq!(backend.get("foo").unwrap(), Some(b"v2".to_vec()));

        assert!(backend.delete("foo").unwrap());
        assert_eq!(backend.get("foo").unwrap(), None);

        // Absent key is not an error
        assert!(!backend.delete("foo").unwrap());
    }

    #[test]
    fn test_backend_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("index.redb");

        RedbBackend::open(&path, true).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_backend_missing_parent_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("index.redb");

        assert!(RedbBackend::open(&path, false).is_err());
    }

    #[test]
    fn test_backend_scan_in_key_order() {
        let dir = tempdir().unwrap();
        let backend = RedbBackend::open(dir.path().join("index.redb"), false).unwrap();

        backend.put("b.x", b"2").unwrap();
        backend.put("a.x", b"1").unwrap();
        backend.put("c.x", b"3").unwrap();

        let mut seen = Vec::new();
        backend
            .scan(&mut |key, value| {
                seen.push((key.to_string(), value.to_vec()));
                ControlFlow::Continue(())
            })
            .unwrap();

        assert_eq!(
            seen,
            vec![
                ("a.x".to_string(), b"1".to_vec()),
                ("b.x".to_string(), b"2".to_vec()),
                ("c.x".to_string(), b"3".to_vec()),
            ]
        );
    }

    #[test]
    fn test_backend_scan_break() {
        let dir = tempdir().unwrap();
        let backend = RedbBackend::open(dir.path().join("index.redb"), false).unwrap();

        for i in 0..10 {
            backend.put(&format!("key.{i}"), b"v").unwrap();
        }

        let mut visited = 0;
        backend
            .scan(&mut |_, _| {
                visited += 1;
                if visited == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert_eq!(visited, 3);
    }

    #[test]
    fn test_backend_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.redb");

        {
            let backend = RedbBackend::open(&path, false).unwrap();
            backend.put("persisted", b"yes").unwrap();
        }

        let backend = RedbBackend::open(&path, false).unwrap();
        assert_eq!(backend.get("persisted").unwrap(), Some(b"yes".to_vec()));
    }
}
