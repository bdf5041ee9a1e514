//! Index store: durable backend plus in-memory pattern trie.
//!
//! All writes go to the backend first and are committed before the trie is
//! touched, so the cache never claims a record the backend does not hold.
//! Reads are served from the trie only. The backend is read back in full on
//! open and on an explicit [`IndexStore::load`].
//!
//! One `RwLock` guards backend and trie together: mutations hold the write
//! lock across the durable write and the trie update, reads share the read
//! lock.

use crate::backend::{Backend, RedbBackend};
use crate::codec;
use crate::trie::PatternTrie;
use metrix_common::{
    validate_name, Error, IndexRecord, IndexStoreConfig, LoadPolicy, Result,
};
use parking_lot::RwLock;
use std::ops::ControlFlow;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// An entry skipped during a load because it could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptEntry {
    /// Key the entry is stored under
    pub name: String,
    /// Why it was rejected
    pub reason: String,
}

/// Outcome of loading the backend into the trie
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of records now cached
    pub loaded: usize,
    /// Entries skipped under [`LoadPolicy::SkipCorrupt`]
    pub corrupt: Vec<CorruptEntry>,
}

impl LoadReport {
    /// True when every stored entry was loaded
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.corrupt.is_empty()
    }
}

struct Inner<B> {
    /// `None` once closed
    backend: Option<B>,
    trie: PatternTrie,
    last_report: LoadReport,
}

/// Persistent metric index store
pub struct IndexStore<B: Backend = RedbBackend> {
    inner: RwLock<Inner<B>>,
    load_policy: LoadPolicy,
}

impl IndexStore<RedbBackend> {
    /// Open (or create) the redb-backed store described by `config` and
    /// load every persisted record.
    pub fn open(config: IndexStoreConfig) -> Result<Self> {
        let backend = RedbBackend::open(&config.path, config.create_parent_dirs)
            .map_err(|e| Error::Open(format!("{}: {}", config.path.display(), e)))?;
        let store = Self::with_backend(backend, &config)?;

        info!(
            "Opened index store at {:?} ({} indexes)",
            config.path,
            store.inner.read().trie.len()
        );
        Ok(store)
    }

    /// Open (or create) a store at `path` with default settings
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(IndexStoreConfig::with_path(path))
    }
}

impl<B: Backend> IndexStore<B> {
    /// Wrap an already opened backend and load its contents
    pub fn with_backend(backend: B, config: &IndexStoreConfig) -> Result<Self> {
        let store = Self {
            inner: RwLock::new(Inner {
                backend: Some(backend),
                trie: PatternTrie::new(),
                last_report: LoadReport::default(),
            }),
            load_policy: config.load_policy,
        };
        store.load()?;
        Ok(store)
    }

    /// Rebuild the trie from the backend.
    ///
    /// Entries that fail to decode are skipped and reported under
    /// [`LoadPolicy::SkipCorrupt`]; under [`LoadPolicy::Abort`] the first one
    /// fails the load. The new contents replace the cache only on success, so
    /// a failed load leaves the previous trie in place.
    pub fn load(&self) -> Result<LoadReport> {
        let mut inner = self.inner.write();
        let backend = inner.backend.as_ref().ok_or(Error::Closed)?;
        let policy = self.load_policy;

        let mut trie = PatternTrie::new();
        let mut report = LoadReport::default();
        let mut aborted = None;

        let mut visit = |name: &str, bytes: &[u8]| {
            let decoded = validate_name(name)
                .map_err(|e| e.to_string())
                .and_then(|()| codec::decode(name, bytes).map_err(|e| e.to_string()));
            match decoded {
                Ok(record) => {
                    trie.insert(record);
                    report.loaded += 1;
                    ControlFlow::Continue(())
                }
                Err(reason) => match policy {
                    LoadPolicy::SkipCorrupt => {
                        report.corrupt.push(CorruptEntry {
                            name: name.to_string(),
                            reason,
                        });
                        ControlFlow::Continue(())
                    }
                    LoadPolicy::Abort => {
                        aborted = Some(Error::codec(name, reason));
                        ControlFlow::Break(())
                    }
                },
            }
        };

        if let Err(e) = backend.scan(&mut visit) {
            error!("Failed to scan indexes: {}", e);
            return Err(Error::store_io(format!("failed to scan indexes: {e}")));
        }
        if let Some(e) = aborted {
            error!("Index load aborted: {}", e);
            return Err(e);
        }

        if !report.is_clean() {
            warn!(
                "Skipped {} corrupt index entries during load (first: '{}')",
                report.corrupt.len(),
                report.corrupt[0].name
            );
        }
        debug!("Loaded {} indexes", report.loaded);

        inner.trie = trie;
        inner.last_report = report.clone();
        Ok(report)
    }

    /// Persist `record`, then make it visible in the cache.
    ///
    /// Overwrites any record stored under the same name.
    pub fn put(&self, record: &IndexRecord) -> Result<()> {
        let mut inner = self.inner.write();
        let backend = inner.backend.as_ref().ok_or(Error::Closed)?;

        validate_name(&record.name)?;
        let bytes = codec::encode(record).map_err(|e| Error::codec(&record.name, e))?;

        if let Err(e) = backend.put(&record.name, &bytes) {
            error!("Failed to persist index '{}': {}", record.name, e);
            return Err(Error::store_io(format!(
                "failed to persist index '{}': {}",
                record.name, e
            )));
        }

        inner.trie.insert(record.clone());
        debug!("put: {}", record.name);
        Ok(())
    }

    /// Get the record stored under `name`
    pub fn get(&self, name: &str) -> Result<IndexRecord> {
        let inner = self.inner.read();
        if inner.backend.is_none() {
            return Err(Error::Closed);
        }
        inner
            .trie
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(name))
    }

    /// Check whether a record is stored under `name`
    pub fn has(&self, name: &str) -> Result<bool> {
        let inner = self.inner.read();
        if inner.backend.is_none() {
            return Err(Error::Closed);
        }
        Ok(inner.trie.has(name))
    }

    /// Delete the record stored under `name` from the backend, then from the
    /// cache.
    ///
    /// The backend delete is always issued, which also clears entries that
    /// were skipped as corrupt during load. Returns `NotFound` only when
    /// neither the cache nor the backend held the name.
    pub fn delete(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.write();
        let backend = inner.backend.as_ref().ok_or(Error::Closed)?;

        let existed = match backend.delete(name) {
            Ok(existed) => existed,
            Err(e) => {
                error!("Failed to delete index '{}': {}", name, e);
                return Err(Error::store_io(format!(
                    "failed to delete index '{}': {}",
                    name, e
                )));
            }
        };

        let cached = inner.trie.remove(name).is_some();
        if !existed && !cached {
            return Err(Error::not_found(name));
        }
        debug!("delete: {}", name);
        Ok(())
    }

    /// Get every record whose name matches `pattern`
    ///
    /// See [`PatternTrie::filter`] for the pattern rules.
    pub fn filter(&self, pattern: &str) -> Result<Vec<IndexRecord>> {
        let inner = self.inner.read();
        if inner.backend.is_none() {
            return Err(Error::Closed);
        }
        Ok(inner.trie.filter(pattern).into_iter().cloned().collect())
    }

    /// Get every stored record
    pub fn all(&self) -> Result<Vec<IndexRecord>> {
        let inner = self.inner.read();
        if inner.backend.is_none() {
            return Err(Error::Closed);
        }
        Ok(inner.trie.records().into_iter().cloned().collect())
    }

    /// Number of stored records
    pub fn len(&self) -> Result<usize> {
        let inner = self.inner.read();
        if inner.backend.is_none() {
            return Err(Error::Closed);
        }
        Ok(inner.trie.len())
    }

    /// Check if the store holds no records
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Report of the most recent load
    pub fn last_load_report(&self) -> Result<LoadReport> {
        let inner = self.inner.read();
        if inner.backend.is_none() {
            return Err(Error::Closed);
        }
        Ok(inner.last_report.clone())
    }

    /// Release the backend. Every later call returns [`Error::Closed`].
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.write();
        let backend = inner.backend.take().ok_or(Error::Closed)?;
        drop(backend);
        inner.trie.clear();
        info!("Closed index store");
        Ok(())
    }
}
