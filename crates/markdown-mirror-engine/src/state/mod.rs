//! Durable sync state.
//!
//! [`StateRepository`] owns the single [`StateDocument`] for a corpus and
//! flushes it to disk after every mutation. All mutation goes through its
//! methods; `&mut self` is the write lock.

pub mod document;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::remote::PageId;

pub use document::{
    HierarchyNode, LastRun, RunCounts, STATE_VERSION, StateDocument, Statistics, SyncRecord,
    UploadCacheEntry, path_key_covers,
};

/// Upload cache entries older than this are treated as absent.
pub const UPLOAD_CACHE_TTL_SECS: i64 = 10 * 60;

/// Metadata key holding the id of a root page this tool created itself.
pub const AUTO_ROOT_KEY: &str = "auto_root_page_id";

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to access state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("state file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("state file version {found} is newer than supported version {STATE_VERSION}")]
    UnsupportedVersion { found: u32 },
}

#[derive(Debug)]
pub struct StateRepository {
    path: Option<PathBuf>,
    doc: StateDocument,
}

impl StateRepository {
    /// Load the state document at `path`. A missing file is an empty state.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StateError> {
        let path = path.into();
        let doc = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<StateDocument>(&raw).map_err(|source| {
                StateError::Corrupt {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No state file at {}, starting fresh", path.display());
                StateDocument::default()
            }
            Err(source) => return Err(StateError::Io { path, source }),
        };
        if doc.version > STATE_VERSION {
            return Err(StateError::UnsupportedVersion { found: doc.version });
        }
        Ok(Self {
            path: Some(path),
            doc,
        })
    }

    /// A repository that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            doc: StateDocument::default(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn document(&self) -> &StateDocument {
        &self.doc
    }

    fn flush(&self) -> Result<(), StateError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |source| StateError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(&self.doc)?;
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)
    }

    // Root

    pub fn root_page_id(&self) -> Option<&PageId> {
        self.doc.root_page_id.as_ref()
    }

    /// Point the tree at `root`. When the root changes, every container entry
    /// is dropped and every file record is marked stale so the next pass
    /// rebuilds the mirror under the new root.
    pub fn set_root(&mut self, root: PageId) -> Result<(), StateError> {
        if self.doc.root_page_id.as_ref() == Some(&root) {
            return Ok(());
        }
        if let Some(previous) = self.doc.root_page_id.replace(root) {
            log::info!("Root page changed from {previous}, rebuilding hierarchy");
            self.doc.hierarchy.clear();
            for record in self.doc.files.values_mut() {
                record.content_hash.clear();
            }
        }
        self.flush()
    }

    // File records

    pub fn record(&self, file_key: &str) -> Option<&SyncRecord> {
        self.doc.files.get(file_key)
    }

    pub fn tracked_files(&self) -> impl Iterator<Item = &str> {
        self.doc.files.keys().map(String::as_str)
    }

    pub fn record_sync(&mut self, file_key: &str, record: SyncRecord) -> Result<(), StateError> {
        self.doc.last_sync_at = Some(record.last_synced_at);
        self.doc.files.insert(file_key.to_string(), record);
        self.flush()
    }

    /// Detach a file from its remote page.
    pub fn forget_file(&mut self, file_key: &str) -> Result<Option<SyncRecord>, StateError> {
        let removed = self.doc.files.remove(file_key);
        if removed.is_some() {
            self.flush()?;
        }
        Ok(removed)
    }

    /// Drop records for files not in `present`, returning the removed keys.
    pub fn prune_missing(&mut self, present: &BTreeSet<String>) -> Result<Vec<String>, StateError> {
        let orphans: Vec<String> = self
            .doc
            .files
            .keys()
            .filter(|k| !present.contains(*k))
            .cloned()
            .collect();
        if orphans.is_empty() {
            return Ok(orphans);
        }
        for key in &orphans {
            self.doc.files.remove(key);
        }
        self.flush()?;
        Ok(orphans)
    }

    // Hierarchy

    pub fn hierarchy_entry(&self, path_key: &str) -> Option<&HierarchyNode> {
        self.doc.hierarchy.get(path_key)
    }

    pub fn hierarchy_entries(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.doc.hierarchy.values()
    }

    pub fn record_hierarchy_entry(&mut self, node: HierarchyNode) -> Result<(), StateError> {
        self.doc.hierarchy.insert(node.path_key.clone(), node);
        self.flush()
    }

    /// Evict `path_key` and every entry nested under it, returning the evicted
    /// keys.
    pub fn invalidate_hierarchy_entry(
        &mut self,
        path_key: &str,
    ) -> Result<Vec<String>, StateError> {
        let evicted: Vec<String> = self
            .doc
            .hierarchy
            .values()
            .filter(|node| path_key_covers(path_key, &node.path_key))
            .map(|node| node.path_key.clone())
            .collect();
        if evicted.is_empty() {
            return Ok(evicted);
        }
        for key in &evicted {
            self.doc.hierarchy.remove(key);
        }
        self.flush()?;
        Ok(evicted)
    }

    // Upload cache

    /// Look up a cached upload, purging it if it has outlived the TTL.
    pub fn cached_upload(
        &mut self,
        content_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UploadCacheEntry>, StateError> {
        let Some(entry) = self.doc.uploads.get(content_hash) else {
            return Ok(None);
        };
        if (now - entry.uploaded_at).num_seconds() < UPLOAD_CACHE_TTL_SECS {
            return Ok(Some(entry.clone()));
        }
        log::debug!("Upload cache entry {content_hash} expired");
        self.doc.uploads.remove(content_hash);
        self.flush()?;
        Ok(None)
    }

    pub fn record_upload(
        &mut self,
        content_hash: &str,
        entry: UploadCacheEntry,
    ) -> Result<(), StateError> {
        self.doc.uploads.insert(content_hash.to_string(), entry);
        self.flush()
    }

    // Metadata and statistics

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.doc.metadata.get(key).map(String::as_str)
    }

    pub fn set_metadata(&mut self, key: &str, value: impl Into<String>) -> Result<(), StateError> {
        self.doc.metadata.insert(key.to_string(), value.into());
        self.flush()
    }

    pub fn statistics(&self) -> &Statistics {
        &self.doc.statistics
    }

    pub fn record_run(
        &mut self,
        counts: RunCounts,
        finished_at: DateTime<Utc>,
    ) -> Result<(), StateError> {
        self.doc.statistics.absorb(counts, finished_at);
        self.doc.last_sync_at = Some(finished_at);
        self.flush()
    }
}
