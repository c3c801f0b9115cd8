use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::MediaKind;
use crate::remote::PageId;

/// Current layout version of the state document.
pub const STATE_VERSION: u32 = 1;

/// Whether `key` equals `ancestor` or lies beneath it.
pub fn path_key_covers(ancestor: &str, key: &str) -> bool {
    key == ancestor
        || key
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Remote page mirroring one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub page_id: PageId,
    pub content_hash: String,
    pub title: String,
    pub block_count: usize,
    pub last_synced_at: DateTime<Utc>,
}

/// Container page mirroring one directory level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub path_key: String,
    pub page_id: PageId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_path_key: Option<String>,
}

/// A previously uploaded asset, keyed by its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadCacheEntry {
    pub remote_reference: String,
    pub uploaded_at: DateTime<Utc>,
    pub kind: MediaKind,
    pub size_bytes: u64,
}

/// Outcome counts of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub created: usize,
    pub replaced: usize,
    pub skipped: usize,
    pub failed: usize,
    pub pruned: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastRun {
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub counts: RunCounts,
}

/// Cumulative counters across every run against this corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub runs: u64,
    pub created: u64,
    pub replaced: u64,
    pub skipped: u64,
    pub failed: u64,
    pub pruned: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<LastRun>,
}

impl Statistics {
    pub(crate) fn absorb(&mut self, counts: RunCounts, finished_at: DateTime<Utc>) {
        self.runs += 1;
        self.created += counts.created as u64;
        self.replaced += counts.replaced as u64;
        self.skipped += counts.skipped as u64;
        self.failed += counts.failed as u64;
        self.pruned += counts.pruned as u64;
        self.last_run = Some(LastRun {
            finished_at,
            counts,
        });
    }
}

fn current_version() -> u32 {
    STATE_VERSION
}

/// The serialized form of all sync state for one corpus root.
///
/// Keys this version does not know about are kept in `extra` and written
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_page_id: Option<PageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub files: BTreeMap<String, SyncRecord>,
    #[serde(default)]
    pub hierarchy: BTreeMap<String, HierarchyNode>,
    #[serde(default)]
    pub uploads: BTreeMap<String, UploadCacheEntry>,
    #[serde(default)]
    pub statistics: Statistics,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for StateDocument {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            root_page_id: None,
            last_sync_at: None,
            files: BTreeMap::new(),
            hierarchy: BTreeMap::new(),
            uploads: BTreeMap::new(),
            statistics: Statistics::default(),
            metadata: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }
}
