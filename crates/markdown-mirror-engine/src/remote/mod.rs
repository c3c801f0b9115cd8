//! The boundary to the destination workspace.
//!
//! Concrete HTTP clients live outside this crate; everything here talks to
//! [`RemoteClient`]. Every implementation must report vanished pages as
//! [`RemoteError::NotFound`] or [`RemoteError::Archived`], because the sync
//! core branches on [`RemoteError::is_missing`].

pub mod memory;
pub mod queue;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::Block;

pub use memory::MemoryRemote;
pub use queue::RequestQueue;

/// Largest number of blocks the destination accepts in one append call.
pub const MAX_BLOCKS_PER_APPEND: usize = 100;

/// Opaque identifier of a remote page.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What the destination reports about one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePage {
    pub id: PageId,
    pub title: String,
    pub parent: Option<PageId>,
    pub archived: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("page {0} not found")]
    NotFound(PageId),
    #[error("page {0} is archived")]
    Archived(PageId),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl RemoteError {
    /// The referenced page no longer exists or was archived.
    pub fn is_missing(&self) -> bool {
        matches!(self, RemoteError::NotFound(_) | RemoteError::Archived(_))
    }

    /// The destination refused the payload itself.
    pub fn is_rejected(&self) -> bool {
        matches!(self, RemoteError::Rejected(_))
    }
}

#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Creates a page that mirrors a directory. `parent == None` creates it at
    /// the top of the workspace.
    async fn create_container_page(
        &self,
        parent: Option<&PageId>,
        title: &str,
        description: Option<&str>,
    ) -> Result<PageId, RemoteError>;

    /// Creates an empty page that will mirror one source file.
    async fn create_content_page(&self, parent: &PageId, title: &str)
    -> Result<PageId, RemoteError>;

    async fn retrieve_page(&self, id: &PageId) -> Result<RemotePage, RemoteError>;

    async fn archive_page(&self, id: &PageId) -> Result<(), RemoteError>;

    /// Appends at most [`MAX_BLOCKS_PER_APPEND`] blocks to a page.
    async fn append_blocks(&self, page: &PageId, blocks: &[Block]) -> Result<(), RemoteError>;

    /// Finds a live direct child of `parent` with exactly `title`.
    async fn search_page_by_title(
        &self,
        parent: &PageId,
        title: &str,
    ) -> Result<Option<PageId>, RemoteError>;
}

#[async_trait]
impl<T: RemoteClient + ?Sized> RemoteClient for Arc<T> {
    async fn create_container_page(
        &self,
        parent: Option<&PageId>,
        title: &str,
        description: Option<&str>,
    ) -> Result<PageId, RemoteError> {
        (**self).create_container_page(parent, title, description).await
    }

    async fn create_content_page(
        &self,
        parent: &PageId,
        title: &str,
    ) -> Result<PageId, RemoteError> {
        (**self).create_content_page(parent, title).await
    }

    async fn retrieve_page(&self, id: &PageId) -> Result<RemotePage, RemoteError> {
        (**self).retrieve_page(id).await
    }

    async fn archive_page(&self, id: &PageId) -> Result<(), RemoteError> {
        (**self).archive_page(id).await
    }

    async fn append_blocks(&self, page: &PageId, blocks: &[Block]) -> Result<(), RemoteError> {
        (**self).append_blocks(page, blocks).await
    }

    async fn search_page_by_title(
        &self,
        parent: &PageId,
        title: &str,
    ) -> Result<Option<PageId>, RemoteError> {
        (**self).search_page_by_title(parent, title).await
    }
}

/// Liveness check: the page exists and is not archived.
///
/// Missing pages are `Ok(false)`; any other failure propagates.
pub async fn is_live(remote: &dyn RemoteClient, id: &PageId) -> Result<bool, RemoteError> {
    match remote.retrieve_page(id).await {
        Ok(page) => Ok(!page.archived),
        Err(e) if e.is_missing() => Ok(false),
        Err(e) => Err(e),
    }
}
