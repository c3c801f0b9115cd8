use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::Block;

use super::{MAX_BLOCKS_PER_APPEND, PageId, RemoteClient, RemoteError, RemotePage};

/// One page held by [`MemoryRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryPage {
    pub id: PageId,
    pub title: String,
    pub parent: Option<PageId>,
    pub description: Option<String>,
    pub container: bool,
    pub archived: bool,
    pub blocks: Vec<Block>,
}

/// Per-operation call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub create_container: usize,
    pub create_content: usize,
    pub retrieve: usize,
    pub archive: usize,
    pub append: usize,
    pub search: usize,
}

impl CallCounts {
    /// Calls that change remote state.
    pub fn mutations(&self) -> usize {
        self.create_container + self.create_content + self.archive + self.append
    }
}

#[derive(Debug, Default)]
struct Inner {
    pages: BTreeMap<PageId, MemoryPage>,
    order: Vec<PageId>,
    append_failures: VecDeque<RemoteError>,
    archive_after_appends: Option<usize>,
    calls: CallCounts,
}

impl Inner {
    fn live_parent(&self, parent: &PageId) -> Result<(), RemoteError> {
        match self.pages.get(parent) {
            Some(page) if !page.archived => Ok(()),
            _ => Err(RemoteError::NotFound(parent.clone())),
        }
    }

    fn insert(&mut self, page: MemoryPage) -> PageId {
        let id = page.id.clone();
        self.order.push(id.clone());
        self.pages.insert(id.clone(), page);
        id
    }

    fn archive_tree(&mut self, id: &PageId) {
        let mut pending = vec![id.clone()];
        while let Some(current) = pending.pop() {
            if let Some(page) = self.pages.get_mut(&current) {
                page.archived = true;
            }
            pending.extend(
                self.pages
                    .values()
                    .filter(|p| p.parent.as_ref() == Some(&current) && !p.archived)
                    .map(|p| p.id.clone()),
            );
        }
    }
}

/// An in-process page store with failure injection, used by tests and dry
/// experiments.
///
/// Archiving a page archives its whole subtree, as hierarchical destinations
/// do.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    inner: Mutex<Inner>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self, id: &PageId) -> Option<MemoryPage> {
        self.inner.lock().pages.get(id).cloned()
    }

    /// Live pages directly under `parent`, in creation order.
    pub fn live_children(&self, parent: &PageId) -> Vec<MemoryPage> {
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .filter_map(|id| inner.pages.get(id))
            .filter(|p| !p.archived && p.parent.as_ref() == Some(parent))
            .cloned()
            .collect()
    }

    /// Live pages carrying `title`, anywhere in the store.
    pub fn live_pages_titled(&self, title: &str) -> Vec<MemoryPage> {
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .filter_map(|id| inner.pages.get(id))
            .filter(|p| !p.archived && p.title == title)
            .cloned()
            .collect()
    }

    pub fn calls(&self) -> CallCounts {
        self.inner.lock().calls
    }

    /// Archive a page as if someone did it through the destination's UI.
    pub fn archive_externally(&self, id: &PageId) {
        self.inner.lock().archive_tree(id);
    }

    /// Remove a page entirely, leaving its id dangling.
    pub fn delete_externally(&self, id: &PageId) {
        self.inner.lock().pages.remove(id);
    }

    /// The next append call fails with `error` before touching any page.
    pub fn fail_next_append(&self, error: RemoteError) {
        self.inner.lock().append_failures.push_back(error);
    }

    /// The next append call finds its target archived, as if someone archived
    /// it between creation and upload.
    pub fn archive_target_on_next_append(&self) {
        self.archive_target_after_appends(0);
    }

    /// Let `successes` append calls through, then archive the target of the
    /// one after.
    pub fn archive_target_after_appends(&self, successes: usize) {
        self.inner.lock().archive_after_appends = Some(successes);
    }
}

#[async_trait]
impl RemoteClient for MemoryRemote {
    async fn create_container_page(
        &self,
        parent: Option<&PageId>,
        title: &str,
        description: Option<&str>,
    ) -> Result<PageId, RemoteError> {
        let mut inner = self.inner.lock();
        inner.calls.create_container += 1;
        if let Some(parent) = parent {
            inner.live_parent(parent)?;
        }
        Ok(inner.insert(MemoryPage {
            id: PageId(Uuid::new_v4().simple().to_string()),
            title: title.to_string(),
            parent: parent.cloned(),
            description: description.map(str::to_string),
            container: true,
            archived: false,
            blocks: Vec::new(),
        }))
    }

    async fn create_content_page(
        &self,
        parent: &PageId,
        title: &str,
    ) -> Result<PageId, RemoteError> {
        let mut inner = self.inner.lock();
        inner.calls.create_content += 1;
        inner.live_parent(parent)?;
        Ok(inner.insert(MemoryPage {
            id: PageId(Uuid::new_v4().simple().to_string()),
            title: title.to_string(),
            parent: Some(parent.clone()),
            description: None,
            container: false,
            archived: false,
            blocks: Vec::new(),
        }))
    }

    async fn retrieve_page(&self, id: &PageId) -> Result<RemotePage, RemoteError> {
        let mut inner = self.inner.lock();
        inner.calls.retrieve += 1;
        let page = inner
            .pages
            .get(id)
            .ok_or_else(|| RemoteError::NotFound(id.clone()))?;
        Ok(RemotePage {
            id: page.id.clone(),
            title: page.title.clone(),
            parent: page.parent.clone(),
            archived: page.archived,
        })
    }

    async fn archive_page(&self, id: &PageId) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        inner.calls.archive += 1;
        if !inner.pages.contains_key(id) {
            return Err(RemoteError::NotFound(id.clone()));
        }
        inner.archive_tree(id);
        Ok(())
    }

    async fn append_blocks(&self, page: &PageId, blocks: &[Block]) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        inner.calls.append += 1;
        if let Some(error) = inner.append_failures.pop_front() {
            return Err(error);
        }
        match inner.archive_after_appends {
            Some(0) => {
                inner.archive_after_appends = None;
                inner.archive_tree(page);
            }
            Some(remaining) => inner.archive_after_appends = Some(remaining - 1),
            None => {}
        }
        if blocks.len() > MAX_BLOCKS_PER_APPEND {
            return Err(RemoteError::Rejected(format!(
                "{} blocks exceeds the limit of {MAX_BLOCKS_PER_APPEND}",
                blocks.len()
            )));
        }
        let target = inner
            .pages
            .get_mut(page)
            .ok_or_else(|| RemoteError::NotFound(page.clone()))?;
        if target.archived {
            return Err(RemoteError::Archived(page.clone()));
        }
        target.blocks.extend_from_slice(blocks);
        Ok(())
    }

    async fn search_page_by_title(
        &self,
        parent: &PageId,
        title: &str,
    ) -> Result<Option<PageId>, RemoteError> {
        let mut inner = self.inner.lock();
        inner.calls.search += 1;
        let found = inner
            .order
            .iter()
            .filter_map(|id| inner.pages.get(id))
            .find(|p| !p.archived && p.parent.as_ref() == Some(parent) && p.title == title)
            .map(|p| p.id.clone());
        Ok(found)
    }
}
