//! Maps a file's directory path onto a chain of remote container pages.
//!
//! Durable entries are optimistic: an entry found in state is checked for
//! liveness before anything is written under it, and a stale entry is evicted
//! (together with everything nested beneath it) and rebuilt. Entries checked
//! or created during the current run are trusted from the in-memory cache.

pub mod descriptor;
pub mod title;

use std::collections::HashMap;

use relative_path::RelativePathBuf;

use crate::error::SyncError;
use crate::models::SourceFile;
use crate::remote::{PageId, RemoteClient, RemoteError, is_live};
use crate::state::{AUTO_ROOT_KEY, HierarchyNode, StateRepository, path_key_covers};

pub use descriptor::{CategoryFileLoader, DescriptorLoader, DirectoryDescriptor, NoDescriptors};
pub use title::format_segment_title;

/// Prefix of ids handed out in dry-run mode in place of created pages.
pub const PLACEHOLDER_PREFIX: &str = "dry-run:";

pub fn is_placeholder(id: &PageId) -> bool {
    id.as_str().starts_with(PLACEHOLDER_PREFIX)
}

#[derive(Debug, Clone)]
pub struct HierarchyOptions {
    /// Put every content page directly under the root.
    pub flat: bool,
    /// Leading directory segment left out of path keys and the remote tree.
    pub skip_segment: Option<String>,
    /// Title for an auto-created root page.
    pub root_title: String,
    /// Skip remote mutations and state writes; hand out placeholder ids.
    pub dry_run: bool,
}

impl Default for HierarchyOptions {
    fn default() -> Self {
        Self {
            flat: false,
            skip_segment: Some("docs".to_string()),
            root_title: "Documentation".to_string(),
            dry_run: false,
        }
    }
}

/// One directory level of a file's container chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLevel {
    pub path_key: String,
    pub parent_path_key: Option<String>,
    /// Directory on disk, relative to the corpus root, used for descriptors.
    pub directory: RelativePathBuf,
    pub segment: String,
}

pub struct HierarchyResolver {
    options: HierarchyOptions,
    descriptors: Box<dyn DescriptorLoader>,
    cache: HashMap<String, PageId>,
}

impl HierarchyResolver {
    pub fn new(options: HierarchyOptions, descriptors: Box<dyn DescriptorLoader>) -> Self {
        Self {
            options,
            descriptors,
            cache: HashMap::new(),
        }
    }

    pub fn options(&self) -> &HierarchyOptions {
        &self.options
    }

    /// The directory levels `file` needs, outermost first. Empty in flat mode.
    pub fn chain(&self, file: &SourceFile) -> Vec<ChainLevel> {
        if self.options.flat {
            return Vec::new();
        }
        let segments = file.directory_segments();
        let mut directory = RelativePathBuf::new();
        let mut keys: Vec<String> = Vec::new();
        let mut levels = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            directory.push(segment);
            if i == 0 && self.options.skip_segment.as_deref() == Some(*segment) {
                continue;
            }
            let parent_path_key = (!keys.is_empty()).then(|| keys.join("/"));
            keys.push(segment.to_string());
            levels.push(ChainLevel {
                path_key: keys.join("/"),
                parent_path_key,
                directory: directory.clone(),
                segment: segment.to_string(),
            });
        }
        levels
    }

    /// Title and description a container for `level` gets.
    pub fn container_title(&self, level: &ChainLevel) -> (String, Option<String>) {
        let descriptor = self.descriptors.load(&level.directory);
        let title = descriptor
            .label
            .unwrap_or_else(|| format_segment_title(&level.segment));
        (title, descriptor.description)
    }

    /// Sort key placing directories by descriptor position, then by name.
    pub fn position_key(&self, file: &SourceFile) -> Vec<(f64, String)> {
        let mut directory = RelativePathBuf::new();
        file.directory_segments()
            .into_iter()
            .map(|segment| {
                directory.push(segment);
                let position = self.descriptors.load(&directory).position;
                (position.unwrap_or(f64::MAX), segment.to_string())
            })
            .collect()
    }

    /// Resolve (creating as needed) the container `file` belongs in.
    pub async fn resolve(
        &mut self,
        remote: &dyn RemoteClient,
        state: &mut StateRepository,
        file: &SourceFile,
        root: &PageId,
    ) -> Result<PageId, SyncError> {
        let mut parent = root.clone();
        for level in self.chain(file) {
            parent = self.resolve_level(remote, state, &level, &parent).await?;
        }
        Ok(parent)
    }

    async fn resolve_level(
        &mut self,
        remote: &dyn RemoteClient,
        state: &mut StateRepository,
        level: &ChainLevel,
        parent: &PageId,
    ) -> Result<PageId, SyncError> {
        if let Some(id) = self.cache.get(&level.path_key) {
            return Ok(id.clone());
        }

        // Everything below a placeholder is new as well.
        if !is_placeholder(parent)
            && let Some(node) = state.hierarchy_entry(&level.path_key).cloned()
        {
            if self.entry_is_valid(remote, &node, parent).await? {
                log::debug!("Reusing container {} for {}", node.page_id, node.path_key);
                self.cache.insert(level.path_key.clone(), node.page_id.clone());
                return Ok(node.page_id);
            }
            log::warn!(
                "Container {} for '{}' is stale, rebuilding",
                node.page_id,
                node.path_key
            );
            self.evict(state, &level.path_key)?;
        }

        let (title, description) = self.container_title(level);
        let id = if is_placeholder(parent) {
            placeholder(&level.path_key)
        } else if let Some(existing) = remote.search_page_by_title(parent, &title).await? {
            log::debug!("Adopting existing container '{title}' ({existing})");
            existing
        } else if self.options.dry_run {
            placeholder(&level.path_key)
        } else {
            log::info!("Creating container '{title}' for {}", level.path_key);
            remote
                .create_container_page(Some(parent), &title, description.as_deref())
                .await?
        };

        if !self.options.dry_run {
            state.record_hierarchy_entry(HierarchyNode {
                path_key: level.path_key.clone(),
                page_id: id.clone(),
                title,
                parent_path_key: level.parent_path_key.clone(),
            })?;
        }
        self.cache.insert(level.path_key.clone(), id.clone());
        Ok(id)
    }

    /// Live, and still a child of the container we expect it under.
    async fn entry_is_valid(
        &self,
        remote: &dyn RemoteClient,
        node: &HierarchyNode,
        parent: &PageId,
    ) -> Result<bool, RemoteError> {
        match remote.retrieve_page(&node.page_id).await {
            Ok(page) => Ok(!page.archived && page.parent.as_ref() == Some(parent)),
            Err(e) if e.is_missing() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn evict(&mut self, state: &mut StateRepository, path_key: &str) -> Result<(), SyncError> {
        self.cache.retain(|key, _| !path_key_covers(path_key, key));
        if !self.options.dry_run {
            state.invalidate_hierarchy_entry(path_key)?;
        }
        Ok(())
    }

    /// Forget the whole container chain of `file` so the next
    /// [`resolve`](Self::resolve) rebuilds it from the root down.
    pub fn invalidate(
        &mut self,
        state: &mut StateRepository,
        file: &SourceFile,
    ) -> Result<(), SyncError> {
        if let Some(top) = self.chain(file).first() {
            log::warn!("Invalidating container chain from '{}'", top.path_key);
            self.evict(state, &top.path_key)?;
        }
        Ok(())
    }

    /// Establish the root container.
    ///
    /// A configured root must be live. Without one, a root is created on first
    /// use, remembered in state metadata, and recreated if it later vanishes.
    pub async fn resolve_root(
        &mut self,
        remote: &dyn RemoteClient,
        state: &mut StateRepository,
        configured: Option<&PageId>,
    ) -> Result<PageId, SyncError> {
        let root = match configured {
            Some(id) => {
                match is_live(remote, id).await {
                    Ok(true) => {}
                    Ok(false) => {
                        return Err(SyncError::ConfigurationInvalid(format!(
                            "root page {id} is missing or archived"
                        )));
                    }
                    Err(RemoteError::Unauthorized(reason)) => {
                        return Err(SyncError::ConfigurationInvalid(format!(
                            "credentials rejected: {reason}"
                        )));
                    }
                    Err(e) => return Err(e.into()),
                }
                id.clone()
            }
            None => self.resolve_auto_root(remote, state).await?,
        };

        if !self.options.dry_run {
            state.set_root(root.clone())?;
        }
        Ok(root)
    }

    async fn resolve_auto_root(
        &mut self,
        remote: &dyn RemoteClient,
        state: &mut StateRepository,
    ) -> Result<PageId, SyncError> {
        if let Some(existing) = state.metadata(AUTO_ROOT_KEY).map(PageId::from) {
            if is_live(remote, &existing).await? {
                return Ok(existing);
            }
            log::warn!("Auto-created root {existing} has vanished, recreating");
        }
        if self.options.dry_run {
            return Ok(placeholder("root"));
        }
        let title = self.options.root_title.clone();
        log::info!("Creating root page '{title}'");
        let root = remote.create_container_page(None, &title, None).await?;
        state.set_metadata(AUTO_ROOT_KEY, root.as_str())?;
        Ok(root)
    }
}

fn placeholder(path_key: &str) -> PageId {
    PageId::new(format!("{PLACEHOLDER_PREFIX}{path_key}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryRemote;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn file(path: &str) -> SourceFile {
        SourceFile::from_relative_str(Path::new("/corpus"), path)
    }

    fn resolver(options: HierarchyOptions) -> HierarchyResolver {
        HierarchyResolver::new(options, Box::new(NoDescriptors))
    }

    async fn setup() -> (MemoryRemote, StateRepository, PageId) {
        let remote = MemoryRemote::new();
        let root = remote.create_container_page(None, "Docs", None).await.unwrap();
        let mut state = StateRepository::in_memory();
        state.set_root(root.clone()).unwrap();
        (remote, state, root)
    }

    #[test]
    fn chain_skips_leading_segment() {
        let r = resolver(HierarchyOptions::default());
        let keys: Vec<_> = r
            .chain(&file("docs/api/v1/intro.md"))
            .into_iter()
            .map(|l| (l.path_key, l.parent_path_key, l.directory.to_string()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("api".to_string(), None, "docs/api".to_string()),
                ("api/v1".to_string(), Some("api".to_string()), "docs/api/v1".to_string()),
            ]
        );
    }

    #[test]
    fn chain_keeps_skip_segment_when_not_leading() {
        let r = resolver(HierarchyOptions::default());
        let keys: Vec<_> = r
            .chain(&file("guide/docs/a.md"))
            .into_iter()
            .map(|l| l.path_key)
            .collect();
        assert_eq!(keys, vec!["guide", "guide/docs"]);
    }

    #[tokio::test]
    async fn flat_mode_returns_root() {
        let (remote, mut state, root) = setup().await;
        let mut r = resolver(HierarchyOptions {
            flat: true,
            ..HierarchyOptions::default()
        });
        let parent = r.resolve(&remote, &mut state, &file("a/b/c.md"), &root).await.unwrap();
        assert_eq!(parent, root);
        assert_eq!(remote.calls().create_container, 1);
    }

    #[tokio::test]
    async fn creates_chain_once_and_reuses_it() {
        let (remote, mut state, root) = setup().await;
        let mut r = resolver(HierarchyOptions::default());

        let first = r
            .resolve(&remote, &mut state, &file("getting-started/install/linux.md"), &root)
            .await
            .unwrap();
        let second = r
            .resolve(&remote, &mut state, &file("getting-started/install/mac.md"), &root)
            .await
            .unwrap();

        assert_eq!(first, second);
        let top = remote.live_children(&root);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].title, "Getting Started");
        assert_eq!(remote.page(&first).unwrap().title, "Install");
        assert_eq!(state.hierarchy_entry("getting-started/install").unwrap().page_id, first);
    }

    #[tokio::test]
    async fn heals_externally_archived_container() {
        let (remote, mut state, root) = setup().await;
        let mut r = resolver(HierarchyOptions::default());
        let old = r.resolve(&remote, &mut state, &file("guide/a.md"), &root).await.unwrap();

        remote.archive_externally(&old);

        // A fresh run starts with an empty cache.
        let mut r = resolver(HierarchyOptions::default());
        let new = r.resolve(&remote, &mut state, &file("guide/a.md"), &root).await.unwrap();

        assert_ne!(old, new);
        assert!(!remote.page(&new).unwrap().archived);
        assert_eq!(state.hierarchy_entry("guide").unwrap().page_id, new);
    }

    #[tokio::test]
    async fn stale_ancestor_evicts_descendants() {
        let (remote, mut state, root) = setup().await;
        let mut r = resolver(HierarchyOptions::default());
        let leaf = r.resolve(&remote, &mut state, &file("a/b/x.md"), &root).await.unwrap();
        let top = state.hierarchy_entry("a").unwrap().page_id.clone();

        remote.delete_externally(&top);

        let mut r = resolver(HierarchyOptions::default());
        let new_leaf = r.resolve(&remote, &mut state, &file("a/b/x.md"), &root).await.unwrap();

        assert_ne!(leaf, new_leaf);
        let new_top = state.hierarchy_entry("a").unwrap().page_id.clone();
        assert_eq!(remote.page(&new_leaf).unwrap().parent, Some(new_top));
    }

    #[tokio::test]
    async fn adopts_existing_container_with_same_title() {
        let (remote, mut state, root) = setup().await;
        let existing = remote
            .create_container_page(Some(&root), "Guide", None)
            .await
            .unwrap();
        let mut r = resolver(HierarchyOptions::default());

        let parent = r.resolve(&remote, &mut state, &file("guide/a.md"), &root).await.unwrap();

        assert_eq!(parent, existing);
        assert_eq!(remote.calls().create_container, 2);
    }

    #[tokio::test]
    async fn dry_run_creates_nothing() {
        let (remote, mut state, root) = setup().await;
        let mut r = resolver(HierarchyOptions {
            dry_run: true,
            ..HierarchyOptions::default()
        });

        let parent = r.resolve(&remote, &mut state, &file("a/b/x.md"), &root).await.unwrap();

        assert_eq!(parent, PageId::from("dry-run:a/b"));
        assert_eq!(remote.calls().mutations(), 1);
        assert!(state.hierarchy_entry("a").is_none());
        // The search under the placeholder is skipped.
        assert_eq!(remote.calls().search, 1);
    }

    #[tokio::test]
    async fn invalidate_forces_rebuild() {
        let (remote, mut state, root) = setup().await;
        let mut r = resolver(HierarchyOptions::default());
        let f = file("guide/a.md");
        r.resolve(&remote, &mut state, &f, &root).await.unwrap();

        r.invalidate(&mut state, &f).unwrap();

        assert!(state.hierarchy_entry("guide").is_none());
        let retrieves = remote.calls().retrieve;
        r.resolve(&remote, &mut state, &f, &root).await.unwrap();
        // Re-resolution searches and adopts the live container.
        assert_eq!(remote.calls().retrieve, retrieves);
        assert_eq!(remote.live_children(&root).len(), 1);
    }

    #[tokio::test]
    async fn auto_root_is_created_and_recreated() {
        let remote = MemoryRemote::new();
        let mut state = StateRepository::in_memory();
        let mut r = resolver(HierarchyOptions::default());

        let first = r.resolve_root(&remote, &mut state, None).await.unwrap();
        assert_eq!(state.metadata(AUTO_ROOT_KEY), Some(first.as_str()));
        assert_eq!(remote.page(&first).unwrap().title, "Documentation");

        let again = r.resolve_root(&remote, &mut state, None).await.unwrap();
        assert_eq!(again, first);

        remote.archive_externally(&first);
        let second = r.resolve_root(&remote, &mut state, None).await.unwrap();
        assert_ne!(second, first);
        assert_eq!(state.root_page_id(), Some(&second));
    }

    #[tokio::test]
    async fn missing_configured_root_is_fatal() {
        let remote = MemoryRemote::new();
        let mut state = StateRepository::in_memory();
        let mut r = resolver(HierarchyOptions::default());

        let err = r
            .resolve_root(&remote, &mut state, Some(&PageId::from("nope")))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::ConfigurationInvalid(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn descriptor_label_wins() {
        struct Fixed;
        impl DescriptorLoader for Fixed {
            fn load(&self, _directory: &relative_path::RelativePath) -> DirectoryDescriptor {
                DirectoryDescriptor {
                    label: Some("Reference".to_string()),
                    description: Some("All of it".to_string()),
                    position: Some(1.0),
                }
            }
        }
        let r = HierarchyResolver::new(HierarchyOptions::default(), Box::new(Fixed));
        let chain = r.chain(&file("api/x.md"));
        assert_eq!(
            r.container_title(&chain[0]),
            ("Reference".to_string(), Some("All of it".to_string()))
        );
    }
}
