//! # Sync orchestration
//!
//! Drives each source file through one pass:
//!
//! 1. hash the file and compare against its [`SyncRecord`]; unchanged files
//!    are skipped
//! 2. parse, convert and process assets
//! 3. resolve the container chain
//! 4. archive the previous page if it is still live, then create a new one
//! 5. append blocks in batches, recreating the page once if it vanishes
//! 6. persist the new record
//!
//! Files are processed strictly one after another. A failure in any step is
//! recorded against that file and the run continues; only configuration and
//! state-storage errors stop the run.

pub mod assets;
pub mod hash;
pub mod outcome;
pub mod status;

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use glob::Pattern;

use crate::convert::BlockConverter;
use crate::error::SyncError;
use crate::hierarchy::{
    DescriptorLoader, HierarchyOptions, HierarchyResolver, format_segment_title,
};
use crate::io::{IoError, parse_source, scan_markdown_files};
use crate::models::{Block, MediaKind, RichText, SourceFile, TextSpan};
use crate::parsing::inline::{is_absolute_url, kinds::Image};
use crate::remote::{
    MAX_BLOCKS_PER_APPEND, PageId, RemoteClient, RemoteError, RequestQueue, is_live,
};
use crate::state::{StateRepository, SyncRecord, UploadCacheEntry};

pub use assets::{AssetProcessor, AssetRequest, NoAssets, RemoteAsset};
pub use hash::content_hash;
pub use outcome::{FileOutcome, FileReport, PlannedAction, SyncSummary};
pub use status::{CorpusStatus, FileStatus, corpus_status};

/// Request budget of the destination API.
pub const DEFAULT_REQUESTS_PER_SECOND: f64 = 3.0;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Existing root page. When absent a root is created and remembered.
    pub root_page_id: Option<PageId>,
    pub root_title: String,
    pub flat: bool,
    pub skip_segment: Option<String>,
    /// Blocks per append call, clamped to `1..=MAX_BLOCKS_PER_APPEND`.
    pub batch_size: usize,
    /// Spacing of remote calls. Zero or less disables the delay but calls
    /// are still issued one at a time.
    pub requests_per_second: f64,
    /// Re-sync files even when their hash is unchanged.
    pub force: bool,
    /// Perform reads only and report what would happen.
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        let hierarchy = HierarchyOptions::default();
        Self {
            root_page_id: None,
            root_title: hierarchy.root_title,
            flat: hierarchy.flat,
            skip_segment: hierarchy.skip_segment,
            batch_size: MAX_BLOCKS_PER_APPEND,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            force: false,
            dry_run: false,
        }
    }
}

impl SyncOptions {
    fn hierarchy(&self) -> HierarchyOptions {
        HierarchyOptions {
            flat: self.flat,
            skip_segment: self.skip_segment.clone(),
            root_title: self.root_title.clone(),
            dry_run: self.dry_run,
        }
    }
}

pub struct SyncOrchestrator {
    remote: Arc<dyn RemoteClient>,
    state: StateRepository,
    resolver: HierarchyResolver,
    converter: BlockConverter,
    assets: Box<dyn AssetProcessor>,
    options: SyncOptions,
    root: Option<PageId>,
}

impl SyncOrchestrator {
    /// Every call the orchestrator and its resolver make to `remote` goes
    /// through one [`RequestQueue`] paced by `options.requests_per_second`.
    pub fn new(
        remote: Arc<dyn RemoteClient>,
        state: StateRepository,
        descriptors: Box<dyn DescriptorLoader>,
        mut options: SyncOptions,
    ) -> Self {
        options.batch_size = options.batch_size.clamp(1, MAX_BLOCKS_PER_APPEND);
        let remote: Arc<dyn RemoteClient> =
            Arc::new(RequestQueue::per_second(remote, options.requests_per_second));
        Self {
            remote,
            state,
            resolver: HierarchyResolver::new(options.hierarchy(), descriptors),
            converter: BlockConverter::new(),
            assets: Box::new(NoAssets),
            options,
            root: None,
        }
    }

    pub fn with_assets(mut self, assets: Box<dyn AssetProcessor>) -> Self {
        self.assets = assets;
        self
    }

    pub fn state(&self) -> &StateRepository {
        &self.state
    }

    pub fn into_state(self) -> StateRepository {
        self.state
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Establish the root page. Errors here are fatal for the run.
    pub async fn prepare(&mut self) -> Result<PageId, SyncError> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        let root = self
            .resolver
            .resolve_root(
                self.remote.as_ref(),
                &mut self.state,
                self.options.root_page_id.as_ref(),
            )
            .await?;
        log::info!("Syncing under root page {root}");
        self.root = Some(root.clone());
        Ok(root)
    }

    /// Scan `docs_root` and sync every content file found.
    pub async fn sync_corpus(
        &mut self,
        docs_root: &Path,
        excludes: &[Pattern],
    ) -> Result<SyncSummary, SyncError> {
        let files = scan_markdown_files(docs_root, excludes)?;
        log::info!("Found {} content files under {}", files.len(), docs_root.display());
        self.sync_files(files).await
    }

    /// Sync `files` as the complete corpus: afterwards, records of files not
    /// in the list are pruned.
    pub async fn sync_files(&mut self, files: Vec<SourceFile>) -> Result<SyncSummary, SyncError> {
        self.prepare().await?;

        let mut ordered: Vec<_> = files
            .into_iter()
            .map(|f| (self.resolver.position_key(&f), f))
            .collect();
        ordered.sort_by(|(a, fa), (b, fb)| compare_positions(a, b).then_with(|| fa.cmp(fb)));
        let files: Vec<SourceFile> = ordered.into_iter().map(|(_, f)| f).collect();

        let mut summary = SyncSummary::default();
        for file in &files {
            let outcome = self.sync_file(file).await?;
            summary.reports.push(FileReport {
                file: file.key().to_string(),
                outcome,
            });
        }

        let present: BTreeSet<String> = files.iter().map(|f| f.key().to_string()).collect();
        if self.options.dry_run {
            summary.pruned = self
                .state
                .tracked_files()
                .filter(|key| !present.contains(*key))
                .map(str::to_string)
                .collect();
        } else {
            summary.pruned = self.state.prune_missing(&present)?;
            for key in &summary.pruned {
                log::info!("Pruned record for deleted file {key}");
            }
            self.state.record_run(summary.counts(), Utc::now())?;
        }

        log::info!("Sync finished: {}", summary.counts_line());
        Ok(summary)
    }

    /// Sync one file. File-scoped failures come back as
    /// [`FileOutcome::Failed`]; only fatal errors are returned as `Err`.
    pub async fn sync_file(&mut self, file: &SourceFile) -> Result<FileOutcome, SyncError> {
        match self.process_file(file).await {
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                log::error!("Failed to sync {}: {e}", file.key());
                Ok(FileOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn process_file(&mut self, file: &SourceFile) -> Result<FileOutcome, SyncError> {
        let root = self.prepare().await?;
        let key = file.key();

        let bytes = tokio::fs::read(file.absolute_path())
            .await
            .map_err(IoError::Io)?;
        let hash = content_hash(&bytes);
        let existing = self.state.record(key).cloned();
        if !self.options.force
            && let Some(record) = &existing
            && record.content_hash == hash
        {
            log::debug!("{key} is up to date");
            return Ok(FileOutcome::Skipped);
        }

        let text = decode_source(key, &bytes);
        let parsed = parse_source(&text);
        let title = parsed.title_or(&format_segment_title(file.stem()));
        let converted = self.converter.convert_document(&parsed.body);
        if !converted.degradations.is_empty() {
            log::warn!(
                "{key}: {} section(s) fell back to plain text",
                converted.degradations.len()
            );
        }
        let blocks = self.process_assets(file, converted.blocks).await?;

        let parent = self
            .resolver
            .resolve(self.remote.as_ref(), &mut self.state, file, &root)
            .await?;

        if self.options.dry_run {
            let action = if existing.is_some() {
                PlannedAction::Replace
            } else {
                PlannedAction::Create
            };
            log::info!("Would {action:?} {key} ({} blocks)", blocks.len());
            return Ok(FileOutcome::Planned(action));
        }

        let previous = match existing {
            Some(record) => {
                self.retire(&record.page_id).await?;
                self.state.forget_file(key)?;
                Some(record.page_id)
            }
            None => None,
        };

        let (parent, page) = self.create_page(file, parent, &root, &title).await?;
        let mut created = vec![page.clone()];
        let uploaded = self
            .upload_blocks(page, &parent, &title, &blocks, &mut created)
            .await;
        let page = match uploaded {
            Ok(page) => page,
            Err(e) => {
                self.discard(&created).await;
                return Err(e);
            }
        };
        self.discard(&created[..created.len() - 1]).await;

        let recorded = self.state.record_sync(
            key,
            SyncRecord {
                page_id: page.clone(),
                content_hash: hash,
                title,
                block_count: blocks.len(),
                last_synced_at: Utc::now(),
            },
        );
        if let Err(e) = recorded {
            self.discard(&[page]).await;
            return Err(e.into());
        }

        Ok(match previous {
            Some(previous) => {
                log::info!("Replaced {key} ({previous} -> {page})");
                FileOutcome::Replaced {
                    page_id: page,
                    previous,
                }
            }
            None => {
                log::info!("Created {key} ({page})");
                FileOutcome::Created { page_id: page }
            }
        })
    }

    /// Archive a superseded page if it is still live.
    async fn retire(&self, page: &PageId) -> Result<(), SyncError> {
        if !is_live(self.remote.as_ref(), page).await? {
            log::debug!("Previous page {page} already gone");
            return Ok(());
        }
        match self.remote.archive_page(page).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_missing() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Archive pages created during a pass that will not be recorded, so
    /// nothing untracked stays live. Pages already gone are ignored.
    async fn discard(&self, pages: &[PageId]) {
        for page in pages {
            match self.remote.archive_page(page).await {
                Ok(()) => log::debug!("Archived abandoned page {page}"),
                Err(e) if e.is_missing() => {}
                Err(e) => log::warn!("Could not archive abandoned page {page}: {e}"),
            }
        }
    }

    /// Create the content page, rebuilding the container chain once if the
    /// parent turns out to be gone.
    async fn create_page(
        &mut self,
        file: &SourceFile,
        parent: PageId,
        root: &PageId,
        title: &str,
    ) -> Result<(PageId, PageId), SyncError> {
        match self.remote.create_content_page(&parent, title).await {
            Ok(page) => return Ok((parent, page)),
            Err(e) if e.is_missing() => {
                log::warn!("Container {parent} for {} vanished, rebuilding", file.key());
            }
            Err(e) => return Err(e.into()),
        }

        self.resolver.invalidate(&mut self.state, file)?;
        let parent = self
            .resolver
            .resolve(self.remote.as_ref(), &mut self.state, file, root)
            .await?;
        match self.remote.create_content_page(&parent, title).await {
            Ok(page) => Ok((parent, page)),
            Err(e) if e.is_missing() => Err(SyncError::HierarchyStale {
                path_key: self
                    .resolver
                    .chain(file)
                    .last()
                    .map(|level| level.path_key.clone())
                    .unwrap_or_default(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Append `blocks` in batches. If the page disappears mid-upload a
    /// replacement is created once under the same parent, the batches already
    /// sent are replayed into it and the failed batch is retried. Every page
    /// created here is pushed onto `created`.
    async fn upload_blocks(
        &self,
        mut page: PageId,
        parent: &PageId,
        title: &str,
        blocks: &[Block],
        created: &mut Vec<PageId>,
    ) -> Result<PageId, SyncError> {
        let batches: Vec<&[Block]> = blocks.chunks(self.options.batch_size).collect();
        let mut recreated = false;
        let mut next = 0;
        while next < batches.len() {
            match self.remote.append_blocks(&page, batches[next]).await {
                Ok(()) => {
                    log::debug!("Appended batch {}/{} to {page}", next + 1, batches.len());
                    next += 1;
                }
                Err(e) if e.is_missing() && !recreated => {
                    recreated = true;
                    log::warn!("Destination {page} lost during upload ({e}), recreating");
                    let replacement = self.remote.create_content_page(parent, title).await?;
                    created.push(replacement.clone());
                    for batch in &batches[..next] {
                        if let Err(e) = self.remote.append_blocks(&replacement, batch).await {
                            return Err(lost_or(e, replacement));
                        }
                    }
                    page = replacement;
                }
                Err(e) => return Err(lost_or(e, page)),
            }
        }
        Ok(page)
    }

    async fn process_assets(
        &mut self,
        file: &SourceFile,
        blocks: Vec<Block>,
    ) -> Result<Vec<Block>, SyncError> {
        if self.options.dry_run {
            return Ok(blocks);
        }
        let mut processed = Vec::with_capacity(blocks.len());
        for block in blocks {
            let block = match block {
                Block::MediaRef {
                    kind,
                    locator,
                    caption,
                } if !is_absolute_url(&locator) => {
                    self.upload_media(file, kind, locator, caption).await?
                }
                Block::CodeBlock {
                    language,
                    code,
                    caption,
                } if assets::is_diagram_language(&language) => {
                    self.render_diagram(language, code, caption).await?
                }
                Block::Paragraph { text } => {
                    processed.extend(self.split_inline_images(file, text).await?);
                    continue;
                }
                Block::ListItem {
                    kind,
                    checked,
                    text,
                } => Block::ListItem {
                    kind,
                    checked,
                    text: self.link_inline_images(file, text).await?,
                },
                Block::Quote { text } => Block::Quote {
                    text: self.link_inline_images(file, text).await?,
                },
                other => other,
            };
            processed.push(block);
        }
        Ok(processed)
    }

    async fn upload_media(
        &mut self,
        file: &SourceFile,
        kind: MediaKind,
        locator: String,
        caption: Option<String>,
    ) -> Result<Block, SyncError> {
        Ok(match self.upload_local(file, kind, &locator).await? {
            Some(reference) => Block::MediaRef {
                kind,
                locator: reference,
                caption,
            },
            None => assets::literal_media(kind, &locator, caption.as_deref()),
        })
    }

    /// Upload a file referenced relative to `file`, returning its remote
    /// reference. Unreadable files and declined uploads yield `None`.
    async fn upload_local(
        &mut self,
        file: &SourceFile,
        kind: MediaKind,
        locator: &str,
    ) -> Result<Option<String>, SyncError> {
        let path = local_asset_path(file, locator);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("{}: cannot read {}: {e}", file.key(), path.display());
                return Ok(None);
            }
        };
        let request = match kind {
            MediaKind::Image => AssetRequest::Image { path },
            MediaKind::File => AssetRequest::File { path },
        };
        self.cached_or_process(content_hash(&bytes), bytes.len() as u64, kind, request)
            .await
    }

    /// Lift uploaded inline images out of a paragraph, splitting the text
    /// around each one.
    async fn split_inline_images(
        &mut self,
        file: &SourceFile,
        text: RichText,
    ) -> Result<Vec<Block>, SyncError> {
        if !text.spans().iter().any(|s| inline_local_image(s).is_some()) {
            return Ok(vec![Block::Paragraph { text }]);
        }

        let mut blocks = Vec::new();
        let mut pending = Vec::new();
        for span in text.0 {
            let uploaded = match inline_local_image(&span) {
                Some((alt, src)) => self
                    .upload_local(file, MediaKind::Image, &src)
                    .await?
                    .map(|reference| (alt, reference)),
                None => None,
            };
            match uploaded {
                Some((alt, reference)) => {
                    push_text(&mut blocks, std::mem::take(&mut pending));
                    blocks.push(Block::MediaRef {
                        kind: MediaKind::Image,
                        locator: reference,
                        caption: (!alt.is_empty()).then_some(alt),
                    });
                }
                None => pending.push(span),
            }
        }
        push_text(&mut blocks, pending);
        Ok(blocks)
    }

    /// Inline images inside list items and quotes stay in the text; once
    /// uploaded to a URL the span links to it.
    async fn link_inline_images(
        &mut self,
        file: &SourceFile,
        text: RichText,
    ) -> Result<RichText, SyncError> {
        let mut spans = Vec::with_capacity(text.0.len());
        for mut span in text.0 {
            if let Some((alt, src)) = inline_local_image(&span) {
                match self.upload_local(file, MediaKind::Image, &src).await? {
                    Some(reference) if is_absolute_url(&reference) => {
                        span.content = if alt.is_empty() { reference.clone() } else { alt };
                        span.link = Some(reference);
                    }
                    Some(reference) => {
                        log::debug!("{}: {src} uploaded as {reference}, kept as text", file.key());
                    }
                    None => {}
                }
            }
            spans.push(span);
        }
        Ok(RichText(spans))
    }

    async fn render_diagram(
        &mut self,
        language: String,
        code: String,
        caption: Option<String>,
    ) -> Result<Block, SyncError> {
        let hash = content_hash(format!("{language}\n{code}").as_bytes());
        let request = AssetRequest::Diagram {
            language: language.clone(),
            source: code.clone(),
        };
        let size = code.len() as u64;
        Ok(
            match self
                .cached_or_process(hash, size, MediaKind::Image, request)
                .await?
            {
                Some(reference) => Block::MediaRef {
                    kind: MediaKind::Image,
                    locator: reference,
                    caption,
                },
                None => Block::CodeBlock {
                    language,
                    code,
                    caption,
                },
            },
        )
    }

    async fn cached_or_process(
        &mut self,
        hash: String,
        size_bytes: u64,
        kind: MediaKind,
        request: AssetRequest,
    ) -> Result<Option<String>, SyncError> {
        let now = Utc::now();
        if let Some(entry) = self.state.cached_upload(&hash, now)? {
            log::debug!("Reusing upload {} for {hash}", entry.remote_reference);
            return Ok(Some(entry.remote_reference));
        }
        let Some(asset) = self.assets.process(request).await else {
            return Ok(None);
        };
        self.state.record_upload(
            &hash,
            UploadCacheEntry {
                remote_reference: asset.reference.clone(),
                uploaded_at: now,
                kind,
                size_bytes,
            },
        )?;
        Ok(Some(asset.reference))
    }
}

fn lost_or(error: RemoteError, page: PageId) -> SyncError {
    if error.is_missing() {
        SyncError::DestinationLost(page)
    } else {
        error.into()
    }
}

/// Source text of a file. Invalid UTF-8 is replaced, with a warning.
fn decode_source<'a>(key: &str, bytes: &'a [u8]) -> Cow<'a, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(e) => {
            log::warn!(
                "{key}: invalid UTF-8 at byte {}, replacing undecodable bytes",
                e.valid_up_to()
            );
            String::from_utf8_lossy(bytes)
        }
    }
}

/// `(alt, src)` of an image the inline parser left as literal text because
/// its source is a local path.
fn inline_local_image(span: &TextSpan) -> Option<(String, String)> {
    if span.link.is_some() || !span.annotations.is_plain() {
        return None;
    }
    let caps = Image::whole().captures(&span.content)?;
    let src = caps.get(2)?.as_str();
    if is_absolute_url(src) {
        return None;
    }
    Some((caps[1].to_string(), src.to_string()))
}

/// Push the text between lifted images as a paragraph, trimming plain
/// whitespace at its edges and dropping it when nothing is left.
fn push_text(blocks: &mut Vec<Block>, mut spans: Vec<TextSpan>) {
    if let Some(first) = spans.first_mut()
        && first.annotations.is_plain()
    {
        first.content = first.content.trim_start().to_string();
    }
    if let Some(last) = spans.last_mut()
        && last.annotations.is_plain()
    {
        last.content = last.content.trim_end().to_string();
    }
    spans.retain(|s| !s.content.is_empty());
    if !spans.is_empty() {
        blocks.push(Block::paragraph(RichText(spans)));
    }
}

/// Path of a media locator relative to the file referencing it.
fn local_asset_path(file: &SourceFile, locator: &str) -> PathBuf {
    let locator = locator.split(['?', '#']).next().unwrap_or(locator);
    file.absolute_path()
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(locator)
}

fn compare_positions(a: &[(f64, String)], b: &[(f64, String)]) -> Ordering {
    for ((pa, na), (pb, nb)) in a.iter().zip(b) {
        let ord = pa.total_cmp(pb).then_with(|| na.cmp(nb));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}
