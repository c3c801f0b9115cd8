use std::collections::BTreeSet;
use std::fs;

use crate::io::IoError;
use crate::models::SourceFile;
use crate::state::StateRepository;

use super::hash::content_hash;

/// How a file on disk compares to its sync record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    New,
    Modified,
    UpToDate,
}

/// Offline comparison of a corpus against persisted state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusStatus {
    pub files: Vec<(String, FileStatus)>,
    /// Tracked files that no longer exist on disk.
    pub orphaned: Vec<String>,
}

impl CorpusStatus {
    pub fn out_of_date(&self) -> impl Iterator<Item = &str> {
        self.files
            .iter()
            .filter(|(_, status)| *status != FileStatus::UpToDate)
            .map(|(file, _)| file.as_str())
    }
}

pub fn file_status(state: &StateRepository, file_key: &str, hash: &str) -> FileStatus {
    match state.record(file_key) {
        None => FileStatus::New,
        Some(record) if record.content_hash == hash => FileStatus::UpToDate,
        Some(_) => FileStatus::Modified,
    }
}

pub fn corpus_status(
    state: &StateRepository,
    files: &[SourceFile],
) -> Result<CorpusStatus, IoError> {
    let mut status = CorpusStatus::default();
    for file in files {
        let bytes = fs::read(file.absolute_path())?;
        let hash = content_hash(&bytes);
        status
            .files
            .push((file.key().to_string(), file_status(state, file.key(), &hash)));
    }
    let present: BTreeSet<&str> = files.iter().map(SourceFile::key).collect();
    status.orphaned = state
        .tracked_files()
        .filter(|key| !present.contains(key))
        .map(str::to_string)
        .collect();
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::scan_markdown_files;
    use crate::remote::PageId;
    use crate::state::SyncRecord;
    use crate::tests::{create_test_docs_dir, create_test_file};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    #[test]
    fn classifies_new_modified_current_and_orphaned() {
        let dir = create_test_docs_dir();
        create_test_file(&dir, "same.md", "same");
        create_test_file(&dir, "changed.md", "after");
        create_test_file(&dir, "fresh.md", "new");

        let mut state = StateRepository::in_memory();
        for (key, body) in [("same.md", "same"), ("changed.md", "before"), ("gone.md", "x")] {
            state
                .record_sync(
                    key,
                    SyncRecord {
                        page_id: PageId::new(format!("p-{key}")),
                        content_hash: content_hash(body.as_bytes()),
                        title: key.to_string(),
                        block_count: 1,
                        last_synced_at: Utc::now(),
                    },
                )
                .unwrap();
        }

        let files = scan_markdown_files(dir.path(), &[]).unwrap();
        let status = corpus_status(&state, &files).unwrap();

        assert_eq!(
            status.files,
            vec![
                ("changed.md".to_string(), FileStatus::Modified),
                ("fresh.md".to_string(), FileStatus::New),
                ("same.md".to_string(), FileStatus::UpToDate),
            ]
        );
        assert_eq!(status.orphaned, vec!["gone.md".to_string()]);
        assert_eq!(status.out_of_date().collect::<Vec<_>>(), vec!["changed.md", "fresh.md"]);
    }
}
