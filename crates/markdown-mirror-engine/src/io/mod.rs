//! Corpus access: scanning the docs tree and reading source files.

pub mod frontmatter;

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use relative_path::RelativePathBuf;

use crate::models::SourceFile;

pub use frontmatter::{ParsedSource, parse_source};

/// Extensions treated as content files.
pub const CONTENT_EXTENSIONS: &[&str] = &["md", "mdx"];

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid docs directory: {0}")]
    InvalidDocsDir(String),
}

/// Read a content file and split off its front matter and title.
pub fn read_source(file: &SourceFile) -> Result<ParsedSource, IoError> {
    let path = file.absolute_path();
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    Ok(parse_source(&fs::read_to_string(path)?))
}

/// Scan for content files under `docs_root`.
///
/// Hidden directories are skipped and any relative path matching one of
/// `excludes` is ignored. The result is sorted by relative path.
pub fn scan_markdown_files(
    docs_root: &Path,
    excludes: &[Pattern],
) -> Result<Vec<SourceFile>, IoError> {
    validate_docs_dir(docs_root)?;

    let mut files = Vec::new();
    scan_directory_recursive(docs_root, docs_root, RelativePathBuf::new(), excludes, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(
    root: &Path,
    dir: &Path,
    relative: RelativePathBuf,
    excludes: &[Pattern],
    files: &mut Vec<SourceFile>,
) -> Result<(), IoError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            log::warn!("Skipping non-UTF-8 path {}", path.display());
            continue;
        };
        let child = relative.join(name);

        if path.is_dir() {
            if !name.starts_with('.') {
                scan_directory_recursive(root, &path, child, excludes, files)?;
            }
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| CONTENT_EXTENSIONS.contains(&ext))
        {
            if excludes.iter().any(|p| p.matches(child.as_str())) {
                log::debug!("Excluded {child}");
                continue;
            }
            files.push(SourceFile::new(root, child));
        }
    }

    Ok(())
}

pub fn validate_docs_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidDocsDir(format!(
            "docs directory not found: {}",
            path.display()
        )));
    }

    Ok(())
}
