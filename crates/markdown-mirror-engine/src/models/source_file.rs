use std::path::{Path, PathBuf};

use relative_path::{RelativePath, RelativePathBuf};

/// A content file discovered under the corpus root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    relative_path: RelativePathBuf,
    absolute_path: PathBuf,
}

impl SourceFile {
    pub fn new(root: &Path, relative_path: RelativePathBuf) -> Self {
        let absolute_path = relative_path.to_path(root);
        Self {
            relative_path,
            absolute_path,
        }
    }

    /// Create from a relative path string.
    pub fn from_relative_str(root: &Path, path: &str) -> Self {
        Self::new(root, RelativePathBuf::from(path))
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    /// Key used for sync records: the forward-slash relative path.
    pub fn key(&self) -> &str {
        self.relative_path.as_str()
    }

    /// File name without its markdown extension.
    pub fn stem(&self) -> &str {
        self.relative_path
            .file_stem()
            .unwrap_or("Untitled")
    }

    /// Directory segments between the corpus root and the file.
    pub fn directory_segments(&self) -> Vec<&str> {
        self.relative_path
            .parent()
            .map(|p| p.components().map(|c| c.as_str()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}
