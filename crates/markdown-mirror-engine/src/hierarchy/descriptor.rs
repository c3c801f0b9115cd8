use std::fs;
use std::path::PathBuf;

use relative_path::RelativePath;
use serde::Deserialize;

/// File name of the per-directory descriptor.
pub const CATEGORY_FILE: &str = "_category_.json";

/// Optional presentation overrides for one directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryDescriptor {
    pub label: Option<String>,
    pub description: Option<String>,
    pub position: Option<f64>,
}

/// Source of [`DirectoryDescriptor`]s. Absence is an empty descriptor, never
/// an error.
pub trait DescriptorLoader: Send + Sync {
    fn load(&self, directory: &RelativePath) -> DirectoryDescriptor;
}

/// No descriptors anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDescriptors;

impl DescriptorLoader for NoDescriptors {
    fn load(&self, _directory: &RelativePath) -> DirectoryDescriptor {
        DirectoryDescriptor::default()
    }
}

#[derive(Debug, Deserialize)]
struct CategoryFile {
    label: Option<String>,
    position: Option<f64>,
    description: Option<String>,
    link: Option<CategoryLink>,
}

#[derive(Debug, Deserialize)]
struct CategoryLink {
    description: Option<String>,
}

/// Reads `_category_.json` files from directories under the corpus root.
#[derive(Debug, Clone)]
pub struct CategoryFileLoader {
    docs_root: PathBuf,
}

impl CategoryFileLoader {
    pub fn new(docs_root: impl Into<PathBuf>) -> Self {
        Self {
            docs_root: docs_root.into(),
        }
    }
}

impl DescriptorLoader for CategoryFileLoader {
    fn load(&self, directory: &RelativePath) -> DirectoryDescriptor {
        let path = directory.join(CATEGORY_FILE).to_path(&self.docs_root);
        let Ok(raw) = fs::read_to_string(&path) else {
            return DirectoryDescriptor::default();
        };
        match serde_json::from_str::<CategoryFile>(&raw) {
            Ok(file) => DirectoryDescriptor {
                label: file.label.filter(|l| !l.trim().is_empty()),
                description: file
                    .description
                    .or_else(|| file.link.and_then(|l| l.description)),
                position: file.position,
            },
            Err(e) => {
                log::warn!("Ignoring malformed {}: {e}", path.display());
                DirectoryDescriptor::default()
            }
        }
    }
}
