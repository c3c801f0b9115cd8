use std::collections::BTreeMap;
use std::fmt::Write;

use markdown_mirror_engine::hierarchy::{HierarchyResolver, format_segment_title};
use markdown_mirror_engine::io::read_source;
use markdown_mirror_engine::models::SourceFile;

/// A container page and what would be placed under it.
#[derive(Debug, Default)]
pub struct TreeNode {
    pub title: String,
    pub containers: BTreeMap<String, TreeNode>,
    pub pages: Vec<String>,
}

/// Lay out the remote tree `resolver` would build for `files`.
pub fn build_tree(
    resolver: &HierarchyResolver,
    root_title: &str,
    files: &[SourceFile],
) -> TreeNode {
    let mut root = TreeNode {
        title: root_title.to_string(),
        ..TreeNode::default()
    };
    for file in files {
        let mut node = &mut root;
        for level in resolver.chain(file) {
            let (title, _) = resolver.container_title(&level);
            node = node
                .containers
                .entry(level.segment.clone())
                .or_insert_with(|| TreeNode {
                    title,
                    ..TreeNode::default()
                });
        }
        let fallback = format_segment_title(file.stem());
        let title = match read_source(file) {
            Ok(parsed) => parsed.title_or(&fallback),
            Err(e) => {
                log::warn!("Cannot read {}: {e}", file.key());
                fallback
            }
        };
        node.pages.push(title);
    }
    root
}

pub fn render_tree(root: &TreeNode) -> String {
    let mut out = String::new();
    render_node(root, 0, &mut out);
    out
}

fn render_node(node: &TreeNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let _ = writeln!(out, "{indent}{}/", node.title);
    for child in node.containers.values() {
        render_node(child, depth + 1, out);
    }
    for page in &node.pages {
        let _ = writeln!(out, "{indent}  {page}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdown_mirror_engine::hierarchy::{HierarchyOptions, NoDescriptors};
    use std::fs;

    #[test]
    fn renders_nested_layout() {
        let dir = tempfile::tempdir().unwrap();
        for (rel, body) in [
            ("docs/index.md", "# Home\n"),
            ("docs/api/auth.md", "no heading"),
            ("docs/api/v1/users.md", "---\ntitle: Users API\n---\n"),
        ] {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
        let files = markdown_mirror_engine::io::scan_markdown_files(dir.path(), &[]).unwrap();
        let resolver =
            HierarchyResolver::new(HierarchyOptions::default(), Box::new(NoDescriptors));

        let tree = build_tree(&resolver, "Handbook", &files);

        assert_eq!(
            render_tree(&tree),
            "Handbook/\n  Api/\n    V1/\n      Users API\n    Auth\n  Home\n"
        );
    }
}
