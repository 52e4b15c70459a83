//! Renders a [`Directory`] as box-drawing text.

use serde::{Deserialize, Serialize};

use super::ignore::IgnoredPaths;
use super::tree_builder::{Directory, TreeNode};
use super::FileRecord;
use crate::utils::format::format_bytes_compact;

const BRANCH: &str = "├── ";
const TERMINAL: &str = "└── ";
const CONTINUATION: &str = "│   ";
const BLANK: &str = "    ";

const FILE_ICON: &str = "📄 ";
const FOLDER_ICON: &str = "📁 ";

/// Annotations applied while rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Append ` (<n> lines)` to files that were read.
    pub show_lines: bool,
    /// Append ` [<size>]` to files.
    pub show_sizes: bool,
    /// Wrap labels in a size-classified `<span>`.
    pub show_colors: bool,
    /// Prefix labels with a file or folder icon.
    pub show_icons: bool,
    /// Paths hidden from the output together with their subtrees.
    pub ignored_paths: IgnoredPaths,
}

impl RenderOptions {
    /// The interactive viewer's defaults: icons and colours on.
    pub fn viewer() -> Self {
        Self {
            show_colors: true,
            show_icons: true,
            ..Self::default()
        }
    }

    fn is_plain(&self) -> bool {
        !(self.show_lines || self.show_sizes || self.show_colors || self.show_icons)
    }
}

/// Colour band of a node, by line count for files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Folder,
    Empty,
    Small,
    Medium,
    Large,
    Huge,
}

impl SizeClass {
    pub const ALL: [SizeClass; 6] = [
        SizeClass::Folder,
        SizeClass::Empty,
        SizeClass::Small,
        SizeClass::Medium,
        SizeClass::Large,
        SizeClass::Huge,
    ];

    pub fn from_lines(lines: usize) -> Self {
        match lines {
            0 => SizeClass::Empty,
            1..=200 => SizeClass::Small,
            201..=300 => SizeClass::Medium,
            301..=500 => SizeClass::Large,
            _ => SizeClass::Huge,
        }
    }

    pub fn of(node: &TreeNode) -> Self {
        match node {
            TreeNode::Directory(_) => SizeClass::Folder,
            TreeNode::Leaf(record) => Self::from_lines(record.lines),
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            SizeClass::Folder => "folder",
            SizeClass::Empty => "file-empty",
            SizeClass::Small => "file-small",
            SizeClass::Medium => "file-medium",
            SizeClass::Large => "file-large",
            SizeClass::Huge => "file-huge",
        }
    }

    /// Legend description.
    pub fn label(self) -> &'static str {
        match self {
            SizeClass::Folder => "Folders",
            SizeClass::Empty => "Empty files (0 lines)",
            SizeClass::Small => "Small files (1-200 lines)",
            SizeClass::Medium => "Medium files (201-300 lines)",
            SizeClass::Large => "Large files (301-500 lines)",
            SizeClass::Huge => "Huge files (500+ lines)",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            SizeClass::Folder => "#FFA726",
            SizeClass::Empty => "#9E9E9E",
            SizeClass::Small => "#4CAF50",
            SizeClass::Medium => "#2196F3",
            SizeClass::Large => "#FF9800",
            SizeClass::Huge => "#F44336",
        }
    }
}

/// Display counts for a rendered tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSummary {
    pub total_files: usize,
    pub total_folders: usize,
    /// Number of entries in the ignored set.
    pub ignored_count: usize,
}

/// Stateless renderer for the hierarchy.
pub struct AsciiRenderer;

impl AsciiRenderer {
    /// Renders names only, one line per node.
    pub fn render_plain(tree: &Directory) -> String {
        Self::render(tree, &RenderOptions::default())
    }

    /// Renders `tree` depth-first in stored order.
    ///
    /// Ignored entries are removed before connectors are chosen, so the last
    /// visible sibling always gets `└── `.
    pub fn render(tree: &Directory, options: &RenderOptions) -> String {
        let mut result = String::new();
        Self::render_recursive(tree, options, "", "", &mut result);
        result
    }

    fn render_recursive(
        dir: &Directory,
        options: &RenderOptions,
        prefix: &str,
        current_path: &str,
        result: &mut String,
    ) {
        let visible: Vec<(String, &str, &TreeNode)> = dir
            .iter()
            .map(|(name, node)| (join_path(current_path, name), name, node))
            .filter(|(path, _, _)| !options.ignored_paths.is_ignored(path))
            .collect();

        for (i, (path, name, node)) in visible.iter().enumerate() {
            let is_last = i == visible.len() - 1;
            let connector = if is_last { TERMINAL } else { BRANCH };

            result.push_str(prefix);
            result.push_str(connector);
            if options.is_plain() {
                result.push_str(name);
            } else {
                result.push_str(&Self::label(name, node, options));
            }
            result.push('\n');

            if let TreeNode::Directory(child) = node {
                let next_prefix = format!("{prefix}{}", if is_last { BLANK } else { CONTINUATION });
                Self::render_recursive(child, options, &next_prefix, path, result);
            }
        }
    }

    fn label(name: &str, node: &TreeNode, options: &RenderOptions) -> String {
        let mut text = name.to_string();
        if let TreeNode::Leaf(record) = node {
            Self::annotate(&mut text, record, options);
        }

        let icon = match (options.show_icons, node.is_directory()) {
            (false, _) => "",
            (true, true) => FOLDER_ICON,
            (true, false) => FILE_ICON,
        };

        if options.show_colors {
            format!(
                "<span class=\"{}\">{icon}{}</span>",
                SizeClass::of(node).css_class(),
                escape_html(&text)
            )
        } else {
            format!("{icon}{text}")
        }
    }

    fn annotate(text: &mut String, record: &FileRecord, options: &RenderOptions) {
        if options.show_lines && record.lines > 0 {
            text.push_str(&format!(" ({} lines)", record.lines));
        }
        if options.show_sizes {
            text.push_str(&format!(" [{}]", format_bytes_compact(record.size)));
        }
    }

    /// Counts visible files and folders, skipping ignored subtrees.
    pub fn summarize(tree: &Directory, ignored: &IgnoredPaths) -> TreeSummary {
        let (total_files, total_folders) = Self::count_visible(tree, ignored, "");
        TreeSummary {
            total_files,
            total_folders,
            ignored_count: ignored.len(),
        }
    }

    fn count_visible(dir: &Directory, ignored: &IgnoredPaths, current_path: &str) -> (usize, usize) {
        let mut files = 0;
        let mut folders = 0;
        for (name, node) in dir.iter() {
            let path = join_path(current_path, name);
            if ignored.is_ignored(&path) {
                continue;
            }
            match node {
                TreeNode::Leaf(_) => files += 1,
                TreeNode::Directory(child) => {
                    let (child_files, child_folders) = Self::count_visible(child, ignored, &path);
                    files += child_files;
                    folders += 1 + child_folders;
                }
            }
        }
        (files, folders)
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FileOrigin, TreeBuilder};
    use chrono::{DateTime, Utc};

    fn record(path: &str, size: u64, lines: usize) -> FileRecord {
        FileRecord {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            size,
            extension: String::new(),
            mime_type: "text/plain".to_string(),
            last_modified: DateTime::<Utc>::UNIX_EPOCH,
            origin: FileOrigin::Local,
            lines,
            content_preview: String::new(),
            is_large: false,
        }
    }

    fn sample() -> Directory {
        TreeBuilder::build(&[
            record("src/main.rs", 2048, 120),
            record("src/lib/mod.rs", 10, 0),
            record("README.md", 1536, 250),
        ])
    }

    #[test]
    fn test_plain_rendering() {
        insta::assert_snapshot!(AsciiRenderer::render_plain(&sample()), @r"
        ├── src
        │   ├── main.rs
        │   └── lib
        │       └── mod.rs
        └── README.md
        ");
    }

    #[test]
    fn test_line_and_size_annotations() {
        let options = RenderOptions {
            show_lines: true,
            show_sizes: true,
            ..RenderOptions::default()
        };
        insta::assert_snapshot!(AsciiRenderer::render(&sample(), &options), @r"
        ├── src
        │   ├── main.rs (120 lines) [2KB]
        │   └── lib
        │       └── mod.rs [10B]
        └── README.md (250 lines) [1.5KB]
        ");
    }

    #[test]
    fn test_viewer_preset_wraps_labels_in_spans() {
        let rendered = AsciiRenderer::render(&sample(), &RenderOptions::viewer());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "├── <span class=\"folder\">📁 src</span>");
        assert_eq!(lines[1], "│   ├── <span class=\"file-small\">📄 main.rs</span>");
        assert_eq!(lines[3], "│       └── <span class=\"file-empty\">📄 mod.rs</span>");
        assert_eq!(lines[4], "└── <span class=\"file-medium\">📄 README.md</span>");
    }

    #[test]
    fn test_icons_without_colors() {
        let options = RenderOptions {
            show_icons: true,
            ..RenderOptions::default()
        };
        let rendered = AsciiRenderer::render(&sample(), &options);
        assert!(rendered.starts_with("├── 📁 src\n│   ├── 📄 main.rs\n"));
    }

    #[test]
    fn test_span_text_is_escaped() {
        let tree = TreeBuilder::build(&[record("a<b>&.txt", 1, 1)]);
        let options = RenderOptions {
            show_colors: true,
            ..RenderOptions::default()
        };
        assert_eq!(
            AsciiRenderer::render(&tree, &options),
            "└── <span class=\"file-small\">a&lt;b&gt;&amp;.txt</span>\n"
        );
    }

    #[test]
    fn test_span_text_escapes_quotes() {
        let tree = TreeBuilder::build(&[record("it's \"q\".txt", 1, 1)]);
        let options = RenderOptions {
            show_colors: true,
            ..RenderOptions::default()
        };
        assert_eq!(
            AsciiRenderer::render(&tree, &options),
            "└── <span class=\"file-small\">it&#39;s &quot;q&quot;.txt</span>\n"
        );
    }

    #[test]
    fn test_ignored_subtree_changes_last_connector() {
        let options = RenderOptions {
            ignored_paths: IgnoredPaths::new(["README.md"]),
            ..RenderOptions::default()
        };
        insta::assert_snapshot!(AsciiRenderer::render(&sample(), &options), @r"
        └── src
            ├── main.rs
            └── lib
                └── mod.rs
        ");
    }

    #[test]
    fn test_ignored_folder_hides_descendants() {
        let options = RenderOptions {
            ignored_paths: IgnoredPaths::new(["src/lib"]),
            ..RenderOptions::default()
        };
        let rendered = AsciiRenderer::render(&sample(), &options);
        assert!(!rendered.contains("lib"));
        assert!(!rendered.contains("mod.rs"));
        assert!(rendered.contains("│   └── main.rs\n"));
    }

    #[test]
    fn test_summarize_honours_ignored_paths() {
        let tree = sample();
        assert_eq!(
            AsciiRenderer::summarize(&tree, &IgnoredPaths::default()),
            TreeSummary {
                total_files: 3,
                total_folders: 2,
                ignored_count: 0
            }
        );
        assert_eq!(
            AsciiRenderer::summarize(&tree, &IgnoredPaths::new(["src/lib"])),
            TreeSummary {
                total_files: 2,
                total_folders: 1,
                ignored_count: 1
            }
        );
    }

    #[test]
    fn test_size_class_bands() {
        assert_eq!(SizeClass::from_lines(0), SizeClass::Empty);
        assert_eq!(SizeClass::from_lines(1), SizeClass::Small);
        assert_eq!(SizeClass::from_lines(200), SizeClass::Small);
        assert_eq!(SizeClass::from_lines(201), SizeClass::Medium);
        assert_eq!(SizeClass::from_lines(300), SizeClass::Medium);
        assert_eq!(SizeClass::from_lines(301), SizeClass::Large);
        assert_eq!(SizeClass::from_lines(500), SizeClass::Large);
        assert_eq!(SizeClass::from_lines(501), SizeClass::Huge);
        assert_eq!(SizeClass::Huge.css_class(), "file-huge");
        assert_eq!(SizeClass::Folder.color(), "#FFA726");

        let classes: std::collections::HashSet<&str> =
            SizeClass::ALL.iter().map(|class| class.css_class()).collect();
        assert_eq!(classes.len(), SizeClass::ALL.len());
    }

    #[test]
    fn test_empty_tree_renders_nothing() {
        assert_eq!(AsciiRenderer::render_plain(&Directory::new()), "");
    }
}
