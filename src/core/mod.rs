pub mod analyzer;
pub mod ascii_tree;
pub mod batch;
pub mod content;
pub mod error;
pub mod handle;
pub mod ignore;
pub mod pipeline;
pub mod progress;
pub mod stats;
pub mod tree_builder;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a single handle, computed from metadata only.
#[derive(Debug, Clone, PartialEq)]
pub struct FileAnalysis {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub extension: String,
    pub mime_type: String,
    pub last_modified: DateTime<Utc>,
    pub origin: FileOrigin,
    pub is_valid: bool,
    pub should_process_content: bool,
    pub is_large: bool,
}

/// A processed file: its analysis plus what was learned from its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub name: String,
    pub path: String,
    pub size: u64,
    /// Including the leading dot; empty when the name has none.
    pub extension: String,
    pub mime_type: String,
    pub last_modified: DateTime<Utc>,
    pub origin: FileOrigin,
    /// Number of `\n`-delimited segments, `0` when the content was not read.
    pub lines: usize,
    /// The first characters of the content, empty when not read.
    pub content_preview: String,
    pub is_large: bool,
}

impl FileRecord {
    pub fn from_analysis(analysis: FileAnalysis, lines: usize, content_preview: String) -> Self {
        Self {
            name: analysis.name,
            path: analysis.path,
            size: analysis.size,
            extension: analysis.extension,
            mime_type: analysis.mime_type,
            last_modified: analysis.last_modified,
            origin: analysis.origin,
            lines,
            content_preview,
            is_large: analysis.is_large,
        }
    }
}

/// Everything a pipeline run hands back to its caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub structure: Directory,
    pub stats: Stats,
    pub ascii_tree: String,
}

pub use analyzer::FileAnalyzer;
pub use ascii_tree::{AsciiRenderer, RenderOptions, SizeClass, TreeSummary};
pub use batch::BatchProcessor;
pub use content::{count_lines, ContentReader};
pub use error::{CoreError, Result};
pub use handle::{FileHandle, FileOrigin, SharedHandle};
pub use ignore::{IgnorePatterns, IgnoredPaths, DEFAULT_IGNORE_PATTERNS};
pub use pipeline::FileProcessor;
pub use progress::{DebugSink, Phase, PhaseBreakdown, ProgressUpdate};
pub use stats::{LargestFile, PhaseTimings, Stats, StatsAggregator};
pub use tree_builder::{Directory, TreeBuilder, TreeNode};
