pub mod settings;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::RenderOptions;

/// Size ceilings and scheduling knobs for a pipeline run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Files handled per batch before an unconditional yield.
    pub batch_size: usize,
    /// Yield after this many processed files.
    pub yield_frequency: usize,
    /// Files at or above this size are dropped during filtering.
    pub max_file_size: u64,
    /// Supported files at or above this size are not read.
    pub max_content_size: u64,
    /// Files above this size are reported as large.
    pub large_file_threshold: u64,
    /// Ceiling for the small plain-text allow-list.
    pub small_text_file_limit: u64,
    /// Characters kept as a content preview.
    pub preview_chars: usize,
    /// Reads in flight per batch; `1` processes files one at a time.
    pub read_concurrency: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            yield_frequency: 2,
            max_file_size: 10 * 1024 * 1024,
            max_content_size: 1024 * 1024,
            large_file_threshold: 100 * 1024,
            small_text_file_limit: 50 * 1024,
            preview_chars: 1000,
            read_concurrency: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Custom ignore patterns, applied after the defaults.
    pub ignore_patterns: Vec<String>,
    pub use_default_ignore_patterns: bool,
    /// Honour `.gitignore` files when collecting a local folder.
    pub respect_gitignore: bool,
    pub processing: ProcessingConfig,
    pub render: RenderOptions,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        settings::load_config(path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            use_default_ignore_patterns: true,
            respect_gitignore: false,
            processing: ProcessingConfig::default(),
            render: RenderOptions::default(),
        }
    }
}
