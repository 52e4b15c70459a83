//! Metadata-only classification of file handles.

use super::{FileAnalysis, FileHandle};
use crate::config::ProcessingConfig;
use crate::utils::file_detection::{file_extension, is_small_text_extension, is_supported_extension};

/// Decides, per handle, whether it survives filtering, whether its content
/// is read, and whether it counts as large. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAnalyzer {
    config: ProcessingConfig,
}

impl FileAnalyzer {
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Size strictly below the file ceiling.
    pub fn is_valid(&self, handle: &dyn FileHandle) -> bool {
        handle.size() < self.config.max_file_size
    }

    pub fn should_process_content(&self, handle: &dyn FileHandle) -> bool {
        let extension = file_extension(handle.name());
        let size = handle.size();
        (is_supported_extension(extension) && size < self.config.max_content_size)
            || (is_small_text_extension(extension) && size < self.config.small_text_file_limit)
    }

    pub fn is_large(&self, handle: &dyn FileHandle) -> bool {
        handle.size() > self.config.large_file_threshold
    }

    pub fn analyze(&self, handle: &dyn FileHandle) -> FileAnalysis {
        let mime_type = match handle.mime_type() {
            "" => "unknown".to_string(),
            mime => mime.to_string(),
        };
        FileAnalysis {
            name: handle.name().to_string(),
            path: handle.relative_path().to_string(),
            size: handle.size(),
            extension: file_extension(handle.name()).to_string(),
            mime_type,
            last_modified: handle.last_modified(),
            origin: handle.origin(),
            is_valid: self.is_valid(handle),
            should_process_content: self.should_process_content(handle),
            is_large: self.is_large(handle),
        }
    }
}
