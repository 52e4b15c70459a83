//! Reads file content within the analyzer's budget and derives line counts.

use std::time::Instant;

use super::progress::DebugSink;
use super::{FileAnalysis, FileHandle, FileRecord};

/// Counts `\n`-delimited segments.
///
/// This is line breaks plus one: `"x\ny\n"` has three segments and an empty
/// string has one.
pub fn count_lines(text: &str) -> usize {
    text.split('\n').count()
}

/// Turns an analysis into a [`FileRecord`], reading content when allowed.
#[derive(Debug, Clone, Copy)]
pub struct ContentReader {
    preview_chars: usize,
}

impl Default for ContentReader {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl ContentReader {
    pub fn new(preview_chars: usize) -> Self {
        Self { preview_chars }
    }

    /// Reads `handle` if the analysis allows it.
    ///
    /// A failed read is logged and yields a record with `lines == 0` and an
    /// empty preview; it never aborts the caller.
    pub async fn process(
        &self,
        handle: &dyn FileHandle,
        analysis: FileAnalysis,
        debug: &DebugSink,
    ) -> FileRecord {
        if !analysis.should_process_content {
            return FileRecord::from_analysis(analysis, 0, String::new());
        }

        let started = Instant::now();
        match handle.read_text().await {
            Ok(text) => {
                let lines = count_lines(&text);
                let preview: String = text.chars().take(self.preview_chars).collect();

                if analysis.is_large {
                    debug.emit(format!(
                        "Processed large file: {} ({:.1}KB, {} lines) in {:.2}ms",
                        analysis.name,
                        analysis.size as f64 / 1024.0,
                        lines,
                        started.elapsed().as_secs_f64() * 1000.0
                    ));
                }

                FileRecord::from_analysis(analysis, lines, preview)
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", analysis.path, e);
                debug.emit(format!("Error reading file {}: {}", analysis.name, e));
                FileRecord::from_analysis(analysis, 0, String::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{CoreError, Result};
    use crate::core::{FileAnalyzer, FileOrigin};
    use crate::sources::RemoteFile;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::{Arc, Mutex};
    use tracing_test::traced_test;

    #[derive(Debug)]
    struct RevokedFile;

    #[async_trait]
    impl FileHandle for RevokedFile {
        fn name(&self) -> &str {
            "gone.rs"
        }
        fn relative_path(&self) -> &str {
            "src/gone.rs"
        }
        fn size(&self) -> u64 {
            42
        }
        fn last_modified(&self) -> DateTime<Utc> {
            DateTime::<Utc>::UNIX_EPOCH
        }
        fn mime_type(&self) -> &str {
            "text/x-rust"
        }
        fn origin(&self) -> FileOrigin {
            FileOrigin::Local
        }
        async fn read_text(&self) -> Result<String> {
            Err(CoreError::Read {
                path: "src/gone.rs".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "handle revoked"),
            })
        }
    }

    async fn process(handle: &dyn FileHandle, debug: &DebugSink) -> FileRecord {
        let analysis = FileAnalyzer::default().analyze(handle);
        ContentReader::default().process(handle, analysis, debug).await
    }

    #[test]
    fn test_count_lines_matches_split_arithmetic() {
        assert_eq!(count_lines("x\ny\n"), 3);
        assert_eq!(count_lines("single"), 1);
        assert_eq!(count_lines(""), 1);
        assert_eq!(count_lines("\n\n"), 3);
        assert_eq!(count_lines("a\r\nb"), 2);
    }

    #[tokio::test]
    async fn test_reads_supported_file() {
        let file = RemoteFile::from_parts("a/b.js", 100, Some("x\ny\n".to_string()));
        let record = process(&file, &DebugSink::none()).await;
        assert_eq!(record.lines, 3);
        assert_eq!(record.content_preview, "x\ny\n");
        assert_eq!(record.extension, ".js");
    }

    #[tokio::test]
    async fn test_unsupported_file_is_not_read() {
        let file = RemoteFile::from_parts("img/logo.png", 100, Some("binary".to_string()));
        let record = process(&file, &DebugSink::none()).await;
        assert_eq!(record.lines, 0);
        assert!(record.content_preview.is_empty());
    }

    #[tokio::test]
    async fn test_preview_is_truncated_by_characters() {
        let text = "é".repeat(1500);
        let file = RemoteFile::from_parts("notes.txt", text.len() as u64, Some(text));
        let record = process(&file, &DebugSink::none()).await;
        assert_eq!(record.content_preview.chars().count(), 1000);
        assert_eq!(record.lines, 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_read_failure_degrades_to_zero_lines() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let messages = messages.clone();
            DebugSink::new(move |msg| messages.lock().unwrap().push(msg))
        };

        let record = process(&RevokedFile, &sink).await;

        assert_eq!(record.lines, 0);
        assert!(record.content_preview.is_empty());
        assert_eq!(record.path, "src/gone.rs");
        assert!(logs_contain("Failed to read src/gone.rs"));
        let messages = messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Error reading file gone.rs"));
    }

    #[tokio::test]
    async fn test_large_file_reports_timing_to_debug_sink() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let messages = messages.clone();
            DebugSink::new(move |msg| messages.lock().unwrap().push(msg))
        };
        let text = "line\n".repeat(30_000);
        let file = RemoteFile::from_parts("big.txt", text.len() as u64, Some(text));

        let record = process(&file, &sink).await;

        assert!(record.is_large);
        assert_eq!(record.lines, 30_001);
        let messages = messages.lock().unwrap();
        assert!(messages[0].contains("Processed large file: big.txt"));
    }
}
