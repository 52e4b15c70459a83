//! The four-phase processing pipeline.

use std::time::Instant;

use rayon::prelude::*;

use super::ascii_tree::AsciiRenderer;
use super::batch::BatchProcessor;
use super::error::Result;
use super::ignore::IgnorePatterns;
use super::progress::{DebugSink, Phase, ProgressUpdate};
use super::stats::{PhaseTimings, Stats, StatsAggregator};
use super::tree_builder::{Directory, TreeBuilder};
use super::{FileAnalyzer, FileHandle, ProcessingResult, SharedHandle};
use crate::config::{AppConfig, ProcessingConfig};

/// Runs filtering, processing, tree building and ASCII rendering over a list
/// of handles.
///
/// Each instance owns its ignore patterns and search term; runs share no
/// state with one another.
#[derive(Debug, Clone)]
pub struct FileProcessor {
    config: ProcessingConfig,
    ignore_patterns: IgnorePatterns,
    include_defaults: bool,
    search_term: Option<String>,
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new(ProcessingConfig::default())
    }
}

impl FileProcessor {
    /// A processor with the default ignore patterns.
    pub fn new(config: ProcessingConfig) -> Self {
        Self {
            config,
            ignore_patterns: IgnorePatterns::defaults(),
            include_defaults: true,
            search_term: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            config: config.processing,
            ignore_patterns: IgnorePatterns::new(
                &config.ignore_patterns,
                config.use_default_ignore_patterns,
            ),
            include_defaults: config.use_default_ignore_patterns,
            search_term: None,
        }
    }

    /// Replaces the custom patterns. The defaults stay in front of them unless
    /// they were disabled when the processor was built.
    pub fn set_custom_ignore_patterns<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignore_patterns = IgnorePatterns::new(patterns, self.include_defaults);
    }

    pub fn ignore_patterns(&self) -> &IgnorePatterns {
        &self.ignore_patterns
    }

    /// Keeps only paths containing `term`, ignoring case. Empty keeps all.
    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        let term = term.into().trim().to_lowercase();
        self.search_term = (!term.is_empty()).then_some(term);
        self
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Whether `handle` survives the filtering phase.
    pub fn should_include(&self, handle: &dyn FileHandle, analyzer: &FileAnalyzer) -> bool {
        let path = handle.relative_path();
        if let Some(pattern) = self.ignore_patterns.matched_by(path) {
            tracing::trace!("Ignoring {} (matched '{}')", path, pattern);
            return false;
        }
        if let Some(term) = &self.search_term {
            if !path.to_lowercase().contains(term.as_str()) {
                return false;
            }
        }
        analyzer.is_valid(handle)
    }

    /// Runs the pipeline without progress or debug observers.
    pub async fn process_files_basic(&self, handles: &[SharedHandle]) -> Result<ProcessingResult> {
        self.process_files(handles, |_| {}, DebugSink::none()).await
    }

    /// Runs all four phases over `handles`.
    ///
    /// Progress percentages never decrease and stay within `[0, 100]`.
    /// Per-file read failures are absorbed; any returned error aborts the
    /// run without a partial result.
    pub async fn process_files<F>(
        &self,
        handles: &[SharedHandle],
        on_progress: F,
        debug: DebugSink,
    ) -> Result<ProcessingResult>
    where
        F: Fn(ProgressUpdate) + Send + Sync,
    {
        let started = Instant::now();
        let mut timings = PhaseTimings::default();
        let report = |phase: Phase, percent: f64, processed: usize, total: usize, timings: PhaseTimings| {
            on_progress(ProgressUpdate {
                percent: percent.clamp(0.0, 100.0),
                processed,
                total,
                phase,
                phase_timings: timings,
            });
        };

        debug.emit(format!("🚀 Starting file processing with {} files", handles.len()));

        if handles.is_empty() {
            report(Phase::Ascii, Phase::Ascii.end(), 0, 0, timings);
            return Ok(Self::empty_result(started, timings));
        }

        // Filtering
        report(Phase::Filtering, Phase::Filtering.start(), 0, handles.len(), timings);
        tokio::task::yield_now().await;

        let phase_started = Instant::now();
        let analyzer = FileAnalyzer::new(self.config);
        let filtered: Vec<SharedHandle> = handles
            .par_iter()
            .filter(|handle| self.should_include(handle.as_ref(), &analyzer))
            .cloned()
            .collect();
        timings.filtering = phase_started.elapsed().as_secs_f64();

        debug.emit(format!(
            "✅ Kept {} of {} files after filtering",
            filtered.len(),
            handles.len()
        ));

        if filtered.is_empty() {
            debug.emit("⚠️ No valid files found after filtering");
            report(Phase::Ascii, Phase::Ascii.end(), 0, 0, timings);
            return Ok(Self::empty_result(started, timings));
        }

        let total = filtered.len();
        report(Phase::Filtering, Phase::Filtering.end(), 0, total, timings);

        // Processing
        debug.emit(format!(
            "📊 Processing {} files in batches of {}",
            total, self.config.batch_size
        ));
        let phase_started = Instant::now();
        let mut stats = StatsAggregator::new();
        let records = BatchProcessor::new(&self.config)
            .process_all(&filtered, &analyzer, &mut stats, &debug, |processed, total| {
                let mut running = timings;
                running.processing = phase_started.elapsed().as_secs_f64();
                report(
                    Phase::Processing,
                    Phase::Processing.percent(processed, total),
                    processed,
                    total,
                    running,
                );
            })
            .await?;
        timings.processing = phase_started.elapsed().as_secs_f64();

        // Building
        debug.emit("🏗️ Building tree structure...");
        report(Phase::Building, Phase::Building.start(), total, total, timings);
        tokio::task::yield_now().await;

        let phase_started = Instant::now();
        let structure = TreeBuilder::build(&records);
        timings.building = phase_started.elapsed().as_secs_f64();
        debug.emit(format!(
            "✅ Tree structure built in {:.2}ms",
            timings.building * 1000.0
        ));
        report(Phase::Building, Phase::Building.end(), total, total, timings);
        tokio::task::yield_now().await;

        // ASCII
        debug.emit("🌳 Generating ASCII tree...");
        report(Phase::Ascii, Phase::Ascii.start(), total, total, timings);
        let phase_started = Instant::now();
        let ascii_tree = AsciiRenderer::render_plain(&structure);
        timings.ascii = phase_started.elapsed().as_secs_f64();
        debug.emit(format!(
            "✅ ASCII tree generated in {:.2}ms",
            timings.ascii * 1000.0
        ));

        let processing_time = started.elapsed().as_secs_f64();
        let stats = stats.finish(processing_time, timings);

        tracing::info!(
            "🎉 Processed {} files ({} lines) in {:.3}s",
            stats.total_files,
            stats.total_lines,
            processing_time
        );
        debug.emit(format!(
            "📈 Performance breakdown: filtering {:.2}ms, processing {:.2}ms, building {:.2}ms, ascii {:.2}ms",
            timings.filtering * 1000.0,
            timings.processing * 1000.0,
            timings.building * 1000.0,
            timings.ascii * 1000.0
        ));

        report(Phase::Ascii, Phase::Ascii.end(), total, total, timings);

        Ok(ProcessingResult {
            structure,
            stats,
            ascii_tree,
        })
    }

    fn empty_result(started: Instant, timings: PhaseTimings) -> ProcessingResult {
        ProcessingResult {
            structure: Directory::new(),
            stats: Stats {
                processing_time: started.elapsed().as_secs_f64(),
                phase_timings: timings,
                ..Stats::default()
            },
            ascii_tree: String::new(),
        }
    }
}
