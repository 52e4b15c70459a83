//! Running statistics over processed file records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::FileRecord;

/// Key under which records without an extension are counted.
pub const NO_EXTENSION: &str = "no-extension";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargestFile {
    pub name: String,
    pub lines: usize,
}

/// Seconds spent in each pipeline phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseTimings {
    pub filtering: f64,
    pub processing: f64,
    pub building: f64,
    pub ascii: f64,
}

impl PhaseTimings {
    pub fn total(&self) -> f64 {
        self.filtering + self.processing + self.building + self.ascii
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_files: usize,
    pub total_lines: usize,
    pub total_size: u64,
    /// Extension (with its dot) to number of files.
    pub file_types: BTreeMap<String, usize>,
    pub largest_file: LargestFile,
    /// Wall-clock seconds for the whole run.
    pub processing_time: f64,
    pub phase_timings: PhaseTimings,
}

impl Stats {
    /// Extensions by descending count, ties broken by name.
    pub fn top_file_types(&self, n: usize) -> Vec<(&str, usize)> {
        let mut types: Vec<(&str, usize)> = self
            .file_types
            .iter()
            .map(|(ext, count)| (ext.as_str(), *count))
            .collect();
        types.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        types.truncate(n);
        types
    }
}

/// Accumulates [`Stats`] one record at a time.
///
/// Totals are order-independent; `largest_file` keeps the first record seen
/// with the highest line count.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    stats: Stats,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, record: &FileRecord) {
        let stats = &mut self.stats;
        stats.total_files += 1;
        stats.total_lines += record.lines;
        stats.total_size += record.size;

        let key = if record.extension.is_empty() {
            NO_EXTENSION
        } else {
            record.extension.as_str()
        };
        *stats.file_types.entry(key.to_string()).or_insert(0) += 1;

        if record.lines > stats.largest_file.lines {
            stats.largest_file = LargestFile {
                name: record.name.clone(),
                lines: record.lines,
            };
        }
    }

    pub fn snapshot(&self) -> Stats {
        self.stats.clone()
    }

    pub fn reset(&mut self) {
        self.stats = Stats::default();
    }

    /// Stamps timing information and hands back the final totals.
    pub fn finish(self, processing_time: f64, phase_timings: PhaseTimings) -> Stats {
        Stats {
            processing_time,
            phase_timings,
            ..self.stats
        }
    }
}
