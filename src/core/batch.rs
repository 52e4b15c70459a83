//! Batched, cooperatively scheduled processing of filtered handles.

use tokio::task::JoinSet;

use super::content::ContentReader;
use super::error::Result;
use super::progress::DebugSink;
use super::stats::StatsAggregator;
use super::{FileAnalyzer, FileRecord, SharedHandle};
use crate::config::ProcessingConfig;

/// Drives classification and content reads over fixed-size batches.
///
/// With `read_concurrency == 1` files are handled one at a time and the task
/// yields every `yield_frequency` files. With more, the members of a batch
/// are read on a [`JoinSet`] and their results are applied in input order.
/// Either way the task yields after every batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchProcessor {
    batch_size: usize,
    yield_frequency: usize,
    read_concurrency: usize,
    reader: ContentReader,
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new(&ProcessingConfig::default())
    }
}

impl BatchProcessor {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            yield_frequency: config.yield_frequency.max(1),
            read_concurrency: config.read_concurrency.max(1),
            reader: ContentReader::new(config.preview_chars),
        }
    }

    /// Processes `handles`, returning one record per handle in input order.
    ///
    /// `on_progress(processed, total)` fires once per file with a strictly
    /// increasing `processed`. Per-file read failures are absorbed; the only
    /// error is a panicked read task.
    pub async fn process_all<F>(
        &self,
        handles: &[SharedHandle],
        analyzer: &FileAnalyzer,
        stats: &mut StatsAggregator,
        debug: &DebugSink,
        mut on_progress: F,
    ) -> Result<Vec<FileRecord>>
    where
        F: FnMut(usize, usize),
    {
        let total = handles.len();
        let batch_count = total.div_ceil(self.batch_size);
        let mut records = Vec::with_capacity(total);

        for (i, batch) in handles.chunks(self.batch_size).enumerate() {
            debug.emit(format!(
                "Processing batch {}/{} ({} files)",
                i + 1,
                batch_count,
                batch.len()
            ));

            if self.read_concurrency == 1 {
                for handle in batch {
                    let analysis = analyzer.analyze(handle.as_ref());
                    let record = self.reader.process(handle.as_ref(), analysis, debug).await;
                    stats.update(&record);
                    records.push(record);
                    on_progress(records.len(), total);

                    if records.len() % self.yield_frequency == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            } else {
                for record in self.read_concurrently(batch, analyzer, debug).await? {
                    stats.update(&record);
                    records.push(record);
                    on_progress(records.len(), total);
                }
            }

            tokio::task::yield_now().await;
        }

        Ok(records)
    }

    async fn read_concurrently(
        &self,
        batch: &[SharedHandle],
        analyzer: &FileAnalyzer,
        debug: &DebugSink,
    ) -> Result<Vec<FileRecord>> {
        let mut slots: Vec<Option<FileRecord>> = vec![None; batch.len()];
        let mut tasks = JoinSet::new();

        for (index, handle) in batch.iter().enumerate() {
            if tasks.len() >= self.read_concurrency {
                if let Some(joined) = tasks.join_next().await {
                    let (done, record) = joined?;
                    slots[done] = Some(record);
                }
            }

            let handle = handle.clone();
            let analysis = analyzer.analyze(handle.as_ref());
            let reader = self.reader;
            let debug = debug.clone();
            tasks.spawn(async move {
                let record = reader.process(handle.as_ref(), analysis, &debug).await;
                (index, record)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (done, record) = joined?;
            slots[done] = Some(record);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::RemoteFile;
    use std::sync::{Arc, Mutex};

    fn handles(count: usize) -> Vec<SharedHandle> {
        (0..count)
            .map(|i| {
                let content = "line\n".repeat(i + 1);
                Arc::new(RemoteFile::from_parts(
                    &format!("repo/f{i}.txt"),
                    content.len() as u64,
                    Some(content),
                )) as SharedHandle
            })
            .collect()
    }

    #[tokio::test]
    async fn test_sequential_preserves_order_and_reports_each_file() {
        let input = handles(7);
        let mut stats = StatsAggregator::new();
        let mut progress = Vec::new();

        let records = BatchProcessor::default()
            .process_all(
                &input,
                &FileAnalyzer::default(),
                &mut stats,
                &DebugSink::none(),
                |done, total| progress.push((done, total)),
            )
            .await
            .unwrap();

        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        let expected: Vec<String> = (0..7).map(|i| format!("repo/f{i}.txt")).collect();
        assert_eq!(paths, expected);
        assert_eq!(progress, (1..=7).map(|i| (i, 7)).collect::<Vec<_>>());
        assert_eq!(stats.snapshot().total_files, 7);
        assert_eq!(records[2].lines, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reads_keep_input_order() {
        let config = ProcessingConfig {
            read_concurrency: 3,
            batch_size: 4,
            ..ProcessingConfig::default()
        };
        let input = handles(10);
        let mut stats = StatsAggregator::new();
        let mut progress = Vec::new();

        let records = BatchProcessor::new(&config)
            .process_all(
                &input,
                &FileAnalyzer::new(config),
                &mut stats,
                &DebugSink::none(),
                |done, _| progress.push(done),
            )
            .await
            .unwrap();

        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.path, format!("repo/f{i}.txt"));
            assert_eq!(record.lines, i + 2);
        }
        assert_eq!(progress, (1..=10).collect::<Vec<_>>());
        assert_eq!(stats.snapshot().total_lines, (2..=11).sum::<usize>());
    }

    #[tokio::test]
    async fn test_batches_are_announced() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let messages = messages.clone();
            DebugSink::new(move |msg| messages.lock().unwrap().push(msg))
        };

        BatchProcessor::default()
            .process_all(
                &handles(6),
                &FileAnalyzer::default(),
                &mut StatsAggregator::new(),
                &sink,
                |_, _| {},
            )
            .await
            .unwrap();

        let messages = messages.lock().unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].ends_with("Processing batch 1/2 (5 files)"));
        assert!(messages[1].ends_with("Processing batch 2/2 (1 files)"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_yields_every_frequency_and_after_each_batch() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let polls = Arc::new(AtomicUsize::new(0));
        let sibling = {
            let polls = polls.clone();
            tokio::spawn(async move {
                loop {
                    polls.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                }
            })
        };

        let config = ProcessingConfig {
            batch_size: 5,
            yield_frequency: 2,
            read_concurrency: 1,
            ..ProcessingConfig::default()
        };
        // seen[k - 1] is the sibling's poll count when file k was reported.
        let mut seen = Vec::new();
        BatchProcessor::new(&config)
            .process_all(
                &handles(10),
                &FileAnalyzer::new(config),
                &mut StatsAggregator::new(),
                &DebugSink::none(),
                |_, _| seen.push(polls.load(Ordering::SeqCst)),
            )
            .await
            .unwrap();
        sibling.abort();

        assert_eq!(seen.len(), 10);
        // Any two consecutive files straddle at least one yield.
        for k in 0..seen.len() - 2 {
            assert!(seen[k + 2] > seen[k], "no yield between files {} and {}", k + 1, k + 3);
        }
        // File 5 closes the first batch, so the sibling runs before file 6.
        assert!(seen[5] > seen[4]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let records = BatchProcessor::default()
            .process_all(
                &[],
                &FileAnalyzer::default(),
                &mut StatsAggregator::new(),
                &DebugSink::none(),
                |_, _| panic!("no progress expected"),
            )
            .await
            .unwrap();
        assert!(records.is_empty());
    }
}
