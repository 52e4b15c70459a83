//! Phase-weighted progress reporting and the optional debug channel.

use std::fmt;
use std::sync::Arc;

use chrono::Local;
use serde::Serialize;

use super::stats::PhaseTimings;

/// The four sequential stages of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Filtering,
    Processing,
    Building,
    Ascii,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Filtering,
        Phase::Processing,
        Phase::Building,
        Phase::Ascii,
    ];

    /// The slice of the overall percentage owned by this phase.
    pub fn range(self) -> (f64, f64) {
        match self {
            Phase::Filtering => (0.0, 5.0),
            Phase::Processing => (5.0, 90.0),
            Phase::Building => (90.0, 95.0),
            Phase::Ascii => (95.0, 100.0),
        }
    }

    pub fn start(self) -> f64 {
        self.range().0
    }

    pub fn end(self) -> f64 {
        self.range().1
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Filtering => "filtering",
            Phase::Processing => "processing",
            Phase::Building => "building",
            Phase::Ascii => "ascii",
        }
    }

    /// Overall percentage after `processed` of `total` units of this phase.
    ///
    /// Clamped to the phase's range; a zero `total` counts as complete.
    pub fn percent(self, processed: usize, total: usize) -> f64 {
        let (start, end) = self.range();
        if total == 0 {
            return end;
        }
        let fraction = processed as f64 / total as f64;
        (start + fraction * (end - start)).clamp(start, end)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One progress callback payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    /// Overall completion in `[0, 100]`.
    pub percent: f64,
    pub processed: usize,
    pub total: usize,
    pub phase: Phase,
    /// Seconds spent in each completed phase so far.
    pub phase_timings: PhaseTimings,
}

/// Per-phase completion derived from an overall percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseBreakdown {
    pub filtering: f64,
    pub processing: f64,
    pub building: f64,
    pub ascii: f64,
    pub current: Phase,
}

impl PhaseBreakdown {
    /// Maps an overall percentage to each phase's own `0..=100` completion.
    pub fn from_percent(percent: f64) -> Self {
        let percent = percent.clamp(0.0, 100.0);
        let local = |phase: Phase| {
            let (start, end) = phase.range();
            ((percent - start) / (end - start) * 100.0).clamp(0.0, 100.0)
        };

        let current = Phase::ALL
            .into_iter()
            .find(|phase| percent < phase.end())
            .unwrap_or(Phase::Ascii);

        Self {
            filtering: local(Phase::Filtering),
            processing: local(Phase::Processing),
            building: local(Phase::Building),
            ascii: local(Phase::Ascii),
            current,
        }
    }

    pub fn for_phase(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Filtering => self.filtering,
            Phase::Processing => self.processing,
            Phase::Building => self.building,
            Phase::Ascii => self.ascii,
        }
    }
}

type DebugCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Optional observer for human-readable pipeline milestones.
///
/// Every message goes to `tracing` at debug level; when a callback is
/// installed it also receives the message prefixed with `[HH:MM:SS]`.
#[derive(Clone, Default)]
pub struct DebugSink {
    callback: Option<DebugCallback>,
}

impl DebugSink {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        Self {
            callback: Some(Arc::new(callback)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.callback.is_some()
    }

    pub fn emit(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::debug!("{}", message);
        if let Some(callback) = &self.callback {
            callback(format!("[{}] {}", Local::now().format("%H:%M:%S"), message));
        }
    }
}

impl fmt::Debug for DebugSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugSink")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
