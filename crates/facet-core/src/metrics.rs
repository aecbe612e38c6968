//! Per-stage timing hooks
//!
//! Every extractor stage reports its elapsed time and input size to a
//! [`FacetMetrics`] sink. The sink only observes; extraction output never
//! depends on it.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::types::Stage;

/// Observer for stage timings. Shared across concurrent extractions.
pub trait FacetMetrics: Send + Sync {
    fn record_stage(&self, stage: Stage, elapsed: Duration, input_bytes: usize);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl FacetMetrics for NoopMetrics {
    #[inline]
    fn record_stage(&self, _stage: Stage, _elapsed: Duration, _input_bytes: usize) {}
}

/// Accumulated figures for one stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTotals {
    pub calls: u64,
    pub elapsed: Duration,
    pub input_bytes: u64,
    pub max_elapsed: Duration,
}

impl StageTotals {
    /// Mean time per call.
    pub fn mean(&self) -> Duration {
        if self.calls == 0 {
            return Duration::ZERO;
        }
        self.elapsed / self.calls.min(u32::MAX as u64) as u32
    }
}

/// Thread-safe accumulator of stage totals.
#[derive(Debug, Default)]
pub struct StageStats {
    totals: Mutex<BTreeMap<Stage, StageTotals>>,
}

impl StageStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current totals, in pipeline stage order.
    pub fn snapshot(&self) -> Vec<(Stage, StageTotals)> {
        let totals = self.totals.lock().unwrap_or_else(|e| e.into_inner());
        totals.iter().map(|(stage, t)| (*stage, *t)).collect()
    }
}

impl FacetMetrics for StageStats {
    fn record_stage(&self, stage: Stage, elapsed: Duration, input_bytes: usize) {
        let mut totals = self.totals.lock().unwrap_or_else(|e| e.into_inner());
        let entry = totals.entry(stage).or_default();
        entry.calls += 1;
        entry.elapsed += elapsed;
        entry.input_bytes += input_bytes as u64;
        entry.max_elapsed = entry.max_elapsed.max(elapsed);
    }
}
