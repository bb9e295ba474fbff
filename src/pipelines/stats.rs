use std::time::{Duration, Instant};

/// Timing for one pipeline call.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Wall time from input to output, inference included.
    pub total_time: Duration,
    /// Number of reviews processed.
    pub items_processed: usize,
}

impl PipelineStats {
    /// Start timing (call at the start of an operation).
    pub(crate) fn start() -> PipelineStatsBuilder {
        PipelineStatsBuilder {
            start_time: Instant::now(),
        }
    }

    /// Mean time per review, zero for an empty call.
    pub fn time_per_item(&self) -> Duration {
        match u32::try_from(self.items_processed) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.total_time / n,
        }
    }
}

/// Tracks elapsed time from creation to [`Self::finish`].
pub(crate) struct PipelineStatsBuilder {
    start_time: Instant,
}

impl PipelineStatsBuilder {
    pub fn finish(self, items_processed: usize) -> PipelineStats {
        PipelineStats {
            total_time: self.start_time.elapsed(),
            items_processed,
        }
    }
}
