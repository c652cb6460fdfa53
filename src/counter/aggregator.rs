//! Accumulation of crossing events into the run summary.

use serde::{Deserialize, Serialize};

use super::crossing::CrossingEvent;
use super::vehicle_class::ClassCounts;

/// Terminal output of a counting run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub count: u64,
    pub by_class: ClassCounts,
    /// Snapshot files written, in event order.
    pub images: Vec<String>,
    /// Reference to the processed input, when the driver knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_video: Option<String>,
}

/// Accumulates counted crossings into per-class totals.
#[derive(Debug, Clone, Default)]
pub struct CountAggregator {
    counts: ClassCounts,
    events: Vec<CrossingEvent>,
    images: Vec<String>,
}

impl CountAggregator {
    /// Create an aggregator with every class at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one crossing event and keep it in the event log.
    pub fn accept(&mut self, event: CrossingEvent) {
        self.counts.increment(event.class);
        self.events.push(event);
    }

    /// Record a snapshot that was successfully written for an accepted event.
    pub fn record_snapshot(&mut self, path: impl Into<String>) {
        self.images.push(path.into());
    }

    /// Get the per-class totals so far.
    pub fn counts(&self) -> &ClassCounts {
        &self.counts
    }

    /// Get the accepted events in arrival order.
    pub fn events(&self) -> &[CrossingEvent] {
        &self.events
    }

    /// Consume the aggregator and produce the run summary.
    pub fn finalize(self) -> RunSummary {
        debug_assert_eq!(self.counts.total(), self.events.len() as u64);
        RunSummary {
            count: self.counts.total(),
            by_class: self.counts,
            images: self.images,
            output_video: None,
        }
    }
}
