//! Export stage tracking
//!
//! An export moves forward through a fixed sequence of stages and never re-enters
//! one. A failure is tagged with the last stage reached.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Stage of a single export
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStage {
    /// Nothing checked yet
    Created,
    /// Schema accepted
    Validated,
    /// Values converted
    Coerced,
    /// Time origin and day fixed
    Bound,
    /// Channels assigned
    Mapped,
    /// Session open, batches flowing
    Writing,
    /// Session written and closed
    Completed,
}

impl ExportStage {
    /// Stage that follows this one
    pub fn next(self) -> Option<Self> {
        match self {
            ExportStage::Created => Some(ExportStage::Validated),
            ExportStage::Validated => Some(ExportStage::Coerced),
            ExportStage::Coerced => Some(ExportStage::Bound),
            ExportStage::Bound => Some(ExportStage::Mapped),
            ExportStage::Mapped => Some(ExportStage::Writing),
            ExportStage::Writing => Some(ExportStage::Completed),
            ExportStage::Completed => None,
        }
    }

    /// Work performed while leaving this stage
    pub fn pending_step(self) -> &'static str {
        match self {
            ExportStage::Created => "validation",
            ExportStage::Validated => "coercion",
            ExportStage::Coerced => "session binding",
            ExportStage::Bound => "channel mapping",
            ExportStage::Mapped => "session creation",
            ExportStage::Writing => "writing",
            ExportStage::Completed => "completion",
        }
    }

    /// True once a session may exist in the sink
    pub fn touches_sink(self) -> bool {
        self >= ExportStage::Mapped
    }

    /// Lowercase stage name
    pub fn as_str(self) -> &'static str {
        match self {
            ExportStage::Created => "created",
            ExportStage::Validated => "validated",
            ExportStage::Coerced => "coerced",
            ExportStage::Bound => "bound",
            ExportStage::Mapped => "mapped",
            ExportStage::Writing => "writing",
            ExportStage::Completed => "completed",
        }
    }
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forward-only stage tracker for one export
#[derive(Debug)]
pub struct StageTracker {
    stage: ExportStage,
    entered_at: Instant,
}

impl StageTracker {
    /// Starts at [`ExportStage::Created`]
    pub fn new() -> Self {
        Self {
            stage: ExportStage::Created,
            entered_at: Instant::now(),
        }
    }

    /// Current stage
    pub fn stage(&self) -> ExportStage {
        self.stage
    }

    /// Moves to the next stage and returns it
    ///
    /// Stays on [`ExportStage::Completed`] once reached.
    pub fn advance(&mut self) -> ExportStage {
        if let Some(next) = self.stage.next() {
            tracing::debug!(
                from = %self.stage,
                to = %next,
                elapsed_ms = self.entered_at.elapsed().as_millis() as u64,
                "Export stage reached"
            );
            self.stage = next;
            self.entered_at = Instant::now();
        }
        self.stage
    }
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}
