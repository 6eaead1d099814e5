//! Export orchestration and batch writing
//!
//! This module provides the core export logic for SessionFrame, including:
//! - Batch partitioning and writing with per-batch retries
//! - Progress observers
//! - Export coordination and the stage state machine
//! - Outcome and failure reporting

pub mod batch;
pub mod coordinator;
pub mod progress;
pub mod stage;
pub mod summary;

pub use batch::{BatchConfig, BatchWriter, RetryPolicy, DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE};
pub use coordinator::{export, plan_export, ExportCoordinator, ExportOptions, ExportPlan};
pub use progress::{NoopProgress, ProgressEvent, ProgressObserver, TracingProgress};
pub use stage::{ExportStage, StageTracker};
pub use summary::{
    ChannelWriteStats, ExportFailure, ExportOutcome, PartialSession, WriteFailure, WriteReport,
};
