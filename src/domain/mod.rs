//! Domain models and types for SessionFrame.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Input model** ([`Dataset`], [`Index`], [`Column`])
//! - **Session model** ([`SessionOrigin`], [`ChannelSpec`], [`Sample`])
//! - **Strongly-typed identifiers** ([`SessionKey`], [`ChannelName`])
//! - **Error types** ([`SessionFrameError`], [`PipelineError`] and one error per stage)
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! Stage errors convert into [`PipelineError`] with `?` or `into()`:
//!
//! ```rust
//! use sessionframe::domain::{PipelineError, SessionSpanError};
//!
//! fn bind() -> Result<(), PipelineError> {
//!     Err(SessionSpanError::EmptyIndex.into())
//! }
//!
//! assert!(matches!(bind(), Err(PipelineError::SessionSpan(_))));
//! ```

pub mod dataset;
pub mod errors;
pub mod ids;
pub mod result;
pub mod session;
pub mod time;

// Re-export commonly used types for convenience
pub use dataset::{Column, Dataset, DatasetBuilder, Index};
pub use errors::{
    CoercionError, ColumnViolation, NameCollisionError, PipelineError, SchemaError,
    SchemaErrorKind, SessionFrameError, SessionSpanError, SinkError, SinkOperation, WriteError,
};
pub use ids::{ChannelName, SessionKey};
pub use result::Result;
pub use session::{
    ChannelHandle, ChannelSpec, Sample, SessionHandle, SessionOrigin, SessionRequest,
};
