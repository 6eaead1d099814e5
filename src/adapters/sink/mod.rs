//! Session sink abstraction
//!
//! This module provides the trait every recording store implements, allowing
//! SessionFrame to export into different stores (JSON lines on disk, memory).

pub mod factory;
pub mod traits;

pub use factory::create_sink;
pub use traits::SessionSink;
