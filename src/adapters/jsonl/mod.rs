//! JSON-lines file store
//!
//! A directory-per-session recording store. Useful as a local export target and
//! as an inspectable record of what a real store would have received.

pub mod models;
pub mod sink;

pub use models::{ChannelManifest, SessionManifest};
pub use sink::JsonlSink;
