//! Session and channel identity
//!
//! Binding fixes where a session sits in time; mapping decides which channels it
//! holds, and the start lap marks where it begins. All three are pure and run before the sink is contacted.

pub mod binder;
pub mod lap;
pub mod mapper;

pub use binder::bind;
pub use lap::{start_lap, LAP_COLUMN};
pub use mapper::{map_channels, DEFAULT_APPLICATION_GROUP};
