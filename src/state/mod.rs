//! In-memory parent/child state.
//!
//! Contains the Registry (the parent map) and the entry types it owns.

mod channel;
mod registry;

pub use channel::{ChannelRef, ChildChannel, ParentChannel};
pub use registry::Registry;
