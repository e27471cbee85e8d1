//! Lifecycle engine: the event handlers driving child creation, deletion,
//! rebinding and recovery.
//!
//! Every handler is the final stop for errors arising within it: platform
//! failures are caught at the call site and reported through the event feed,
//! never propagated. Handlers suspend only on platform calls and re-validate
//! registry state after each await before acting on it.

pub(crate) mod channel_delete;
pub(crate) mod channel_update;
pub(crate) mod register;
pub(crate) mod text_toggle;
pub(crate) mod voice_state;
