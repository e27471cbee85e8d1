//! Fatal configuration errors.
//!
//! Operational failures (a delete or permission edit going wrong mid-flight)
//! are *not* represented here; those are caught at the call site and surfaced
//! through [`Event::Error`](crate::events::Event). This module only covers
//! errors that prevent the manager from starting at all.

use thiserror::Error;

/// Errors raised when constructing a [`TempChannelsManager`](crate::TempChannelsManager).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("the GUILDS intent is required to use this manager")]
    MissingGuildsIntent,

    #[error("the GUILD_VOICE_STATES intent is required to use this manager")]
    MissingVoiceStatesIntent,
}

impl ManagerError {
    /// Get a static error code string for logging.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingGuildsIntent => "missing_guilds_intent",
            Self::MissingVoiceStatesIntent => "missing_voice_states_intent",
        }
    }
}
