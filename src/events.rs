//! The domain event feed.
//!
//! Every state transition the manager performs is published on an in-process
//! broadcast channel as a variant of [`Event`]. The enum is closed: each
//! transition has exactly one variant with a typed payload, so hosts match on
//! it instead of string event names.

use tokio::sync::broadcast;
use tracing::debug;

use crate::platform::{ChannelId, ChannelInfo, Member};
use crate::state::{ChildChannel, ParentChannel};

/// Default capacity of the broadcast feed.
const EVENT_CAPACITY: usize = 256;

/// A state transition performed (or observed) by the manager.
#[derive(Debug, Clone)]
pub enum Event {
    /// A parent channel was registered.
    ChannelRegister { parent: ParentChannel },

    /// A parent channel was unregistered, either explicitly or because its
    /// underlying channel was deleted.
    ChannelUnregister { parent: ParentChannel },

    /// A child voice channel was created on the platform.
    VoiceChannelCreate { channel: ChannelInfo },

    /// A child voice channel was deleted, by the manager or externally.
    VoiceChannelDelete { channel_id: ChannelId },

    /// A child was bound to its parent in the registry.
    ChildCreate { parent_id: ChannelId, child: ChildChannel },

    /// A child was removed from its parent in the registry.
    ChildDelete { parent_id: ChannelId, child: ChildChannel },

    /// A child channel's name was forcibly reverted to the canonical format.
    ChildPrefixChange { child: ChildChannel },

    /// A linked text channel or thread was created.
    TextChannelCreate { channel_id: ChannelId },

    /// A linked text channel or thread was deleted or unlinked.
    TextChannelDelete { channel_id: ChannelId },

    /// A member invoked the text toggle without owning a tracked child.
    VoiceNotExisting { member: Member },

    /// An operational failure was caught and reported instead of propagated.
    Error { code: &'static str, message: String },
}

impl Event {
    /// Short name of the variant, used as the `event` field in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChannelRegister { .. } => "channelRegister",
            Self::ChannelUnregister { .. } => "channelUnregister",
            Self::VoiceChannelCreate { .. } => "voiceChannelCreate",
            Self::VoiceChannelDelete { .. } => "voiceChannelDelete",
            Self::ChildCreate { .. } => "childCreate",
            Self::ChildDelete { .. } => "childDelete",
            Self::ChildPrefixChange { .. } => "childPrefixChange",
            Self::TextChannelCreate { .. } => "textChannelCreate",
            Self::TextChannelDelete { .. } => "textChannelDelete",
            Self::VoiceNotExisting { .. } => "voiceNotExisting",
            Self::Error { .. } => "error",
        }
    }
}

/// Handle used by the manager internals to publish events.
///
/// Cheap to clone; all clones feed the same subscribers. Publishing with no
/// live subscriber is not an error.
#[derive(Debug, Clone)]
pub struct Events {
    tx: broadcast::Sender<Event>,
}

impl Events {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    /// Open a new subscription. Only events published after this call are
    /// observed.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: Event) {
        debug!(event = event.name(), "emit");
        // A send error only means there is no subscriber right now.
        let _ = self.tx.send(event);
    }

    /// Report an operational failure through the feed.
    pub fn error(&self, code: &'static str, message: impl Into<String>) {
        self.emit(Event::Error { code, message: message.into() });
    }
}

impl Default for Events {
    fn default() -> Self {
        Self::new()
    }
}
