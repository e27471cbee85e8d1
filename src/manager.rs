//! The temporary channels manager: public API and gateway intake.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, broadcast};
use tracing::info;

use crate::error::ManagerError;
use crate::events::{Event, Events};
use crate::handlers;
use crate::options::ParentChannelOptions;
use crate::platform::{ChannelId, Member, Platform};
use crate::state::Registry;

/// A member's voice-state change, as reported by the host's gateway binding.
///
/// `old_channel`/`new_channel` are the channels the member was in before and
/// after the change; a move shows up as two different `Some` values.
#[derive(Debug, Clone)]
pub struct VoiceStateUpdate {
    pub member: Member,
    pub old_channel: Option<ChannelId>,
    pub new_channel: Option<ChannelId>,
}

/// Context of a text-toggle invocation (a slash command or message), carrying
/// the invoking member and the voice channel they currently sit in.
#[derive(Debug, Clone)]
pub struct TextToggleContext {
    pub member: Member,
    pub voice_channel: Option<ChannelId>,
}

/// Lifecycle manager for ephemeral per-user voice channels.
///
/// The host registers parent channels, forwards its gateway notifications to
/// the `voice_state_update` / `channel_update` / `channel_delete` intake
/// methods, and observes the resulting transitions through [`subscribe`].
/// It never touches the registry directly.
///
/// [`subscribe`]: TempChannelsManager::subscribe
pub struct TempChannelsManager {
    pub(crate) platform: Arc<dyn Platform>,
    pub(crate) registry: Registry,
    pub(crate) events: Events,
    recovery_locks: DashMap<ChannelId, Arc<Mutex<()>>>,
}

impl TempChannelsManager {
    /// Build a manager over the host's platform binding.
    ///
    /// Fails when the underlying client connection lacks the gateway intents
    /// the manager depends on; nothing else is fatal after this point.
    pub fn new(platform: Arc<dyn Platform>) -> Result<Self, ManagerError> {
        let intents = platform.intents();
        if !intents.guilds {
            return Err(ManagerError::MissingGuildsIntent);
        }
        if !intents.guild_voice_states {
            return Err(ManagerError::MissingVoiceStatesIntent);
        }

        let events = Events::new();
        Ok(Self {
            registry: Registry::new(events.clone()),
            events,
            platform,
            recovery_locks: DashMap::new(),
        })
    }

    /// Open a subscription to the domain event feed.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Register a parent channel: from now on a member joining it gets a
    /// dedicated child channel.
    ///
    /// Synchronous and idempotent; re-registering the same id replaces the
    /// options snapshot. Recovery of surviving children runs on a background
    /// task (must be called within a Tokio runtime); use [`recover`] when
    /// completion needs to be awaited.
    ///
    /// [`recover`]: TempChannelsManager::recover
    pub fn register_channel(
        self: &Arc<Self>,
        channel_id: impl Into<ChannelId>,
        options: ParentChannelOptions,
    ) {
        let channel_id = channel_id.into();
        // A channel id can never be a parent key and a child's voice channel
        // at the same time.
        if self.registry.find_by_voice(&channel_id).is_some() {
            self.events.error(
                "channel_is_a_child",
                format!("channel {channel_id} is a tracked child and cannot become a parent"),
            );
            return;
        }

        self.registry.register(channel_id.clone(), options);
        let mgr = Arc::clone(self);
        tokio::spawn(async move {
            handlers::register::restore_after_crash(&mgr, &channel_id).await;
        });
    }

    /// Run (or re-run) the recovery pass for a registered parent and wait for
    /// it to finish. Concurrent passes for the same parent are serialized.
    pub async fn recover(&self, channel_id: &str) {
        handlers::register::restore_after_crash(self, channel_id).await;
    }

    /// Unregister a parent channel. Children are cascade-deleted when the
    /// parent was registered with `child_auto_delete_if_parent_gets_unregistered`;
    /// otherwise their channels are left alone and only the bindings drop.
    ///
    /// Unregistering an unknown id is not fatal: it reports an `Error` event
    /// and returns false.
    pub async fn unregister_channel(&self, channel_id: &str) -> bool {
        let Some(parent) = self.registry.unregister(channel_id) else {
            self.events.error(
                "unknown_parent",
                format!("could not unregister the channel with the id {channel_id}"),
            );
            return false;
        };
        self.drop_recovery_lock(channel_id);

        if parent.options.child_auto_delete_if_parent_gets_unregistered {
            for child in &parent.children {
                handlers::voice_state::delete_child_channels(self, channel_id, child).await;
            }
            info!(
                channel = %channel_id,
                children = parent.children.len(),
                "cascade-deleted children of unregistered parent"
            );
        }
        true
    }

    /// Gateway intake: a member's voice state changed.
    pub async fn voice_state_update(&self, update: VoiceStateUpdate) {
        handlers::voice_state::handle_voice_state_update(self, update).await;
    }

    /// Gateway intake: a channel was renamed.
    pub async fn channel_update(&self, channel_id: &str, old_name: &str, new_name: &str) {
        handlers::channel_update::handle_channel_update(self, channel_id, old_name, new_name).await;
    }

    /// Gateway intake: a channel was deleted.
    pub async fn channel_delete(&self, channel_id: &str) {
        handlers::channel_delete::handle_channel_delete(self, channel_id).await;
    }

    /// Command intake: toggle the text channel of the invoker's owned child.
    pub async fn toggle_text_channel(&self, ctx: TextToggleContext) {
        handlers::text_toggle::handle_text_toggle(self, ctx).await;
    }

    pub(crate) fn recovery_lock(&self, parent_id: &str) -> Arc<Mutex<()>> {
        self.recovery_locks
            .entry(parent_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Forget the recovery lock of a parent that is no longer registered.
    /// An in-flight pass keeps its own handle; re-registration creates a
    /// fresh lock.
    pub(crate) fn drop_recovery_lock(&self, parent_id: &str) {
        self.recovery_locks.remove(parent_id);
    }
}
