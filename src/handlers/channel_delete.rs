//! Cleanup after external channel deletions.

use tracing::info;

use crate::events::Event;
use crate::manager::TempChannelsManager;

/// React to a channel deletion reported by the platform.
///
/// Three cases, checked in order:
/// - a registered parent: implicit unregistration, no cascade (the channel
///   itself is already gone, only the registry entry is dropped);
/// - a child's voice channel: delete the linked text channel if any, then
///   drop the binding;
/// - a child's linked text channel: clear the link, leave the child alone.
pub(crate) async fn handle_channel_delete(mgr: &TempChannelsManager, channel_id: &str) {
    if mgr.registry.is_registered(channel_id) {
        info!(channel = %channel_id, "parent channel deleted externally, unregistering");
        mgr.registry.unregister(channel_id);
        mgr.drop_recovery_lock(channel_id);
        return;
    }

    let Some((parent, child)) = mgr.registry.find_by_any(channel_id) else {
        return;
    };

    if child.text_channel.as_ref().is_some_and(|t| t.id == channel_id) {
        if mgr.registry.set_text_channel(&parent.channel_id, &child.voice_channel.id, None) {
            mgr.events.emit(Event::TextChannelDelete { channel_id: channel_id.to_string() });
        }
        return;
    }

    // The voice channel is gone; cascade onto the text link and unbind.
    if let Some(text) = &child.text_channel {
        match mgr.platform.delete_channel(&text.id).await {
            Ok(()) => mgr.events.emit(Event::TextChannelDelete { channel_id: text.id.clone() }),
            Err(err) => mgr.events.error(
                err.error_code(),
                format!("cannot delete text channel {}: {err}", text.id),
            ),
        }
    }
    mgr.events.emit(Event::VoiceChannelDelete { channel_id: channel_id.to_string() });
    mgr.registry.unbind(&parent.channel_id, channel_id);
}
