//! External rename handling.

use tracing::info;

use crate::events::Event;
use crate::manager::TempChannelsManager;

/// React to a channel rename reported by the platform.
///
/// Only tracked children are of interest. A rename that still matches the
/// applicable naming pattern, or happens while `child_can_be_renamed` is set,
/// is accepted as-is; anything else is reverted to the canonical name derived
/// from the child's position in its parent's list.
pub(crate) async fn handle_channel_update(
    mgr: &TempChannelsManager,
    channel_id: &str,
    old_name: &str,
    new_name: &str,
) {
    if old_name == new_name {
        return;
    }
    let Some((parent, mut child)) = mgr.registry.find_by_any(channel_id) else {
        return;
    };

    let is_voice = child.voice_channel.id == channel_id;
    let policy = if is_voice {
        &parent.options.child_voice_naming
    } else {
        &parent.options.child_text_naming
    };

    if policy.matches(new_name) || parent.options.child_can_be_renamed {
        mgr.registry.set_channel_name(&parent.channel_id, channel_id, new_name);
        return;
    }

    let Some(count) = parent.child_index(&child.voice_channel.id) else {
        return;
    };
    let canonical = policy.format(new_name, count);

    match mgr.platform.rename_channel(channel_id, &canonical).await {
        Ok(()) => {
            mgr.registry.set_channel_name(&parent.channel_id, channel_id, &canonical);
            if is_voice {
                child.voice_channel.name = canonical.clone();
            } else if let Some(text) = child.text_channel.as_mut() {
                text.name = canonical.clone();
            }
            info!(channel = %channel_id, name = %canonical, "reverted external rename");
            mgr.events.emit(Event::ChildPrefixChange { child });
        }
        Err(err) => {
            mgr.events.error(
                err.error_code(),
                format!("cannot restore the name of channel {channel_id}: {err}"),
            );
        }
    }
}
