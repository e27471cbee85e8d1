//! Voice-state transitions: child provisioning and eviction.

use tracing::{info, warn};

use crate::events::Event;
use crate::manager::{TempChannelsManager, VoiceStateUpdate};
use crate::naming;
use crate::platform::{CreateVoiceChannel, Member, OverwriteSubject, Permission, PlatformError};
use crate::state::{ChannelRef, ChildChannel};

/// React to a member's voice-state change.
///
/// A move between two channels is both a leave and a join: the eviction
/// check runs on the old channel before provisioning runs on the new one,
/// so switching between two tracked parents tears down the old child first.
pub(crate) async fn handle_voice_state_update(mgr: &TempChannelsManager, update: VoiceStateUpdate) {
    let left = update.old_channel.is_some() && update.new_channel.is_none();
    let joined = update.old_channel.is_none() && update.new_channel.is_some();
    let moved = matches!(
        (&update.old_channel, &update.new_channel),
        (Some(old), Some(new)) if old != new
    );

    if (left || moved) && let Some(old) = &update.old_channel {
        check_child_for_deletion(mgr, old).await;
    }

    if (joined || moved) && let Some(new) = &update.new_channel {
        create_child(mgr, &update.member, new).await;
    }
}

/// Evaluate the deletion policy for a tracked child and delete it if it
/// applies. Safe to call on channels that are not tracked (or no longer
/// tracked): that is a no-op.
pub(crate) async fn check_child_for_deletion(mgr: &TempChannelsManager, channel_id: &str) {
    let Some((parent, child)) = mgr.registry.find_by_voice(channel_id) else {
        return;
    };

    let info = match mgr.platform.fetch_channel(channel_id).await {
        Ok(Some(info)) => info,
        Ok(None) => {
            // Deleted externally without a notification reaching us yet.
            super::channel_delete::handle_channel_delete(mgr, channel_id).await;
            return;
        }
        Err(err) => {
            mgr.events
                .error(err.error_code(), format!("cannot inspect channel {channel_id}: {err}"));
            return;
        }
    };

    let opts = &parent.options;
    let owner_absent = !info.members.iter().any(|m| *m == child.owner.id);
    let should_delete = (opts.child_auto_delete_if_empty && info.members.is_empty())
        || (opts.child_auto_delete_if_owner_leaves && owner_absent);
    if !should_delete {
        return;
    }

    // The fetch suspended; the child may already be gone.
    if mgr.registry.find_by_voice(channel_id).is_none() {
        return;
    }

    if delete_child_channels(mgr, &parent.channel_id, &child).await {
        mgr.registry.unbind(&parent.channel_id, channel_id);
        info!(
            parent = %parent.channel_id,
            channel = %channel_id,
            owner = %child.owner.id,
            "child evicted"
        );
    }
}

/// Delete a child's channels on the platform: linked text first, then voice.
/// Emits the per-channel delete events; failures are reported and stop the
/// sequence. Returns true when the voice channel was deleted.
///
/// The text link is cleared as soon as the text channel is gone, so a voice
/// deletion failing afterwards leaves a binding the next eviction attempt
/// can still reclaim.
pub(crate) async fn delete_child_channels(
    mgr: &TempChannelsManager,
    parent_id: &str,
    child: &ChildChannel,
) -> bool {
    if let Some(text) = &child.text_channel {
        match mgr.platform.delete_channel(&text.id).await {
            Ok(()) => {
                mgr.registry.set_text_channel(parent_id, &child.voice_channel.id, None);
                mgr.events.emit(Event::TextChannelDelete { channel_id: text.id.clone() });
            }
            // Already gone, externally or on an earlier attempt.
            Err(PlatformError::ChannelNotFound(_)) => {
                mgr.registry.set_text_channel(parent_id, &child.voice_channel.id, None);
            }
            Err(err) => {
                mgr.events.error(
                    err.error_code(),
                    format!("cannot auto delete channel {}: {err}", text.id),
                );
                return false;
            }
        }
    }

    match mgr.platform.delete_channel(&child.voice_channel.id).await {
        Ok(()) => {
            mgr.events
                .emit(Event::VoiceChannelDelete { channel_id: child.voice_channel.id.clone() });
            true
        }
        Err(err) => {
            mgr.events.error(
                err.error_code(),
                format!("cannot auto delete channel {}: {err}", child.voice_channel.id),
            );
            false
        }
    }
}

/// Provision a child when a member lands in a registered parent channel.
async fn create_child(mgr: &TempChannelsManager, member: &Member, channel_id: &str) {
    let Some(parent) = mgr.registry.get(channel_id) else {
        return;
    };
    let opts = &parent.options;

    let parent_info = match mgr.platform.fetch_channel(&parent.channel_id).await {
        Ok(Some(info)) => info,
        Ok(None) => {
            warn!(channel = %parent.channel_id, "registered parent channel no longer exists");
            return;
        }
        Err(err) => {
            mgr.events.error(
                err.error_code(),
                format!("cannot resolve parent channel {}: {err}", parent.channel_id),
            );
            return;
        }
    };

    let count = naming::next_count(parent.children.iter().map(|c| c.voice_channel.name.as_str()));
    let name = opts.child_voice_naming.format(&member.display_name, count);
    let category = opts.child_category.clone().or(parent_info.category);

    let created = if opts.child_should_be_a_copy_of_parent {
        mgr.platform.clone_channel(&parent.channel_id, &name).await
    } else {
        // New children inherit the target category's overwrites.
        let inherited = match &category {
            Some(cat) => match mgr.platform.fetch_channel(cat).await {
                Ok(Some(info)) => info.overwrites,
                Ok(None) => Vec::new(),
                Err(err) => {
                    mgr.events.error(
                        err.error_code(),
                        format!("cannot resolve category {cat}: {err}"),
                    );
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        mgr.platform
            .create_voice_channel(CreateVoiceChannel {
                name: name.clone(),
                category,
                bitrate: opts.child_bitrate,
                user_limit: opts.child_max_users,
                overwrites: inherited,
            })
            .await
    };

    let voice = match created {
        Ok(info) => info,
        Err(err) => {
            mgr.events.error(
                err.error_code(),
                format!("cannot create child channel for parent {}: {err}", parent.channel_id),
            );
            return;
        }
    };
    mgr.events.emit(Event::VoiceChannelCreate { channel: voice.clone() });

    // The owner grant is what recovery keys on after a restart.
    if let Err(err) = mgr
        .platform
        .edit_permission_overwrite(
            &voice.id,
            &OverwriteSubject::member(member.id.clone()),
            vec![Permission::ManageChannels],
        )
        .await
    {
        mgr.events.error(
            err.error_code(),
            format!(
                "couldn't update the permissions of the channel {} for member {}: {err}",
                voice.id, member.id
            ),
        );
    }

    if let Some(extra) = &opts.child_permission_overwrite_options {
        for subject in &opts.child_overwrite_roles_and_users {
            if let Err(err) = mgr
                .platform
                .edit_permission_overwrite(&voice.id, subject, extra.clone())
                .await
            {
                mgr.events.error(
                    err.error_code(),
                    format!(
                        "couldn't update the permissions of the channel {} for {}: {err}",
                        voice.id, subject.id
                    ),
                );
            }
        }
    }

    // The parent may have been unregistered while the creation was in
    // flight; don't leave an orphaned channel behind.
    if !mgr.registry.is_registered(&parent.channel_id) {
        if let Err(err) = mgr.platform.delete_channel(&voice.id).await {
            mgr.events.error(
                err.error_code(),
                format!("cannot delete orphaned channel {}: {err}", voice.id),
            );
        }
        return;
    }

    let child = ChildChannel::new(
        member.clone(),
        ChannelRef::new(voice.id.clone(), voice.name.clone()),
        count,
    );
    if !mgr.registry.bind(&parent.channel_id, child) {
        return;
    }

    if let Err(err) = mgr.platform.move_member(&member.id, &voice.id).await {
        mgr.events.error(
            err.error_code(),
            format!("cannot move member {} into channel {}: {err}", member.id, voice.id),
        );
    }
    info!(
        parent = %parent.channel_id,
        channel = %voice.id,
        owner = %member.id,
        "child channel provisioned"
    );
}
