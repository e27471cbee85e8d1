//! The on-demand text/thread toggle.

use tracing::info;

use crate::events::Event;
use crate::manager::{TempChannelsManager, TextToggleContext};
use crate::platform::{CreateTextChannel, OverwriteSubject, Permission, PermissionOverwrite};
use crate::state::ChannelRef;

/// Toggle the linked text channel of the invoking member's owned child.
///
/// This is an explicit toggle, not idempotent creation: no link means create
/// one, an existing link means delete it. A member who owns no tracked child
/// gets a `VoiceNotExisting` event instead.
pub(crate) async fn handle_text_toggle(mgr: &TempChannelsManager, ctx: TextToggleContext) {
    let Some(voice_id) = ctx.voice_channel.clone() else {
        mgr.events.emit(Event::VoiceNotExisting { member: ctx.member });
        return;
    };
    let Some((parent, child)) = mgr.registry.find_by_voice(&voice_id) else {
        mgr.events.emit(Event::VoiceNotExisting { member: ctx.member });
        return;
    };
    if child.owner.id != ctx.member.id {
        mgr.events.emit(Event::VoiceNotExisting { member: ctx.member });
        return;
    }

    if let Some(text) = &child.text_channel {
        match mgr.platform.delete_channel(&text.id).await {
            Ok(()) => {
                mgr.registry.set_text_channel(&parent.channel_id, &voice_id, None);
                info!(channel = %text.id, owner = %ctx.member.id, "text channel removed");
                mgr.events.emit(Event::TextChannelDelete { channel_id: text.id.clone() });
            }
            Err(err) => mgr.events.error(
                err.error_code(),
                format!("cannot delete text channel {}: {err}", text.id),
            ),
        }
        return;
    }

    let Some(count) = parent.child_index(&voice_id) else {
        return;
    };
    let name = parent.options.child_text_naming.format(&child.owner.display_name, count);

    let created = if let Some(thread_parent) = &parent.options.text_channel_as_thread_parent {
        match mgr
            .platform
            .create_thread(thread_parent, &name, parent.options.thread_archive_duration)
            .await
        {
            Ok(info) => {
                if let Err(err) =
                    mgr.platform.add_thread_member(&info.id, &ctx.member.id).await
                {
                    mgr.events.error(
                        err.error_code(),
                        format!("cannot add member {} to thread {}: {err}", ctx.member.id, info.id),
                    );
                }
                Ok(info)
            }
            Err(err) => Err(err),
        }
    } else {
        mgr.platform
            .create_text_channel(CreateTextChannel {
                name: name.clone(),
                category: parent.options.child_category.clone(),
                overwrites: vec![PermissionOverwrite::allow(
                    OverwriteSubject::member(ctx.member.id.clone()),
                    vec![Permission::ManageChannels],
                )],
            })
            .await
    };

    match created {
        Ok(info) => {
            let link = ChannelRef::new(info.id.clone(), info.name.clone());
            if !mgr.registry.set_text_channel(&parent.channel_id, &voice_id, Some(link)) {
                // The child was evicted mid-creation; don't leak the channel.
                if let Err(err) = mgr.platform.delete_channel(&info.id).await {
                    mgr.events.error(
                        err.error_code(),
                        format!("cannot delete orphaned text channel {}: {err}", info.id),
                    );
                }
                return;
            }
            info!(channel = %info.id, owner = %ctx.member.id, "text channel created");
            mgr.events.emit(Event::TextChannelCreate { channel_id: info.id });
        }
        Err(err) => mgr.events.error(
            err.error_code(),
            format!("cannot create text channel for {voice_id}: {err}"),
        ),
    }
}
