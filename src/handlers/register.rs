//! Recovery: rebuilding the registry from live platform state.
//!
//! Runs after every parent registration, including at process start. There
//! is no persisted child list: surviving children are recognized purely by
//! the naming pattern plus the member-type permission overwrite the manager
//! stamps on every channel it provisions (optionally topped up by the
//! `list_channel_to_restore` seeds the host supplies).

use tracing::{info, warn};

use crate::manager::TempChannelsManager;
use crate::naming;
use crate::platform::{ChannelInfo, ChannelKind, Member};
use crate::state::{ChannelRef, ChildChannel};

use super::voice_state;

pub(crate) async fn restore_after_crash(mgr: &TempChannelsManager, parent_id: &str) {
    // One recovery pass at a time per parent. A concurrent registration
    // waits here, then re-scans and finds everything already bound.
    let lock = mgr.recovery_lock(parent_id);
    let _guard = lock.lock().await;

    let Some(parent) = mgr.registry.get(parent_id) else {
        return;
    };
    let opts = parent.options.clone();

    let parent_info = match mgr.platform.fetch_channel(parent_id).await {
        Ok(Some(info)) => info,
        Ok(None) => {
            warn!(channel = %parent_id, "cannot recover: parent channel does not exist");
            return;
        }
        Err(err) => {
            mgr.events
                .error(err.error_code(), format!("cannot recover parent {parent_id}: {err}"));
            return;
        }
    };

    let bot = mgr.platform.current_user();
    let category = opts.child_category.clone().or(parent_info.category);

    let channels = match mgr.platform.list_channels(category.as_deref()).await {
        Ok(channels) => channels,
        Err(err) => {
            mgr.events.error(
                err.error_code(),
                format!("cannot scan channels while recovering parent {parent_id}: {err}"),
            );
            return;
        }
    };

    // System-created children carry a member-type overwrite (the owner
    // grant); that is what separates them from look-alike channels.
    let text_matches: Vec<&ChannelInfo> = channels
        .iter()
        .filter(|c| {
            matches!(c.kind, ChannelKind::Text | ChannelKind::Thread)
                && opts.child_text_naming.matches(&c.name)
                && c.member_overwrite_subject().is_some()
        })
        .collect();

    // One child per owner; a later scan hit replaces an earlier one.
    let mut adopted: Vec<(Member, ChannelInfo)> = Vec::new();
    let mut adopt = |owner: Member, info: ChannelInfo| {
        if let Some(slot) = adopted.iter_mut().find(|(m, _)| m.id == owner.id) {
            slot.1 = info;
        } else {
            adopted.push((owner, info));
        }
    };

    for info in channels.iter().filter(|c| {
        c.kind == ChannelKind::Voice
            && c.id != parent_id
            && opts.child_voice_naming.matches(&c.name)
            && c.member_overwrite_subject().is_some()
    }) {
        let owner = resolve_owner(mgr, info, &bot).await;
        adopt(owner, info.clone());
    }

    for seed in &opts.list_channel_to_restore {
        match mgr.platform.fetch_channel(seed).await {
            Ok(Some(info)) if info.kind == ChannelKind::Voice && info.id != parent_id => {
                let owner = resolve_owner(mgr, &info, &bot).await;
                adopt(owner, info);
            }
            Ok(_) => {}
            Err(err) => mgr
                .events
                .error(err.error_code(), format!("cannot restore channel {seed}: {err}")),
        }
    }

    let mut bound = Vec::new();
    for (index, (owner, info)) in adopted.into_iter().enumerate() {
        if mgr.registry.is_registered(&info.id) {
            continue;
        }
        let position = naming::parse_sequence(&info.name).unwrap_or(index as u32 + 1);
        let mut child =
            ChildChannel::new(owner.clone(), ChannelRef::new(info.id.clone(), info.name), position);
        if let Some(text) =
            text_matches.iter().find(|t| t.member_overwrite_subject() == Some(owner.id.as_str()))
        {
            child.text_channel = Some(ChannelRef::new(text.id.clone(), text.name.clone()));
        }
        if mgr.registry.bind(parent_id, child) {
            bound.push(info.id);
        }
    }
    info!(parent = %parent_id, children = bound.len(), "registry rebuilt from platform state");

    // Children that stopped satisfying retention policy while we were away
    // are pruned instead of kept.
    for id in &bound {
        voice_state::check_child_for_deletion(mgr, id).await;
    }
}

/// Owner of a recovered child: the subject of its member-type overwrite,
/// falling back to the bot identity when the member cannot be resolved.
async fn resolve_owner(mgr: &TempChannelsManager, info: &ChannelInfo, bot: &Member) -> Member {
    let Some(owner_id) = info.member_overwrite_subject() else {
        return bot.clone();
    };
    match mgr.platform.fetch_member(owner_id).await {
        Ok(Some(member)) => member,
        Ok(None) => bot.clone(),
        Err(err) => {
            mgr.events.error(
                err.error_code(),
                format!("cannot resolve owner {owner_id} of channel {}: {err}", info.id),
            );
            bot.clone()
        }
    }
}
