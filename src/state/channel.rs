//! Parent and child entry types.

use crate::options::ParentChannelOptions;
use crate::platform::{ChannelId, Member};

/// A lightweight handle to a platform channel: its id plus the last name the
/// manager saw for it. The name is what the naming counter is parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub id: ChannelId,
    pub name: String,
}

impl ChannelRef {
    pub fn new(id: impl Into<ChannelId>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// One registered parent channel and its live children.
#[derive(Debug, Clone)]
pub struct ParentChannel {
    pub channel_id: ChannelId,
    /// Configuration snapshot; immutable after registration.
    pub options: ParentChannelOptions,
    /// Insertion order is creation order.
    pub children: Vec<ChildChannel>,
}

impl ParentChannel {
    pub fn new(channel_id: ChannelId, options: ParentChannelOptions) -> Self {
        Self { channel_id, options, children: Vec::new() }
    }

    /// Look up a child by its voice channel id.
    pub fn child_by_voice(&self, voice_id: &str) -> Option<&ChildChannel> {
        self.children.iter().find(|c| c.voice_channel.id == voice_id)
    }

    /// 1-based position of a child in the creation-ordered list, used to
    /// render the canonical name when reverting a rename.
    pub fn child_index(&self, voice_id: &str) -> Option<u32> {
        self.children
            .iter()
            .position(|c| c.voice_channel.id == voice_id)
            .map(|i| i as u32 + 1)
    }
}

/// One live temporary voice channel.
///
/// `owner` is fixed at creation; `text_channel` is the only field that
/// changes afterwards.
#[derive(Debug, Clone)]
pub struct ChildChannel {
    /// The member whose join created this child (or the bot identity when
    /// recovery could not resolve a real owner).
    pub owner: Member,
    pub voice_channel: ChannelRef,
    /// Linked text channel or thread, created lazily; at most one at a time.
    pub text_channel: Option<ChannelRef>,
    /// Sequence counter the child was created with.
    pub position: u32,
}

impl ChildChannel {
    pub fn new(owner: Member, voice_channel: ChannelRef, position: u32) -> Self {
        Self { owner, voice_channel, text_channel: None, position }
    }
}
