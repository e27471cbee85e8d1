//! The Registry: the authoritative parent -> children mapping.
//!
//! All mutation is synchronous; handlers never hold a map guard across an
//! await. The Registry owns its entries exclusively: lifecycle and recovery
//! code go through these accessors, never through the map itself.

use dashmap::DashMap;
use tracing::debug;

use crate::events::{Event, Events};
use crate::options::ParentChannelOptions;
use crate::platform::ChannelId;
use crate::state::{ChannelRef, ChildChannel, ParentChannel};

pub struct Registry {
    parents: DashMap<ChannelId, ParentChannel>,
    events: Events,
}

impl Registry {
    pub fn new(events: Events) -> Self {
        Self { parents: DashMap::new(), events }
    }

    /// Insert or overwrite a parent entry with an empty child list and emit
    /// `ChannelRegister`.
    pub fn register(&self, channel_id: ChannelId, options: ParentChannelOptions) {
        let parent = ParentChannel::new(channel_id.clone(), options);
        debug!(channel = %channel_id, "parent registered");
        self.parents.insert(channel_id, parent.clone());
        self.events.emit(Event::ChannelRegister { parent });
    }

    /// Remove a parent entry, emitting `ChannelUnregister` and one
    /// `ChildDelete` per still-bound child. Returns the removed entry so the
    /// caller can run the cascade policy; `None` means the id was unknown.
    pub fn unregister(&self, channel_id: &str) -> Option<ParentChannel> {
        let (_, parent) = self.parents.remove(channel_id)?;
        debug!(channel = %channel_id, children = parent.children.len(), "parent unregistered");
        self.events.emit(Event::ChannelUnregister { parent: parent.clone() });
        for child in &parent.children {
            self.events.emit(Event::ChildDelete {
                parent_id: parent.channel_id.clone(),
                child: child.clone(),
            });
        }
        Some(parent)
    }

    /// Snapshot of a parent entry by its channel id.
    pub fn get(&self, channel_id: &str) -> Option<ParentChannel> {
        self.parents.get(channel_id).map(|p| p.clone())
    }

    pub fn is_registered(&self, channel_id: &str) -> bool {
        self.parents.contains_key(channel_id)
    }

    /// Linear scan for the parent owning a child with this voice channel id.
    pub fn find_by_voice(&self, voice_id: &str) -> Option<(ParentChannel, ChildChannel)> {
        self.parents.iter().find_map(|entry| {
            entry.child_by_voice(voice_id).map(|c| (entry.clone(), c.clone()))
        })
    }

    /// Linear scan matching either a child's voice channel or its linked
    /// text channel. Children are indexed only by parent, so every reverse
    /// lookup goes through here.
    pub fn find_by_any(&self, channel_id: &str) -> Option<(ParentChannel, ChildChannel)> {
        self.parents.iter().find_map(|entry| {
            entry
                .children
                .iter()
                .find(|c| {
                    c.voice_channel.id == channel_id
                        || c.text_channel.as_ref().is_some_and(|t| t.id == channel_id)
                })
                .map(|c| (entry.clone(), c.clone()))
        })
    }

    /// Append a child to a parent and emit `ChildCreate`. Returns false when
    /// the parent has been unregistered in the meantime or the voice channel
    /// is already bound somewhere.
    pub fn bind(&self, parent_id: &str, child: ChildChannel) -> bool {
        if self.find_by_voice(&child.voice_channel.id).is_some() {
            debug!(channel = %child.voice_channel.id, "voice channel already bound, skipping");
            return false;
        }
        let Some(mut parent) = self.parents.get_mut(parent_id) else {
            return false;
        };
        parent.children.push(child.clone());
        drop(parent);
        debug!(parent = %parent_id, channel = %child.voice_channel.id, "child bound");
        self.events.emit(Event::ChildCreate { parent_id: parent_id.to_string(), child });
        true
    }

    /// Remove a child by voice channel id and emit `ChildDelete`. A missing
    /// child is a no-op, which makes double eviction harmless.
    pub fn unbind(&self, parent_id: &str, voice_id: &str) -> Option<ChildChannel> {
        let child = {
            let mut parent = self.parents.get_mut(parent_id)?;
            let index = parent.children.iter().position(|c| c.voice_channel.id == voice_id)?;
            parent.children.remove(index)
        };
        debug!(parent = %parent_id, channel = %voice_id, "child unbound");
        self.events.emit(Event::ChildDelete {
            parent_id: parent_id.to_string(),
            child: child.clone(),
        });
        Some(child)
    }

    /// Set or clear a child's linked text channel. Returns false when the
    /// child is no longer bound.
    pub fn set_text_channel(
        &self,
        parent_id: &str,
        voice_id: &str,
        text: Option<ChannelRef>,
    ) -> bool {
        let Some(mut parent) = self.parents.get_mut(parent_id) else {
            return false;
        };
        let Some(child) = parent.children.iter_mut().find(|c| c.voice_channel.id == voice_id)
        else {
            return false;
        };
        child.text_channel = text;
        true
    }

    /// Record a rename the manager accepted or performed, so the naming
    /// counter keeps parsing live names.
    pub fn set_channel_name(&self, parent_id: &str, channel_id: &str, name: &str) {
        if let Some(mut parent) = self.parents.get_mut(parent_id) {
            for child in parent.children.iter_mut() {
                if child.voice_channel.id == channel_id {
                    child.voice_channel.name = name.to_string();
                    return;
                }
                if let Some(text) = child.text_channel.as_mut()
                    && text.id == channel_id
                {
                    text.name = name.to_string();
                    return;
                }
            }
        }
    }
}
