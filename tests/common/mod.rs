//! In-memory guild platform used to drive the manager in integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use tempchannels::{
    ChannelId, ChannelInfo, ChannelKind, CreateTextChannel, CreateVoiceChannel, Event, Intents,
    Member, OverwriteSubject, Permission, PermissionOverwrite, Platform, PlatformError,
    TempChannelsManager, VoiceStateUpdate,
};

#[derive(Default)]
struct GuildState {
    channels: HashMap<ChannelId, ChannelInfo>,
    members: HashMap<String, Member>,
    next_id: u64,
    renames: Vec<(ChannelId, String)>,
    moves: Vec<(String, ChannelId)>,
    fail_deletes: Vec<ChannelId>,
}

/// A fake guild: channels, members and the call log the tests assert on.
pub struct MockGuild {
    state: Mutex<GuildState>,
    bot: Member,
    intents: Intents,
}

impl MockGuild {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(GuildState::default()),
            bot: Member::new("bot", "bot"),
            intents: Intents { guilds: true, guild_voice_states: true },
        })
    }

    pub fn without_voice_intent() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(GuildState::default()),
            bot: Member::new("bot", "bot"),
            intents: Intents { guilds: true, guild_voice_states: false },
        })
    }

    pub fn add_member(&self, id: &str, display_name: &str) -> Member {
        let member = Member::new(id, display_name);
        self.state.lock().members.insert(id.to_string(), member.clone());
        member
    }

    pub fn add_channel(&self, id: &str, name: &str, kind: ChannelKind, category: Option<&str>) {
        let info = ChannelInfo {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            category: category.map(str::to_string),
            members: Vec::new(),
            overwrites: Vec::new(),
        };
        self.state.lock().channels.insert(id.to_string(), info);
    }

    /// Add a channel that looks like one the manager provisioned: it carries
    /// a member-type overwrite granting the owner ManageChannels.
    pub fn add_owned_channel(
        &self,
        id: &str,
        name: &str,
        kind: ChannelKind,
        category: Option<&str>,
        owner_id: &str,
    ) {
        self.add_channel(id, name, kind, category);
        let mut state = self.state.lock();
        let channel = state.channels.get_mut(id).expect("just inserted");
        channel.overwrites.push(PermissionOverwrite::allow(
            OverwriteSubject::member(owner_id),
            vec![Permission::ManageChannels],
        ));
    }

    /// Put a member into a voice channel (platform-side state only).
    pub fn join(&self, member_id: &str, channel_id: &str) {
        let mut state = self.state.lock();
        for channel in state.channels.values_mut() {
            channel.members.retain(|m| m != member_id);
        }
        if let Some(channel) = state.channels.get_mut(channel_id) {
            channel.members.push(member_id.to_string());
        }
    }

    /// Remove a member from whatever voice channel they are in.
    pub fn leave(&self, member_id: &str) {
        let mut state = self.state.lock();
        for channel in state.channels.values_mut() {
            channel.members.retain(|m| m != member_id);
        }
    }

    pub fn channel(&self, id: &str) -> Option<ChannelInfo> {
        self.state.lock().channels.get(id).cloned()
    }

    pub fn channel_by_name(&self, name: &str) -> Option<ChannelInfo> {
        self.state.lock().channels.values().find(|c| c.name == name).cloned()
    }

    /// Apply an out-of-band rename, as another guild admin would.
    pub fn set_name(&self, id: &str, name: &str) {
        if let Some(channel) = self.state.lock().channels.get_mut(id) {
            channel.name = name.to_string();
        }
    }

    /// Drop a channel without going through the manager, as an external
    /// deletion would.
    pub fn remove_channel(&self, id: &str) {
        self.state.lock().channels.remove(id);
    }

    pub fn channel_count(&self) -> usize {
        self.state.lock().channels.len()
    }

    /// The single channel whose id is not in `known`, i.e. the one the
    /// manager just created.
    pub fn created_channel(&self, known: &[&str]) -> ChannelInfo {
        let state = self.state.lock();
        let mut created: Vec<_> =
            state.channels.values().filter(|c| !known.contains(&c.id.as_str())).collect();
        assert_eq!(created.len(), 1, "expected exactly one created channel");
        created.pop().unwrap().clone()
    }

    pub fn renames(&self) -> Vec<(ChannelId, String)> {
        self.state.lock().renames.clone()
    }

    pub fn moves(&self) -> Vec<(String, ChannelId)> {
        self.state.lock().moves.clone()
    }

    /// Make the next delete of this channel fail with an API error.
    pub fn fail_delete(&self, channel_id: &str) {
        self.state.lock().fail_deletes.push(channel_id.to_string());
    }

    fn fresh_id(state: &mut GuildState, prefix: &str) -> ChannelId {
        state.next_id += 1;
        format!("{prefix}{}", state.next_id)
    }
}

#[async_trait]
impl Platform for MockGuild {
    fn intents(&self) -> Intents {
        self.intents
    }

    fn current_user(&self) -> Member {
        self.bot.clone()
    }

    async fn fetch_channel(&self, id: &str) -> Result<Option<ChannelInfo>, PlatformError> {
        Ok(self.state.lock().channels.get(id).cloned())
    }

    async fn list_channels(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<ChannelInfo>, PlatformError> {
        let state = self.state.lock();
        let mut channels: Vec<_> = state
            .channels
            .values()
            .filter(|c| category.is_none() || c.category.as_deref() == category)
            .cloned()
            .collect();
        channels.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(channels)
    }

    async fn fetch_member(&self, id: &str) -> Result<Option<Member>, PlatformError> {
        Ok(self.state.lock().members.get(id).cloned())
    }

    async fn create_voice_channel(
        &self,
        req: CreateVoiceChannel,
    ) -> Result<ChannelInfo, PlatformError> {
        let mut state = self.state.lock();
        let id = Self::fresh_id(&mut state, "voice-");
        let info = ChannelInfo {
            id: id.clone(),
            name: req.name,
            kind: ChannelKind::Voice,
            category: req.category,
            members: Vec::new(),
            overwrites: req.overwrites,
        };
        state.channels.insert(id, info.clone());
        Ok(info)
    }

    async fn create_text_channel(
        &self,
        req: CreateTextChannel,
    ) -> Result<ChannelInfo, PlatformError> {
        let mut state = self.state.lock();
        let id = Self::fresh_id(&mut state, "text-");
        let info = ChannelInfo {
            id: id.clone(),
            name: req.name,
            kind: ChannelKind::Text,
            category: req.category,
            members: Vec::new(),
            overwrites: req.overwrites,
        };
        state.channels.insert(id, info.clone());
        Ok(info)
    }

    async fn create_thread(
        &self,
        parent: &str,
        name: &str,
        _auto_archive_minutes: u16,
    ) -> Result<ChannelInfo, PlatformError> {
        let mut state = self.state.lock();
        if !state.channels.contains_key(parent) {
            return Err(PlatformError::ChannelNotFound(parent.to_string()));
        }
        let id = Self::fresh_id(&mut state, "thread-");
        let info = ChannelInfo {
            id: id.clone(),
            name: name.to_string(),
            kind: ChannelKind::Thread,
            category: Some(parent.to_string()),
            members: Vec::new(),
            overwrites: Vec::new(),
        };
        state.channels.insert(id, info.clone());
        Ok(info)
    }

    async fn add_thread_member(&self, thread: &str, member: &str) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        let channel = state
            .channels
            .get_mut(thread)
            .ok_or_else(|| PlatformError::ChannelNotFound(thread.to_string()))?;
        channel.members.push(member.to_string());
        Ok(())
    }

    async fn clone_channel(&self, source: &str, name: &str) -> Result<ChannelInfo, PlatformError> {
        let mut state = self.state.lock();
        let template = state
            .channels
            .get(source)
            .cloned()
            .ok_or_else(|| PlatformError::ChannelNotFound(source.to_string()))?;
        let id = Self::fresh_id(&mut state, "clone-");
        let info = ChannelInfo {
            id: id.clone(),
            name: name.to_string(),
            kind: template.kind,
            category: template.category,
            members: Vec::new(),
            overwrites: template.overwrites,
        };
        state.channels.insert(id, info.clone());
        Ok(info)
    }

    async fn delete_channel(&self, id: &str) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        if let Some(pos) = state.fail_deletes.iter().position(|c| c == id) {
            state.fail_deletes.remove(pos);
            return Err(PlatformError::Api(format!("delete of {id} refused")));
        }
        state
            .channels
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| PlatformError::ChannelNotFound(id.to_string()))
    }

    async fn rename_channel(&self, id: &str, name: &str) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        let channel = state
            .channels
            .get_mut(id)
            .ok_or_else(|| PlatformError::ChannelNotFound(id.to_string()))?;
        channel.name = name.to_string();
        state.renames.push((id.to_string(), name.to_string()));
        Ok(())
    }

    async fn edit_permission_overwrite(
        &self,
        channel: &str,
        subject: &OverwriteSubject,
        allow: Vec<Permission>,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        let channel = state
            .channels
            .get_mut(channel)
            .ok_or_else(|| PlatformError::ChannelNotFound(channel.to_string()))?;
        if let Some(existing) = channel.overwrites.iter_mut().find(|o| &o.subject == subject) {
            for perm in allow {
                if !existing.allow.contains(&perm) {
                    existing.allow.push(perm);
                }
            }
        } else {
            channel.overwrites.push(PermissionOverwrite::allow(subject.clone(), allow));
        }
        Ok(())
    }

    async fn move_member(&self, member: &str, channel: &str) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        if !state.channels.contains_key(channel) {
            return Err(PlatformError::ChannelNotFound(channel.to_string()));
        }
        for c in state.channels.values_mut() {
            c.members.retain(|m| m != member);
        }
        state
            .channels
            .get_mut(channel)
            .expect("checked above")
            .members
            .push(member.to_string());
        state.moves.push((member.to_string(), channel.to_string()));
        Ok(())
    }
}

/// Build a manager over the mock guild.
pub fn manager(guild: &Arc<MockGuild>) -> Arc<TempChannelsManager> {
    let platform: Arc<dyn Platform> = guild.clone();
    Arc::new(TempChannelsManager::new(platform).expect("intents are granted"))
}

/// Collect every event published so far.
pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

pub fn join(member: &Member, channel: &str) -> VoiceStateUpdate {
    VoiceStateUpdate {
        member: member.clone(),
        old_channel: None,
        new_channel: Some(channel.to_string()),
    }
}

pub fn leave(member: &Member, channel: &str) -> VoiceStateUpdate {
    VoiceStateUpdate {
        member: member.clone(),
        old_channel: Some(channel.to_string()),
        new_channel: None,
    }
}

pub fn switch(member: &Member, from: &str, to: &str) -> VoiceStateUpdate {
    VoiceStateUpdate {
        member: member.clone(),
        old_channel: Some(from.to_string()),
        new_channel: Some(to.to_string()),
    }
}
