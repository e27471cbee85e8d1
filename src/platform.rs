//! The guild platform boundary.
//!
//! Everything the manager needs from the hosting chat platform is expressed
//! through the [`Platform`] trait: channel creation/deletion/renaming,
//! permission overwrite edits, member moves, and cached/fetched lookups.
//! The host application implements this trait over its own client binding;
//! the manager never talks to the network directly.

use async_trait::async_trait;
use thiserror::Error;

/// Stable external identifier of a guild channel.
pub type ChannelId = String;

/// Stable external identifier of a guild member.
pub type MemberId = String;

/// Errors arising from external platform calls.
///
/// These are never propagated past a lifecycle handler; they are caught at
/// the call site and surfaced through [`Event::Error`](crate::events::Event).
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("no such channel: {0}")]
    ChannelNotFound(ChannelId),

    #[error("no such member: {0}")]
    MemberNotFound(MemberId),

    #[error("missing permission: {0}")]
    PermissionDenied(String),

    #[error("platform api error: {0}")]
    Api(String),
}

impl PlatformError {
    /// Get a static error code string for logging.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ChannelNotFound(_) => "channel_not_found",
            Self::MemberNotFound(_) => "member_not_found",
            Self::PermissionDenied(_) => "permission_denied",
            Self::Api(_) => "api_error",
        }
    }
}

/// The kind of a guild channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Voice,
    Text,
    Category,
    Thread,
}

/// Whether a permission overwrite targets a single member or a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverwriteKind {
    Member,
    Role,
}

/// The subject of a permission overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverwriteSubject {
    pub id: String,
    pub kind: OverwriteKind,
}

impl OverwriteSubject {
    pub fn member(id: impl Into<String>) -> Self {
        Self { id: id.into(), kind: OverwriteKind::Member }
    }

    pub fn role(id: impl Into<String>) -> Self {
        Self { id: id.into(), kind: OverwriteKind::Role }
    }
}

/// The subset of channel permissions the manager grants or copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ManageChannels,
    ViewChannel,
    Connect,
    Speak,
    SendMessages,
}

/// A permission overwrite as it exists on a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionOverwrite {
    pub subject: OverwriteSubject,
    pub allow: Vec<Permission>,
    pub deny: Vec<Permission>,
}

impl PermissionOverwrite {
    /// Convenience constructor for an allow-only overwrite.
    pub fn allow(subject: OverwriteSubject, allow: Vec<Permission>) -> Self {
        Self { subject, allow, deny: Vec::new() }
    }
}

/// A guild member, as resolved by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, display_name: impl Into<String>) -> Self {
        Self { id: id.into(), display_name: display_name.into() }
    }
}

/// A snapshot of a guild channel as the platform sees it.
#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
    pub kind: ChannelKind,
    /// The category the channel is nested under, if any.
    pub category: Option<ChannelId>,
    /// Members currently connected to (voice) or part of (thread) the channel.
    pub members: Vec<MemberId>,
    pub overwrites: Vec<PermissionOverwrite>,
}

impl ChannelInfo {
    /// First member-type overwrite subject, if any.
    ///
    /// A member-type overwrite is the signal that a channel was provisioned
    /// by this manager with an owner grant.
    pub fn member_overwrite_subject(&self) -> Option<&str> {
        self.overwrites
            .iter()
            .find(|o| o.subject.kind == OverwriteKind::Member)
            .map(|o| o.subject.id.as_str())
    }
}

/// Gateway intents granted to the host's client connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intents {
    pub guilds: bool,
    pub guild_voice_states: bool,
}

/// Request to create a fresh voice channel.
#[derive(Debug, Clone)]
pub struct CreateVoiceChannel {
    pub name: String,
    pub category: Option<ChannelId>,
    pub bitrate: Option<u32>,
    pub user_limit: Option<u32>,
    /// Overwrites applied at creation (inherited from the target category).
    pub overwrites: Vec<PermissionOverwrite>,
}

/// Request to create a fresh text channel.
#[derive(Debug, Clone)]
pub struct CreateTextChannel {
    pub name: String,
    pub category: Option<ChannelId>,
    pub overwrites: Vec<PermissionOverwrite>,
}

/// Asynchronous operations the manager needs from the hosting platform.
///
/// Every method may suspend while awaiting the network and may fail; the
/// manager treats each call as at-most-once and never retries (see the
/// error policy on [`PlatformError`]).
#[async_trait]
pub trait Platform: Send + Sync {
    /// Gateway intents the underlying client connection was opened with.
    fn intents(&self) -> Intents;

    /// The bot's own member identity, used as the fallback owner during
    /// recovery when no real owner can be resolved.
    fn current_user(&self) -> Member;

    /// Resolve a channel by id. `Ok(None)` means the channel does not exist.
    async fn fetch_channel(&self, id: &str) -> Result<Option<ChannelInfo>, PlatformError>;

    /// List the channels nested under `category`, or every guild channel
    /// when `category` is `None`.
    async fn list_channels(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<ChannelInfo>, PlatformError>;

    /// Resolve a member by id. `Ok(None)` means the member is not in the guild.
    async fn fetch_member(&self, id: &str) -> Result<Option<Member>, PlatformError>;

    async fn create_voice_channel(
        &self,
        req: CreateVoiceChannel,
    ) -> Result<ChannelInfo, PlatformError>;

    async fn create_text_channel(
        &self,
        req: CreateTextChannel,
    ) -> Result<ChannelInfo, PlatformError>;

    /// Create a thread under an existing text channel.
    async fn create_thread(
        &self,
        parent: &str,
        name: &str,
        auto_archive_minutes: u16,
    ) -> Result<ChannelInfo, PlatformError>;

    async fn add_thread_member(
        &self,
        thread: &str,
        member: &str,
    ) -> Result<(), PlatformError>;

    /// Clone an existing channel, keeping its settings but with a new name.
    async fn clone_channel(
        &self,
        source: &str,
        name: &str,
    ) -> Result<ChannelInfo, PlatformError>;

    async fn delete_channel(&self, id: &str) -> Result<(), PlatformError>;

    async fn rename_channel(&self, id: &str, name: &str) -> Result<(), PlatformError>;

    /// Grant `allow` permissions to `subject` on `channel`, merging with any
    /// existing overwrite for that subject.
    async fn edit_permission_overwrite(
        &self,
        channel: &str,
        subject: &OverwriteSubject,
        allow: Vec<Permission>,
    ) -> Result<(), PlatformError>;

    /// Move a member into a voice channel.
    async fn move_member(
        &self,
        member: &str,
        channel: &str,
    ) -> Result<(), PlatformError>;
}
