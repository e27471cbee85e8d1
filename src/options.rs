//! Per-parent configuration.

use crate::naming::NamingPolicy;
use crate::platform::{ChannelId, OverwriteSubject, Permission};

/// Configuration snapshot attached to a registered parent channel.
///
/// Options are captured at registration time and never mutated afterwards;
/// re-registering the same channel id replaces the whole snapshot.
#[derive(Debug, Clone)]
pub struct ParentChannelOptions {
    /// Category to create children under; inherits the parent's own category
    /// when absent.
    pub child_category: Option<ChannelId>,

    /// Delete a child as soon as its member count reaches zero.
    pub child_auto_delete_if_empty: bool,

    /// Delete a child when its owner is no longer present, even if other
    /// members remain.
    pub child_auto_delete_if_owner_leaves: bool,

    /// Cascade-delete all live children when the parent is unregistered.
    pub child_auto_delete_if_parent_gets_unregistered: bool,

    /// When false, any external rename that breaks the naming pattern is
    /// reverted. Note that allowing renames means recovery can no longer
    /// recognize renamed children after a restart.
    pub child_can_be_renamed: bool,

    /// Naming pair for voice children.
    pub child_voice_naming: NamingPolicy,

    /// Naming pair for linked text channels or threads.
    pub child_text_naming: NamingPolicy,

    /// User limit applied at creation; ignored when cloning the parent.
    pub child_max_users: Option<u32>,

    /// Bitrate applied at creation; ignored when cloning the parent.
    pub child_bitrate: Option<u32>,

    /// Extra permission grant applied to each subject in
    /// [`child_overwrite_roles_and_users`](Self::child_overwrite_roles_and_users).
    pub child_permission_overwrite_options: Option<Vec<Permission>>,

    /// Roles and users receiving the extra grant on every new child.
    pub child_overwrite_roles_and_users: Vec<OverwriteSubject>,

    /// Clone the parent channel instead of building a child from scratch.
    /// Only the name is customized; bitrate and user limit are ignored.
    pub child_should_be_a_copy_of_parent: bool,

    /// When set, the linked "text channel" is a thread under this fixed
    /// text channel rather than a real channel.
    pub text_channel_as_thread_parent: Option<ChannelId>,

    /// Auto-archive duration, in minutes, for thread-backed text channels.
    pub thread_archive_duration: u16,

    /// Seed list of channel ids to re-adopt during recovery, on top of the
    /// category scan. Typically loaded from the host's own storage.
    pub list_channel_to_restore: Vec<ChannelId>,
}

impl Default for ParentChannelOptions {
    fn default() -> Self {
        Self {
            child_category: None,
            child_auto_delete_if_empty: true,
            child_auto_delete_if_owner_leaves: false,
            child_auto_delete_if_parent_gets_unregistered: false,
            child_can_be_renamed: false,
            child_voice_naming: NamingPolicy::default_voice(),
            child_text_naming: NamingPolicy::default_text(),
            child_max_users: None,
            child_bitrate: None,
            child_permission_overwrite_options: Some(vec![Permission::ManageChannels]),
            child_overwrite_roles_and_users: Vec::new(),
            child_should_be_a_copy_of_parent: false,
            text_channel_as_thread_parent: None,
            thread_archive_duration: 60,
            list_channel_to_restore: Vec::new(),
        }
    }
}
