//! Lifecycle manager for ephemeral per-user voice channels in a chat guild.
//!
//! A member joining a registered "parent" voice channel gets a dedicated
//! "child" channel provisioned and is moved into it; the child is reclaimed
//! when it empties out or its owner departs, per the parent's options. After
//! a restart, the registry of live children is rebuilt by pattern-matching
//! existing platform state (channel names plus the owner permission
//! overwrite stamped at creation).
//!
//! The crate talks to the hosting chat platform only through the
//! [`Platform`] trait; the host implements it over its own client binding,
//! forwards gateway notifications to the manager's intake methods, and
//! observes every state transition through the [`Event`] feed.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use tempchannels::{ParentChannelOptions, Platform, TempChannelsManager};
//! # async fn example(platform: Arc<dyn Platform>) {
//! let manager = Arc::new(TempChannelsManager::new(platform).expect("intents"));
//! let mut events = manager.subscribe();
//! manager.register_channel("voice-lobby", ParentChannelOptions::default());
//! while let Ok(event) = events.recv().await {
//!     println!("{}", event.name());
//! }
//! # }
//! ```

mod error;
mod events;
mod handlers;
mod manager;
mod naming;
mod options;
mod platform;
mod state;

pub use error::ManagerError;
pub use events::{Event, Events};
pub use manager::{TempChannelsManager, TextToggleContext, VoiceStateUpdate};
pub use naming::NamingPolicy;
pub use options::ParentChannelOptions;
pub use platform::{
    ChannelId, ChannelInfo, ChannelKind, CreateTextChannel, CreateVoiceChannel, Intents, Member,
    MemberId, OverwriteKind, OverwriteSubject, Permission, PermissionOverwrite, Platform,
    PlatformError,
};
pub use state::{ChannelRef, ChildChannel, ParentChannel};
