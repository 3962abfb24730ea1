mod discord;

#[cfg(test)]
pub mod fake;

use std::time::Duration;

use async_trait::async_trait;
use poise::serenity_prelude::{MessageId, RoleId, UserId};
use thiserror::Error;

use crate::models::RankedSubmission;

pub use discord::DiscordPlatform;

/// Outcome of a failed platform call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Not found")]
    NotFound,
    #[error("Timed out")]
    Timeout,
    #[error("{0}")]
    Transient(String),
}

pub type PlatformResult<T> = Result<T, PlatformError>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub id: UserId,
    pub display: String,
    pub bot: bool,
}

/// A message posted in the tracked channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelMessage {
    pub id: MessageId,
    pub author: Author,
    pub content: String,
    pub attachments: usize,
    pub link: String,
    /// Someone reacted to the message with the tracked emoji.
    pub has_tracked_reaction: bool,
    /// The bot itself reacted to the message with the tracked emoji.
    pub bot_reacted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reactor {
    pub id: UserId,
    pub bot: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberInfo {
    pub bot: bool,
    pub roles: Vec<RoleId>,
}

impl MemberInfo {
    pub fn has_role(&self, role: RoleId) -> bool {
        self.roles.contains(&role)
    }
}

/// Chat platform operations scoped to the tracked channel and its guild.
///
/// Every call either succeeds or reports whether the target is gone ([`PlatformError::NotFound`])
/// or the call failed for another reason.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn fetch_message(&self, id: MessageId) -> PlatformResult<ChannelMessage>;

    /// The newest `limit` messages of the channel, newest first.
    async fn recent_messages(&self, limit: u8) -> PlatformResult<Vec<ChannelMessage>>;

    async fn delete_message(&self, id: MessageId) -> PlatformResult<()>;

    async fn add_tracked_reaction(&self, id: MessageId) -> PlatformResult<()>;

    /// Everyone who reacted to the message with the tracked emoji, bots included.
    async fn tracked_reactors(&self, id: MessageId) -> PlatformResult<Vec<Reactor>>;

    async fn member(&self, user: UserId) -> PlatformResult<MemberInfo>;

    async fn add_role(&self, user: UserId, role: RoleId) -> PlatformResult<()>;

    async fn remove_role(&self, user: UserId, role: RoleId) -> PlatformResult<()>;

    /// Posts a notice that removes itself after `ttl`.
    async fn send_notice(&self, content: String, ttl: Duration) -> PlatformResult<()>;

    async fn send_leaderboard(&self, entries: &[RankedSubmission]) -> PlatformResult<()>;
}
