use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use poise::serenity_prelude::{
    ChannelId, CreateMessage, GuildId, Http, Message, MessageId, ReactionType,
    RoleId, UserId,
};
use time::OffsetDateTime;
use tracing::warn;

use super::{
    Author, ChannelMessage, MemberInfo, Platform, PlatformError, PlatformResult, Reactor,
};
use crate::{models::RankedSubmission, utils::report::leaderboard_embed};

/// The platform page size for reactions.
const REACTION_PAGE_SIZE: u8 = 100;

pub struct DiscordPlatform {
    http: Arc<Http>,
    guild: GuildId,
    channel: ChannelId,
    emoji: String,
    timeout: Duration,
}

impl DiscordPlatform {
    pub fn new(
        http: Arc<Http>,
        guild: GuildId,
        channel: ChannelId,
        emoji: String,
        timeout: Duration,
    ) -> DiscordPlatform {
        DiscordPlatform {
            http,
            guild,
            channel,
            emoji,
            timeout,
        }
    }

    fn reaction_type(&self) -> ReactionType {
        ReactionType::Unicode(self.emoji.clone())
    }

    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, serenity::Error>>,
    ) -> PlatformResult<T> {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result.map_err(PlatformError::from),
            Err(_) => Err(PlatformError::Timeout),
        }
    }

    /// Converts a gateway message posted in the tracked channel.
    pub fn channel_message(&self, message: &Message) -> ChannelMessage {
        let tracked = message
            .reactions
            .iter()
            .filter(|r| r.reaction_type.unicode_eq(&self.emoji));

        ChannelMessage {
            id: message.id,
            author: Author {
                id: message.author.id,
                display: message.author.tag(),
                bot: message.author.bot,
            },
            content: message.content.clone(),
            attachments: message.attachments.len(),
            link: message.id.link(self.channel, Some(self.guild)),
            has_tracked_reaction: tracked.clone().next().is_some(),
            bot_reacted: tracked.clone().any(|r| r.me),
        }
    }
}

impl From<serenity::Error> for PlatformError {
    fn from(err: serenity::Error) -> Self {
        if let serenity::Error::Http(http_err) = &err {
            if http_err.status_code().map(|s| s.as_u16()) == Some(404) {
                return PlatformError::NotFound;
            }
        }

        PlatformError::Transient(err.to_string())
    }
}

#[async_trait]
impl Platform for DiscordPlatform {
    async fn fetch_message(&self, id: MessageId) -> PlatformResult<ChannelMessage> {
        let message = self.call(self.http.get_message(self.channel, id)).await?;
        Ok(self.channel_message(&message))
    }

    async fn recent_messages(&self, limit: u8) -> PlatformResult<Vec<ChannelMessage>> {
        let messages = self
            .call(self.http.get_messages(self.channel, None, Some(limit)))
            .await?;

        Ok(messages
            .iter()
            .map(|message| self.channel_message(message))
            .collect())
    }

    async fn delete_message(&self, id: MessageId) -> PlatformResult<()> {
        self.call(self.channel.delete_message(&self.http, id)).await
    }

    async fn add_tracked_reaction(&self, id: MessageId) -> PlatformResult<()> {
        self.call(
            self.channel
                .create_reaction(&self.http, id, self.reaction_type()),
        )
        .await
    }

    async fn tracked_reactors(&self, id: MessageId) -> PlatformResult<Vec<Reactor>> {
        let mut reactors = Vec::new();
        let mut after: Option<UserId> = None;

        loop {
            let page = self
                .call(self.channel.reaction_users(
                    &self.http,
                    id,
                    self.reaction_type(),
                    Some(REACTION_PAGE_SIZE),
                    after,
                ))
                .await?;

            let page_len = page.len();
            after = page.last().map(|user| user.id);
            reactors.extend(page.into_iter().map(|user| Reactor {
                id: user.id,
                bot: user.bot,
            }));

            if page_len < REACTION_PAGE_SIZE as usize {
                break;
            }
        }

        Ok(reactors)
    }

    async fn member(&self, user: UserId) -> PlatformResult<MemberInfo> {
        let member = self.call(self.http.get_member(self.guild, user)).await?;

        Ok(MemberInfo {
            bot: member.user.bot,
            roles: member.roles.clone(),
        })
    }

    async fn add_role(&self, user: UserId, role: RoleId) -> PlatformResult<()> {
        self.call(self.http.add_member_role(self.guild, user, role, None))
            .await
    }

    async fn remove_role(&self, user: UserId, role: RoleId) -> PlatformResult<()> {
        self.call(self.http.remove_member_role(self.guild, user, role, None))
            .await
    }

    async fn send_notice(&self, content: String, ttl: Duration) -> PlatformResult<()> {
        let notice = self.call(self.channel.say(&self.http, content)).await?;

        let http = self.http.clone();
        let channel = self.channel;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Err(err) = channel.delete_message(&http, notice.id).await {
                warn!("Could not delete notice {}: {err}", notice.id);
            }
        });

        Ok(())
    }

    async fn send_leaderboard(&self, entries: &[RankedSubmission]) -> PlatformResult<()> {
        let embed = leaderboard_embed(entries, &self.emoji, OffsetDateTime::now_utc());

        self.call(
            self.channel
                .send_message(&self.http, CreateMessage::new().embed(embed)),
        )
        .await
        .map(|_| ())
    }
}
