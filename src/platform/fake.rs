//! In-memory platform used by the tests.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use poise::serenity_prelude::{MessageId, RoleId, UserId};

use super::{
    Author, ChannelMessage, MemberInfo, Platform, PlatformError, PlatformResult, Reactor,
};
use crate::models::RankedSubmission;

#[derive(Default)]
struct State {
    /// Channel history, oldest first.
    messages: Vec<ChannelMessage>,
    reactors: HashMap<MessageId, Vec<Reactor>>,
    members: HashMap<UserId, MemberInfo>,
    deleted: Vec<MessageId>,
    notices: Vec<String>,
    leaderboards: Vec<Vec<RankedSubmission>>,
    failing_fetches: HashSet<MessageId>,
    fail_deletes: bool,
    fail_reports: bool,
}

#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<State>,
}

pub fn author(id: u64) -> Author {
    Author {
        id: UserId::new(id),
        display: format!("user{id}"),
        bot: false,
    }
}

pub fn image_post(id: u64, author_id: u64) -> ChannelMessage {
    ChannelMessage {
        id: MessageId::new(id),
        author: author(author_id),
        content: String::new(),
        attachments: 1,
        link: format!("https://discord.com/channels/1/2/{id}"),
        has_tracked_reaction: false,
        bot_reacted: false,
    }
}

pub fn text_post(id: u64, author_id: u64, content: &str) -> ChannelMessage {
    ChannelMessage {
        content: content.to_owned(),
        attachments: 0,
        ..image_post(id, author_id)
    }
}

impl FakePlatform {
    pub fn new() -> FakePlatform {
        FakePlatform::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn post(&self, message: ChannelMessage) {
        self.state().messages.push(message);
    }

    pub fn add_member(&self, id: u64, roles: &[RoleId]) {
        self.state().members.insert(
            UserId::new(id),
            MemberInfo {
                bot: false,
                roles: roles.to_vec(),
            },
        );
    }

    pub fn add_bot_member(&self, id: u64) {
        self.state().members.insert(
            UserId::new(id),
            MemberInfo {
                bot: true,
                roles: Vec::new(),
            },
        );
    }

    pub fn react(&self, message: u64, user: u64, bot: bool) {
        let mut state = self.state();
        let message = MessageId::new(message);
        state.reactors.entry(message).or_default().push(Reactor {
            id: UserId::new(user),
            bot,
        });
        if let Some(m) = state.messages.iter_mut().find(|m| m.id == message) {
            m.has_tracked_reaction = true;
            m.bot_reacted |= bot;
        }
    }

    pub fn unreact(&self, message: u64, user: u64) {
        let mut state = self.state();
        if let Some(reactors) = state.reactors.get_mut(&MessageId::new(message)) {
            reactors.retain(|r| r.id != UserId::new(user));
        }
    }

    /// Removes a message the way its author would.
    pub fn delete(&self, message: u64) {
        let mut state = self.state();
        let message = MessageId::new(message);
        state.messages.retain(|m| m.id != message);
        state.reactors.remove(&message);
    }

    pub fn fail_fetch(&self, message: u64) {
        self.state().failing_fetches.insert(MessageId::new(message));
    }

    pub fn fail_deletes(&self) {
        self.state().fail_deletes = true;
    }

    pub fn fail_reports(&self) {
        self.state().fail_reports = true;
    }

    pub fn roles(&self, user: u64) -> Vec<RoleId> {
        self.state()
            .members
            .get(&UserId::new(user))
            .map(|m| m.roles.clone())
            .unwrap_or_default()
    }

    pub fn deleted(&self) -> Vec<MessageId> {
        self.state().deleted.clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.state().notices.clone()
    }

    pub fn leaderboards(&self) -> Vec<Vec<RankedSubmission>> {
        self.state().leaderboards.clone()
    }

    pub fn bot_reacted(&self, message: u64) -> bool {
        self.state()
            .messages
            .iter()
            .any(|m| m.id == MessageId::new(message) && m.bot_reacted)
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn fetch_message(&self, id: MessageId) -> PlatformResult<ChannelMessage> {
        let state = self.state();
        if state.failing_fetches.contains(&id) {
            return Err(PlatformError::Timeout);
        }
        state
            .messages
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(PlatformError::NotFound)
    }

    async fn recent_messages(&self, limit: u8) -> PlatformResult<Vec<ChannelMessage>> {
        Ok(self
            .state()
            .messages
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn delete_message(&self, id: MessageId) -> PlatformResult<()> {
        let mut state = self.state();
        if state.fail_deletes {
            return Err(PlatformError::Transient("Missing permissions".to_owned()));
        }
        let before = state.messages.len();
        state.messages.retain(|m| m.id != id);
        if state.messages.len() == before {
            return Err(PlatformError::NotFound);
        }
        state.reactors.remove(&id);
        state.deleted.push(id);
        Ok(())
    }

    async fn add_tracked_reaction(&self, id: MessageId) -> PlatformResult<()> {
        let mut state = self.state();
        let message = state
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(PlatformError::NotFound)?;
        message.has_tracked_reaction = true;
        message.bot_reacted = true;
        Ok(())
    }

    async fn tracked_reactors(&self, id: MessageId) -> PlatformResult<Vec<Reactor>> {
        Ok(self.state().reactors.get(&id).cloned().unwrap_or_default())
    }

    async fn member(&self, user: UserId) -> PlatformResult<MemberInfo> {
        self.state()
            .members
            .get(&user)
            .cloned()
            .ok_or(PlatformError::NotFound)
    }

    async fn add_role(&self, user: UserId, role: RoleId) -> PlatformResult<()> {
        let mut state = self.state();
        let member = state.members.get_mut(&user).ok_or(PlatformError::NotFound)?;
        if !member.roles.contains(&role) {
            member.roles.push(role);
        }
        Ok(())
    }

    async fn remove_role(&self, user: UserId, role: RoleId) -> PlatformResult<()> {
        let mut state = self.state();
        let member = state.members.get_mut(&user).ok_or(PlatformError::NotFound)?;
        member.roles.retain(|r| *r != role);
        Ok(())
    }

    async fn send_notice(&self, content: String, _ttl: Duration) -> PlatformResult<()> {
        self.state().notices.push(content);
        Ok(())
    }

    async fn send_leaderboard(&self, entries: &[RankedSubmission]) -> PlatformResult<()> {
        let mut state = self.state();
        if state.fail_reports {
            return Err(PlatformError::Transient("Service unavailable".to_owned()));
        }
        state.leaderboards.push(entries.to_vec());
        Ok(())
    }
}
