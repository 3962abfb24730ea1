use poise::serenity_prelude::{Mentionable, MessageId, RoleId};
use tracing::{debug, info, warn};

use super::Tracker;
use crate::{
    models::SubmissionRecord,
    platform::{Author, ChannelMessage, PlatformError},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// Bot messages, commands and messages that are already tracked.
    Ignored,
    Accepted { replaced: Option<MessageId> },
    Rejected { replaced: Option<MessageId> },
}

impl AdmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AdmissionOutcome::Accepted { .. })
    }
}

#[derive(Clone, Debug)]
pub struct EditedMessage {
    pub id: MessageId,
    pub author: Author,
    pub author_roles: Option<Vec<RoleId>>,
}

/// At least one attachment and no text.
pub fn is_image_only(message: &ChannelMessage) -> bool {
    message.attachments > 0 && message.content.trim().is_empty()
}

impl Tracker {
    pub fn is_command(&self, content: &str) -> bool {
        content.trim_start().starts_with(&self.config.command_prefix)
    }

    /// Handles a new message in the tracked channel.
    ///
    /// The author's previous submission is removed first, whether or not the new message is
    /// valid, so an author never has two active submissions.
    #[tracing::instrument(skip_all, fields(message = %message.id, author = %message.author.display))]
    pub async fn admit(
        &mut self,
        message: &ChannelMessage,
        author_roles: Option<&[RoleId]>,
    ) -> AdmissionOutcome {
        if message.author.bot
            || self.is_command(&message.content)
            || self.store.contains(message.id)
        {
            return AdmissionOutcome::Ignored;
        }

        let privileged = self
            .has_role(message.author.id, author_roles, self.config.admin_role)
            .await;
        let image_only = is_image_only(message);

        let replaced = self.drop_previous_submission(&message.author).await;

        let outcome = if privileged || image_only {
            self.accept(message, author_roles).await;
            AdmissionOutcome::Accepted { replaced }
        } else {
            self.reject(message).await;
            AdmissionOutcome::Rejected { replaced }
        };

        if outcome.is_accepted() || replaced.is_some() {
            self.persist().await;
        }

        outcome
    }

    /// Deletes any edited message of a non-privileged author.
    ///
    /// Applies to every message in the channel, not just tracked submissions.
    #[tracing::instrument(skip_all, fields(message = %edited.id, author = %edited.author.display))]
    pub async fn handle_edit(&mut self, edited: &EditedMessage) {
        if edited.author.bot {
            return;
        }

        let privileged = self
            .has_role(
                edited.author.id,
                edited.author_roles.as_deref(),
                self.config.admin_role,
            )
            .await;

        if privileged {
            return;
        }

        info!("Deleting an edited message");
        match self.platform.delete_message(edited.id).await {
            Ok(()) | Err(PlatformError::NotFound) => {}
            Err(err) => warn!("Could not delete edited message {}: {err}", edited.id),
        }
    }

    /// Removes the author's earlier submissions and returns the newest removed one.
    async fn drop_previous_submission(&mut self, author: &Author) -> Option<MessageId> {
        let previous = self.store.remove_by_author(author.id, &author.display);

        for record in &previous {
            debug!("Replacing previous submission {}", record.message_id);
            match self.platform.delete_message(record.message_id).await {
                Ok(()) | Err(PlatformError::NotFound) => {}
                Err(err) => warn!(
                    "Could not delete previous submission {}: {err}",
                    record.message_id
                ),
            }
        }

        previous.last().map(|record| record.message_id)
    }

    pub(super) async fn accept(
        &mut self,
        message: &ChannelMessage,
        author_roles: Option<&[RoleId]>,
    ) {
        info!("Accepting a submission");

        if let Err(err) = self.platform.add_tracked_reaction(message.id).await {
            warn!("Could not react to submission {}: {err}", message.id);
        }

        self.store.insert(SubmissionRecord::new(
            message.id,
            message.author.id,
            message.author.display.clone(),
            message.link.clone(),
        ));

        let contributor = self.config.contributor_role;
        if !self
            .has_role(message.author.id, author_roles, contributor)
            .await
        {
            if let Err(err) = self.platform.add_role(message.author.id, contributor).await {
                warn!(
                    "Could not grant the contributor role to {}: {err}",
                    message.author.display
                );
            }
        }
    }

    async fn reject(&mut self, message: &ChannelMessage) {
        info!("Rejecting a message that is not image-only");

        match self.platform.delete_message(message.id).await {
            Ok(()) | Err(PlatformError::NotFound) => {}
            Err(err) => warn!("Could not delete rejected message {}: {err}", message.id),
        }

        let notice = format!(
            "{} image-only posts are allowed.",
            message.author.id.mention()
        );
        if let Err(err) = self
            .platform
            .send_notice(notice, self.config.notice_ttl)
            .await
        {
            warn!("Could not send the rejection notice: {err}");
        }
    }
}
