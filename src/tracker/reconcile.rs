use tracing::{info, warn};

use super::{admission::is_image_only, Tracker};

impl Tracker {
    /// Catches up on submissions posted while the bot was offline.
    ///
    /// Only the newest `reconcile_history_limit` messages are looked at. Messages that the bot
    /// already reacted to were handled in an earlier run and are left alone, as are authors who
    /// already have an active submission. Nothing is deleted here.
    #[tracing::instrument(skip(self))]
    pub async fn reconcile(&mut self) {
        let messages = match self
            .platform
            .recent_messages(self.config.reconcile_history_limit)
            .await
        {
            Ok(messages) => messages,
            Err(err) => {
                warn!("Could not fetch the recent history, skipping reconciliation: {err}");
                return;
            }
        };

        let mut accepted = 0;
        for message in messages {
            if message.author.bot
                || message.bot_reacted
                || self.store.contains(message.id)
                || self.is_command(&message.content)
                || self
                    .store
                    .has_submission_by(message.author.id, &message.author.display)
            {
                continue;
            }

            let privileged = self
                .has_role(message.author.id, None, self.config.admin_role)
                .await;
            if !privileged && !is_image_only(&message) {
                continue;
            }

            self.accept(&message, None).await;
            accepted += 1;
        }

        info!("Picked up {accepted} missed submissions");

        if accepted > 0 {
            self.persist().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use poise::serenity_prelude::MessageId;

    use crate::{
        platform::fake::{image_post, text_post},
        tracker::testing::{self, admin},
    };

    #[test(tokio::test)]
    async fn picks_up_missed_image_posts() {
        let (mut tracker, platform, snapshots) = testing::tracker();
        platform.add_member(10, &[]);
        platform.add_member(20, &[]);
        platform.add_member(30, &[admin()]);
        platform.post(image_post(1, 10));
        platform.post(text_post(2, 20, "just chatting"));
        platform.post(text_post(3, 30, "admin post"));

        tracker.reconcile().await;

        assert_eq!(
            tracker.store().message_ids(),
            vec![MessageId::new(3), MessageId::new(1)]
        );
        assert!(platform.bot_reacted(1));
        assert!(!platform.bot_reacted(2));
        assert!(platform.deleted().is_empty());
        assert_eq!(snapshots.stored().records.len(), 2);
    }

    #[test(tokio::test)]
    async fn running_twice_adds_nothing_new() {
        let (mut tracker, platform, _snapshots) = testing::tracker();
        platform.add_member(10, &[]);
        platform.add_member(20, &[]);
        platform.post(image_post(1, 10));
        platform.post(image_post(2, 20));

        tracker.reconcile().await;
        let first = tracker.store().snapshot();
        tracker.reconcile().await;

        assert_eq!(tracker.store().snapshot(), first);
        assert_eq!(tracker.store().len(), 2);
    }

    #[test(tokio::test)]
    async fn messages_from_earlier_epochs_are_skipped() {
        let (mut tracker, platform, _snapshots) = testing::tracker();
        platform.add_member(10, &[]);
        platform.post(image_post(1, 10));
        platform.react(1, 999, true);

        tracker.reconcile().await;

        assert!(tracker.store().is_empty());
    }

    #[test(tokio::test)]
    async fn newest_post_wins_for_an_author() {
        let (mut tracker, platform, _snapshots) = testing::tracker();
        platform.add_member(10, &[]);
        platform.post(image_post(1, 10));
        platform.post(image_post(2, 10));

        tracker.reconcile().await;

        assert_eq!(tracker.store().message_ids(), vec![MessageId::new(2)]);
        assert!(!platform.bot_reacted(1));
        assert!(tracker.store().is_consistent());
    }

    #[test(tokio::test)]
    async fn tracked_author_is_not_duplicated() {
        let (mut tracker, platform, _snapshots) = testing::tracker();
        platform.add_member(10, &[]);
        platform.post(image_post(1, 10));
        tracker.admit(&image_post(1, 10), None).await;
        // Posted while offline, never reacted to.
        platform.post(image_post(2, 10));

        tracker.reconcile().await;

        assert_eq!(tracker.store().message_ids(), vec![MessageId::new(1)]);
    }
}
