use std::collections::HashSet;

use poise::serenity_prelude::{MessageId, UserId};
use tracing::{debug, info, warn};

use super::{score::reaction_weight, Tracker};
use crate::platform::{PlatformError, PlatformResult};

impl Tracker {
    /// Recomputes the score of every tracked submission from its live reactions.
    ///
    /// A submission that can't be fetched is dropped, whatever the reason. The snapshot is saved
    /// once after the whole pass.
    #[tracing::instrument(skip(self))]
    pub async fn rescore(&mut self) {
        let message_ids = self.store.message_ids();
        info!("Rescoring {} submissions", message_ids.len());

        let mut dropped = 0;
        for message_id in message_ids {
            if let Err(err) = self.platform.fetch_message(message_id).await {
                match err {
                    PlatformError::NotFound => {
                        debug!("Submission {message_id} is gone, dropping it")
                    }
                    err => warn!("Could not fetch submission {message_id}, dropping it: {err}"),
                }
                self.store.remove(message_id);
                dropped += 1;
                continue;
            }

            match self.weighted_score(message_id).await {
                Ok(score) => {
                    self.store.set_score(message_id, score);
                }
                Err(err) => warn!(
                    "Could not count reactions on {message_id}, keeping the old score: {err}"
                ),
            }
        }

        if dropped > 0 {
            info!("Dropped {dropped} submissions that could not be fetched");
        }

        self.persist().await;
    }

    /// Sum of vote weights of the distinct human reactors.
    async fn weighted_score(&self, message_id: MessageId) -> PlatformResult<u32> {
        let reactors = self.platform.tracked_reactors(message_id).await?;

        let mut seen = HashSet::<UserId>::new();
        let mut total = 0;
        for reactor in reactors {
            if reactor.bot || !seen.insert(reactor.id) {
                continue;
            }

            let is_staker = match self.platform.member(reactor.id).await {
                Ok(member) => member.has_role(self.config.staker_role),
                Err(err) => {
                    warn!("Could not look up roles of reactor {}: {err}", reactor.id);
                    false
                }
            };
            total += reaction_weight(is_staker);
        }

        Ok(total)
    }
}
