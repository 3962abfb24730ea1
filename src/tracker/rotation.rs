use tracing::{error, info};

use super::Tracker;
use crate::models::RankedSubmission;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RotationOutcome {
    /// Nothing was tracked, nothing was reported or cleared.
    Empty,
    Rotated {
        report: Vec<RankedSubmission>,
        report_sent: bool,
    },
}

impl Tracker {
    /// Reports the top submissions and starts a new leaderboard epoch.
    ///
    /// The store is cleared even when the report could not be sent.
    #[tracing::instrument(skip(self))]
    pub async fn rotate(&mut self) -> RotationOutcome {
        if self.store.is_empty() {
            info!("No submissions, skipping the leaderboard");
            return RotationOutcome::Empty;
        }

        let report = self.store.top(self.config.leaderboard_size);
        info!(
            "Rotating the leaderboard with {} submissions",
            self.store.len()
        );

        let report_sent = match self.platform.send_leaderboard(&report).await {
            Ok(()) => true,
            Err(err) => {
                error!("Could not send the leaderboard, it is lost: {err}");
                false
            }
        };

        self.store.clear();
        self.persist().await;

        RotationOutcome::Rotated {
            report,
            report_sent,
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use poise::serenity_prelude::{MessageId, UserId};

    use super::RotationOutcome;
    use crate::{
        models::{RankedSubmission, SubmissionRecord},
        platform::fake::image_post,
        tracker::testing::{self, staker},
    };

    fn message_ids(report: &[RankedSubmission]) -> Vec<u64> {
        report.iter().map(|r| r.record.message_id.get()).collect()
    }

    #[test(tokio::test)]
    async fn empty_store_is_not_rotated() {
        let (mut tracker, platform, snapshots) = testing::tracker();

        assert_eq!(tracker.rotate().await, RotationOutcome::Empty);
        assert!(platform.leaderboards().is_empty());
        assert_eq!(snapshots.saves(), 0);
    }

    #[test(tokio::test)]
    async fn ties_keep_insertion_order_and_store_is_cleared() {
        let (mut tracker, platform, snapshots) = testing::tracker();
        platform.add_member(10, &[]);
        platform.add_member(20, &[]);
        platform.add_member(30, &[]);
        for user in 100..109 {
            platform.add_member(user, &[]);
        }
        for (message, author) in [(1, 10), (2, 20), (3, 30)] {
            platform.post(image_post(message, author));
            tracker.admit(&image_post(message, author), None).await;
        }
        // m1: 7, m2: 9, m3: 9
        for user in 100..107 {
            platform.react(1, user, false);
        }
        for user in 100..109 {
            platform.react(2, user, false);
            platform.react(3, user, false);
        }
        tracker.rescore().await;

        let outcome = tracker.rotate().await;

        match outcome {
            RotationOutcome::Rotated {
                report,
                report_sent,
            } => {
                assert!(report_sent);
                assert_eq!(message_ids(&report), vec![2, 3, 1]);
                assert_eq!(
                    report.iter().map(|r| r.rank).collect::<Vec<_>>(),
                    vec![1, 2, 3]
                );
            }
            RotationOutcome::Empty => panic!("The store was not empty"),
        }
        assert_eq!(message_ids(&platform.leaderboards()[0]), vec![2, 3, 1]);
        assert!(tracker.store().is_empty());
        assert!(tracker.store().submitted_users().is_empty());
        assert!(snapshots.stored().is_empty());
    }

    #[test(tokio::test)]
    async fn failed_report_still_clears() {
        let (mut tracker, platform, snapshots) = testing::tracker();
        platform.add_member(10, &[staker()]);
        platform.post(image_post(1, 10));
        tracker.admit(&image_post(1, 10), None).await;
        platform.fail_reports();

        let outcome = tracker.rotate().await;

        assert!(matches!(
            outcome,
            RotationOutcome::Rotated {
                report_sent: false,
                ..
            }
        ));
        assert!(tracker.store().is_empty());
        assert!(snapshots.stored().is_empty());
    }

    #[test(tokio::test)]
    async fn report_is_limited_to_leaderboard_size() {
        let (mut tracker, platform, _snapshots) = testing::tracker();
        for i in 1..=12u64 {
            platform.add_member(i * 10, &[]);
            platform.post(image_post(i, i * 10));
            tracker.admit(&image_post(i, i * 10), None).await;
        }

        tracker.rotate().await;

        assert_eq!(platform.leaderboards()[0].len(), 10);
    }

    #[test(tokio::test)]
    async fn rotating_twice_reports_once() {
        let (mut tracker, platform, _snapshots) = testing::tracker();
        platform.add_member(10, &[]);
        platform.post(image_post(1, 10));
        tracker.admit(&image_post(1, 10), None).await;

        tracker.rotate().await;
        assert_eq!(tracker.rotate().await, RotationOutcome::Empty);

        assert_eq!(platform.leaderboards().len(), 1);
        assert_eq!(
            platform.leaderboards()[0][0].record,
            SubmissionRecord::new(
                MessageId::new(1),
                UserId::new(10),
                "user10",
                "https://discord.com/channels/1/2/1",
            )
        );
    }
}
