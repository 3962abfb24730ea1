//! Submission tracking: admission, scoring and leaderboard rotation.
//!
//! All of it runs inside a single [`Tracker`] actor, so every request sees the store as left by
//! the previous one and never observes a half-finished pass.

mod admission;
mod reconcile;
mod rescore;
mod rotation;
pub mod score;
pub mod store;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use poise::serenity_prelude::{RoleId, UserId};
use tracing::{error, warn};

use crate::{
    actors::{Actor, ActorHandle, ActorStopped},
    models::{RankedSubmission, SubmissionStats},
    platform::{ChannelMessage, Platform},
    repository::SnapshotStorage,
};

pub use admission::{AdmissionOutcome, EditedMessage};
pub use rotation::RotationOutcome;
pub use store::SubmissionStore;

#[derive(Clone, Debug)]
pub struct TrackerConfig {
    pub admin_role: RoleId,
    pub staker_role: RoleId,
    pub contributor_role: RoleId,
    pub command_prefix: String,
    pub leaderboard_size: usize,
    pub reconcile_history_limit: u8,
    pub notice_ttl: Duration,
}

pub struct Tracker {
    store: SubmissionStore,
    platform: Arc<dyn Platform>,
    snapshots: Arc<dyn SnapshotStorage>,
    config: TrackerConfig,
}

pub type TrackerHandle = ActorHandle<Tracker>;

pub enum TrackerRequest {
    Admit {
        message: ChannelMessage,
        author_roles: Option<Vec<RoleId>>,
    },
    Edit(EditedMessage),
    Reconcile,
    Rescore,
    Rotate,
    Ranking {
        limit: Option<usize>,
    },
    Stats,
}

pub enum TrackerResponse {
    Admitted(AdmissionOutcome),
    Done,
    Rotated(RotationOutcome),
    Ranking(Vec<RankedSubmission>),
    Stats(Option<SubmissionStats>),
}

impl Tracker {
    pub fn new(
        store: SubmissionStore,
        platform: Arc<dyn Platform>,
        snapshots: Arc<dyn SnapshotStorage>,
        config: TrackerConfig,
    ) -> Tracker {
        Tracker {
            store,
            platform,
            snapshots,
            config,
        }
    }

    /// Restores the store from the last snapshot. An unreadable snapshot starts an empty store.
    pub async fn load(
        platform: Arc<dyn Platform>,
        snapshots: Arc<dyn SnapshotStorage>,
        config: TrackerConfig,
    ) -> Tracker {
        let store = match snapshots.load().await {
            Ok(snapshot) => SubmissionStore::from_snapshot(snapshot),
            Err(err) => {
                error!("Could not load the submission snapshot, starting empty: {err}");
                SubmissionStore::new()
            }
        };

        Tracker::new(store, platform, snapshots, config)
    }

    pub fn store(&self) -> &SubmissionStore {
        &self.store
    }

    pub fn ranking(&self, limit: Option<usize>) -> Vec<RankedSubmission> {
        match limit {
            Some(limit) => self.store.top(limit),
            None => self.store.ranked(),
        }
    }

    pub fn stats(&self) -> Option<SubmissionStats> {
        self.store.stats()
    }

    async fn persist(&self) {
        if let Err(err) = self.snapshots.save(&self.store.snapshot()).await {
            error!("Could not save the submission snapshot: {err}");
        }
    }

    /// Whether the user holds the role. Lookup failures count as not holding it.
    async fn has_role(&self, user: UserId, known_roles: Option<&[RoleId]>, role: RoleId) -> bool {
        if let Some(roles) = known_roles {
            return roles.contains(&role);
        }

        match self.platform.member(user).await {
            Ok(member) => member.has_role(role),
            Err(err) => {
                warn!("Could not look up roles of {user}: {err}");
                false
            }
        }
    }
}

#[async_trait]
impl Actor for Tracker {
    type Message = TrackerRequest;
    type Response = TrackerResponse;

    async fn handle_message(&mut self, message: TrackerRequest) -> TrackerResponse {
        match message {
            TrackerRequest::Admit {
                message,
                author_roles,
            } => TrackerResponse::Admitted(self.admit(&message, author_roles.as_deref()).await),
            TrackerRequest::Edit(edited) => {
                self.handle_edit(&edited).await;
                TrackerResponse::Done
            }
            TrackerRequest::Reconcile => {
                self.reconcile().await;
                TrackerResponse::Done
            }
            TrackerRequest::Rescore => {
                self.rescore().await;
                TrackerResponse::Done
            }
            TrackerRequest::Rotate => TrackerResponse::Rotated(self.rotate().await),
            TrackerRequest::Ranking { limit } => TrackerResponse::Ranking(self.ranking(limit)),
            TrackerRequest::Stats => TrackerResponse::Stats(self.stats()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Stopped(#[from] ActorStopped),
    #[error("Unexpected tracker response")]
    UnexpectedResponse,
}

impl ActorHandle<Tracker> {
    pub async fn admit(
        &self,
        message: ChannelMessage,
        author_roles: Option<Vec<RoleId>>,
    ) -> Result<AdmissionOutcome, TrackerError> {
        match self
            .send(TrackerRequest::Admit {
                message,
                author_roles,
            })
            .await?
        {
            TrackerResponse::Admitted(outcome) => Ok(outcome),
            _ => Err(TrackerError::UnexpectedResponse),
        }
    }

    pub async fn edited(&self, edited: EditedMessage) -> Result<(), TrackerError> {
        self.send(TrackerRequest::Edit(edited)).await?;
        Ok(())
    }

    pub async fn reconcile(&self) -> Result<(), TrackerError> {
        self.send(TrackerRequest::Reconcile).await?;
        Ok(())
    }

    pub async fn rescore(&self) -> Result<(), TrackerError> {
        self.send(TrackerRequest::Rescore).await?;
        Ok(())
    }

    pub async fn rotate(&self) -> Result<RotationOutcome, TrackerError> {
        match self.send(TrackerRequest::Rotate).await? {
            TrackerResponse::Rotated(outcome) => Ok(outcome),
            _ => Err(TrackerError::UnexpectedResponse),
        }
    }

    pub async fn ranking(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<RankedSubmission>, TrackerError> {
        match self.send(TrackerRequest::Ranking { limit }).await? {
            TrackerResponse::Ranking(ranking) => Ok(ranking),
            _ => Err(TrackerError::UnexpectedResponse),
        }
    }

    pub async fn stats(&self) -> Result<Option<SubmissionStats>, TrackerError> {
        match self.send(TrackerRequest::Stats).await? {
            TrackerResponse::Stats(stats) => Ok(stats),
            _ => Err(TrackerError::UnexpectedResponse),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{sync::Arc, time::Duration};

    use poise::serenity_prelude::RoleId;

    use super::{SubmissionStore, Tracker, TrackerConfig};
    use crate::{platform::fake::FakePlatform, repository::memory::MemorySnapshots};

    pub fn admin() -> RoleId {
        RoleId::new(901)
    }

    pub fn staker() -> RoleId {
        RoleId::new(902)
    }

    pub fn contributor() -> RoleId {
        RoleId::new(903)
    }

    pub fn config() -> TrackerConfig {
        TrackerConfig {
            admin_role: admin(),
            staker_role: staker(),
            contributor_role: contributor(),
            command_prefix: "!".to_owned(),
            leaderboard_size: 10,
            reconcile_history_limit: 50,
            notice_ttl: Duration::from_secs(5),
        }
    }

    pub fn tracker() -> (Tracker, Arc<FakePlatform>, Arc<MemorySnapshots>) {
        let platform = Arc::new(FakePlatform::new());
        let snapshots = Arc::new(MemorySnapshots::default());
        let tracker = Tracker::new(
            SubmissionStore::new(),
            platform.clone(),
            snapshots.clone(),
            config(),
        );
        (tracker, platform, snapshots)
    }
}
