//! Keeps the voter role in line with live reactions.
//!
//! A member gets the role on their first tracked-emoji reaction in the channel and loses it when
//! they withdraw their last one. Finding the last one means re-reading the reactors of every
//! message in the scanned history window, so a removal costs one request per reacted message
//! within the newest `scan_limit` messages. Reactions on older messages are not seen.

use std::sync::Arc;

use poise::serenity_prelude::{RoleId, UserId};
use tracing::{debug, info, warn};

use crate::platform::{Platform, PlatformResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoterChange {
    Granted,
    Revoked,
    Unchanged,
}

pub struct VoterRoles {
    platform: Arc<dyn Platform>,
    voter_role: RoleId,
    scan_limit: u8,
}

impl VoterRoles {
    pub fn new(platform: Arc<dyn Platform>, voter_role: RoleId, scan_limit: u8) -> VoterRoles {
        VoterRoles {
            platform,
            voter_role,
            scan_limit,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn reaction_added(&self, user: UserId) -> VoterChange {
        let member = match self.platform.member(user).await {
            Ok(member) => member,
            Err(err) => {
                warn!("Could not look up the reacting member: {err}");
                return VoterChange::Unchanged;
            }
        };

        if member.bot || member.has_role(self.voter_role) {
            return VoterChange::Unchanged;
        }

        match self.platform.add_role(user, self.voter_role).await {
            Ok(()) => {
                info!("Granted the voter role");
                VoterChange::Granted
            }
            Err(err) => {
                warn!("Could not grant the voter role: {err}");
                VoterChange::Unchanged
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn reaction_removed(&self, user: UserId) -> VoterChange {
        let member = match self.platform.member(user).await {
            Ok(member) => member,
            Err(err) => {
                warn!("Could not look up the member who removed a reaction: {err}");
                return VoterChange::Unchanged;
            }
        };

        if member.bot || !member.has_role(self.voter_role) {
            return VoterChange::Unchanged;
        }

        match self.still_voting(user).await {
            Ok(true) => {
                debug!("Still voting elsewhere, keeping the voter role");
                VoterChange::Unchanged
            }
            Ok(false) => match self.platform.remove_role(user, self.voter_role).await {
                Ok(()) => {
                    info!("Revoked the voter role");
                    VoterChange::Revoked
                }
                Err(err) => {
                    warn!("Could not revoke the voter role: {err}");
                    VoterChange::Unchanged
                }
            },
            Err(err) => {
                warn!("Could not scan the channel for remaining votes: {err}");
                VoterChange::Unchanged
            }
        }
    }

    async fn still_voting(&self, user: UserId) -> PlatformResult<bool> {
        let messages = self.platform.recent_messages(self.scan_limit).await?;

        for message in messages.iter().filter(|m| m.has_tracked_reaction) {
            let reactors = self.platform.tracked_reactors(message.id).await?;
            if reactors.iter().any(|r| r.id == user) {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
