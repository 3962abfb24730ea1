use std::time::Duration;

use poise::serenity_prelude::{ChannelId, RoleId};
use serde::Deserialize;

use crate::tracker::TrackerConfig;

/// The largest history page the platform returns.
const MAX_HISTORY_LIMIT: u8 = 100;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub discord_bot_token: String,
    pub database_url: String,
    pub register_commands_globally: Option<bool>,
    pub register_commands_in_guilds: Option<Vec<u64>>,

    pub target_channel_id: u64,
    pub voter_role_id: u64,
    pub staker_role_id: u64,
    pub admin_role_id: u64,
    pub contributor_role_id: u64,

    #[serde(default = "default_tracked_emoji")]
    pub tracked_emoji: String,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    #[serde(default = "default_rescore_interval_secs")]
    pub rescore_interval_secs: u64,
    #[serde(default = "default_rotation_interval_secs")]
    pub rotation_interval_secs: u64,
    #[serde(default = "default_reconcile_history_limit")]
    pub reconcile_history_limit: u8,
    #[serde(default = "default_voter_scan_history_limit")]
    pub voter_scan_history_limit: u8,
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
    #[serde(default = "default_notice_ttl_secs")]
    pub notice_ttl_secs: u64,
    #[serde(default = "default_platform_timeout_secs")]
    pub platform_timeout_secs: u64,

    #[serde(default = "default_liveness_addr")]
    pub liveness_addr: String,
}

fn default_tracked_emoji() -> String {
    "🔥".to_string()
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_rescore_interval_secs() -> u64 {
    2 * 60
}

fn default_rotation_interval_secs() -> u64 {
    24 * 60 * 60
}

fn default_reconcile_history_limit() -> u8 {
    50
}

fn default_voter_scan_history_limit() -> u8 {
    MAX_HISTORY_LIMIT
}

fn default_leaderboard_size() -> usize {
    10
}

fn default_notice_ttl_secs() -> u64 {
    5
}

fn default_platform_timeout_secs() -> u64 {
    10
}

fn default_liveness_addr() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must not be zero")]
    Zero { name: &'static str },
    #[error("TRACKED_EMOJI must not be empty")]
    EmptyEmoji,
    #[error("COMMAND_PREFIX must not be empty")]
    EmptyPrefix,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("TARGET_CHANNEL_ID", self.target_channel_id),
            ("VOTER_ROLE_ID", self.voter_role_id),
            ("STAKER_ROLE_ID", self.staker_role_id),
            ("ADMIN_ROLE_ID", self.admin_role_id),
            ("CONTRIBUTOR_ROLE_ID", self.contributor_role_id),
            ("RESCORE_INTERVAL_SECS", self.rescore_interval_secs),
            ("ROTATION_INTERVAL_SECS", self.rotation_interval_secs),
            ("PLATFORM_TIMEOUT_SECS", self.platform_timeout_secs),
        ];

        for (name, value) in non_zero {
            if value == 0 {
                return Err(ConfigError::Zero { name });
            }
        }

        if self.leaderboard_size == 0 {
            return Err(ConfigError::Zero {
                name: "LEADERBOARD_SIZE",
            });
        }

        if self.reconcile_history_limit == 0 {
            return Err(ConfigError::Zero {
                name: "RECONCILE_HISTORY_LIMIT",
            });
        }

        if self.tracked_emoji.trim().is_empty() {
            return Err(ConfigError::EmptyEmoji);
        }

        if self.command_prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }

        Ok(())
    }

    pub fn target_channel(&self) -> ChannelId {
        ChannelId::new(self.target_channel_id)
    }

    pub fn voter_role(&self) -> RoleId {
        RoleId::new(self.voter_role_id)
    }

    pub fn admin_role(&self) -> RoleId {
        RoleId::new(self.admin_role_id)
    }

    pub fn rescore_interval(&self) -> Duration {
        Duration::from_secs(self.rescore_interval_secs)
    }

    pub fn rotation_interval(&self) -> Duration {
        Duration::from_secs(self.rotation_interval_secs)
    }

    pub fn platform_timeout(&self) -> Duration {
        Duration::from_secs(self.platform_timeout_secs)
    }

    pub fn voter_scan_limit(&self) -> u8 {
        self.voter_scan_history_limit.clamp(1, MAX_HISTORY_LIMIT)
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            admin_role: self.admin_role(),
            staker_role: RoleId::new(self.staker_role_id),
            contributor_role: RoleId::new(self.contributor_role_id),
            command_prefix: self.command_prefix.clone(),
            leaderboard_size: self.leaderboard_size,
            reconcile_history_limit: self.reconcile_history_limit.clamp(1, MAX_HISTORY_LIMIT),
            notice_ttl: Duration::from_secs(self.notice_ttl_secs),
        }
    }
}
