use std::collections::HashSet;

use poise::serenity_prelude::UserId;

use super::SubmissionRecord;

/// Serializable copy of the submission store.
///
/// Records are kept in insertion order, which is also the tie-breaking order of the ranking.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub records: Vec<SubmissionRecord>,
    pub submitted_users: HashSet<UserId>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.submitted_users.is_empty()
    }
}
