use std::collections::HashSet;

use poise::serenity_prelude::{MessageId, UserId};
use tracing::warn;

use crate::models::{RankedSubmission, Snapshot, SubmissionRecord, SubmissionStats};

/// In-memory set of tracked submissions.
///
/// Holds at most one record per author. The set of submitted users is updated together with
/// every record mutation and always equals the set of record authors.
#[derive(Debug, Default)]
pub struct SubmissionStore {
    records: Vec<SubmissionRecord>,
    submitted_users: HashSet<UserId>,
}

impl SubmissionStore {
    pub fn new() -> SubmissionStore {
        SubmissionStore::default()
    }

    /// Rebuilds the store from a persisted snapshot.
    ///
    /// The submitted users are derived from the records, a stale user list in the snapshot is
    /// dropped. Duplicate authors keep the latest record.
    pub fn from_snapshot(snapshot: Snapshot) -> SubmissionStore {
        let mut store = SubmissionStore::new();

        for record in snapshot.records {
            for previous in store.insert(record) {
                warn!(
                    "Snapshot contains several submissions by {}, dropping {}",
                    previous.author_display, previous.message_id
                );
            }
        }

        if store.submitted_users != snapshot.submitted_users {
            warn!(
                "Snapshot user list is out of sync ({} users stored, {} derived), using derived",
                snapshot.submitted_users.len(),
                store.submitted_users.len()
            );
        }

        store
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            records: self.records.clone(),
            submitted_users: self.submitted_users.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SubmissionRecord] {
        &self.records
    }

    pub fn submitted_users(&self) -> &HashSet<UserId> {
        &self.submitted_users
    }

    pub fn contains(&self, message_id: MessageId) -> bool {
        self.records.iter().any(|r| r.message_id == message_id)
    }

    pub fn has_submission_by(&self, author: UserId, author_display: &str) -> bool {
        self.position_by_author(author, author_display).is_some()
    }

    pub fn message_ids(&self) -> Vec<MessageId> {
        self.records.iter().map(|r| r.message_id).collect()
    }

    /// Inserts a record, replacing every record that shares its author id or display.
    pub fn insert(&mut self, record: SubmissionRecord) -> Vec<SubmissionRecord> {
        let previous = self.remove_by_author(record.author, &record.author_display);

        self.submitted_users.insert(record.author);
        self.records.push(record);

        debug_assert!(self.is_consistent());
        previous
    }

    pub fn remove(&mut self, message_id: MessageId) -> Option<SubmissionRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.message_id == message_id)?;

        Some(self.remove_at(index))
    }

    /// Removes every record matching the author id or the display, oldest first.
    ///
    /// Two records can match when an author was renamed and someone else took the old name.
    pub fn remove_by_author(
        &mut self,
        author: UserId,
        author_display: &str,
    ) -> Vec<SubmissionRecord> {
        let mut removed = Vec::new();
        while let Some(index) = self.position_by_author(author, author_display) {
            removed.push(self.remove_at(index));
        }
        removed
    }

    /// Overwrites the score of a tracked record. Returns `false` if the message is not tracked.
    pub fn set_score(&mut self, message_id: MessageId, score: u32) -> bool {
        match self.records.iter_mut().find(|r| r.message_id == message_id) {
            Some(record) => {
                record.score = score;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.submitted_users.clear();
    }

    /// All records by descending score. Ties keep insertion order.
    pub fn ranked(&self) -> Vec<RankedSubmission> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| b.score.cmp(&a.score));

        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| RankedSubmission {
                rank: index + 1,
                record,
            })
            .collect()
    }

    pub fn top(&self, count: usize) -> Vec<RankedSubmission> {
        let mut ranked = self.ranked();
        ranked.truncate(count);
        ranked
    }

    pub fn stats(&self) -> Option<SubmissionStats> {
        if self.records.is_empty() {
            return None;
        }

        let total: u64 = self.records.iter().map(|r| u64::from(r.score)).sum();
        let max_score = self.records.iter().map(|r| r.score).max().unwrap_or(0);

        Some(SubmissionStats {
            submissions: self.records.len(),
            users: self.submitted_users.len(),
            mean_score: total as f64 / self.records.len() as f64,
            max_score,
        })
    }

    /// Whether authors and displays are unique and the submitted users are exactly the record
    /// authors.
    pub fn is_consistent(&self) -> bool {
        let authors: HashSet<UserId> = self.records.iter().map(|r| r.author).collect();
        let displays: HashSet<&str> = self
            .records
            .iter()
            .map(|r| r.author_display.as_str())
            .collect();

        authors.len() == self.records.len()
            && displays.len() == self.records.len()
            && authors == self.submitted_users
    }

    fn position_by_author(&self, author: UserId, author_display: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.author == author || r.author_display == author_display)
    }

    fn remove_at(&mut self, index: usize) -> SubmissionRecord {
        let record = self.records.remove(index);

        if !self.records.iter().any(|r| r.author == record.author) {
            self.submitted_users.remove(&record.author);
        }

        debug_assert!(self.is_consistent());
        record
    }
}
