use poise::serenity_prelude::{MessageId, UserId};

/// A message accepted into the tracked set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub message_id: MessageId,
    pub author: UserId,
    /// Display identity, used for de-duplication and in reports.
    pub author_display: String,
    pub link: String,
    pub score: u32,
}

impl SubmissionRecord {
    pub fn new(
        message_id: MessageId,
        author: UserId,
        author_display: impl Into<String>,
        link: impl Into<String>,
    ) -> SubmissionRecord {
        SubmissionRecord {
            message_id,
            author,
            author_display: author_display.into(),
            link: link.into(),
            score: 0,
        }
    }
}

/// A submission together with its 1-based position in the ranking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedSubmission {
    pub rank: usize,
    pub record: SubmissionRecord,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionStats {
    pub submissions: usize,
    pub users: usize,
    pub mean_score: f64,
    pub max_score: u32,
}
