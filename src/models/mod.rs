mod snapshot;
mod submission;

pub use snapshot::Snapshot;
pub use submission::{RankedSubmission, SubmissionRecord, SubmissionStats};
