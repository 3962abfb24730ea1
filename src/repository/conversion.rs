use poise::serenity_prelude::{MessageId, UserId};
use thiserror::Error;

use crate::models::SubmissionRecord;

pub trait DBConvertible: Sized {
    type DBType;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError>;

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError>;
}

#[derive(Debug, Error)]
pub enum DBFromConversionError {
    #[error("Invalid number: {0}")]
    InvalidNumber(i64),
}

#[derive(Debug, Error)]
pub enum DBToConversionError {
    #[error("Number does not fit into the database: {0}")]
    NumberTooLarge(u64),
}

fn snowflake_to_db(value: u64) -> Result<i64, DBToConversionError> {
    i64::try_from(value).map_err(|_| DBToConversionError::NumberTooLarge(value))
}

fn snowflake_from_db(value: i64) -> Result<u64, DBFromConversionError> {
    match u64::try_from(value) {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(DBFromConversionError::InvalidNumber(value)),
    }
}

impl DBConvertible for UserId {
    type DBType = i64;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        snowflake_to_db(self.get())
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(UserId::new(snowflake_from_db(*value)?))
    }
}

impl DBConvertible for MessageId {
    type DBType = i64;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        snowflake_to_db(self.get())
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(MessageId::new(snowflake_from_db(*value)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SqlSubmission {
    pub message_id: i64,
    pub author_id: i64,
    pub author_display: String,
    pub link: String,
    pub score: i64,
}

impl DBConvertible for SubmissionRecord {
    type DBType = SqlSubmission;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(SqlSubmission {
            message_id: self.message_id.to_db()?,
            author_id: self.author.to_db()?,
            author_display: self.author_display.clone(),
            link: self.link.clone(),
            score: i64::from(self.score),
        })
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(SubmissionRecord {
            message_id: MessageId::from_db(&value.message_id)?,
            author: UserId::from_db(&value.author_id)?,
            author_display: value.author_display.clone(),
            link: value.link.clone(),
            score: u32::try_from(value.score)
                .map_err(|_| DBFromConversionError::InvalidNumber(value.score))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude::{MessageId, UserId};

    use super::{DBConvertible, SqlSubmission};
    use crate::models::SubmissionRecord;

    #[test]
    fn snowflakes_fit() {
        let id = UserId::new(1_167_708_126_716_366_939);
        assert_eq!(UserId::from_db(&id.to_db().unwrap()).unwrap(), id);
    }

    #[test]
    fn rejects_snowflake_over_i64() {
        assert!(MessageId::new(u64::MAX).to_db().is_err());
    }

    #[test]
    fn rejects_zero_and_negative_ids() {
        assert!(UserId::from_db(&0).is_err());
        assert!(MessageId::from_db(&-5).is_err());
    }

    #[test]
    fn rejects_negative_score() {
        let row = SqlSubmission {
            message_id: 1,
            author_id: 2,
            author_display: "someone".to_owned(),
            link: "https://discord.com/channels/1/2/1".to_owned(),
            score: -1,
        };
        assert!(SubmissionRecord::from_db(&row).is_err());
    }
}
