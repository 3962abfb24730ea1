use std::collections::HashSet;

use async_trait::async_trait;
use poise::serenity_prelude::UserId;
use sqlx::{query, query_as, query_scalar, Pool, Sqlite};
use tracing::debug;

use crate::models::{Snapshot, SubmissionRecord};

use super::conversion::{DBConvertible, SqlSubmission};

/// Durable storage for the submission store.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    async fn load(&self) -> Result<Snapshot, anyhow::Error>;

    /// Replaces the stored snapshot as a whole.
    async fn save(&self, snapshot: &Snapshot) -> Result<(), anyhow::Error>;
}

#[derive(Debug)]
pub struct SnapshotRepository {
    pool: Pool<Sqlite>,
}

impl SnapshotRepository {
    pub fn new(pool: Pool<Sqlite>) -> SnapshotRepository {
        SnapshotRepository { pool }
    }
}

#[async_trait]
impl SnapshotStorage for SnapshotRepository {
    async fn load(&self) -> Result<Snapshot, anyhow::Error> {
        let rows = query_as::<_, SqlSubmission>(
            r#"
                SELECT message_id, author_id, author_display, link, score
                FROM submissions
                ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .iter()
            .map(SubmissionRecord::from_db)
            .collect::<Result<Vec<_>, _>>()?;

        let users = query_scalar::<_, i64>("SELECT user_id FROM submitted_users")
            .fetch_all(&self.pool)
            .await?;

        let submitted_users = users
            .iter()
            .map(UserId::from_db)
            .collect::<Result<HashSet<_>, _>>()?;

        debug!(
            "Loaded snapshot with {} submissions and {} users",
            records.len(),
            submitted_users.len()
        );

        Ok(Snapshot {
            records,
            submitted_users,
        })
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        query("DELETE FROM submissions")
            .execute(&mut *transaction)
            .await?;
        query("DELETE FROM submitted_users")
            .execute(&mut *transaction)
            .await?;

        for (position, record) in snapshot.records.iter().enumerate() {
            let row = record.to_db()?;

            query(
                r#"
                    INSERT INTO submissions (position, message_id, author_id, author_display, link, score)
                    VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(position as i64)
            .bind(row.message_id)
            .bind(row.author_id)
            .bind(row.author_display)
            .bind(row.link)
            .bind(row.score)
            .execute(&mut *transaction)
            .await?;
        }

        for user in &snapshot.submitted_users {
            query("INSERT INTO submitted_users (user_id) VALUES ($1)")
                .bind(user.to_db()?)
                .execute(&mut *transaction)
                .await?;
        }

        transaction.commit().await?;

        debug!(
            "Saved snapshot with {} submissions and {} users",
            snapshot.records.len(),
            snapshot.submitted_users.len()
        );

        Ok(())
    }
}
