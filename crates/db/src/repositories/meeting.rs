use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use samm_core::meetings::{MeetingStore, StoreError};
use samm_core::{ChannelId, MeetingKey, MeetingRecord, MessageTs, UserId};

use crate::DbPool;

/// SQLite-backed meeting store.
///
/// `append_response` and `mark_finished` are each a single statement, so
/// concurrent acknowledgment handlers get the per-record atomicity the
/// processor relies on without any application-level locking.
pub struct SqlMeetingStore {
    pool: DbPool,
}

impl SqlMeetingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn backend(error: sqlx::Error) -> StoreError {
    StoreError::Backend(error.to_string())
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl MeetingStore for SqlMeetingStore {
    async fn get(&self, key: &MeetingKey) -> Result<Option<MeetingRecord>, StoreError> {
        let Some(meeting) = sqlx::query(
            "SELECT name, agenda, end_at, reminder_period_hours, finished
             FROM meetings WHERE channel = ?1 AND ts = ?2",
        )
        .bind(&key.channel.0)
        .bind(&key.ts.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        else {
            return Ok(None);
        };

        let participants = sqlx::query(
            "SELECT user_id, role FROM meeting_participants WHERE channel = ?1 AND ts = ?2",
        )
        .bind(&key.channel.0)
        .bind(&key.ts.0)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let mut required = BTreeSet::new();
        let mut optional = BTreeSet::new();
        for row in participants {
            let user = UserId(row.get::<String, _>("user_id"));
            match row.get::<String, _>("role").as_str() {
                "required" => {
                    required.insert(user);
                }
                _ => {
                    optional.insert(user);
                }
            }
        }

        let responses: BTreeSet<UserId> = sqlx::query(
            "SELECT user_id FROM meeting_responses WHERE channel = ?1 AND ts = ?2",
        )
        .bind(&key.channel.0)
        .bind(&key.ts.0)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?
        .into_iter()
        .map(|row| UserId(row.get::<String, _>("user_id")))
        .collect();

        Ok(Some(MeetingRecord {
            key: key.clone(),
            name: meeting.get::<String, _>("name"),
            required,
            optional,
            agenda: meeting.get::<String, _>("agenda"),
            end: meeting.get::<DateTime<Utc>, _>("end_at"),
            reminder_period_hours: meeting.get::<i64, _>("reminder_period_hours") as u32,
            responses,
            finished: meeting.get::<bool, _>("finished"),
        }))
    }

    async fn insert(&self, record: &MeetingRecord) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let inserted = sqlx::query(
            "INSERT INTO meetings (channel, ts, name, agenda, end_at, reminder_period_hours, finished)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&record.key.channel.0)
        .bind(&record.key.ts.0)
        .bind(&record.name)
        .bind(&record.agenda)
        .bind(record.end)
        .bind(record.reminder_period_hours as i64)
        .bind(record.finished)
        .execute(&mut *tx)
        .await;

        if let Err(error) = inserted {
            if is_unique_violation(&error) {
                return Err(StoreError::Conflict);
            }
            return Err(backend(error));
        }

        for (role, users) in [("required", &record.required), ("optional", &record.optional)] {
            for user in users {
                sqlx::query(
                    "INSERT INTO meeting_participants (channel, ts, user_id, role)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .bind(&record.key.channel.0)
                .bind(&record.key.ts.0)
                .bind(&user.0)
                .bind(role)
                .execute(&mut *tx)
                .await
                .map_err(backend)?;
            }
        }

        for user in &record.responses {
            sqlx::query(
                "INSERT INTO meeting_responses (channel, ts, user_id) VALUES (?1, ?2, ?3)",
            )
            .bind(&record.key.channel.0)
            .bind(&record.key.ts.0)
            .bind(&user.0)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        }

        tx.commit().await.map_err(backend)
    }

    async fn append_response(
        &self,
        key: &MeetingKey,
        participant: &UserId,
    ) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM meetings WHERE channel = ?1 AND ts = ?2",
        )
        .bind(&key.channel.0)
        .bind(&key.ts.0)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;
        if exists == 0 {
            return Err(StoreError::NotFound);
        }

        // INSERT OR IGNORE makes the set-add atomic and idempotent.
        let result = sqlx::query(
            "INSERT OR IGNORE INTO meeting_responses (channel, ts, user_id) VALUES (?1, ?2, ?3)",
        )
        .bind(&key.channel.0)
        .bind(&key.ts.0)
        .bind(&participant.0)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_finished(&self, key: &MeetingKey) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE meetings SET finished = 1 WHERE channel = ?1 AND ts = ?2")
            .bind(&key.channel.0)
            .bind(&key.ts.0)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
