use chrono::{DateTime, Utc};
use sqlx::Row;

use super::{Store, StoreError};
use crate::survey::drafts::DraftAnswers;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// A live login session joined with its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub draft: DraftAnswers,
    pub created_at: DateTime<Utc>,
}

impl Store {
    /// Fails with [`StoreError::Conflict`] when the username is taken.
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRecord, StoreError> {
        let id = sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_insert)?
        .last_insert_rowid();

        Ok(UserRecord {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    pub async fn user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query("SELECT id, username, email, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> Result<UserRecord, StoreError> {
            Ok(UserRecord {
                id: row.try_get("id")?,
                username: row.try_get("username")?,
                email: row.try_get("email")?,
                password_hash: row.try_get("password_hash")?,
            })
        })
        .transpose()
    }

    pub async fn update_password_hash(
        &self,
        user_id: i64,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let updated = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    pub async fn create_session(&self, user_id: i64, token: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO sessions (token, user_id, draft_answers, created_at) VALUES (?, ?, '{}', ?)",
        )
        .bind(token)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_insert)?;
        Ok(())
    }

    /// Sessions created before `not_before` are treated as expired.
    pub async fn session(
        &self,
        token: &str,
        not_before: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT s.token, s.user_id, u.username, s.draft_answers, s.created_at \
             FROM sessions s JOIN users u ON u.id = s.user_id \
             WHERE s.token = ? AND s.created_at >= ?",
        )
        .bind(token)
        .bind(not_before)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let draft: DraftAnswers = serde_json::from_str(&row.try_get::<String, _>("draft_answers")?)?;
        Ok(Some(SessionRecord {
            token: row.try_get("token")?,
            user_id: row.try_get("user_id")?,
            username: row.try_get("username")?,
            draft,
            created_at: row.try_get("created_at")?,
        }))
    }

    pub async fn save_draft(&self, token: &str, draft: &DraftAnswers) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(draft)?;
        sqlx::query("UPDATE sessions SET draft_answers = ? WHERE token = ?")
            .bind(encoded)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Patches `answers` into the stored draft in one statement, so concurrent
    /// autosaves for the same session never overwrite each other. Returns the
    /// merged draft.
    pub async fn merge_draft(
        &self,
        token: &str,
        answers: &DraftAnswers,
    ) -> Result<DraftAnswers, StoreError> {
        let patch = serde_json::to_string(answers)?;
        let merged: Option<String> = sqlx::query_scalar(
            "UPDATE sessions SET draft_answers = json_patch(draft_answers, ?) \
             WHERE token = ? RETURNING draft_answers",
        )
        .bind(patch)
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let merged = merged.ok_or(StoreError::NotFound)?;
        Ok(serde_json::from_str(&merged)?)
    }

    pub async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_sessions_for(&self, user_id: i64) -> Result<u64, StoreError> {
        let removed = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(removed)
    }
}
