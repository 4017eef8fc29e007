//! MySQL implementation of the TokenRepository trait.
//!
//! Rotation and compromise containment each run in one transaction. Rotation
//! locks the presented row with `SELECT ... FOR UPDATE`, so a concurrent
//! rotation of the same token waits and then sees it revoked.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, Row};
use uuid::Uuid;

use tw_core::domain::entities::token::RefreshTokenRecord;
use tw_core::domain::entities::user::RecoveryGrant;
use tw_core::errors::DomainError;
use tw_core::repositories::{RotationCommit, TokenRepository};

const RECORD_COLUMNS: &str =
    "id, user_id, token_hash, created_at, expires_at, is_revoked, revoked_at, replaced_by_id";

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshTokenRecord entity
    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<RefreshTokenRecord, DomainError> {
        let id: String = row.try_get("id").map_err(|e| column_error("id", e))?;
        let user_id: String = row.try_get("user_id").map_err(|e| column_error("user_id", e))?;
        let replaced_by_id: Option<String> = row
            .try_get("replaced_by_id")
            .map_err(|e| column_error("replaced_by_id", e))?;

        Ok(RefreshTokenRecord {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            token_hash: row
                .try_get("token_hash")
                .map_err(|e| column_error("token_hash", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column_error("created_at", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| column_error("expires_at", e))?,
            is_revoked: row
                .try_get("is_revoked")
                .map_err(|e| column_error("is_revoked", e))?,
            revoked_at: row
                .try_get::<Option<DateTime<Utc>>, _>("revoked_at")
                .map_err(|e| column_error("revoked_at", e))?,
            replaced_by_id: replaced_by_id.as_deref().map(parse_uuid).transpose()?,
        })
    }

    async fn insert_record<'e, E>(executor: E, record: &RefreshTokenRecord) -> Result<(), DomainError>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, user_id, token_hash, created_at, expires_at, is_revoked, revoked_at, replaced_by_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(record.id.to_string())
            .bind(record.user_id.to_string())
            .bind(&record.token_hash)
            .bind(record.created_at)
            .bind(record.expires_at)
            .bind(record.is_revoked)
            .bind(record.revoked_at)
            .bind(record.replaced_by_id.map(|id| id.to_string()))
            .execute(executor)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => DomainError::Conflict {
                    message: "Token already exists".to_string(),
                },
                e => query_error("save refresh token", e),
            })?;

        Ok(())
    }

    /// Bulk revocation shared by "log out everywhere" and compromise containment
    async fn revoke_active_for_user<'e, E>(
        executor: E,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        let query = r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?
            WHERE user_id = ? AND is_revoked = FALSE AND expires_at > ?
        "#;

        let result = sqlx::query(query)
            .bind(now)
            .bind(user_id.to_string())
            .bind(now)
            .execute(executor)
            .await
            .map_err(|e| query_error("revoke user tokens", e))?;

        Ok(result.rows_affected() as usize)
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save_refresh_token(
        &self,
        record: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, DomainError> {
        Self::insert_record(&self.pool, &record).await?;
        Ok(record)
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM refresh_tokens WHERE token_hash = ? LIMIT 1",
            RECORD_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find refresh token", e))?;

        result.as_ref().map(Self::row_to_record).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let query = format!("SELECT {} FROM refresh_tokens WHERE id = ? LIMIT 1", RECORD_COLUMNS);

        let result = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find token by id", e))?;

        result.as_ref().map(Self::row_to_record).transpose()
    }

    async fn find_active_by_user_id(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let query = format!(
            r#"
            SELECT {}
            FROM refresh_tokens
            WHERE user_id = ?
                AND is_revoked = FALSE
                AND expires_at > ?
            ORDER BY created_at DESC
            "#,
            RECORD_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("find user tokens", e))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn rotate_refresh_token(
        &self,
        presented_hash: &str,
        successor: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<RotationCommit, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_error("begin rotation", e))?;

        let query = format!(
            "SELECT {} FROM refresh_tokens WHERE token_hash = ? FOR UPDATE",
            RECORD_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(presented_hash)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| query_error("lock presented token", e))?;

        let found = row.as_ref().map(Self::row_to_record).transpose()?;
        // Early returns drop `tx`, which rolls back and releases the lock
        let previous = match RotationCommit::screen(found, now) {
            Ok(record) => record,
            Err(refused) => return Ok(refused),
        };

        Self::insert_record(&mut *tx, &successor).await?;

        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?, replaced_by_id = ?
            WHERE id = ? AND is_revoked = FALSE
            "#,
        )
        .bind(now)
        .bind(successor.id.to_string())
        .bind(previous.id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| query_error("revoke presented token", e))?;

        if result.rows_affected() != 1 {
            return Err(DomainError::Internal {
                message: format!("presented token {} changed during rotation", previous.id),
            });
        }

        tx.commit()
            .await
            .map_err(|e| query_error("commit rotation", e))?;

        let mut previous = previous;
        previous.revoke_for_successor(successor.id, now);
        Ok(RotationCommit::Rotated {
            previous,
            successor,
        })
    }

    async fn revoke_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?
            WHERE token_hash = ? AND is_revoked = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(now)
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("revoke token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_user_tokens(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        Self::revoke_active_for_user(&self.pool, user_id, now).await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("ping credential store", e))?;
        Ok(())
    }

    async fn contain_compromise(
        &self,
        user_id: Uuid,
        grant: &RecoveryGrant,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_error("begin containment", e))?;

        sqlx::query(
            r#"
            UPDATE users
            SET recovery_token_hash = ?, recovery_expires_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&grant.token_hash)
        .bind(grant.expires_at)
        .bind(now)
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| query_error("attach recovery grant", e))?;

        let revoked = Self::revoke_active_for_user(&mut *tx, user_id, now).await?;

        tx.commit()
            .await
            .map_err(|e| query_error("commit containment", e))?;

        Ok(revoked)
    }
}

pub(super) fn parse_uuid(value: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value).map_err(|e| DomainError::Internal {
        message: format!("Invalid UUID in database: {}", e),
    })
}

pub(super) fn column_error(column: &str, e: sqlx::Error) -> DomainError {
    DomainError::Internal {
        message: format!("Failed to get {}: {}", column, e),
    }
}

pub(super) fn query_error(action: &str, e: sqlx::Error) -> DomainError {
    tracing::error!(error = %e, "Failed to {}", action);
    DomainError::Internal {
        message: format!("Failed to {}: {}", action, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid_rejects_garbage() {
        assert!(matches!(parse_uuid("nope"), Err(DomainError::Internal { .. })));
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_record_columns_cover_entity() {
        for column in ["token_hash", "revoked_at", "replaced_by_id", "expires_at"] {
            assert!(RECORD_COLUMNS.contains(column));
        }
    }
}
