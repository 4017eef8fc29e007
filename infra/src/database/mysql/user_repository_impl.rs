//! MySQL implementation of the UserRepository trait.
//!
//! Users are owned by the surrounding application; this repository only
//! reads them and maintains the recovery-token columns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use tw_core::domain::entities::user::{RecoveryGrant, User, UserRole};
use tw_core::errors::DomainError;
use tw_core::repositories::UserRepository;

use super::token_repository_impl::{column_error, parse_uuid, query_error};

const USER_COLUMNS: &str =
    "id, email, role, is_active, recovery_token_hash, recovery_expires_at, created_at, updated_at";

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity
    fn row_to_user(row: &sqlx::mysql::MySqlRow) -> Result<User, DomainError> {
        let id: String = row.try_get("id").map_err(|e| column_error("id", e))?;
        let role: String = row.try_get("role").map_err(|e| column_error("role", e))?;

        Ok(User {
            id: parse_uuid(&id)?,
            email: row.try_get("email").map_err(|e| column_error("email", e))?,
            role: role
                .parse::<UserRole>()
                .map_err(|message| DomainError::Internal { message })?,
            is_active: row
                .try_get("is_active")
                .map_err(|e| column_error("is_active", e))?,
            recovery_token_hash: row
                .try_get("recovery_token_hash")
                .map_err(|e| column_error("recovery_token_hash", e))?,
            recovery_expires_at: row
                .try_get::<Option<DateTime<Utc>>, _>("recovery_expires_at")
                .map_err(|e| column_error("recovery_expires_at", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column_error("created_at", e))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| column_error("updated_at", e))?,
        })
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE id = ? LIMIT 1", USER_COLUMNS);

        let result = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find user by id", e))?;

        result.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER(?) LIMIT 1",
            USER_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find user by email", e))?;

        result.as_ref().map(Self::row_to_user).transpose()
    }

    async fn store_recovery_grant(
        &self,
        user_id: Uuid,
        grant: &RecoveryGrant,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
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
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("store recovery grant", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn consume_recovery_grant(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_error("begin recovery redemption", e))?;

        let query = format!(
            "SELECT {} FROM users WHERE recovery_token_hash = ? FOR UPDATE",
            USER_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| query_error("lock recovery grant", e))?;

        let user = match row {
            Some(row) => Self::row_to_user(&row)?,
            None => return Ok(None),
        };
        if !user.has_recovery(token_hash, now) {
            return Ok(None);
        }

        sqlx::query(
            r#"
            UPDATE users
            SET recovery_token_hash = NULL, recovery_expires_at = NULL, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(now)
        .bind(user.id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| query_error("clear recovery grant", e))?;

        tx.commit()
            .await
            .map_err(|e| query_error("commit recovery redemption", e))?;

        Ok(Some(user.id))
    }
}
