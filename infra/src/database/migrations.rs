//! Schema bootstrap and the one-time legacy token migration
//!
//! Older deployments stored the refresh token itself in `token_hash`. The
//! migration rewrites those cells to their SHA-256 digest in a single
//! transaction; afterwards every lookup is by digest.

use sqlx::{MySqlPool, Row};
use tw_core::domain::entities::token::RefreshTokenRecord;

use crate::InfrastructureError;

/// Schema statements, applied in order; each one is idempotent
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id CHAR(36) NOT NULL PRIMARY KEY,
        email VARCHAR(255) NOT NULL,
        role VARCHAR(32) NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        recovery_token_hash CHAR(64) NULL,
        recovery_expires_at DATETIME(6) NULL,
        created_at DATETIME(6) NOT NULL,
        updated_at DATETIME(6) NOT NULL,
        UNIQUE KEY uq_users_email (email),
        KEY idx_users_recovery_token (recovery_token_hash)
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS refresh_tokens (
        id CHAR(36) NOT NULL PRIMARY KEY,
        user_id CHAR(36) NOT NULL,
        token_hash VARCHAR(512) NOT NULL,
        created_at DATETIME(6) NOT NULL,
        expires_at DATETIME(6) NOT NULL,
        is_revoked BOOLEAN NOT NULL DEFAULT FALSE,
        revoked_at DATETIME(6) NULL,
        replaced_by_id CHAR(36) NULL,
        UNIQUE KEY uq_refresh_tokens_hash (token_hash),
        KEY idx_refresh_tokens_user_active (user_id, is_revoked, expires_at),
        CONSTRAINT fk_refresh_tokens_user FOREIGN KEY (user_id)
            REFERENCES users (id) ON DELETE CASCADE,
        CONSTRAINT fk_refresh_tokens_successor FOREIGN KEY (replaced_by_id)
            REFERENCES refresh_tokens (id)
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
    "#,
];

/// Outcome of a migration run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Plaintext cells rewritten to their digest
    pub rehashed_tokens: usize,
}

/// Whether a stored `token_hash` value is a legacy plaintext token
///
/// Digests are 64 hex characters; JWTs always contain `.` separators.
pub fn is_legacy_plaintext(value: &str) -> bool {
    value.contains('.') || value.len() != 64 || !value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Create the tables if they do not exist
pub async fn bootstrap_schema(pool: &MySqlPool) -> Result<(), InfrastructureError> {
    for statement in SCHEMA {
        sqlx::query(*statement)
            .execute(pool)
            .await
            .map_err(|e| InfrastructureError::Migration(format!("Schema bootstrap failed: {}", e)))?;
    }
    Ok(())
}

/// Rewrite every plaintext `token_hash` to its digest, all or nothing
pub async fn migrate_legacy_tokens(pool: &MySqlPool) -> Result<MigrationReport, InfrastructureError> {
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "SELECT id, token_hash FROM refresh_tokens WHERE token_hash LIKE '%.%' OR CHAR_LENGTH(token_hash) <> 64 FOR UPDATE",
    )
    .fetch_all(&mut *tx)
    .await?;

    let mut report = MigrationReport::default();
    for row in rows {
        let id: String = row.try_get("id")?;
        let stored: String = row.try_get("token_hash")?;
        if !is_legacy_plaintext(&stored) {
            continue;
        }

        sqlx::query("UPDATE refresh_tokens SET token_hash = ? WHERE id = ?")
            .bind(RefreshTokenRecord::hash_token(&stored))
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                InfrastructureError::Migration(format!("Failed to rehash token {}: {}", id, e))
            })?;
        report.rehashed_tokens += 1;
    }

    tx.commit().await?;

    if report.rehashed_tokens > 0 {
        tracing::warn!(
            rehashed_tokens = report.rehashed_tokens,
            "Rewrote legacy plaintext refresh tokens to digests"
        );
    }
    Ok(report)
}
