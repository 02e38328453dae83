use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::auth::RevokedToken;
use crate::utils::errors::AppResult;

/// Blacklist persistente de JWT revocados, claveada por jti.
/// Sobrevive a reinicios del proceso, a diferencia de un set en memoria.
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Revocar es idempotente: repetir el logout con el mismo token
    /// conserva la fila original
    pub async fn revoke(&self, jti: &str) -> AppResult<RevokedToken> {
        let token = sqlx::query_as::<_, RevokedToken>(
            r#"
            INSERT INTO revoked_tokens (id, jti, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (jti) DO UPDATE SET jti = EXCLUDED.jti
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(jti)
        .fetch_one(&self.pool)
        .await?;

        Ok(token)
    }

    pub async fn is_revoked(&self, jti: &str) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    /// Barrido de tokens revocados con más de 30 días; para entonces el
    /// JWT ya expiró por sí solo
    pub async fn sweep_expired(&self) -> AppResult<u64> {
        let threshold = Utc::now() - Duration::days(30);

        let result = sqlx::query("DELETE FROM revoked_tokens WHERE created_at < $1")
            .bind(threshold)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
