//! Modelos de autenticación
//!
//! Token revocado persistido: la blacklist de JWT sobrevive a reinicios
//! del proceso (tabla revoked_tokens, barrido de 30 días).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Fila de la tabla revoked_tokens
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RevokedToken {
    pub id: Uuid,
    pub jti: String,
    pub created_at: DateTime<Utc>,
}
