//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not active: {0}")]
    NotActive(String),

    #[error("Immutable: {0}")]
    Immutable(String),

    #[error("Generation exhausted: {0}")]
    GenerationExhausted(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Database(e) => {
                // Violaciones de integridad (unique/exclusion) emergen de
                // constraints que duplican reglas de negocio: son conflictos
                // del cliente, no fallos del servidor
                let violation = e
                    .as_database_error()
                    .and_then(|db| db.code())
                    .is_some_and(|code| is_integrity_violation(&code));

                if violation {
                    tracing::warn!("Integrity violation: {}", e);
                    (
                        StatusCode::CONFLICT,
                        ErrorResponse {
                            error: "Conflict".to_string(),
                            message: "The operation conflicts with existing data".to_string(),
                            details: Some(json!({ "sql_error": e.to_string() })),
                            code: Some("CONFLICT".to_string()),
                        },
                    )
                } else {
                    tracing::error!("Database error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorResponse {
                            error: "Database Error".to_string(),
                            message: "An error occurred while accessing the database".to_string(),
                            details: Some(json!({ "sql_error": e.to_string() })),
                            code: Some("DB_ERROR".to_string()),
                        },
                    )
                }
            }

            AppError::Validation(e) => {
                tracing::warn!("Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Validation Error".to_string(),
                        message: "The provided data is invalid".to_string(),
                        details: Some(json!(e)),
                        code: Some("VALIDATION_ERROR".to_string()),
                    },
                )
            }

            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    error: "Unauthorized".to_string(),
                    message: msg,
                    details: None,
                    code: Some("UNAUTHORIZED".to_string()),
                },
            ),

            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorResponse {
                    error: "Forbidden".to_string(),
                    message: msg,
                    details: None,
                    code: Some("FORBIDDEN".to_string()),
                },
            ),

            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "Not Found".to_string(),
                    message: msg,
                    details: None,
                    code: Some("NOT_FOUND".to_string()),
                },
            ),

            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: "Conflict".to_string(),
                    message: msg,
                    details: None,
                    code: Some("CONFLICT".to_string()),
                },
            ),

            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Bad Request".to_string(),
                    message: msg,
                    details: None,
                    code: Some("BAD_REQUEST".to_string()),
                },
            ),

            AppError::NotActive(msg) => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: "Not Active".to_string(),
                    message: msg,
                    details: None,
                    code: Some("NOT_ACTIVE".to_string()),
                },
            ),

            AppError::Immutable(msg) => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: "Immutable".to_string(),
                    message: msg,
                    details: None,
                    code: Some("IMMUTABLE".to_string()),
                },
            ),

            AppError::GenerationExhausted(msg) => {
                tracing::error!("Generación de código agotada: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Generation Exhausted".to_string(),
                        message: msg,
                        details: None,
                        code: Some("GENERATION_EXHAUSTED".to_string()),
                    },
                )
            }

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal Server Error".to_string(),
                        message: "An unexpected error occurred".to_string(),
                        details: Some(json!({ "internal_error": msg })),
                        code: Some("INTERNAL_ERROR".to_string()),
                    },
                )
            }

            AppError::Jwt(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    error: "JWT Error".to_string(),
                    message: msg,
                    details: None,
                    code: Some("JWT_ERROR".to_string()),
                },
            ),

            AppError::Hash(msg) => {
                tracing::error!("Hash error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Hash Error".to_string(),
                        message: "An error occurred while processing credentials".to_string(),
                        details: Some(json!({ "hash_error": msg })),
                        code: Some("HASH_ERROR".to_string()),
                    },
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Códigos SQLSTATE que denotan violación de integridad: 23505
/// (unique_violation) y 23P01 (exclusion_violation, solapamiento de
/// reservas del mismo vehículo)
fn is_integrity_violation(code: &str) -> bool {
    matches!(code, "23505" | "23P01")
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_active_maps_to_conflict_status() {
        let response = AppError::NotActive("el carrito no está activo".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let response = AppError::Forbidden("no eres el propietario".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_integrity_violation_codes() {
        assert!(is_integrity_violation("23505"));
        assert!(is_integrity_violation("23P01"));
        assert!(!is_integrity_violation("23503"));
        assert!(!is_integrity_violation("42P01"));
    }

    #[test]
    fn test_generation_exhausted_is_500() {
        let response =
            AppError::GenerationExhausted("sin códigos libres".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
