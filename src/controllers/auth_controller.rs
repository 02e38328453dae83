//! Controller de autenticación
//!
//! Registro, login, logout y consulta del usuario actual. Los passwords
//! se almacenan con bcrypt y los tokens revocados se persisten por jti.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::environment::EnvironmentConfig;
use crate::dto::auth_dto::{ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest};
use crate::dto::user_dto::UserResponse;
use crate::repositories::token_repository::TokenRepository;
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};

pub struct AuthController {
    users: UserRepository,
    tokens: TokenRepository,
    jwt_config: JwtConfig,
}

impl AuthController {
    pub fn new(pool: PgPool, config: &EnvironmentConfig) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            tokens: TokenRepository::new(pool),
            jwt_config: JwtConfig::from(config),
        }
    }

    /// El registro siempre crea rol 'user'; la promoción a admin es
    /// una operación aparte reservada a otro admin.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<LoginResponse> {
        request.validate()?;

        if self.users.email_exists(&request.email).await? {
            return Err(AppError::Conflict(
                "El email ya está registrado".to_string(),
            ));
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Hash(format!("Error hasheando password: {}", e)))?;

        let user = self
            .users
            .create(
                request.name,
                request.surname,
                request.email,
                password_hash,
                request.bday,
                request.place,
                "user",
            )
            .await?;

        tracing::info!("👤 Usuario registrado: {}", user.email);

        let token = generate_token(user.id, &user.role, &self.jwt_config)?;

        Ok(LoginResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_config.expiration,
            user: UserResponse::from(user),
        })
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        request.validate()?;

        // Mismo error para email inexistente y password incorrecto
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Credenciales inválidas".to_string()))?;

        let valid = bcrypt::verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Hash(format!("Error verificando password: {}", e)))?;

        if !valid {
            return Err(AppError::Unauthorized("Credenciales inválidas".to_string()));
        }

        tracing::info!("🔑 Login exitoso: {}", user.email);

        let token = generate_token(user.id, &user.role, &self.jwt_config)?;

        Ok(LoginResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_config.expiration,
            user: UserResponse::from(user),
        })
    }

    /// Revoca el jti del token actual y aprovecha para barrer los
    /// revocados antiguos, ya expirados por sí solos.
    pub async fn logout(&self, jti: &str) -> AppResult<()> {
        self.tokens.revoke(jti).await?;

        let swept = self.tokens.sweep_expired().await?;
        if swept > 0 {
            tracing::debug!("🧹 {} tokens revocados antiguos eliminados", swept);
        }

        Ok(())
    }

    /// Cambia el password verificando antes el actual. Con el mismo
    /// error que el login ante un password incorrecto.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        request.validate()?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        let valid = bcrypt::verify(&request.old_password, &user.password_hash)
            .map_err(|e| AppError::Hash(format!("Error verificando password: {}", e)))?;

        if !valid {
            return Err(AppError::Unauthorized("Credenciales inválidas".to_string()));
        }

        let password_hash = bcrypt::hash(&request.new_password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Hash(format!("Error hasheando password: {}", e)))?;

        self.users.update_password(user_id, &password_hash).await?;

        tracing::info!("🔒 Password actualizado para {}", user.email);

        Ok(())
    }

    /// Emite un token nuevo a partir de uno todavía válido y revoca el
    /// jti anterior: refrescar consume el token de origen
    pub async fn refresh(&self, user_id: Uuid, jti: &str) -> AppResult<LoginResponse> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        let token = generate_token(user.id, &user.role, &self.jwt_config)?;

        self.tokens.revoke(jti).await?;

        Ok(LoginResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_config.expiration,
            user: UserResponse::from(user),
        })
    }

    pub async fn me(&self, user_id: Uuid) -> AppResult<UserResponse> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        Ok(UserResponse::from(user))
    }
}
