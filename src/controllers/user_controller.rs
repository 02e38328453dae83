//! Controller de usuarios
//!
//! Perfil propio, administración de la lista de usuarios y cambio de rol.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::user_dto::{ChangeRoleRequest, UpdateUserRequest, UserResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::{AppError, AppResult};

pub struct UserController {
    repository: UserRepository,
}

impl UserController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UserRepository::new(pool),
        }
    }

    pub async fn list_all(&self) -> AppResult<Vec<UserResponse>> {
        let users = self.repository.list_all().await?;

        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    /// Un admin puede ver cualquier usuario; el resto sólo a sí mismo
    pub async fn get_by_id(
        &self,
        auth: &AuthenticatedUser,
        id: Uuid,
    ) -> AppResult<UserResponse> {
        if !auth.is_admin() && auth.user_id != id {
            return Err(AppError::Forbidden(
                "No tienes permiso para ver este usuario".to_string(),
            ));
        }

        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        Ok(UserResponse::from(user))
    }

    pub async fn update_profile(
        &self,
        auth: &AuthenticatedUser,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> AppResult<UserResponse> {
        request.validate()?;

        if !auth.is_admin() && auth.user_id != id {
            return Err(AppError::Forbidden(
                "No tienes permiso para modificar este usuario".to_string(),
            ));
        }

        if let Some(new_email) = &request.email {
            let current = self
                .repository
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

            if *new_email != current.email && self.repository.email_exists(new_email).await? {
                return Err(AppError::Conflict(
                    "El email ya está registrado".to_string(),
                ));
            }
        }

        let user = self
            .repository
            .update_profile(
                id,
                request.name,
                request.surname,
                request.email,
                request.bday,
                request.place,
            )
            .await?;

        Ok(UserResponse::from(user))
    }

    pub async fn change_role(
        &self,
        id: Uuid,
        request: ChangeRoleRequest,
    ) -> AppResult<UserResponse> {
        request.validate()?;

        if request.role != "user" && request.role != "admin" {
            return Err(AppError::BadRequest(format!(
                "Rol desconocido: '{}'",
                request.role
            )));
        }

        let user = self.repository.change_role(id, &request.role).await?;

        tracing::info!("🛡️ Rol de {} cambiado a {}", user.email, user.role);

        Ok(UserResponse::from(user))
    }

    pub async fn delete(&self, auth: &AuthenticatedUser, id: Uuid) -> AppResult<()> {
        if !auth.is_admin() && auth.user_id != id {
            return Err(AppError::Forbidden(
                "No tienes permiso para eliminar este usuario".to_string(),
            ));
        }

        self.repository.delete(id).await
    }
}
