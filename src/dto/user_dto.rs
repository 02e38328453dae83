//! DTOs de usuarios

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::User;

/// Response de usuario (sin password)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub role: String,
    pub bday: NaiveDate,
    pub place: String,
    pub register_ts: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            surname: user.surname,
            email: user.email,
            role: user.role,
            bday: user.bday,
            place: user.place,
            register_ts: user.register_ts,
        }
    }
}

/// Request para actualizar el perfil (nunca password ni rol)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub surname: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    pub bday: Option<NaiveDate>,

    #[validate(length(min = 1, max = 100))]
    pub place: Option<String>,
}

/// Request para cambiar el rol de un usuario (solo admin)
#[derive(Debug, Deserialize, Validate)]
pub struct ChangeRoleRequest {
    #[validate(length(min = 1, max = 50))]
    pub role: String,
}
