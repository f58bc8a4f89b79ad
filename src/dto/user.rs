use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{UserEntity, UserId},
    dto::validation::validate_username,
};

/// Payload used to register a player.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 3, max = 32), custom(function = "validate_username"))]
    pub username: String,
}

/// Newly registered player together with the token identifying them in lobbies.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisteredUser {
    pub id: UserId,
    pub username: String,
    pub token: String,
}

impl From<UserEntity> for RegisteredUser {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            username: user.username,
            token: user.token,
        }
    }
}

/// Public view of a player; the token is only handed out at registration.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
}

impl From<UserEntity> for UserSummary {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}
