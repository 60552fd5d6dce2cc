use crate::error::{AppError, Result};
use crate::user::user_dto::UpdateProfileRequest;
use crate::user::user_models::User;
use crate::user::user_repository::UserRepository;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    pub async fn update_profile(&self, user_id: Uuid, payload: UpdateProfileRequest) -> Result<User> {
        self.repo
            .update_profile(
                user_id,
                payload.username.as_deref(),
                payload.avatar_url.as_deref(),
            )
            .await
    }
}
