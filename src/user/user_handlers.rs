use crate::{
    error::{AppError, Result},
    state::AppState,
};
use super::{
    user_dto::UpdateProfileRequest,
    user_models::UserResponse,
};
use axum::{extract::State, Extension, Json};
use uuid::Uuid;
use validator::Validate;

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn get_me(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<UserResponse>> {
    let user = state.user_service.get_user(user_id).await?;
    Ok(Json(user.into()))
}

/// Update the authenticated user's profile
#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    payload.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.user_service.update_profile(user_id, payload).await?;
    Ok(Json(user.into()))
}
