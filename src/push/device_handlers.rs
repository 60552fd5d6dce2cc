use crate::{
    error::{AppError, Result},
    state::AppState,
};
use super::device_models::{Device, DevicePlatform};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddDeviceRequest {
    /// "FCM" or "APNS"
    pub platform: String,
    #[validate(length(min = 1, max = 4096))]
    pub registration_id: String,
    #[validate(length(max = 100))]
    pub name: Option<String>,
}

/// Register a device for push notifications
#[utoipa::path(
    post,
    path = "/api/devices",
    request_body = AddDeviceRequest,
    responses(
        (status = 201, description = "Device registered", body = Device),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Registration id already in use"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "devices",
    security(("bearer_auth" = []))
)]
pub async fn add_device(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<AddDeviceRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let platform: DevicePlatform = payload.platform.parse()
        .map_err(|e: String| AppError::BadRequest(e))?;

    let device = state.push_service
        .add_device(
            user_id,
            platform,
            &payload.registration_id,
            payload.name.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(device)))
}
