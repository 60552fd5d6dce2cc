use crate::{
    error::{AppError, Result},
    state::AppState,
};
use super::{
    gadget_dto::{AddGadgetRequest, VerifyGadgetRequest},
    gadget_models::{Gadget, GadgetKind},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

/// List the authenticated user's gadgets
#[utoipa::path(
    get,
    path = "/api/gadgets",
    responses(
        (status = 200, description = "List of gadgets", body = Vec<Gadget>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "gadgets",
    security(("bearer_auth" = []))
)]
pub async fn list_gadgets(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<Gadget>>> {
    let gadgets = state.gadget_service.list_gadgets(user_id).await?;
    Ok(Json(gadgets))
}

/// Register a new contact channel
#[utoipa::path(
    post,
    path = "/api/gadgets",
    request_body = AddGadgetRequest,
    responses(
        (status = 201, description = "Gadget created", body = Gadget),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Gadget already registered"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "gadgets",
    security(("bearer_auth" = []))
)]
pub async fn add_gadget(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<AddGadgetRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let kind: GadgetKind = payload.kind.parse()
        .map_err(|e: String| AppError::BadRequest(e))?;

    let gadget = state.gadget_service.add_gadget(user_id, kind, &payload.value).await?;

    Ok((StatusCode::CREATED, Json(gadget)))
}

/// Send a verification code to a gadget
#[utoipa::path(
    post,
    path = "/api/gadgets/{id}/verification",
    params(
        ("id" = Uuid, Path, description = "Gadget ID")
    ),
    responses(
        (status = 200, description = "Verification code dispatched"),
        (status = 400, description = "Gadget already verified"),
        (status = 404, description = "Gadget not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "gadgets",
    security(("bearer_auth" = []))
)]
pub async fn request_verification(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(gadget_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.gadget_service.request_verification(user_id, gadget_id).await?;
    Ok(StatusCode::OK)
}

/// Verify a gadget with a one-time code
#[utoipa::path(
    post,
    path = "/api/gadgets/{id}/verify",
    params(
        ("id" = Uuid, Path, description = "Gadget ID")
    ),
    request_body = VerifyGadgetRequest,
    responses(
        (status = 200, description = "Gadget verified", body = Gadget),
        (status = 400, description = "Invalid or expired code"),
        (status = 404, description = "Gadget not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "gadgets",
    security(("bearer_auth" = []))
)]
pub async fn verify_gadget(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(gadget_id): Path<Uuid>,
    Json(payload): Json<VerifyGadgetRequest>,
) -> Result<Json<Gadget>> {
    payload.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let gadget = state.gadget_service
        .verify_gadget(user_id, gadget_id, &payload.code)
        .await?;

    Ok(Json(gadget))
}

/// Remove a gadget
#[utoipa::path(
    delete,
    path = "/api/gadgets/{id}",
    params(
        ("id" = Uuid, Path, description = "Gadget ID")
    ),
    responses(
        (status = 204, description = "Gadget deleted"),
        (status = 404, description = "Gadget not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "gadgets",
    security(("bearer_auth" = []))
)]
pub async fn delete_gadget(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(gadget_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.gadget_service.delete_gadget(user_id, gadget_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
