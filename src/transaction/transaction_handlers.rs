use crate::{
    error::{AppError, Result},
    notification::notification_dto::PaginatedResponse,
    state::AppState,
};
use super::{
    transaction_dto::{CreateTransactionRequest, GeodataRequest, RespondTransactionRequest},
    transaction_models::{Transaction, TransactionStatus},
    transaction_repository::TransactionFilters,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize)]
pub struct TransactionListQuery {
    status: Option<String>,
    role: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

/// List the authenticated user's transactions
#[utoipa::path(
    get,
    path = "/api/transactions",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("role" = Option<String>, Query, description = "Filter by side (buyer, seller)"),
        ("page" = Option<u32>, Query, description = "Page number"),
        ("limit" = Option<u32>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "List of transactions", body = PaginatedResponse<Transaction>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "transactions",
    security(("bearer_auth" = []))
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<PaginatedResponse<Transaction>>> {
    let status = match query.status {
        Some(ref s) => Some(
            s.parse::<TransactionStatus>()
                .map_err(AppError::BadRequest)?
                .as_str()
                .to_string(),
        ),
        None => None,
    };

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let filters = TransactionFilters {
        status,
        role: query.role,
        page: Some(page),
        limit: Some(limit),
    };

    let (transactions, total) = state
        .transaction_service
        .list_transactions(user_id, filters)
        .await?;

    let total_pages = (total as f64 / limit as f64).ceil() as u32;

    Ok(Json(PaginatedResponse {
        data: transactions,
        total,
        page,
        limit,
        total_pages,
    }))
}

/// Get a single transaction
#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Transaction", body = Transaction),
        (status = 404, description = "Transaction not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "transactions",
    security(("bearer_auth" = []))
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<Transaction>> {
    let transaction = state
        .transaction_service
        .get_transaction(user_id, transaction_id)
        .await?;
    Ok(Json(transaction))
}

/// Create a transaction (buyer side)
#[utoipa::path(
    post,
    path = "/api/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction created", body = Transaction),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Seller not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "transactions",
    security(("bearer_auth" = []))
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<CreateTransactionRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let transaction = state
        .transaction_service
        .create_transaction(user_id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Respond to a pending transaction (seller side)
#[utoipa::path(
    post,
    path = "/api/transactions/{id}/respond",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    request_body = RespondTransactionRequest,
    responses(
        (status = 200, description = "Transaction updated", body = Transaction),
        (status = 400, description = "Illegal target status"),
        (status = 404, description = "Transaction not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "transactions",
    security(("bearer_auth" = []))
)]
pub async fn respond_transaction(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<RespondTransactionRequest>,
) -> Result<Json<Transaction>> {
    let status = payload
        .status
        .parse::<TransactionStatus>()
        .map_err(AppError::BadRequest)?;

    if status != TransactionStatus::Accepted && status != TransactionStatus::Rejected {
        return Err(AppError::BadRequest(
            "Status must be ACCEPTED or REJECTED".to_string(),
        ));
    }

    let transaction = state
        .transaction_service
        .respond(user_id, transaction_id, status)
        .await?;

    Ok(Json(transaction))
}

/// Re-send a pending offer to the seller
#[utoipa::path(
    post,
    path = "/api/transactions/{id}/resend",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Offer re-sent", body = Transaction),
        (status = 404, description = "Transaction not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "transactions",
    security(("bearer_auth" = []))
)]
pub async fn resend_transaction(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<Transaction>> {
    let transaction = state
        .transaction_service
        .resend(user_id, transaction_id)
        .await?;
    Ok(Json(transaction))
}

/// Ask the counterpart to provide geodata
#[utoipa::path(
    post,
    path = "/api/transactions/{id}/geodata/request",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Request delivered"),
        (status = 404, description = "Transaction not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "transactions",
    security(("bearer_auth" = []))
)]
pub async fn request_geodata(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(transaction_id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .transaction_service
        .request_geodata(user_id, transaction_id)
        .await?;
    Ok(StatusCode::OK)
}

/// Attach or update geodata on a transaction
#[utoipa::path(
    put,
    path = "/api/transactions/{id}/geodata",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    request_body = GeodataRequest,
    responses(
        (status = 200, description = "Geodata updated", body = Transaction),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Transaction not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "transactions",
    security(("bearer_auth" = []))
)]
pub async fn update_geodata(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<GeodataRequest>,
) -> Result<Json<Transaction>> {
    payload.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let geodata = json!({
        "latitude": payload.latitude,
        "longitude": payload.longitude,
        "accuracy": payload.accuracy,
    });

    let transaction = state
        .transaction_service
        .update_geodata(user_id, transaction_id, geodata)
        .await?;

    Ok(Json(transaction))
}
