use crate::{
    error::{AppError, Result},
    state::AppState,
};
use super::{
    notification_dto::{
        PaginatedResponse, UpdateNotificationSettingsRequest, UpdateNotificationStatusRequest,
    },
    notification_models::{Notification, NotificationSettings, NotificationStatus, NotificationType},
    notification_repository::NotificationFilters,
};
use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use futures::stream::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct NotificationListQuery {
    search: Option<String>,
    status: Option<String>,
    /// Comma-separated list of notification types.
    types: Option<String>,
    created_by: Option<Uuid>,
    created_from: Option<DateTime<Utc>>,
    created_to: Option<DateTime<Utc>>,
    page: Option<u32>,
    limit: Option<u32>,
}

/// List notifications for the authenticated user
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(
        ("search" = Option<String>, Query, description = "Match type name or payload substring"),
        ("status" = Option<String>, Query, description = "Filter by status (PENDING, READ)"),
        ("types" = Option<String>, Query, description = "Comma-separated notification types"),
        ("created_by" = Option<Uuid>, Query, description = "Filter by originating user"),
        ("created_from" = Option<String>, Query, description = "Created at or after (RFC 3339)"),
        ("created_to" = Option<String>, Query, description = "Created at or before (RFC 3339)"),
        ("page" = Option<u32>, Query, description = "Page number"),
        ("limit" = Option<u32>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "List of notifications", body = PaginatedResponse<Notification>),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<PaginatedResponse<Notification>>> {
    let status = match query.status {
        Some(ref s) => Some(
            s.parse::<NotificationStatus>()
                .map_err(AppError::BadRequest)?
                .as_str()
                .to_string(),
        ),
        None => None,
    };

    let types = match query.types {
        Some(ref raw) => {
            let mut types = Vec::new();
            for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let parsed = part
                    .parse::<NotificationType>()
                    .map_err(AppError::BadRequest)?;
                types.push(parsed.as_str().to_string());
            }
            if types.is_empty() { None } else { Some(types) }
        }
        None => None,
    };

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let filters = NotificationFilters {
        search: query.search,
        status,
        types,
        created_by: query.created_by,
        created_from: query.created_from,
        created_to: query.created_to,
        page: Some(page),
        limit: Some(limit),
    };

    let (notifications, total) = state
        .notification_service
        .list_notifications(user_id, filters)
        .await?;

    let total_pages = (total as f64 / limit as f64).ceil() as u32;

    Ok(Json(PaginatedResponse {
        data: notifications,
        total,
        page,
        limit,
        total_pages,
    }))
}

/// Subscribe to real-time notifications via Server-Sent Events
#[utoipa::path(
    get,
    path = "/api/notifications/stream",
    responses(
        (status = 200, description = "SSE stream of notifications"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn notification_stream(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let rx = state.notification_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok((receiver_id, notification)) if receiver_id == user_id => {
            let json = serde_json::to_string(&notification).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Update a notification's status (only PENDING -> READ)
#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    request_body = UpdateNotificationStatusRequest,
    responses(
        (status = 200, description = "Notification updated", body = Notification),
        (status = 400, description = "Illegal target status"),
        (status = 404, description = "Notification not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn update_notification_status(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(notification_id): Path<Uuid>,
    Json(payload): Json<UpdateNotificationStatusRequest>,
) -> Result<Json<Notification>> {
    let target = payload
        .status
        .parse::<NotificationStatus>()
        .map_err(AppError::BadRequest)?;

    if target != NotificationStatus::Read {
        return Err(AppError::BadRequest(
            "Only the READ status can be set".to_string(),
        ));
    }

    let notification = state
        .notification_service
        .update_status(user_id, notification_id)
        .await?;

    Ok(Json(notification))
}

/// Get per-type notification settings
#[utoipa::path(
    get,
    path = "/api/notifications/settings",
    responses(
        (status = 200, description = "Notification settings", body = Vec<NotificationSettings>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn get_notification_settings(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<NotificationSettings>>> {
    let settings = state.settings_service.list_settings(user_id).await?;
    Ok(Json(settings))
}

/// Bulk-update per-type notification settings
#[utoipa::path(
    put,
    path = "/api/notifications/settings",
    request_body = UpdateNotificationSettingsRequest,
    responses(
        (status = 200, description = "Updated settings", body = Vec<NotificationSettings>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn update_notification_settings(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<UpdateNotificationSettingsRequest>,
) -> Result<Json<Vec<NotificationSettings>>> {
    let settings = state
        .settings_service
        .update_notification_settings(user_id, &payload.settings)
        .await?;

    Ok(Json(settings))
}
