use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateNotificationStatusRequest {
    /// Target status; only "READ" is accepted.
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NotificationSettingUpdate {
    pub notification_type: String,
    pub is_enabled: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateNotificationSettingsRequest {
    pub settings: Vec<NotificationSettingUpdate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}
