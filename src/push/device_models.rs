use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DevicePlatform {
    Fcm,
    Apns,
}

impl DevicePlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            DevicePlatform::Fcm => "FCM",
            DevicePlatform::Apns => "APNS",
        }
    }
}

impl std::fmt::Display for DevicePlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DevicePlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FCM" => Ok(DevicePlatform::Fcm),
            "APNS" => Ok(DevicePlatform::Apns),
            other => Err(format!("unknown device platform: {}", other)),
        }
    }
}

/// A registered push target. The row shape is identical for both platform
/// tables; `registration_id` is unique across the two combined, checked at
/// registration time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Device {
    pub id: Uuid,
    pub user_id: Uuid,
    pub registration_id: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_platform_round_trip() {
        assert_eq!(DevicePlatform::from_str("FCM").unwrap(), DevicePlatform::Fcm);
        assert_eq!(DevicePlatform::from_str("APNS").unwrap(), DevicePlatform::Apns);
        assert!(DevicePlatform::from_str("WNS").is_err());
    }
}
