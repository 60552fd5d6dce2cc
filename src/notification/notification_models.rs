use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    TransactionPending,
    TransactionAccepted,
    TransactionRejected,
    TransactionExpired,
    GeodataMissing,
    GeodataUpdated,
}

impl NotificationType {
    pub const ALL: [NotificationType; 6] = [
        NotificationType::TransactionPending,
        NotificationType::TransactionAccepted,
        NotificationType::TransactionRejected,
        NotificationType::TransactionExpired,
        NotificationType::GeodataMissing,
        NotificationType::GeodataUpdated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::TransactionPending => "TRANSACTION_PENDING",
            NotificationType::TransactionAccepted => "TRANSACTION_ACCEPTED",
            NotificationType::TransactionRejected => "TRANSACTION_REJECTED",
            NotificationType::TransactionExpired => "TRANSACTION_EXPIRED",
            NotificationType::GeodataMissing => "GEODATA_MISSING",
            NotificationType::GeodataUpdated => "GEODATA_UPDATED",
        }
    }

    /// Short headline used for push alerts.
    pub fn headline(&self) -> &'static str {
        match self {
            NotificationType::TransactionPending => "New trade offer",
            NotificationType::TransactionAccepted => "Offer accepted",
            NotificationType::TransactionRejected => "Offer declined",
            NotificationType::TransactionExpired => "Offer expired",
            NotificationType::GeodataMissing => "Pickup location needed",
            NotificationType::GeodataUpdated => "Pickup location updated",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown notification type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    Pending,
    Read,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "PENDING",
            NotificationStatus::Read => "READ",
        }
    }
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NotificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(NotificationStatus::Pending),
            "READ" => Ok(NotificationStatus::Read),
            other => Err(format!("unknown notification status: {}", other)),
        }
    }
}

/// A business event addressed to one user. `data` carries a snapshot of the
/// transaction that triggered it; `created_by` is null for system-generated
/// events such as expiry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub notification_type: String,
    pub status: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    pub received_by: Uuid,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct NotificationSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: String,
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_notification_type_round_trip() {
        for t in NotificationType::ALL {
            assert_eq!(NotificationType::from_str(t.as_str()).unwrap(), t);
        }
        assert!(NotificationType::from_str("TRANSACTION_UNKNOWN").is_err());
    }

    #[test]
    fn test_notification_type_serde_matches_as_str() {
        for t in NotificationType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn test_notification_status_round_trip() {
        assert_eq!(NotificationStatus::from_str("PENDING").unwrap(), NotificationStatus::Pending);
        assert_eq!(NotificationStatus::from_str("READ").unwrap(), NotificationStatus::Read);
        assert!(NotificationStatus::from_str("ARCHIVED").is_err());
    }
}
