use crate::error::{AppError, Result};
use crate::notification::notification_models::Notification;
use crate::notification::notification_repository::NotificationRepository;
use crate::notification::settings_repository::SettingsRepository;
use crate::queue::TaskQueue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::device_models::{Device, DevicePlatform};
use super::device_repository::DeviceRepository;

/// Serialized notification carried by a push task. The receiver is optional
/// at this boundary: a snapshot that lost its receiver is dropped by the
/// worker instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSnapshot {
    pub id: Uuid,
    pub notification_type: String,
    pub received_by: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationSnapshot {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            notification_type: notification.notification_type.clone(),
            received_by: Some(notification.received_by),
            created_by: notification.created_by,
            data: notification.data.clone(),
            created_at: notification.created_at,
        }
    }
}

/// One channel delivery attempt for one notification.
#[derive(Debug, Clone)]
pub struct PushTask {
    pub platform: DevicePlatform,
    pub notification: NotificationSnapshot,
}

/// Notifications whose (receiver, type) pair is enabled. Receivers with a
/// disabled or missing settings row drop out here.
pub fn filter_eligible<'a>(
    notifications: &'a [Notification],
    enabled: &HashSet<(Uuid, String)>,
) -> Vec<&'a Notification> {
    notifications
        .iter()
        .filter(|n| enabled.contains(&(n.received_by, n.notification_type.clone())))
        .collect()
}

#[derive(Clone)]
pub struct PushService {
    device_repo: DeviceRepository,
    settings_repo: SettingsRepository,
    notification_repo: NotificationRepository,
    push_queue: TaskQueue<PushTask>,
}

impl PushService {
    pub fn new(
        device_repo: DeviceRepository,
        settings_repo: SettingsRepository,
        notification_repo: NotificationRepository,
        push_queue: TaskQueue<PushTask>,
    ) -> Self {
        Self {
            device_repo,
            settings_repo,
            notification_repo,
            push_queue,
        }
    }

    /// Register a push target. Registration ids are unique across both
    /// platforms, so a collision on either table is a conflict.
    pub async fn add_device(
        &self,
        user_id: Uuid,
        platform: DevicePlatform,
        registration_id: &str,
        name: Option<&str>,
    ) -> Result<Device> {
        if self.device_repo.registration_id_exists(registration_id).await? {
            return Err(AppError::Conflict("Device already registered".into()));
        }

        self.device_repo
            .create(platform, user_id, registration_id, name)
            .await
    }

    /// Fan the given notifications out to the push channels, filtered by the
    /// receivers' per-type settings. Fire-and-forget: once a task is on the
    /// queue the caller is done, and failures stay in the queue's logs.
    pub async fn send_push(&self, notification_ids: &[Uuid]) -> Result<()> {
        if notification_ids.is_empty() {
            return Ok(());
        }

        let notifications = self.notification_repo.find_by_ids(notification_ids).await?;
        if notifications.is_empty() {
            return Ok(());
        }

        let receiver_ids: Vec<Uuid> = notifications
            .iter()
            .map(|n| n.received_by)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let enabled = self.settings_repo.enabled_pairs(&receiver_ids).await?;

        for notification in filter_eligible(&notifications, &enabled) {
            let snapshot = NotificationSnapshot::from(notification);
            for platform in [DevicePlatform::Fcm, DevicePlatform::Apns] {
                self.push_queue.enqueue(PushTask {
                    platform,
                    notification: snapshot.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::notification_models::{NotificationStatus, NotificationType};

    fn notification(received_by: Uuid, notification_type: NotificationType) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            notification_type: notification_type.as_str().to_string(),
            status: NotificationStatus::Pending.as_str().to_string(),
            data: serde_json::json!({}),
            received_by,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_disabled_type_is_filtered_out() {
        let user = Uuid::new_v4();
        let notifications = vec![notification(user, NotificationType::TransactionPending)];
        // The settings row exists but is disabled, so it is absent from the
        // enabled set.
        let enabled = HashSet::new();
        assert!(filter_eligible(&notifications, &enabled).is_empty());
    }

    #[test]
    fn test_missing_settings_row_is_filtered_out() {
        let with_settings = Uuid::new_v4();
        let without_settings = Uuid::new_v4();
        let notifications = vec![
            notification(with_settings, NotificationType::TransactionPending),
            notification(without_settings, NotificationType::TransactionPending),
        ];
        let enabled: HashSet<(Uuid, String)> = [(
            with_settings,
            NotificationType::TransactionPending.as_str().to_string(),
        )]
        .into_iter()
        .collect();

        let eligible = filter_eligible(&notifications, &enabled);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].received_by, with_settings);
    }

    #[test]
    fn test_eligibility_is_per_type() {
        let user = Uuid::new_v4();
        let notifications = vec![
            notification(user, NotificationType::TransactionPending),
            notification(user, NotificationType::GeodataMissing),
        ];
        let enabled: HashSet<(Uuid, String)> = [(
            user,
            NotificationType::GeodataMissing.as_str().to_string(),
        )]
        .into_iter()
        .collect();

        let eligible = filter_eligible(&notifications, &enabled);
        assert_eq!(eligible.len(), 1);
        assert_eq!(
            eligible[0].notification_type,
            NotificationType::GeodataMissing.as_str()
        );
    }

    #[test]
    fn test_snapshot_keeps_receiver() {
        let n = notification(Uuid::new_v4(), NotificationType::TransactionExpired);
        let snapshot = NotificationSnapshot::from(&n);
        assert_eq!(snapshot.received_by, Some(n.received_by));
        assert_eq!(snapshot.notification_type, n.notification_type);
    }
}
