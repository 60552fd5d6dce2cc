use crate::notification::notification_models::NotificationType;
use crate::notification::notification_repository::NotificationRepository;
use crate::notification::settings_repository::SettingsRepository;
use std::sync::Arc;
use tracing::debug;

use super::channels::{PushChannel, PushMessage};
use super::device_repository::DeviceRepository;
use super::push_service::{NotificationSnapshot, PushTask};

/// Drains the push queue. Each task re-checks eligibility on fresh data
/// before touching a provider: settings may have flipped between fan-out
/// and delivery.
pub struct PushWorker {
    device_repo: DeviceRepository,
    settings_repo: SettingsRepository,
    notification_repo: NotificationRepository,
    channels: Vec<Arc<dyn PushChannel>>,
}

impl PushWorker {
    pub fn new(
        device_repo: DeviceRepository,
        settings_repo: SettingsRepository,
        notification_repo: NotificationRepository,
        channels: Vec<Arc<dyn PushChannel>>,
    ) -> Self {
        Self {
            device_repo,
            settings_repo,
            notification_repo,
            channels,
        }
    }

    fn render(snapshot: &NotificationSnapshot, badge: i64) -> PushMessage {
        let title = snapshot
            .notification_type
            .parse::<NotificationType>()
            .map(|t| t.headline().to_string())
            .unwrap_or_else(|_| snapshot.notification_type.clone());

        PushMessage {
            title,
            body: "Open tradepost for details".to_string(),
            badge,
            data: snapshot.data.clone(),
        }
    }

    /// A skipped task is a success: aborting without a send is the intended
    /// outcome for stale or ineligible snapshots, not a retryable failure.
    pub async fn deliver(&self, task: PushTask) -> anyhow::Result<()> {
        let Some(user_id) = task.notification.received_by else {
            debug!("push task without receiver, skipping");
            return Ok(());
        };

        if !self
            .settings_repo
            .is_enabled(user_id, &task.notification.notification_type)
            .await?
        {
            debug!(
                "push disabled for user {} type {}, skipping",
                user_id, task.notification.notification_type
            );
            return Ok(());
        }

        let Some(channel) = self.channels.iter().find(|c| c.platform() == task.platform) else {
            debug!("no channel configured for {}, skipping", task.platform);
            return Ok(());
        };

        let devices = self.device_repo.find_by_user(user_id, task.platform).await?;
        if devices.is_empty() {
            return Ok(());
        }

        let badge = self.notification_repo.count_pending(user_id).await?;
        let message = Self::render(&task.notification, badge);

        for device in &devices {
            channel.send(&device.registration_id, &message).await?;
        }

        debug!(
            "pushed notification {} to {} {} device(s)",
            task.notification.id,
            devices.len(),
            task.platform
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_render_uses_type_headline() {
        let snapshot = NotificationSnapshot {
            id: Uuid::new_v4(),
            notification_type: NotificationType::GeodataMissing.as_str().to_string(),
            received_by: Some(Uuid::new_v4()),
            created_by: None,
            data: serde_json::json!({"transaction": {"id": "x"}}),
            created_at: Utc::now(),
        };
        let message = PushWorker::render(&snapshot, 3);
        assert_eq!(message.title, "Pickup location needed");
        assert_eq!(message.badge, 3);
        assert_eq!(message.data["transaction"]["id"], "x");
    }

    #[test]
    fn test_render_falls_back_to_raw_type() {
        let snapshot = NotificationSnapshot {
            id: Uuid::new_v4(),
            notification_type: "LEGACY_TYPE".to_string(),
            received_by: None,
            created_by: None,
            data: serde_json::json!({}),
            created_at: Utc::now(),
        };
        let message = PushWorker::render(&snapshot, 0);
        assert_eq!(message.title, "LEGACY_TYPE");
    }
}
