use crate::db::DbPool;
use crate::error::Result;
use uuid::Uuid;

use super::notification_dto::NotificationSettingUpdate;
use super::notification_models::NotificationSettings;
use super::settings_repository::SettingsRepository;

/// Split the incoming updates into the types to enable and the types to
/// disable. A type appearing multiple times keeps its last state.
pub fn partition_updates(updates: &[NotificationSettingUpdate]) -> (Vec<String>, Vec<String>) {
    let mut enable = Vec::new();
    let mut disable = Vec::new();

    for update in updates {
        enable.retain(|t| t != &update.notification_type);
        disable.retain(|t| t != &update.notification_type);
        if update.is_enabled {
            enable.push(update.notification_type.clone());
        } else {
            disable.push(update.notification_type.clone());
        }
    }

    (enable, disable)
}

#[derive(Clone)]
pub struct SettingsService {
    db: DbPool,
    repo: SettingsRepository,
}

impl SettingsService {
    pub fn new(db: DbPool, repo: SettingsRepository) -> Self {
        Self { db, repo }
    }

    pub async fn list_settings(&self, user_id: Uuid) -> Result<Vec<NotificationSettings>> {
        self.repo.find_all_by_user(user_id).await
    }

    /// Bulk enable/disable in one atomic scope. Types with no existing row
    /// are silently ignored, never created.
    pub async fn update_notification_settings(
        &self,
        user_id: Uuid,
        updates: &[NotificationSettingUpdate],
    ) -> Result<Vec<NotificationSettings>> {
        let (enable, disable) = partition_updates(updates);

        let mut tx = self.db.begin().await?;
        if !enable.is_empty() {
            self.repo
                .set_enabled_with_tx(&mut tx, user_id, &enable, true)
                .await?;
        }
        if !disable.is_empty() {
            self.repo
                .set_enabled_with_tx(&mut tx, user_id, &disable, false)
                .await?;
        }
        tx.commit().await?;

        self.repo.find_all_by_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(notification_type: &str, is_enabled: bool) -> NotificationSettingUpdate {
        NotificationSettingUpdate {
            notification_type: notification_type.to_string(),
            is_enabled,
        }
    }

    #[test]
    fn test_partition_splits_by_state() {
        let (enable, disable) = partition_updates(&[
            update("TRANSACTION_PENDING", true),
            update("GEODATA_MISSING", false),
            update("TRANSACTION_EXPIRED", true),
        ]);
        assert_eq!(enable, vec!["TRANSACTION_PENDING", "TRANSACTION_EXPIRED"]);
        assert_eq!(disable, vec!["GEODATA_MISSING"]);
    }

    #[test]
    fn test_partition_last_state_wins() {
        let (enable, disable) = partition_updates(&[
            update("TRANSACTION_PENDING", true),
            update("TRANSACTION_PENDING", false),
        ]);
        assert!(enable.is_empty());
        assert_eq!(disable, vec!["TRANSACTION_PENDING"]);
    }

    #[test]
    fn test_partition_empty() {
        let (enable, disable) = partition_updates(&[]);
        assert!(enable.is_empty());
        assert!(disable.is_empty());
    }
}
