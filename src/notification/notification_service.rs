use crate::error::{AppError, Result};
use crate::transaction::transaction_models::Transaction;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::notification_models::{Notification, NotificationType};
use super::notification_repository::{NotificationFilters, NotificationRepository};

/// Embed a snapshot of the triggering transaction in the notification
/// payload. The dedupe lookup and the fan-in query both key on
/// `data.transaction.id`.
pub fn transaction_snapshot(transaction: &Transaction) -> serde_json::Value {
    serde_json::json!({ "transaction": transaction })
}

/// Distinct non-null originators of the given notifications, in first-seen
/// order. Notifications without an originator are skipped.
pub fn distinct_originators(notifications: &[Notification]) -> Vec<Uuid> {
    let mut seen = Vec::new();
    for notification in notifications {
        let Some(originator) = notification.created_by else {
            continue;
        };
        if !seen.contains(&originator) {
            seen.push(originator);
        }
    }
    seen
}

#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
    notification_tx: broadcast::Sender<(Uuid, Notification)>,
}

impl NotificationService {
    pub fn new(
        repo: NotificationRepository,
        notification_tx: broadcast::Sender<(Uuid, Notification)>,
    ) -> Self {
        Self {
            repo,
            notification_tx,
        }
    }

    /// Create a notification for a transaction event.
    ///
    /// GEODATA_MISSING is deduplicated per (transaction, receiver): while a
    /// matching PENDING notification exists it is returned unchanged instead
    /// of inserting a duplicate. The lookup-then-create is not guarded by a
    /// constraint; a concurrent identical trigger can still produce a
    /// duplicate, which is accepted.
    pub async fn create_from_transaction(
        &self,
        notification_type: NotificationType,
        transaction: &Transaction,
        received_by: Uuid,
        created_by: Option<Uuid>,
    ) -> Result<Notification> {
        if notification_type == NotificationType::GeodataMissing {
            if let Some(existing) = self
                .repo
                .find_pending_for_transaction(
                    notification_type.as_str(),
                    received_by,
                    transaction.id,
                )
                .await?
            {
                return Ok(existing);
            }
        }

        let data = transaction_snapshot(transaction);
        let notification = self
            .repo
            .create(notification_type.as_str(), &data, received_by, created_by)
            .await?;

        let _ = self
            .notification_tx
            .send((received_by, notification.clone()));

        Ok(notification)
    }

    /// Answer every GEODATA_MISSING request that references this transaction:
    /// each distinct non-null originator gets one GEODATA_UPDATED back.
    /// Requests without an originator are skipped silently.
    pub async fn create_geodata_updated(
        &self,
        transaction: &Transaction,
        created_by: Uuid,
    ) -> Result<Vec<Notification>> {
        let missing = self
            .repo
            .find_by_type_and_transaction(NotificationType::GeodataMissing.as_str(), transaction.id)
            .await?;

        let mut created = Vec::new();
        for originator in distinct_originators(&missing) {
            let notification = self
                .create_from_transaction(
                    NotificationType::GeodataUpdated,
                    transaction,
                    originator,
                    Some(created_by),
                )
                .await?;
            created.push(notification);
        }

        Ok(created)
    }

    /// The only legal transition is PENDING -> READ; the request layer has
    /// already rejected any other target. A row that is absent, foreign or
    /// no longer PENDING is indistinguishable here: NotFound.
    pub async fn update_status(&self, user_id: Uuid, notification_id: Uuid) -> Result<Notification> {
        self.repo
            .mark_read(notification_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".into()))
    }

    pub async fn list_notifications(
        &self,
        user_id: Uuid,
        filters: NotificationFilters,
    ) -> Result<(Vec<Notification>, i64)> {
        self.repo.find_all(user_id, &filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::notification_models::NotificationStatus;
    use chrono::Utc;

    fn notification(created_by: Option<Uuid>) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            notification_type: NotificationType::GeodataMissing.as_str().to_string(),
            status: NotificationStatus::Pending.as_str().to_string(),
            data: serde_json::json!({}),
            received_by: Uuid::new_v4(),
            created_by,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_distinct_originators_skips_null() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let notifications = vec![
            notification(Some(a)),
            notification(None),
            notification(Some(b)),
            notification(None),
        ];
        assert_eq!(distinct_originators(&notifications), vec![a, b]);
    }

    #[test]
    fn test_distinct_originators_dedupes() {
        let a = Uuid::new_v4();
        let notifications = vec![notification(Some(a)), notification(Some(a))];
        assert_eq!(distinct_originators(&notifications), vec![a]);
    }

    #[test]
    fn test_distinct_originators_empty_when_all_null() {
        let notifications = vec![notification(None), notification(None)];
        assert!(distinct_originators(&notifications).is_empty());
    }

    #[test]
    fn test_snapshot_references_transaction_id() {
        let transaction = Transaction::sample();
        let snapshot = transaction_snapshot(&transaction);
        assert_eq!(
            snapshot["transaction"]["id"].as_str().unwrap(),
            transaction.id.to_string()
        );
    }
}
