use crate::error::{AppError, Result};
use crate::notification::notification_models::NotificationType;
use crate::notification::notification_service::NotificationService;
use crate::push::push_service::PushService;
use crate::transaction::transaction_dto::CreateTransactionRequest;
use crate::transaction::transaction_models::{counterpart_of, Transaction, TransactionStatus};
use crate::transaction::transaction_repository::{TransactionFilters, TransactionRepository};
use crate::user::user_repository::UserRepository;
use chrono::{Duration, Utc};
use uuid::Uuid;

const EXPIRY_BATCH_SIZE: i64 = 200;

#[derive(Clone)]
pub struct TransactionService {
    repo: TransactionRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    push: PushService,
    response_hours: i64,
}

impl TransactionService {
    pub fn new(
        repo: TransactionRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
        push: PushService,
        response_hours: i64,
    ) -> Self {
        Self {
            repo,
            user_repo,
            notifications,
            push,
            response_hours,
        }
    }

    /// Push is best-effort: the notification row is already committed and a
    /// fan-out failure must not surface to the caller.
    async fn push_notifications(&self, notification_ids: &[Uuid]) {
        if let Err(e) = self.push.send_push(notification_ids).await {
            tracing::warn!("push fan-out failed for {:?}: {:?}", notification_ids, e);
        }
    }

    pub async fn create_transaction(
        &self,
        buyer_id: Uuid,
        payload: CreateTransactionRequest,
    ) -> Result<Transaction> {
        if payload.seller_id == buyer_id {
            return Err(AppError::BadRequest("Cannot trade with yourself".into()));
        }

        self.user_repo
            .find_by_id(payload.seller_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Seller not found".into()))?;

        let expires_at = Utc::now() + Duration::hours(self.response_hours);
        let transaction = self
            .repo
            .create(
                buyer_id,
                payload.seller_id,
                &payload.commodity,
                payload.quantity,
                payload.price,
                expires_at,
            )
            .await?;

        let notification = self
            .notifications
            .create_from_transaction(
                NotificationType::TransactionPending,
                &transaction,
                transaction.seller_id,
                Some(buyer_id),
            )
            .await?;
        self.push_notifications(&[notification.id]).await;

        Ok(transaction)
    }

    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        filters: TransactionFilters,
    ) -> Result<(Vec<Transaction>, i64)> {
        self.repo.find_all(user_id, &filters).await
    }

    pub async fn get_transaction(&self, user_id: Uuid, transaction_id: Uuid) -> Result<Transaction> {
        self.repo
            .find_by_id_for_user(transaction_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction not found".into()))
    }

    /// Seller accepts or rejects a pending transaction. Accepting a
    /// transaction that still lacks geodata also reminds the seller to
    /// attach it (system-generated, no originator).
    pub async fn respond(
        &self,
        seller_id: Uuid,
        transaction_id: Uuid,
        status: TransactionStatus,
    ) -> Result<Transaction> {
        let transaction = self
            .repo
            .update_status_by_seller(transaction_id, seller_id, status.as_str())
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction not found".into()))?;

        let notification_type = match status {
            TransactionStatus::Accepted => NotificationType::TransactionAccepted,
            _ => NotificationType::TransactionRejected,
        };

        let mut notification_ids = Vec::new();
        let notification = self
            .notifications
            .create_from_transaction(
                notification_type,
                &transaction,
                transaction.buyer_id,
                Some(seller_id),
            )
            .await?;
        notification_ids.push(notification.id);

        if status == TransactionStatus::Accepted && transaction.geodata.is_none() {
            let reminder = self
                .notifications
                .create_from_transaction(
                    NotificationType::GeodataMissing,
                    &transaction,
                    transaction.seller_id,
                    None,
                )
                .await?;
            notification_ids.push(reminder.id);
        }

        self.push_notifications(&notification_ids).await;

        Ok(transaction)
    }

    /// Buyer re-sends a pending offer: the response deadline restarts and
    /// the seller is notified again.
    pub async fn resend(&self, buyer_id: Uuid, transaction_id: Uuid) -> Result<Transaction> {
        let expires_at = Utc::now() + Duration::hours(self.response_hours);
        let transaction = self
            .repo
            .reset_expiry_by_buyer(transaction_id, buyer_id, expires_at)
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction not found".into()))?;

        let notification = self
            .notifications
            .create_from_transaction(
                NotificationType::TransactionPending,
                &transaction,
                transaction.seller_id,
                Some(buyer_id),
            )
            .await?;
        self.push_notifications(&[notification.id]).await;

        Ok(transaction)
    }

    /// Ask the counterpart for geodata. Deduplicated: repeating the request
    /// while the first notification is still PENDING returns it unchanged.
    pub async fn request_geodata(&self, user_id: Uuid, transaction_id: Uuid) -> Result<()> {
        let transaction = self.get_transaction(user_id, transaction_id).await?;
        let counterpart = counterpart_of(&transaction, user_id);

        let notification = self
            .notifications
            .create_from_transaction(
                NotificationType::GeodataMissing,
                &transaction,
                counterpart,
                Some(user_id),
            )
            .await?;
        self.push_notifications(&[notification.id]).await;

        Ok(())
    }

    /// Attach geodata and answer everyone who asked for it.
    pub async fn update_geodata(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
        geodata: serde_json::Value,
    ) -> Result<Transaction> {
        let transaction = self
            .repo
            .update_geodata(transaction_id, user_id, &geodata)
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction not found".into()))?;

        let created = self
            .notifications
            .create_geodata_updated(&transaction, user_id)
            .await?;
        let notification_ids: Vec<Uuid> = created.iter().map(|n| n.id).collect();
        self.push_notifications(&notification_ids).await;

        Ok(transaction)
    }

    /// Scheduled sweep: move overdue PENDING transactions to NO_RESPONSE and
    /// tell the creator. Bounded per invocation.
    pub async fn expire_overdue(&self) -> Result<Vec<Transaction>> {
        let overdue = self.repo.find_overdue_pending(EXPIRY_BATCH_SIZE).await?;

        let mut expired = Vec::new();
        for candidate in overdue {
            // The seller may have responded since the batch was read.
            let Some(transaction) = self.repo.mark_no_response(candidate.id).await? else {
                continue;
            };

            let notification = self
                .notifications
                .create_from_transaction(
                    NotificationType::TransactionExpired,
                    &transaction,
                    transaction.buyer_id,
                    None,
                )
                .await?;
            self.push_notifications(&[notification.id]).await;

            expired.push(transaction);
        }

        Ok(expired)
    }
}
