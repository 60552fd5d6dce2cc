use crate::auth::otp;
use crate::db::DbPool;
use crate::delivery::DeliveryTask;
use crate::error::{AppError, Result};
use crate::gadget::gadget_models::{Gadget, GadgetKind, OtpPurpose};
use crate::gadget::gadget_repository::GadgetRepository;
use crate::gadget::otp_repository::OtpRepository;
use crate::queue::TaskQueue;
use chrono::{Duration, Utc};
use uuid::Uuid;

const CLEANUP_BATCH_SIZE: i64 = 500;

#[derive(Clone)]
pub struct GadgetService {
    db: DbPool,
    repo: GadgetRepository,
    otp_repo: OtpRepository,
    delivery_queue: TaskQueue<DeliveryTask>,
    otp_ttl_minutes: i64,
}

impl GadgetService {
    pub fn new(
        db: DbPool,
        repo: GadgetRepository,
        otp_repo: OtpRepository,
        delivery_queue: TaskQueue<DeliveryTask>,
        otp_ttl_minutes: i64,
    ) -> Self {
        Self {
            db,
            repo,
            otp_repo,
            delivery_queue,
            otp_ttl_minutes,
        }
    }

    pub async fn list_gadgets(&self, user_id: Uuid) -> Result<Vec<Gadget>> {
        self.repo.find_all_by_user(user_id).await
    }

    /// Register a new contact channel. A value already claimed by anyone,
    /// including the caller, is a conflict.
    pub async fn add_gadget(&self, user_id: Uuid, kind: GadgetKind, value: &str) -> Result<Gadget> {
        let value = value.trim();

        if self.repo.find_by_value(kind, value).await?.is_some() {
            return Err(AppError::Conflict("Gadget already registered".into()));
        }

        self.repo.create(user_id, kind, value).await
    }

    /// Issue a verification code and dispatch it over the channel that
    /// matches the gadget kind. Delivery is asynchronous; the caller gets an
    /// immediate 200 regardless of transport outcome.
    pub async fn request_verification(&self, user_id: Uuid, gadget_id: Uuid) -> Result<()> {
        let gadget = self
            .repo
            .find_by_id(gadget_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Gadget not found".into()))?;

        if gadget.is_verified {
            return Err(AppError::BadRequest("Gadget is already verified".into()));
        }

        let code = otp::generate_code();
        let code_hash = otp::hash_code(&code)?;
        let expires_at = Utc::now() + Duration::minutes(self.otp_ttl_minutes);

        self.otp_repo
            .create(gadget.id, &code_hash, OtpPurpose::Verify, expires_at)
            .await?;

        let task = match gadget.kind.parse::<GadgetKind>() {
            Ok(GadgetKind::Email) => DeliveryTask::Email {
                recipients: vec![gadget.value.clone()],
                subject: "Your verification code".to_string(),
                body: format!("Your tradepost verification code is {}", code),
            },
            _ => DeliveryTask::Sms {
                recipient: gadget.value.clone(),
                body: format!("tradepost code: {}", code),
            },
        };
        self.delivery_queue.enqueue(task);

        Ok(())
    }

    pub async fn verify_gadget(&self, user_id: Uuid, gadget_id: Uuid, code: &str) -> Result<Gadget> {
        let gadget = self
            .repo
            .find_by_id(gadget_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Gadget not found".into()))?;

        if gadget.is_verified {
            return Err(AppError::BadRequest("Gadget is already verified".into()));
        }

        let otp_code = self
            .otp_repo
            .find_active(gadget.id, OtpPurpose::Verify)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid or expired code".into()))?;

        if !otp::verify_code(code, &otp_code.code_hash)? {
            return Err(AppError::BadRequest("Invalid or expired code".into()));
        }

        let mut tx = self.db.begin().await?;
        self.otp_repo.consume_with_tx(&mut tx, otp_code.id).await?;
        self.repo.mark_verified_with_tx(&mut tx, gadget.id).await?;
        tx.commit().await?;

        self.repo
            .find_by_id(gadget_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Gadget not found".into()))
    }

    pub async fn delete_gadget(&self, user_id: Uuid, gadget_id: Uuid) -> Result<()> {
        let rows_affected = self.repo.delete(gadget_id, user_id).await?;

        if rows_affected == 0 {
            return Err(AppError::NotFound("Gadget not found".into()));
        }

        Ok(())
    }

    /// Periodic cleanup: stale unverified gadgets and expired codes.
    /// Notifications are never touched here.
    pub async fn cleanup(&self, retention_days: i32) -> Result<(u64, u64)> {
        let gadgets = self
            .repo
            .delete_stale_unverified(retention_days, CLEANUP_BATCH_SIZE)
            .await?;
        let codes = self.otp_repo.delete_expired().await?;

        Ok((gadgets, codes))
    }
}
