use crate::error::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use super::gadget_models::{OtpCode, OtpPurpose};

#[derive(Clone)]
pub struct OtpRepository {
    pool: PgPool,
}

impl OtpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        gadget_id: Uuid,
        code_hash: &str,
        purpose: OtpPurpose,
        expires_at: DateTime<Utc>,
    ) -> Result<OtpCode> {
        let code = sqlx::query_as::<_, OtpCode>(
            "INSERT INTO otp_codes (gadget_id, code_hash, purpose, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING *"
        )
        .bind(gadget_id)
        .bind(code_hash)
        .bind(purpose.as_str())
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(code)
    }

    /// Latest unconsumed, unexpired code for the gadget and purpose.
    pub async fn find_active(
        &self,
        gadget_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpCode>> {
        let code = sqlx::query_as::<_, OtpCode>(
            "SELECT * FROM otp_codes
             WHERE gadget_id = $1 AND purpose = $2
               AND consumed_at IS NULL AND expires_at > NOW()
             ORDER BY created_at DESC
             LIMIT 1"
        )
        .bind(gadget_id)
        .bind(purpose.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(code)
    }

    pub async fn consume_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
    ) -> Result<()> {
        sqlx::query("UPDATE otp_codes SET consumed_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM otp_codes WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
