use crate::error::Result;
use sqlx::PgPool;
use uuid::Uuid;
use super::gadget_models::{Gadget, GadgetKind};

#[derive(Clone)]
pub struct GadgetRepository {
    pool: PgPool,
}

impl GadgetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        kind: GadgetKind,
        value: &str,
    ) -> Result<Gadget> {
        let gadget = sqlx::query_as::<_, Gadget>(
            "INSERT INTO gadgets (user_id, kind, value) VALUES ($1, $2, $3) RETURNING *"
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(value)
        .fetch_one(&self.pool)
        .await?;

        Ok(gadget)
    }

    pub async fn create_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        kind: GadgetKind,
        value: &str,
        verified: bool,
    ) -> Result<Gadget> {
        let gadget = sqlx::query_as::<_, Gadget>(
            "INSERT INTO gadgets (user_id, kind, value, is_verified, verified_at)
             VALUES ($1, $2, $3, $4, CASE WHEN $4 THEN NOW() END)
             RETURNING *"
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(value)
        .bind(verified)
        .fetch_one(&mut **tx)
        .await?;

        Ok(gadget)
    }

    /// Insert unless the (kind, value) pair already exists. Used for the
    /// Google login path where the email gadget may be present already.
    pub async fn ensure_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        kind: GadgetKind,
        value: &str,
        verified: bool,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO gadgets (user_id, kind, value, is_verified, verified_at)
             VALUES ($1, $2, $3, $4, CASE WHEN $4 THEN NOW() END)
             ON CONFLICT (kind, value) DO NOTHING"
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(value)
        .bind(verified)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Gadget>> {
        let gadget = sqlx::query_as::<_, Gadget>(
            "SELECT * FROM gadgets WHERE id = $1 AND user_id = $2"
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(gadget)
    }

    pub async fn find_all_by_user(&self, user_id: Uuid) -> Result<Vec<Gadget>> {
        let gadgets = sqlx::query_as::<_, Gadget>(
            "SELECT * FROM gadgets WHERE user_id = $1 ORDER BY created_at"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(gadgets)
    }

    pub async fn find_by_value(&self, kind: GadgetKind, value: &str) -> Result<Option<Gadget>> {
        let gadget = sqlx::query_as::<_, Gadget>(
            "SELECT * FROM gadgets WHERE kind = $1 AND value = $2"
        )
        .bind(kind.as_str())
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(gadget)
    }

    pub async fn find_verified_by_value(
        &self,
        kind: GadgetKind,
        value: &str,
    ) -> Result<Option<Gadget>> {
        let gadget = sqlx::query_as::<_, Gadget>(
            "SELECT * FROM gadgets WHERE kind = $1 AND value = $2 AND is_verified = true"
        )
        .bind(kind.as_str())
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(gadget)
    }

    pub async fn mark_verified_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE gadgets SET is_verified = true, verified_at = NOW() WHERE id = $1"
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM gadgets WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Remove unverified gadgets older than the retention window, at most
    /// `limit` per call.
    pub async fn delete_stale_unverified(&self, retention_days: i32, limit: i64) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM gadgets WHERE id IN (
                SELECT id FROM gadgets
                WHERE is_verified = false
                  AND created_at < NOW() - make_interval(days => $1)
                ORDER BY created_at
                LIMIT $2
            )"
        )
        .bind(retention_days)
        .bind(limit)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
