use crate::error::Result;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;
use super::notification_models::{NotificationSettings, NotificationType};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One enabled row per notification type. Idempotent, so it is safe on
    /// the repeat-login upsert path too.
    pub async fn create_defaults_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
    ) -> Result<()> {
        for notification_type in NotificationType::ALL {
            sqlx::query(
                "INSERT INTO notification_settings (user_id, notification_type)
                 VALUES ($1, $2)
                 ON CONFLICT (user_id, notification_type) DO NOTHING"
            )
            .bind(user_id)
            .bind(notification_type.as_str())
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    pub async fn find_all_by_user(&self, user_id: Uuid) -> Result<Vec<NotificationSettings>> {
        let settings = sqlx::query_as::<_, NotificationSettings>(
            "SELECT * FROM notification_settings WHERE user_id = $1 ORDER BY notification_type"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Bulk toggle. Types without an existing row match nothing and are
    /// thereby ignored.
    pub async fn set_enabled_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        types: &[String],
        enabled: bool,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notification_settings SET is_enabled = $3
             WHERE user_id = $1 AND notification_type = ANY($2)"
        )
        .bind(user_id)
        .bind(types)
        .bind(enabled)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    /// Enabled (user, type) pairs for a set of users.
    pub async fn enabled_pairs(&self, user_ids: &[Uuid]) -> Result<HashSet<(Uuid, String)>> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT user_id, notification_type FROM notification_settings
             WHERE user_id = ANY($1) AND is_enabled = true"
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Fresh single-pair check used by the push workers. A missing row
    /// counts as disabled.
    pub async fn is_enabled(&self, user_id: Uuid, notification_type: &str) -> Result<bool> {
        let enabled = sqlx::query_scalar::<_, bool>(
            "SELECT is_enabled FROM notification_settings
             WHERE user_id = $1 AND notification_type = $2"
        )
        .bind(user_id)
        .bind(notification_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(enabled.unwrap_or(false))
    }
}
