use crate::error::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use super::notification_models::Notification;

#[derive(Debug, Default)]
pub struct NotificationFilters {
    pub search: Option<String>,
    pub status: Option<String>,
    pub types: Option<Vec<String>>,
    pub created_by: Option<Uuid>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        notification_type: &str,
        data: &serde_json::Value,
        received_by: Uuid,
        created_by: Option<Uuid>,
    ) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (notification_type, data, received_by, created_by)
             VALUES ($1, $2, $3, $4)
             RETURNING *"
        )
        .bind(notification_type)
        .bind(data)
        .bind(received_by)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Dedupe lookup: latest PENDING notification of this type, addressed to
    /// this receiver, whose payload references the transaction.
    pub async fn find_pending_for_transaction(
        &self,
        notification_type: &str,
        received_by: Uuid,
        transaction_id: Uuid,
    ) -> Result<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications
             WHERE notification_type = $1
               AND received_by = $2
               AND status = 'PENDING'
               AND data->'transaction'->>'id' = $3
             ORDER BY created_at DESC
             LIMIT 1"
        )
        .bind(notification_type)
        .bind(received_by)
        .bind(transaction_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Every notification of the given type whose payload references the
    /// transaction, regardless of receiver or status.
    pub async fn find_by_type_and_transaction(
        &self,
        notification_type: &str,
        transaction_id: Uuid,
    ) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications
             WHERE notification_type = $1
               AND data->'transaction'->>'id' = $2
             ORDER BY created_at"
        )
        .bind(notification_type)
        .bind(transaction_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE id = ANY($1)"
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Conditional status transition. Matches only rows that are PENDING and
    /// owned by the caller, so a foreign, absent or already-read id falls
    /// through to None.
    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET status = 'READ'
             WHERE id = $1 AND received_by = $2 AND status = 'PENDING'
             RETURNING *"
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn count_pending(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE received_by = $1 AND status = 'PENDING'"
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn find_all(
        &self,
        user_id: Uuid,
        filters: &NotificationFilters,
    ) -> Result<(Vec<Notification>, i64)> {
        let mut where_clause = String::from("WHERE received_by = $1");
        let mut params_count = 1;

        if filters.status.is_some() {
            params_count += 1;
            where_clause.push_str(&format!(" AND status = ${}", params_count));
        }

        if filters.types.is_some() {
            params_count += 1;
            where_clause.push_str(&format!(" AND notification_type = ANY(${})", params_count));
        }

        if filters.created_by.is_some() {
            params_count += 1;
            where_clause.push_str(&format!(" AND created_by = ${}", params_count));
        }

        if filters.created_from.is_some() {
            params_count += 1;
            where_clause.push_str(&format!(" AND created_at >= ${}", params_count));
        }

        if filters.created_to.is_some() {
            params_count += 1;
            where_clause.push_str(&format!(" AND created_at <= ${}", params_count));
        }

        if filters.search.is_some() {
            params_count += 1;
            where_clause.push_str(&format!(
                " AND (notification_type ILIKE ${0} OR data::text ILIKE ${0})",
                params_count
            ));
        }

        let page = filters.page.unwrap_or(1).max(1);
        let limit = filters.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * limit;

        let data_query = format!(
            "SELECT * FROM notifications {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            where_clause,
            params_count + 1,
            params_count + 2
        );
        let count_query = format!("SELECT COUNT(*) FROM notifications {}", where_clause);

        let search_pattern = filters.search.as_ref().map(|s| format!("%{}%", s));

        let mut db_query = sqlx::query_as::<_, Notification>(&data_query).bind(user_id);
        let mut db_count = sqlx::query_scalar::<_, i64>(&count_query).bind(user_id);

        if let Some(ref status) = filters.status {
            db_query = db_query.bind(status.clone());
            db_count = db_count.bind(status.clone());
        }
        if let Some(ref types) = filters.types {
            db_query = db_query.bind(types.clone());
            db_count = db_count.bind(types.clone());
        }
        if let Some(created_by) = filters.created_by {
            db_query = db_query.bind(created_by);
            db_count = db_count.bind(created_by);
        }
        if let Some(created_from) = filters.created_from {
            db_query = db_query.bind(created_from);
            db_count = db_count.bind(created_from);
        }
        if let Some(created_to) = filters.created_to {
            db_query = db_query.bind(created_to);
            db_count = db_count.bind(created_to);
        }
        if let Some(ref pattern) = search_pattern {
            db_query = db_query.bind(pattern.clone());
            db_count = db_count.bind(pattern.clone());
        }

        let notifications = db_query
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;
        let total = db_count.fetch_one(&self.pool).await?;

        Ok((notifications, total))
    }
}
