use crate::error::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use super::transaction_models::Transaction;

#[derive(Debug, Default)]
pub struct TransactionFilters {
    pub status: Option<String>,
    /// "buyer" or "seller"; anything else means both sides.
    pub role: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        buyer_id: Uuid,
        seller_id: Uuid,
        commodity: &str,
        quantity: f64,
        price: f64,
        expires_at: DateTime<Utc>,
    ) -> Result<Transaction> {
        let transaction = sqlx::query_as::<_, Transaction>(
            "INSERT INTO transactions (buyer_id, seller_id, commodity, quantity, price, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *"
        )
        .bind(buyer_id)
        .bind(seller_id)
        .bind(commodity)
        .bind(quantity)
        .bind(price)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(transaction)
    }

    pub async fn find_by_id_for_user(&self, id: Uuid, user_id: Uuid) -> Result<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE id = $1 AND (buyer_id = $2 OR seller_id = $2)"
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    pub async fn find_all(
        &self,
        user_id: Uuid,
        filters: &TransactionFilters,
    ) -> Result<(Vec<Transaction>, i64)> {
        let mut where_clause = match filters.role.as_deref() {
            Some("buyer") => String::from("WHERE buyer_id = $1"),
            Some("seller") => String::from("WHERE seller_id = $1"),
            _ => String::from("WHERE (buyer_id = $1 OR seller_id = $1)"),
        };
        let mut params_count = 1;

        if filters.status.is_some() {
            params_count += 1;
            where_clause.push_str(&format!(" AND status = ${}", params_count));
        }

        let page = filters.page.unwrap_or(1).max(1);
        let limit = filters.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * limit;

        let data_query = format!(
            "SELECT * FROM transactions {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            where_clause,
            params_count + 1,
            params_count + 2
        );
        let count_query = format!("SELECT COUNT(*) FROM transactions {}", where_clause);

        let mut db_query = sqlx::query_as::<_, Transaction>(&data_query).bind(user_id);
        let mut db_count = sqlx::query_scalar::<_, i64>(&count_query).bind(user_id);

        if let Some(ref status) = filters.status {
            db_query = db_query.bind(status.clone());
            db_count = db_count.bind(status.clone());
        }

        let transactions = db_query
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;
        let total = db_count.fetch_one(&self.pool).await?;

        Ok((transactions, total))
    }

    /// Seller response. Only a PENDING transaction owned by this seller
    /// matches; the deadline is cleared with the transition.
    pub async fn update_status_by_seller(
        &self,
        id: Uuid,
        seller_id: Uuid,
        status: &str,
    ) -> Result<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(
            "UPDATE transactions SET status = $1, expires_at = NULL, updated_at = NOW()
             WHERE id = $2 AND seller_id = $3 AND status = 'PENDING'
             RETURNING *"
        )
        .bind(status)
        .bind(id)
        .bind(seller_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    pub async fn reset_expiry_by_buyer(
        &self,
        id: Uuid,
        buyer_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(
            "UPDATE transactions SET expires_at = $1, updated_at = NOW()
             WHERE id = $2 AND buyer_id = $3 AND status = 'PENDING'
             RETURNING *"
        )
        .bind(expires_at)
        .bind(id)
        .bind(buyer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    pub async fn update_geodata(
        &self,
        id: Uuid,
        user_id: Uuid,
        geodata: &serde_json::Value,
    ) -> Result<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(
            "UPDATE transactions SET geodata = $1, updated_at = NOW()
             WHERE id = $2 AND (buyer_id = $3 OR seller_id = $3)
             RETURNING *"
        )
        .bind(geodata)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    pub async fn find_overdue_pending(&self, limit: i64) -> Result<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions
             WHERE status = 'PENDING' AND expires_at IS NOT NULL AND expires_at <= NOW()
             ORDER BY expires_at
             LIMIT $1"
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Expiry transition. Conditional on the row still being PENDING so the
    /// sweep cannot clobber a response that landed in between.
    pub async fn mark_no_response(&self, id: Uuid) -> Result<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(
            "UPDATE transactions SET status = 'NO_RESPONSE', expires_at = NULL, updated_at = NOW()
             WHERE id = $1 AND status = 'PENDING'
             RETURNING *"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }
}
