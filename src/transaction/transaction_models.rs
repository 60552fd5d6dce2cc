use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Accepted,
    Rejected,
    NoResponse,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Accepted => "ACCEPTED",
            TransactionStatus::Rejected => "REJECTED",
            TransactionStatus::NoResponse => "NO_RESPONSE",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TransactionStatus::Pending),
            "ACCEPTED" => Ok(TransactionStatus::Accepted),
            "REJECTED" => Ok(TransactionStatus::Rejected),
            "NO_RESPONSE" => Ok(TransactionStatus::NoResponse),
            other => Err(format!("unknown transaction status: {}", other)),
        }
    }
}

/// A trade between a buyer (the creator) and a seller. While PENDING it
/// carries an expiry deadline; responding or expiring clears it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Transaction {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub commodity: String,
    pub quantity: f64,
    pub price: f64,
    pub status: String,
    pub expires_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<Object>)]
    pub geodata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The other participant of a transaction.
pub fn counterpart_of(transaction: &Transaction, user_id: Uuid) -> Uuid {
    if transaction.buyer_id == user_id {
        transaction.seller_id
    } else {
        transaction.buyer_id
    }
}

#[cfg(test)]
impl Transaction {
    pub fn sample() -> Self {
        Self {
            id: Uuid::new_v4(),
            buyer_id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            commodity: "wheat".to_string(),
            quantity: 12.5,
            price: 240.0,
            status: TransactionStatus::Pending.as_str().to_string(),
            expires_at: Some(Utc::now() + chrono::Duration::hours(24)),
            geodata: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Accepted,
            TransactionStatus::Rejected,
            TransactionStatus::NoResponse,
        ] {
            assert_eq!(TransactionStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(TransactionStatus::from_str("CANCELLED").is_err());
    }

    #[test]
    fn test_counterpart_of() {
        let transaction = Transaction::sample();
        assert_eq!(
            counterpart_of(&transaction, transaction.buyer_id),
            transaction.seller_id
        );
        assert_eq!(
            counterpart_of(&transaction, transaction.seller_id),
            transaction.buyer_id
        );
    }
}
