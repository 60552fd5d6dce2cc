use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GadgetKind {
    Email,
    Phone,
}

impl GadgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GadgetKind::Email => "EMAIL",
            GadgetKind::Phone => "PHONE",
        }
    }
}

impl std::fmt::Display for GadgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GadgetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMAIL" => Ok(GadgetKind::Email),
            "PHONE" => Ok(GadgetKind::Phone),
            other => Err(format!("unknown gadget kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    Verify,
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Verify => "VERIFY",
            OtpPurpose::PasswordReset => "PASSWORD_RESET",
        }
    }
}

impl std::fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's contact channel (email address or phone number).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Gadget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub value: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct OtpCode {
    pub id: Uuid,
    pub gadget_id: Uuid,
    pub code_hash: String,
    pub purpose: String,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_gadget_kind_round_trip() {
        assert_eq!(GadgetKind::Email.to_string(), "EMAIL");
        assert_eq!(GadgetKind::Phone.to_string(), "PHONE");
        assert_eq!(GadgetKind::from_str("EMAIL").unwrap(), GadgetKind::Email);
        assert_eq!(GadgetKind::from_str("PHONE").unwrap(), GadgetKind::Phone);
        assert!(GadgetKind::from_str("CARRIER_PIGEON").is_err());
    }

    #[test]
    fn test_otp_purpose_display() {
        assert_eq!(OtpPurpose::Verify.to_string(), "VERIFY");
        assert_eq!(OtpPurpose::PasswordReset.to_string(), "PASSWORD_RESET");
    }
}
