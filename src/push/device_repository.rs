use crate::error::Result;
use sqlx::PgPool;
use uuid::Uuid;
use super::device_models::{Device, DevicePlatform};

fn table_for(platform: DevicePlatform) -> &'static str {
    match platform {
        DevicePlatform::Fcm => "fcm_devices",
        DevicePlatform::Apns => "apns_devices",
    }
}

#[derive(Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// True when the registration id exists on either platform table. The
    /// cross-table invariant lives here, not in the schema.
    pub async fn registration_id_exists(&self, registration_id: &str) -> Result<bool> {
        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM fcm_devices WHERE registration_id = $1
             UNION ALL
             SELECT id FROM apns_devices WHERE registration_id = $1
             LIMIT 1"
        )
        .bind(registration_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(existing.is_some())
    }

    pub async fn create(
        &self,
        platform: DevicePlatform,
        user_id: Uuid,
        registration_id: &str,
        name: Option<&str>,
    ) -> Result<Device> {
        let query = format!(
            "INSERT INTO {} (user_id, registration_id, name)
             VALUES ($1, $2, $3)
             RETURNING *",
            table_for(platform)
        );

        let device = sqlx::query_as::<_, Device>(&query)
            .bind(user_id)
            .bind(registration_id)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(device)
    }

    pub async fn find_by_user(&self, user_id: Uuid, platform: DevicePlatform) -> Result<Vec<Device>> {
        let query = format!(
            "SELECT * FROM {} WHERE user_id = $1 ORDER BY created_at",
            table_for(platform)
        );

        let devices = sqlx::query_as::<_, Device>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(devices)
    }
}
