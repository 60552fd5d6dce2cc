use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTransactionRequest {
    pub seller_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub commodity: String,
    #[validate(range(min = 0.001))]
    pub quantity: f64,
    #[validate(range(min = 0.0))]
    pub price: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RespondTransactionRequest {
    /// "ACCEPTED" or "REJECTED"
    pub status: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GeodataRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = 0.0))]
    pub accuracy: Option<f64>,
}
