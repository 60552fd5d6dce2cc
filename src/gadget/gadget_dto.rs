use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddGadgetRequest {
    /// "EMAIL" or "PHONE"
    pub kind: String,
    #[validate(length(min = 3, max = 128))]
    pub value: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyGadgetRequest {
    #[validate(length(equal = 6))]
    pub code: String,
}
