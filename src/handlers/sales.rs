use super::common::{success_response, validate_input, AppJson};
use crate::errors::ServiceError;
use crate::models::de;
use crate::services::sales::SaleLine;
use crate::AppState;
use axum::{extract::State, response::Response};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SaleRequest {
    #[validate(length(min = 1, message = "sale contains no items"))]
    pub items: Vec<SaleLineRequest>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SaleLineRequest {
    pub barcode: String,
    #[serde(deserialize_with = "de::flexible_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub name: Option<String>,
}

pub async fn record_sale(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SaleRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    let lines = payload
        .items
        .into_iter()
        .map(|item| SaleLine {
            barcode: item.barcode,
            quantity: item.quantity,
            name: item.name,
        })
        .collect();

    let outcome = state.sales.record_sale(lines).await?;
    Ok(success_response(outcome))
}
