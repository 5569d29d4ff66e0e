use super::common::{created_message, success_message, success_response, validate_input, AppJson};
use crate::errors::ServiceError;
use crate::models::de;
use crate::services::inventory::{NewProduct, ProductPatch, UpdateOutcome};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "barcode is required"))]
    pub barcode: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(deserialize_with = "de::flexible_decimal")]
    pub price: Decimal,
    #[serde(deserialize_with = "de::flexible_quantity")]
    pub quantity: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "de::flexible_decimal_opt")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "de::flexible_quantity_opt")]
    pub quantity: Option<u32>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:barcode", get(get_product).put(update_product))
}

async fn list_products(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let items = state.inventory.list().await?;
    Ok(success_response(items))
}

async fn get_product(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> Result<Response, ServiceError> {
    let item = state.inventory.get(&barcode).await?;
    Ok(success_response(item))
}

async fn create_product(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProductRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;

    state
        .inventory
        .create(NewProduct {
            barcode: payload.barcode,
            name: payload.name,
            description: payload.description,
            category: payload.category,
            price: payload.price,
            quantity: payload.quantity,
        })
        .await?;

    Ok(created_message("Product created"))
}

async fn update_product(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
    AppJson(payload): AppJson<UpdateProductRequest>,
) -> Result<Response, ServiceError> {
    let patch = ProductPatch {
        name: payload.name,
        description: payload.description,
        category: payload.category,
        price: payload.price,
        quantity: payload.quantity,
    };

    match state.inventory.update(&barcode, patch).await? {
        UpdateOutcome::Updated => Ok(success_message("Product updated")),
        UpdateOutcome::NothingToUpdate => Ok((
            StatusCode::NOT_MODIFIED,
            Json(json!({ "message": "nothing to update" })),
        )
            .into_response()),
    }
}
