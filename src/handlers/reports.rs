use super::common::success_response;
use crate::errors::ServiceError;
use crate::AppState;
use axum::{extract::State, response::Response, routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(sales_report))
        .route("/inventory", get(inventory_report))
}

async fn sales_report(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let report = state.reports.sales_report().await?;
    Ok(success_response(report))
}

async fn inventory_report(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let report = state.reports.inventory_report().await?;
    Ok(success_response(report))
}
