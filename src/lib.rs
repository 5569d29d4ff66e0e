//! sheetpos-api
//!
//! Point-of-sale and inventory backend whose system of record is a hosted
//! spreadsheet: inventory CRUD, sale transactions, reports, and receipts
//! over two worksheets.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod cache;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod services;

use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use cache::SheetCache;
use gateway::SpreadsheetGateway;
use services::inventory::InventoryService;
use services::receipts::ReceiptService;
use services::reports::ReportService;
use services::sales::SaleService;

/// Shared application state: the config plus one instance of each service,
/// all reading through the same worksheet cache.
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub inventory: Arc<InventoryService>,
    pub sales: Arc<SaleService>,
    pub reports: Arc<ReportService>,
    pub receipts: Arc<ReceiptService>,
}

impl AppState {
    pub fn build(config: config::AppConfig, gateway: Arc<dyn SpreadsheetGateway>) -> Self {
        let cache = Arc::new(SheetCache::new(
            gateway.clone(),
            config.inventory_worksheet.clone(),
            config.sales_worksheet.clone(),
            config.cache_ttl(),
        ));

        let inventory = Arc::new(InventoryService::new(
            gateway.clone(),
            cache.clone(),
            config.inventory_worksheet.clone(),
        ));
        let sales = Arc::new(SaleService::new(
            gateway.clone(),
            cache.clone(),
            config.inventory_worksheet.clone(),
            config.sales_worksheet.clone(),
        ));
        let reports = Arc::new(ReportService::new(
            cache.clone(),
            config.low_stock_threshold,
        ));
        let receipts = Arc::new(ReceiptService::new(cache));

        Self {
            config,
            inventory,
            sales,
            reports,
            receipts,
        }
    }
}

/// The full application router: API, receipt view, health, and page routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/inventory", handlers::inventory::routes())
        .route("/api/sale", post(handlers::sales::record_sale))
        .nest("/api/report", handlers::reports::routes())
        .route("/receipt/:sale_id", get(handlers::receipts::show))
        .merge(handlers::pages::routes(&state.config.static_dir))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
