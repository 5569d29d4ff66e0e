//! Browser views. Plain files out of `static_dir`; all behavior lives in
//! the JSON API these pages call.

use crate::AppState;
use axum::Router;
use std::path::Path;
use tower_http::services::ServeFile;

pub fn routes(static_dir: &str) -> Router<AppState> {
    let dir = Path::new(static_dir);
    Router::new()
        .route_service("/", ServeFile::new(dir.join("pos.html")))
        .route_service("/lookup", ServeFile::new(dir.join("lookup.html")))
        .route_service("/receiving", ServeFile::new(dir.join("receiving.html")))
        .route_service("/reports", ServeFile::new(dir.join("reports.html")))
}
