#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use sheetpos_api::{
    config::AppConfig,
    errors::ServiceError,
    gateway::{CellUpdate, SpreadsheetGateway},
    app_router, AppState,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const INVENTORY: &str = "Inventory";
pub const SALES: &str = "Sales";

pub fn inventory_header() -> Vec<String> {
    ["barcode", "name", "description", "category", "price", "quantity"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn sales_header() -> Vec<String> {
    [
        "sale_id",
        "timestamp",
        "barcode",
        "product_name",
        "quantity",
        "unit_price",
        "line_total",
        "category",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

/// Worksheet map standing in for the hosted spreadsheet. Counts full-grid
/// reads per worksheet and can be told to fail reads or appends.
pub struct InMemoryGateway {
    worksheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
    read_counts: Mutex<HashMap<String, usize>>,
    fail_reads: AtomicBool,
    fail_appends: AtomicBool,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self {
            worksheets: Mutex::new(HashMap::new()),
            read_counts: Mutex::new(HashMap::new()),
            fail_reads: AtomicBool::new(false),
            fail_appends: AtomicBool::new(false),
        }
    }

    pub fn seed(&self, worksheet: &str, grid: Vec<Vec<String>>) {
        self.worksheets
            .lock()
            .unwrap()
            .insert(worksheet.to_string(), grid);
    }

    pub fn grid(&self, worksheet: &str) -> Vec<Vec<String>> {
        self.worksheets
            .lock()
            .unwrap()
            .get(worksheet)
            .cloned()
            .unwrap_or_default()
    }

    pub fn read_count(&self, worksheet: &str) -> usize {
        *self
            .read_counts
            .lock()
            .unwrap()
            .get(worksheet)
            .unwrap_or(&0)
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_appends(&self, on: bool) {
        self.fail_appends.store(on, Ordering::SeqCst);
    }
}

fn column_index(letters: &str) -> Option<usize> {
    let mut index = 0usize;
    for c in letters.chars() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        index = index * 26 + (c as usize - 'A' as usize + 1);
    }
    (index > 0).then_some(index)
}

/// Splits an A1 cell reference like `F7` into a 1-based (column, row).
fn parse_a1(range: &str) -> Option<(usize, usize)> {
    let split = range.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = range.split_at(split);
    let column = column_index(letters)?;
    let row: usize = digits.parse().ok()?;
    Some((column, row))
}

#[async_trait]
impl SpreadsheetGateway for InMemoryGateway {
    async fn read_rows(&self, worksheet: &str) -> Result<Vec<Vec<String>>, ServiceError> {
        *self
            .read_counts
            .lock()
            .unwrap()
            .entry(worksheet.to_string())
            .or_insert(0) += 1;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ServiceError::Upstream("simulated read failure".into()));
        }
        self.worksheets
            .lock()
            .unwrap()
            .get(worksheet)
            .cloned()
            .ok_or_else(|| ServiceError::Upstream(format!("unknown worksheet '{worksheet}'")))
    }

    async fn find_in_column(
        &self,
        worksheet: &str,
        column: u32,
        value: &str,
    ) -> Result<Option<u32>, ServiceError> {
        let worksheets = self.worksheets.lock().unwrap();
        let grid = worksheets
            .get(worksheet)
            .ok_or_else(|| ServiceError::Upstream(format!("unknown worksheet '{worksheet}'")))?;
        let position = grid
            .iter()
            .position(|row| row.get(column as usize - 1).map(String::as_str) == Some(value));
        Ok(position.map(|i| i as u32 + 1))
    }

    async fn append_rows(
        &self,
        worksheet: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), ServiceError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(ServiceError::Upstream("simulated append failure".into()));
        }
        let mut worksheets = self.worksheets.lock().unwrap();
        let grid = worksheets
            .get_mut(worksheet)
            .ok_or_else(|| ServiceError::Upstream(format!("unknown worksheet '{worksheet}'")))?;
        grid.extend(rows);
        Ok(())
    }

    async fn batch_update(
        &self,
        worksheet: &str,
        updates: Vec<CellUpdate>,
    ) -> Result<(), ServiceError> {
        let mut worksheets = self.worksheets.lock().unwrap();
        let grid = worksheets
            .get_mut(worksheet)
            .ok_or_else(|| ServiceError::Upstream(format!("unknown worksheet '{worksheet}'")))?;
        for update in updates {
            let (column, row) = parse_a1(&update.range).ok_or_else(|| {
                ServiceError::Upstream(format!("bad range '{}'", update.range))
            })?;
            while grid.len() < row {
                grid.push(Vec::new());
            }
            let cells = &mut grid[row - 1];
            while cells.len() < column {
                cells.push(String::new());
            }
            cells[column - 1] = update.value;
        }
        Ok(())
    }
}

/// Full application over an [`InMemoryGateway`] with both worksheets seeded
/// empty (header rows only).
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub gateway: Arc<InMemoryGateway>,
}

impl TestApp {
    pub fn new() -> Self {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway.seed(INVENTORY, vec![inventory_header()]);
        gateway.seed(SALES, vec![sales_header()]);
        Self::with_gateway(gateway)
    }

    pub fn with_gateway(gateway: Arc<InMemoryGateway>) -> Self {
        let cfg = AppConfig::new(
            "test-spreadsheet".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        let state = AppState::build(cfg, gateway.clone());
        let router = app_router(state.clone());
        Self {
            router,
            state,
            gateway,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("response")
    }
}

pub async fn response_json(response: Response) -> Value {
    use http_body_util::BodyExt;
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("response body bytes")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json response")
}

pub async fn response_text(response: Response) -> String {
    use http_body_util::BodyExt;
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("response body bytes")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 response")
}
