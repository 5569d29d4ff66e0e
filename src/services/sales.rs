use crate::cache::SheetCache;
use crate::errors::ServiceError;
use crate::gateway::{CellUpdate, SpreadsheetGateway};
use crate::models;
use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};

/// One requested line item. `name` is an optional client-supplied label
/// used in error messages when the barcode is unknown.
#[derive(Debug, Clone)]
pub struct SaleLine {
    pub barcode: String,
    pub quantity: u32,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaleLineSummary {
    pub name: String,
    pub quantity: u32,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct SaleOutcome {
    pub sale_id: String,
    pub items: Vec<SaleLineSummary>,
}

/// Records sale transactions against the inventory worksheet.
///
/// The whole read-validate-write sequence runs under `txn_lock`, so two
/// concurrent sales cannot both pass the sufficiency check against the same
/// pre-decrement quantity. The lock serializes within this process only;
/// out-of-band spreadsheet edits remain unprotected.
pub struct SaleService {
    gateway: Arc<dyn SpreadsheetGateway>,
    cache: Arc<SheetCache>,
    inventory_worksheet: String,
    sales_worksheet: String,
    txn_lock: Mutex<()>,
}

impl SaleService {
    pub fn new(
        gateway: Arc<dyn SpreadsheetGateway>,
        cache: Arc<SheetCache>,
        inventory_worksheet: String,
        sales_worksheet: String,
    ) -> Self {
        Self {
            gateway,
            cache,
            inventory_worksheet,
            sales_worksheet,
            txn_lock: Mutex::new(()),
        }
    }

    /// Validates every line against a live stock read, then issues the two
    /// staged writes: the stock batch update and the sale-row append. The
    /// writes are not atomic; a failure between them leaves stock decremented
    /// with no sale rows, surfaced as the raw upstream error.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn record_sale(&self, lines: Vec<SaleLine>) -> Result<SaleOutcome, ServiceError> {
        if lines.is_empty() {
            return Err(ServiceError::Validation("sale contains no items".into()));
        }
        if let Some(line) = lines.iter().find(|l| l.quantity == 0) {
            return Err(ServiceError::Validation(format!(
                "quantity for '{}' must be a positive integer",
                line.barcode
            )));
        }

        let _guard = self.txn_lock.lock().await;

        // Stock correctness is safety-critical: always a live read, never the cache.
        let grid = self.gateway.read_rows(&self.inventory_worksheet).await?;
        let mut stock: HashMap<String, models::InventoryRecord> =
            models::parse_inventory_grid(&grid)
                .into_iter()
                .map(|record| (record.barcode.clone(), record))
                .collect();

        let sales_grid = self.gateway.read_rows(&self.sales_worksheet).await?;
        let recorded = sales_grid.len().saturating_sub(1);
        let sale_id = format!("V{}", recorded + 1);
        // one shared timestamp for every row of the transaction
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let mut stock_updates = Vec::with_capacity(lines.len());
        let mut sale_rows = Vec::with_capacity(lines.len());
        let mut items = Vec::with_capacity(lines.len());

        for line in &lines {
            let product = stock.get_mut(&line.barcode).ok_or_else(|| {
                let label = line.name.clone().unwrap_or_else(|| line.barcode.clone());
                ServiceError::NotFound(format!("Product '{label}' not found in stock"))
            })?;

            if product.quantity < line.quantity {
                return Err(ServiceError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.quantity,
                });
            }

            // decrement in memory so repeated lines against one barcode accumulate
            product.quantity -= line.quantity;
            let line_total = product.price * Decimal::from(line.quantity);

            stock_updates.push(CellUpdate::new(
                format!("F{}", product.row),
                product.quantity.to_string(),
            ));
            sale_rows.push(vec![
                sale_id.clone(),
                timestamp.clone(),
                line.barcode.clone(),
                product.name.clone(),
                line.quantity.to_string(),
                product.price.to_string(),
                line_total.to_string(),
                product.category.clone(),
            ]);
            items.push(SaleLineSummary {
                name: product.name.clone(),
                quantity: line.quantity,
                line_total,
            });
        }

        self.gateway
            .batch_update(&self.inventory_worksheet, stock_updates)
            .await?;
        self.gateway
            .append_rows(&self.sales_worksheet, sale_rows)
            .await?;

        self.cache.invalidate_inventory();
        self.cache.invalidate_sales();

        info!(%sale_id, items = items.len(), "sale recorded");
        Ok(SaleOutcome { sale_id, items })
    }
}
