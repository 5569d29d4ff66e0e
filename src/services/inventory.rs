use crate::cache::SheetCache;
use crate::errors::ServiceError;
use crate::gateway::{CellUpdate, SpreadsheetGateway};
use crate::models::InventoryRecord;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument};

/// Fields of a product being created. All six sheet columns, in order.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub barcode: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl NewProduct {
    fn into_row(self) -> Vec<String> {
        vec![
            self.barcode,
            self.name,
            self.description,
            self.category,
            self.price.to_string(),
            self.quantity.to_string(),
        ]
    }
}

/// A partial update; only present fields are written.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<u32>,
}

/// Distinguishes a real update from a patch with nothing in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NothingToUpdate,
}

/// CRUD over inventory rows, keyed by barcode.
pub struct InventoryService {
    gateway: Arc<dyn SpreadsheetGateway>,
    cache: Arc<SheetCache>,
    worksheet: String,
}

impl InventoryService {
    pub fn new(
        gateway: Arc<dyn SpreadsheetGateway>,
        cache: Arc<SheetCache>,
        worksheet: String,
    ) -> Self {
        Self {
            gateway,
            cache,
            worksheet,
        }
    }

    /// All inventory rows from the cached snapshot.
    pub async fn list(&self) -> Result<Vec<InventoryRecord>, ServiceError> {
        self.cache.inventory().await
    }

    /// Exact-match lookup on the cached snapshot.
    #[instrument(skip(self))]
    pub async fn get(&self, barcode: &str) -> Result<InventoryRecord, ServiceError> {
        self.cache
            .inventory()
            .await?
            .into_iter()
            .find(|item| item.barcode == barcode)
            .ok_or_else(|| ServiceError::NotFound(format!("Product '{barcode}' not found")))
    }

    /// Appends a product row. The duplicate check goes to the live sheet,
    /// not the cache, so a stale snapshot cannot admit a duplicate barcode.
    #[instrument(skip(self, product), fields(barcode = %product.barcode))]
    pub async fn create(&self, product: NewProduct) -> Result<(), ServiceError> {
        let existing = self
            .gateway
            .find_in_column(&self.worksheet, 1, &product.barcode)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Product with barcode '{}' already exists",
                product.barcode
            )));
        }

        let barcode = product.barcode.clone();
        self.gateway
            .append_rows(&self.worksheet, vec![product.into_row()])
            .await?;
        self.cache.invalidate_inventory();

        info!(%barcode, "product created");
        Ok(())
    }

    /// Writes one targeted cell per present patch field in a single batch.
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        barcode: &str,
        patch: ProductPatch,
    ) -> Result<UpdateOutcome, ServiceError> {
        let row = self
            .gateway
            .find_in_column(&self.worksheet, 1, barcode)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product '{barcode}' not found")))?;

        let mut updates = Vec::new();
        if let Some(name) = patch.name {
            updates.push(CellUpdate::new(format!("B{row}"), name));
        }
        if let Some(description) = patch.description {
            updates.push(CellUpdate::new(format!("C{row}"), description));
        }
        if let Some(category) = patch.category {
            updates.push(CellUpdate::new(format!("D{row}"), category));
        }
        if let Some(price) = patch.price {
            updates.push(CellUpdate::new(format!("E{row}"), price.to_string()));
        }
        if let Some(quantity) = patch.quantity {
            updates.push(CellUpdate::new(format!("F{row}"), quantity.to_string()));
        }

        if updates.is_empty() {
            return Ok(UpdateOutcome::NothingToUpdate);
        }

        let touched = updates.len();
        self.gateway.batch_update(&self.worksheet, updates).await?;
        self.cache.invalidate_inventory();

        info!(%barcode, touched, "product updated");
        Ok(UpdateOutcome::Updated)
    }
}
