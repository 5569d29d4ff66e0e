use crate::cache::SheetCache;
use crate::errors::ServiceError;
use crate::models::SaleRecord;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::instrument;

/// Everything a rendered receipt needs: the matching sale rows in sheet
/// order, their summed total, and the transaction timestamp.
#[derive(Debug)]
pub struct Receipt {
    pub sale_id: String,
    pub timestamp: String,
    pub items: Vec<SaleRecord>,
    pub total: Decimal,
}

pub struct ReceiptService {
    cache: Arc<SheetCache>,
}

impl ReceiptService {
    pub fn new(cache: Arc<SheetCache>) -> Self {
        Self { cache }
    }

    #[instrument(skip(self))]
    pub async fn receipt(&self, sale_id: &str) -> Result<Receipt, ServiceError> {
        let items: Vec<SaleRecord> = self
            .cache
            .sales()
            .await?
            .into_iter()
            .filter(|row| row.sale_id == sale_id)
            .collect();

        let Some(first) = items.first() else {
            return Err(ServiceError::NotFound(format!("Sale '{sale_id}' not found")));
        };

        Ok(Receipt {
            sale_id: sale_id.to_string(),
            timestamp: first.timestamp.clone(),
            total: items.iter().map(|row| row.line_total).sum(),
            items,
        })
    }
}
