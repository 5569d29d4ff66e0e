//! Read-through worksheet snapshot cache.
//!
//! One snapshot per worksheet: the full typed row set plus the instant it
//! was fetched. A snapshot is served as long as it is no older than the
//! freshness window; `invalidate` clears it so the next read refetches.
//! Concurrent readers of a stale snapshot may both refetch and redundantly
//! hit the gateway; the last writer wins, which is consistent with the
//! freshness contract. A failed refetch leaves the stored snapshot untouched.

use crate::errors::ServiceError;
use crate::gateway::SpreadsheetGateway;
use crate::models::{self, InventoryRecord, SaleRecord};
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

struct Snapshot<T> {
    rows: Vec<T>,
    fetched_at: Instant,
}

/// Time-bounded snapshot of one worksheet's typed rows.
pub struct SnapshotCache<T> {
    ttl: Duration,
    inner: RwLock<Option<Snapshot<T>>>,
}

impl<T: Clone> SnapshotCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(None),
        }
    }

    /// Returns the cached rows if fresh, otherwise awaits `fetch`, stores the
    /// result, and returns it. The lock is never held across the fetch.
    pub async fn get_with<F, Fut>(&self, fetch: F) -> Result<Vec<T>, ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, ServiceError>>,
    {
        {
            let guard = self.inner.read().unwrap();
            if let Some(snapshot) = guard.as_ref() {
                if snapshot.fetched_at.elapsed() <= self.ttl {
                    return Ok(snapshot.rows.clone());
                }
            }
        }

        let rows = fetch().await?;
        let mut guard = self.inner.write().unwrap();
        *guard = Some(Snapshot {
            rows: rows.clone(),
            fetched_at: Instant::now(),
        });
        Ok(rows)
    }

    /// Forces the next `get_with` to refetch regardless of elapsed time.
    pub fn invalidate(&self) {
        let mut guard = self.inner.write().unwrap();
        *guard = None;
    }
}

/// The two worksheet caches behind typed read-through accessors.
/// Owned by the application state and injected into services; writes go
/// through the gateway directly and call the matching `invalidate_*`.
pub struct SheetCache {
    gateway: Arc<dyn SpreadsheetGateway>,
    inventory_worksheet: String,
    sales_worksheet: String,
    inventory: SnapshotCache<InventoryRecord>,
    sales: SnapshotCache<SaleRecord>,
}

impl SheetCache {
    pub fn new(
        gateway: Arc<dyn SpreadsheetGateway>,
        inventory_worksheet: String,
        sales_worksheet: String,
        ttl: Duration,
    ) -> Self {
        Self {
            gateway,
            inventory_worksheet,
            sales_worksheet,
            inventory: SnapshotCache::new(ttl),
            sales: SnapshotCache::new(ttl),
        }
    }

    pub async fn inventory(&self) -> Result<Vec<InventoryRecord>, ServiceError> {
        let gateway = self.gateway.clone();
        let worksheet = self.inventory_worksheet.clone();
        self.inventory
            .get_with(|| async move {
                debug!(%worksheet, "refreshing inventory snapshot");
                let grid = gateway.read_rows(&worksheet).await?;
                Ok(models::parse_inventory_grid(&grid))
            })
            .await
    }

    pub async fn sales(&self) -> Result<Vec<SaleRecord>, ServiceError> {
        let gateway = self.gateway.clone();
        let worksheet = self.sales_worksheet.clone();
        self.sales
            .get_with(|| async move {
                debug!(%worksheet, "refreshing sales snapshot");
                let grid = gateway.read_rows(&worksheet).await?;
                Ok(models::parse_sales_grid(&grid))
            })
            .await
    }

    pub fn invalidate_inventory(&self) {
        self.inventory.invalidate();
    }

    pub fn invalidate_sales(&self) {
        self.sales.invalidate();
    }
}
