use crate::cache::SheetCache;
use crate::errors::ServiceError;
use crate::models::{InventoryRecord, SaleRecord};
use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};

const TOP_PRODUCTS: usize = 5;
const DAILY_WINDOW_DAYS: i64 = 30;
const LOW_STOCK_NAMES_SHOWN: usize = 10;
const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Serialize)]
pub struct SalesKpis {
    pub revenue_today: Decimal,
    pub orders_today: u64,
    pub revenue_month: Decimal,
    pub orders_month: u64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ProductQuantity {
    pub name: String,
    pub quantity: u64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize)]
pub struct SalesCharts {
    pub by_category: BTreeMap<String, u64>,
    pub top_products: Vec<ProductQuantity>,
    pub daily_revenue_30d: Vec<DailyRevenue>,
}

#[derive(Debug, Serialize)]
pub struct SalesReport {
    pub kpis: SalesKpis,
    pub charts: SalesCharts,
}

#[derive(Debug, Serialize)]
pub struct InventoryKpis {
    pub total_value: Decimal,
    pub total_units: u64,
    pub low_stock_count: u64,
}

#[derive(Debug, Serialize)]
pub struct InventoryLists {
    pub low_stock_names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InventoryReport {
    pub kpis: InventoryKpis,
    pub lists: InventoryLists,
}

/// Folds sale rows into KPIs and chart series, relative to `today`.
/// Rows whose timestamp cannot be dated are skipped and logged; they never
/// abort the report.
pub fn fold_sales_report(rows: &[SaleRecord], today: NaiveDate) -> SalesReport {
    let mut revenue_today = Decimal::ZERO;
    let mut revenue_month = Decimal::ZERO;
    let mut today_ids: HashSet<&str> = HashSet::new();
    let mut month_ids: HashSet<&str> = HashSet::new();
    let mut by_category: BTreeMap<String, u64> = BTreeMap::new();
    let mut product_order: Vec<String> = Vec::new();
    let mut product_totals: HashMap<String, u64> = HashMap::new();
    let mut daily: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for row in rows {
        let Some(date) = row.sale_date() else {
            warn!(sale_id = %row.sale_id, timestamp = %row.timestamp, "skipping sale row with unusable timestamp");
            continue;
        };

        if date == today {
            revenue_today += row.line_total;
            today_ids.insert(&row.sale_id);
        }
        if date.year() == today.year() && date.month() == today.month() {
            revenue_month += row.line_total;
            month_ids.insert(&row.sale_id);
        }

        let category = if row.category.is_empty() {
            UNCATEGORIZED
        } else {
            row.category.as_str()
        };
        *by_category.entry(category.to_string()).or_insert(0) += u64::from(row.quantity);

        if !product_totals.contains_key(&row.product_name) {
            product_order.push(row.product_name.clone());
        }
        *product_totals.entry(row.product_name.clone()).or_insert(0) +=
            u64::from(row.quantity);

        let days_ago = (today - date).num_days();
        if (0..=DAILY_WINDOW_DAYS).contains(&days_ago) {
            *daily.entry(date).or_insert(Decimal::ZERO) += row.line_total;
        }
    }

    // stable sort keeps first-seen order between equal totals
    let mut top_products: Vec<ProductQuantity> = product_order
        .into_iter()
        .map(|name| {
            let quantity = product_totals[&name];
            ProductQuantity { name, quantity }
        })
        .collect();
    top_products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    top_products.truncate(TOP_PRODUCTS);

    SalesReport {
        kpis: SalesKpis {
            revenue_today,
            orders_today: today_ids.len() as u64,
            revenue_month,
            orders_month: month_ids.len() as u64,
        },
        charts: SalesCharts {
            by_category,
            top_products,
            daily_revenue_30d: daily
                .into_iter()
                .map(|(date, revenue)| DailyRevenue { date, revenue })
                .collect(),
        },
    }
}

/// Folds inventory rows into stock-value totals and the low-stock list.
/// Quantity 0 is out-of-stock, not low-stock; the threshold is inclusive.
pub fn fold_inventory_report(rows: &[InventoryRecord], threshold: u32) -> InventoryReport {
    let mut total_value = Decimal::ZERO;
    let mut total_units: u64 = 0;
    let mut low_stock_names = Vec::new();

    for item in rows {
        total_value += item.price * Decimal::from(item.quantity);
        total_units += u64::from(item.quantity);

        if item.quantity > 0 && item.quantity <= threshold {
            low_stock_names.push(format!("{} (qty: {})", item.name, item.quantity));
        }
    }

    let low_stock_count = low_stock_names.len() as u64;
    low_stock_names.truncate(LOW_STOCK_NAMES_SHOWN);

    InventoryReport {
        kpis: InventoryKpis {
            total_value,
            total_units,
            low_stock_count,
        },
        lists: InventoryLists { low_stock_names },
    }
}

/// Serves the two reports from the cached worksheet snapshots.
pub struct ReportService {
    cache: Arc<SheetCache>,
    low_stock_threshold: u32,
}

impl ReportService {
    pub fn new(cache: Arc<SheetCache>, low_stock_threshold: u32) -> Self {
        Self {
            cache,
            low_stock_threshold,
        }
    }

    #[instrument(skip(self))]
    pub async fn sales_report(&self) -> Result<SalesReport, ServiceError> {
        let rows = self.cache.sales().await?;
        let report = fold_sales_report(&rows, Local::now().date_naive());
        info!(rows = rows.len(), "sales report generated");
        Ok(report)
    }

    #[instrument(skip(self))]
    pub async fn inventory_report(&self) -> Result<InventoryReport, ServiceError> {
        let rows = self.cache.inventory().await?;
        let report = fold_inventory_report(&rows, self.low_stock_threshold);
        info!(rows = rows.len(), "inventory report generated");
        Ok(report)
    }
}
