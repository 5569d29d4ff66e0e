//! Typed records for the two worksheets, plus the one place where
//! spreadsheet text is coerced into numbers.
//!
//! Sheets hand back everything as text, with prices sometimes using a comma
//! as the decimal separator. All of that tolerance lives here; the rest of
//! the crate only ever sees `Decimal` and `u32`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::warn;

/// Fixed column order of the inventory worksheet (header row values).
pub const INVENTORY_HEADER: [&str; 6] = [
    "barcode",
    "name",
    "description",
    "category",
    "price",
    "quantity",
];

/// Fixed column order of the sales worksheet (header row values).
pub const SALES_HEADER: [&str; 8] = [
    "sale_id",
    "timestamp",
    "barcode",
    "product_name",
    "quantity",
    "unit_price",
    "line_total",
    "category",
];

/// One inventory row, numeric fields already coerced.
/// `row` is the 1-based sheet row backing the record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InventoryRecord {
    #[serde(skip_serializing)]
    pub row: u32,
    pub barcode: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// One sale line item row. Immutable once written; `sale_id` groups the
/// rows of one logical transaction.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SaleRecord {
    pub sale_id: String,
    pub timestamp: String,
    pub barcode: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub category: String,
}

impl SaleRecord {
    /// Date part of the timestamp (`YYYY-MM-DD`, the first whitespace token).
    pub fn sale_date(&self) -> Option<NaiveDate> {
        let token = self.timestamp.split_whitespace().next()?;
        NaiveDate::parse_from_str(token, "%Y-%m-%d").ok()
    }
}

/// Parses spreadsheet decimal text, normalizing a comma separator to a dot.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim().replace(',', ".").as_str()).ok()
}

/// Parses spreadsheet quantity text. Negative values do not parse.
pub fn parse_quantity(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

fn column_map(header: &[String]) -> HashMap<&str, usize> {
    header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect()
}

fn field<'a>(row: &'a [String], columns: &HashMap<&str, usize>, name: &str) -> Option<&'a str> {
    columns.get(name).and_then(|&i| row.get(i)).map(String::as_str)
}

/// Maps a full inventory value grid (header row first) to typed records.
/// Rows that fail coercion are skipped with a warning, never an error.
pub fn parse_inventory_grid(grid: &[Vec<String>]) -> Vec<InventoryRecord> {
    let Some((header, data)) = grid.split_first() else {
        return Vec::new();
    };
    let columns = column_map(header);

    let mut records = Vec::with_capacity(data.len());
    for (i, row) in data.iter().enumerate() {
        // data row 0 sits on sheet row 2, below the header
        let sheet_row = i as u32 + 2;
        let parsed = (|| {
            Some(InventoryRecord {
                row: sheet_row,
                barcode: field(row, &columns, "barcode")?.to_string(),
                name: field(row, &columns, "name")?.to_string(),
                description: field(row, &columns, "description").unwrap_or("").to_string(),
                category: field(row, &columns, "category").unwrap_or("").to_string(),
                price: parse_decimal(field(row, &columns, "price")?)?,
                quantity: parse_quantity(field(row, &columns, "quantity")?)?,
            })
        })();
        match parsed {
            Some(record) => records.push(record),
            None => warn!(sheet_row, "skipping unparseable inventory row"),
        }
    }
    records
}

/// Maps a full sales value grid (header row first) to typed records,
/// skipping unparseable rows with a warning.
pub fn parse_sales_grid(grid: &[Vec<String>]) -> Vec<SaleRecord> {
    let Some((header, data)) = grid.split_first() else {
        return Vec::new();
    };
    let columns = column_map(header);

    let mut records = Vec::with_capacity(data.len());
    for (i, row) in data.iter().enumerate() {
        let sheet_row = i as u32 + 2;
        let parsed = (|| {
            Some(SaleRecord {
                sale_id: field(row, &columns, "sale_id")?.to_string(),
                timestamp: field(row, &columns, "timestamp")?.to_string(),
                barcode: field(row, &columns, "barcode")?.to_string(),
                product_name: field(row, &columns, "product_name")?.to_string(),
                quantity: parse_quantity(field(row, &columns, "quantity")?)?,
                unit_price: parse_decimal(field(row, &columns, "unit_price")?)?,
                line_total: parse_decimal(field(row, &columns, "line_total")?)?,
                category: field(row, &columns, "category").unwrap_or("").to_string(),
            })
        })();
        match parsed {
            Some(record) => records.push(record),
            None => warn!(sheet_row, "skipping unparseable sale row"),
        }
    }
    records
}

/// Deserializers for request fields that clients send either as JSON numbers
/// or as strings (possibly with a comma decimal separator).
pub mod de {
    use super::{parse_decimal, parse_quantity};
    use rust_decimal::Decimal;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn decimal_from_value<E: Error>(value: &Value) -> Result<Decimal, E> {
        match value {
            Value::String(s) => {
                parse_decimal(s).ok_or_else(|| E::custom(format!("invalid decimal: {s:?}")))
            }
            Value::Number(n) => parse_decimal(&n.to_string())
                .ok_or_else(|| E::custom(format!("invalid decimal: {n}"))),
            other => Err(E::custom(format!("expected a number, got {other}"))),
        }
    }

    fn quantity_from_value<E: Error>(value: &Value) -> Result<u32, E> {
        match value {
            Value::String(s) => {
                parse_quantity(s).ok_or_else(|| E::custom(format!("invalid quantity: {s:?}")))
            }
            Value::Number(n) => n
                .as_u64()
                .and_then(|q| u32::try_from(q).ok())
                .ok_or_else(|| E::custom(format!("invalid quantity: {n}"))),
            other => Err(E::custom(format!("expected an integer, got {other}"))),
        }
    }

    pub fn flexible_decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
        decimal_from_value(&Value::deserialize(d)?)
    }

    pub fn flexible_decimal_opt<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Decimal>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            value => decimal_from_value(&value).map(Some),
        }
    }

    pub fn flexible_quantity<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        quantity_from_value(&Value::deserialize(d)?)
    }

    pub fn flexible_quantity_opt<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<u32>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            value => quantity_from_value(&value).map(Some),
        }
    }
}
