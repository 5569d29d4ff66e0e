//! Access to the external spreadsheet store.
//!
//! Services talk to [`SpreadsheetGateway`]; the one production implementation
//! is [`SheetsGateway`], and tests substitute an in-memory worksheet map.

use crate::errors::ServiceError;
use async_trait::async_trait;

pub mod sheets;

pub use sheets::{ServiceAccountKey, SheetsGateway};

/// One staged single-cell write, addressed in A1 notation relative to a
/// worksheet (e.g. `F7`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub range: String,
    pub value: String,
}

impl CellUpdate {
    pub fn new(range: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            value: value.into(),
        }
    }
}

/// Operations the spreadsheet backend must offer. All failures surface as
/// [`ServiceError::Upstream`]; nothing here retries.
#[async_trait]
pub trait SpreadsheetGateway: Send + Sync {
    /// Full value grid of a worksheet, header row included.
    async fn read_rows(&self, worksheet: &str) -> Result<Vec<Vec<String>>, ServiceError>;

    /// 1-based row number of the first cell in the given 1-based column
    /// that exactly matches `value`.
    async fn find_in_column(
        &self,
        worksheet: &str,
        column: u32,
        value: &str,
    ) -> Result<Option<u32>, ServiceError>;

    /// Appends whole rows after the last data row.
    async fn append_rows(
        &self,
        worksheet: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), ServiceError>;

    /// Applies all staged cell writes in one call, in order.
    async fn batch_update(
        &self,
        worksheet: &str,
        updates: Vec<CellUpdate>,
    ) -> Result<(), ServiceError>;
}

/// A1 column letters for a 1-based column index (1 → `A`, 27 → `AA`).
pub fn column_letter(mut column: u32) -> String {
    debug_assert!(column >= 1);
    let mut letters = String::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.insert(0, (b'A' + rem as u8) as char);
        column = (column - 1) / 26;
    }
    letters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_cover_single_and_double_width() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(6), "F");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(52), "AZ");
    }
}
