use crate::errors::ServiceError;
use crate::services::receipts::Receipt;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Html,
};
use std::fmt::Write;

pub async fn show(
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
) -> Result<Html<String>, ServiceError> {
    let receipt = state.receipts.receipt(&sale_id).await?;
    Ok(Html(render(&receipt)))
}

/// Renders the printable receipt. Small enough that a template engine
/// would be more ceremony than the page itself.
fn render(receipt: &Receipt) -> String {
    let mut rows = String::new();
    for item in &receipt.items {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&item.product_name),
            item.quantity,
            item.line_total,
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Receipt {id}</title>
<style>
  body {{ font-family: monospace; max-width: 24rem; margin: 1rem auto; }}
  table {{ width: 100%; border-collapse: collapse; }}
  td, th {{ text-align: left; padding: 0.2rem 0.4rem; }}
  tfoot td {{ border-top: 1px solid #000; font-weight: bold; }}
</style>
</head>
<body>
<h2>Receipt {id}</h2>
<p>{timestamp}</p>
<table>
<thead><tr><th>Item</th><th>Qty</th><th>Total</th></tr></thead>
<tbody>{rows}</tbody>
<tfoot><tr><td colspan="2">Total</td><td>{total}</td></tr></tfoot>
</table>
</body>
</html>"#,
        id = escape(&receipt.sale_id),
        timestamp = escape(&receipt.timestamp),
        rows = rows,
        total = receipt.total,
    )
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
