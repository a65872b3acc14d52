use rust_decimal::Decimal;
use serde::Serialize;

/// One point-in-time scrape of a product page. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub name: String,
    // None => fetch or extraction failed, skip the product this run
    pub price: Option<Decimal>,
}

impl PriceSnapshot {
    pub fn absent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: None,
        }
    }
}
