use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::TrackedProduct;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("event.products is not an array, check event params")]
    ProductsNotAList,

    #[error("event.products[{index}] is malformed: {reason}")]
    BadProduct { index: usize, reason: String },
}

#[derive(Debug, Deserialize)]
struct EventProduct {
    url: String,
    #[serde(rename = "targetPrice")]
    target_price: Decimal,
}

/// Invocation payload of the event-driven run:
/// `{ "products": [{ "url": ..., "targetPrice": ... }] }`.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationEvent {
    pub products: Vec<TrackedProduct>,
}

impl InvocationEvent {
    /// Validates the whole payload up front. Any malformed entry rejects the
    /// event, so a run never processes half a list.
    pub fn parse(event: &Value) -> Result<Self, EventError> {
        let items = event
            .get("products")
            .and_then(Value::as_array)
            .ok_or(EventError::ProductsNotAList)?;

        let mut products = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let p = EventProduct::deserialize(item).map_err(|e| EventError::BadProduct {
                index,
                reason: e.to_string(),
            })?;

            let url = p.url.trim();
            if url.is_empty() {
                return Err(EventError::BadProduct {
                    index,
                    reason: "url is empty".to_string(),
                });
            }

            products.push(TrackedProduct::new(url, p.target_price));
        }

        Ok(Self { products })
    }
}
