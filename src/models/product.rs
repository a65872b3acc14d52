use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product whose price is being watched.
///
/// Field names follow the stored record shape; `targetPrice` may be stored as
/// either a string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedProduct {
    #[serde(rename = "productUrl")]
    pub url: String,

    #[serde(rename = "targetPrice")]
    pub target_price: Decimal,

    // set once by this system after a successful send, never reset
    #[serde(rename = "emailSent", default)]
    pub notified: bool,
}

impl TrackedProduct {
    pub fn new(url: impl Into<String>, target_price: Decimal) -> Self {
        Self {
            url: url.into(),
            target_price,
            notified: false,
        }
    }
}
