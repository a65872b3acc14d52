use std::str::FromStr;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use thiserror::Error;

use crate::models::PriceSnapshot;

// Leading digit groups split by a single space, NBSP or narrow NBSP;
// "12 990 Ft" and "12\u{a0}990 Ft" both read as 12990.
static LEADING_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([0-9]+(?:[ \x{a0}\x{202f}][0-9]+)*)").expect("price pattern is valid")
});

#[derive(Debug, Error, PartialEq)]
pub enum ExtractionError {
    #[error("no price found at selector {selector}")]
    MissingPrice { selector: String },

    #[error("price text {text:?} does not start with digits")]
    NotNumeric { text: String },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("page returned {0}")]
    Status(StatusCode),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Source of price snapshots. Every failure collapses into a snapshot with an
/// absent price; implementations log the cause themselves.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    async fn snapshot(&self, url: &str) -> PriceSnapshot;
}

/// Reads the leading price out of a text like `"12 990 Ft"`.
pub fn extract_price(text: &str) -> Result<Decimal, ExtractionError> {
    let not_numeric = || ExtractionError::NotNumeric {
        text: text.trim().to_string(),
    };

    let caps = LEADING_PRICE.captures(text).ok_or_else(not_numeric)?;
    let digits: String = caps[1].chars().filter(char::is_ascii_digit).collect();

    Decimal::from_str(&digits).map_err(|_| not_numeric())
}

#[derive(Debug, Clone)]
pub struct PageSelectors {
    price_raw: String,
    price: Selector,
    name: Selector,
}

impl PageSelectors {
    pub fn new(price: &str, name: &str) -> Result<Self, FetchError> {
        Ok(Self {
            price_raw: price.to_string(),
            price: parse_selector(price)?,
            name: parse_selector(name)?,
        })
    }

    /// Pulls the display name and the price out of a product page. The name
    /// is empty when its markup is missing, which is not an error.
    pub fn extract(&self, html: &str) -> (String, Result<Decimal, ExtractionError>) {
        let doc = Html::parse_document(html);

        let name = doc
            .select(&self.name)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let price_text = doc
            .select(&self.price)
            .next()
            .map(|el| el.text().collect::<String>())
            .filter(|t| !t.trim().is_empty());

        let price = match price_text {
            Some(t) => extract_price(&t),
            None => Err(ExtractionError::MissingPrice {
                selector: self.price_raw.clone(),
            }),
        };

        (name, price)
    }
}

fn parse_selector(s: &str) -> Result<Selector, FetchError> {
    Selector::parse(s).map_err(|e| FetchError::Selector {
        selector: s.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Clone)]
pub struct PageScraper {
    http: Client,
    selectors: PageSelectors,
}

impl PageScraper {
    pub fn new(selectors: PageSelectors) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(concat!("PriceWatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, selectors })
    }

    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let res = self.http.get(url).send().await?;

        if !res.status().is_success() {
            return Err(FetchError::Status(res.status()));
        }

        Ok(res.text().await?)
    }
}

#[async_trait]
impl PriceFetcher for PageScraper {
    async fn snapshot(&self, url: &str) -> PriceSnapshot {
        let html = match self.fetch_page(url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(%url, error = %e, "could not fetch product page");
                return PriceSnapshot::absent("");
            }
        };

        let (name, price) = self.selectors.extract(&html);
        match price {
            Ok(price) => {
                tracing::info!("Current price of {}: {}", name, price);
                PriceSnapshot {
                    name,
                    price: Some(price),
                }
            }
            Err(e) => {
                let e = FetchError::from(e);
                tracing::warn!(%url, product = %name, error = %e, "could not read price");
                PriceSnapshot::absent(name)
            }
        }
    }
}
