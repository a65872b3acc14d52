#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pricewatch::{
    models::{PriceSnapshot, TrackedProduct},
    services::{
        mailer::{EmailMessage, MailError, Mailer, SentEmail},
        notification::NotificationTemplates,
        price_watch::PriceWatch,
        product_store::{ProductStore, StoreError},
        scraper::PriceFetcher,
    },
};
use rust_decimal::Decimal;

pub const TO: &str = "me@example.com";
pub const FROM: &str = "watch@example.com";

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Serves canned snapshots; unknown URLs behave like a failed fetch.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, PriceSnapshot>,
    pub requested: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn with_price(mut self, url: &str, name: &str, price: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            PriceSnapshot {
                name: name.to_string(),
                price: Some(dec(price)),
            },
        );
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceFetcher for FakeFetcher {
    async fn snapshot(&self, url: &str) -> PriceSnapshot {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| PriceSnapshot::absent(""))
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    // subjects containing this text fail to send
    fail_on: Option<String>,
}

impl RecordingMailer {
    pub fn failing_on(text: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_on: Some(text.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, MailError> {
        if let Some(f) = &self.fail_on {
            if message.subject.contains(f.as_str()) {
                return Err(MailError::Transport("rejected by test mailer".to_string()));
            }
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(SentEmail {
            message_id: Some(format!("msg-{}", sent.len())),
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub products: Mutex<Vec<TrackedProduct>>,
    pub writes: Mutex<usize>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn with(products: Vec<TrackedProduct>) -> Self {
        Self {
            products: Mutex::new(products),
            ..Self::default()
        }
    }

    pub fn get(&self, url: &str) -> Option<TrackedProduct> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.url == url)
            .cloned()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

fn unavailable() -> StoreError {
    StoreError::Mongo(mongodb::error::Error::from(std::io::Error::other("store unavailable")))
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list_products(&self) -> Result<Vec<TrackedProduct>, StoreError> {
        if self.fail_reads {
            return Err(unavailable());
        }
        Ok(self.products.lock().unwrap().clone())
    }

    async fn find_product(&self, url: &str) -> Result<Option<TrackedProduct>, StoreError> {
        if self.fail_reads {
            return Err(unavailable());
        }
        Ok(self.get(url))
    }

    async fn mark_notified(&self, product: &TrackedProduct) -> Result<bool, StoreError> {
        if self.fail_writes {
            return Err(unavailable());
        }
        *self.writes.lock().unwrap() += 1;

        let mut products = self.products.lock().unwrap();
        match products.iter_mut().find(|p| p.url == product.url) {
            Some(p) => {
                let newly = !p.notified;
                p.notified = true;
                Ok(newly)
            }
            None => {
                products.push(TrackedProduct {
                    notified: true,
                    ..product.clone()
                });
                Ok(true)
            }
        }
    }
}

pub fn stored(url: &str, target: &str, notified: bool) -> TrackedProduct {
    TrackedProduct {
        url: url.to_string(),
        target_price: dec(target),
        notified,
    }
}

pub fn watch(fetcher: Arc<FakeFetcher>, mailer: Arc<RecordingMailer>) -> PriceWatch {
    let templates = NotificationTemplates::build("Test árfigyelő").unwrap();
    PriceWatch::new(fetcher, mailer, templates, TO, FROM)
}
