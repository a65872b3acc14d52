use async_trait::async_trait;
use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::options::UpdateOptions;
use mongodb::{Collection, Database};
use thiserror::Error;

use crate::models::TrackedProduct;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// Where tracked products and their notified flag live.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All tracked products, in the order the store returns them.
    async fn list_products(&self) -> Result<Vec<TrackedProduct>, StoreError>;

    async fn find_product(&self, url: &str) -> Result<Option<TrackedProduct>, StoreError>;

    /// Sets the notified flag for `product.url`. Safe to repeat; returns true
    /// only when the flag was not already set.
    async fn mark_notified(&self, product: &TrackedProduct) -> Result<bool, StoreError>;
}

/// Decodes stored records, dropping (and logging) the ones that don't fit the
/// product shape, e.g. a missing or non-numeric `targetPrice`.
pub fn decode_products(docs: impl IntoIterator<Item = Document>) -> Vec<TrackedProduct> {
    docs.into_iter()
        .filter_map(|d| {
            let url = d.get_str("productUrl").unwrap_or("<missing productUrl>").to_string();
            match bson::from_document::<TrackedProduct>(d) {
                Ok(product) => Some(product),
                Err(e) => {
                    tracing::warn!(%url, error = %e, "skipping unreadable product record");
                    None
                }
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct MongoProductStore {
    products: Collection<TrackedProduct>,
}

impl MongoProductStore {
    pub fn new(db: &Database, table_name: &str) -> Self {
        Self {
            products: db.collection::<TrackedProduct>(table_name),
        }
    }

    pub fn collection_name(&self) -> &str {
        self.products.name()
    }
}

#[async_trait]
impl ProductStore for MongoProductStore {
    async fn list_products(&self) -> Result<Vec<TrackedProduct>, StoreError> {
        // raw documents, so one bad record can't sink the whole scan
        let mut cursor = self
            .products
            .clone_with_type::<Document>()
            .find(None, None)
            .await?;

        let mut docs: Vec<Document> = Vec::new();
        while let Some(res) = cursor.next().await {
            docs.push(res?);
        }

        Ok(decode_products(docs))
    }

    async fn find_product(&self, url: &str) -> Result<Option<TrackedProduct>, StoreError> {
        Ok(self
            .products
            .find_one(doc! { "productUrl": url }, None)
            .await?)
    }

    async fn mark_notified(&self, product: &TrackedProduct) -> Result<bool, StoreError> {
        let now = Utc::now().timestamp();

        let flipped = self
            .products
            .update_one(
                doc! { "productUrl": &product.url, "emailSent": { "$ne": true } },
                doc! { "$set": { "emailSent": true, "notifiedAt": now } },
                None,
            )
            .await?;

        if flipped.modified_count > 0 {
            return Ok(true);
        }

        // Either already flagged, or a product that only ever arrived through
        // an event. Only the latter gets inserted.
        let inserted = self
            .products
            .update_one(
                doc! { "productUrl": &product.url },
                doc! {
                    "$setOnInsert": {
                        "targetPrice": product.target_price.to_string(),
                        "emailSent": true,
                        "notifiedAt": now,
                    }
                },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await?;

        Ok(inserted.upserted_id.is_some())
    }
}
