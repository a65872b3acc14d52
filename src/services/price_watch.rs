use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{EventError, InvocationEvent, TrackedProduct};

use super::{
    decision::should_notify,
    mailer::{EmailMessage, Mailer},
    notification::NotificationTemplates,
    product_store::ProductStore,
    scraper::PriceFetcher,
};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    MalformedEvent(#[from] EventError),

    #[error("no product store configured (DB_TABLE_NAME is missing)")]
    StoreNotConfigured,
}

/// Counters for one batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub checked: usize,
    pub skipped: usize,
    pub below_target: usize,
    pub already_notified: usize,
    pub notified: usize,
    pub mail_failures: usize,
    pub store_failures: usize,
    pub started_at: i64,
    pub finished_at: i64,
}

impl RunSummary {
    fn begin() -> Self {
        Self {
            started_at: Utc::now().timestamp(),
            ..Self::default()
        }
    }

    fn finish(mut self) -> Self {
        self.finished_at = Utc::now().timestamp();
        tracing::info!(
            checked = self.checked,
            skipped = self.skipped,
            below_target = self.below_target,
            already_notified = self.already_notified,
            notified = self.notified,
            mail_failures = self.mail_failures,
            store_failures = self.store_failures,
            "price check finished"
        );
        self
    }
}

/// The batch driver: fetch, decide, notify and remember, one product at a
/// time. All I/O goes through the injected seams.
#[derive(Clone)]
pub struct PriceWatch {
    fetcher: Arc<dyn PriceFetcher>,
    mailer: Arc<dyn Mailer>,
    store: Option<Arc<dyn ProductStore>>,
    templates: NotificationTemplates,
    to_email: String,
    from_email: String,
    event_dedup: bool,
}

impl PriceWatch {
    pub fn new(
        fetcher: Arc<dyn PriceFetcher>,
        mailer: Arc<dyn Mailer>,
        templates: NotificationTemplates,
        to_email: impl Into<String>,
        from_email: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            mailer,
            store: None,
            templates,
            to_email: to_email.into(),
            from_email: from_email.into(),
            event_dedup: false,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ProductStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Lets event-driven runs consult and update the store's notified flag.
    pub fn with_event_dedup(mut self, enabled: bool) -> Self {
        self.event_dedup = enabled;
        self
    }

    /// Event-driven run over `event.products`. A malformed payload rejects
    /// the whole run before anything is fetched.
    pub async fn run_event(&self, event: &Value) -> Result<RunSummary, RunError> {
        let event = InvocationEvent::parse(event).inspect_err(|e| {
            tracing::error!("{}. Exiting...", e);
        })?;

        let store = if self.event_dedup {
            if self.store.is_none() {
                tracing::warn!("event deduplication requested but no store is configured");
            }
            self.store.as_deref()
        } else {
            None
        };

        let mut summary = RunSummary::begin();

        for mut product in event.products {
            if let Some(store) = store {
                match store.find_product(&product.url).await {
                    Ok(Some(stored)) => product.notified = stored.notified,
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!(url = %product.url, error = %e, "could not read notified flag, skipping");
                        summary.checked += 1;
                        summary.skipped += 1;
                        continue;
                    }
                }
            }

            self.process(&product, store, &mut summary).await;
        }

        Ok(summary.finish())
    }

    /// Store-driven run. An empty or unreadable store means there is nothing
    /// to do, not a failure.
    pub async fn run_store(&self) -> Result<RunSummary, RunError> {
        let store = self.store.as_deref().ok_or(RunError::StoreNotConfigured)?;
        let summary = RunSummary::begin();

        let products = match store.list_products().await {
            Ok(products) => products,
            Err(e) => {
                tracing::error!(error = %e, "could not load tracked products, nothing to do");
                return Ok(summary.finish());
            }
        };

        if products.is_empty() {
            tracing::info!("no tracked products in the store, nothing to do");
            return Ok(summary.finish());
        }

        let mut summary = summary;
        for product in &products {
            self.process(product, Some(store), &mut summary).await;
        }

        Ok(summary.finish())
    }

    async fn process(
        &self,
        product: &TrackedProduct,
        store: Option<&dyn ProductStore>,
        summary: &mut RunSummary,
    ) {
        summary.checked += 1;

        let snapshot = self.fetcher.snapshot(&product.url).await;
        let label = if snapshot.name.is_empty() {
            product.url.as_str()
        } else {
            snapshot.name.as_str()
        };

        let Some(price) = snapshot.price else {
            summary.skipped += 1;
            return;
        };

        if price < product.target_price {
            summary.below_target += 1;
        }

        if !should_notify(Some(price), product.target_price, product.notified) {
            if product.notified && price < product.target_price {
                summary.already_notified += 1;
                tracing::info!("Already notified about {}, not sending again", label);
            } else {
                tracing::info!(
                    "Not sending email for {}, because price is {} and target price is {}",
                    label,
                    price,
                    product.target_price
                );
            }
            return;
        }

        let email = match self.templates.render_price_drop(product, &snapshot.name, price) {
            Ok(email) => email,
            Err(e) => {
                summary.mail_failures += 1;
                tracing::error!("Could not render email for {}: {}", label, e);
                return;
            }
        };

        let message = EmailMessage {
            to: self.to_email.clone(),
            from: self.from_email.clone(),
            subject: email.subject,
            text_body: email.text_body,
            html_body: email.html_body,
        };

        match self.mailer.send(&message).await {
            Ok(sent) => {
                summary.notified += 1;
                tracing::info!(message_id = ?sent.message_id, "Email for {} sent successfully", label);
            }
            Err(e) => {
                summary.mail_failures += 1;
                tracing::error!("Error sending email for {}: {}", label, e);
                return;
            }
        }

        let Some(store) = store else {
            return;
        };

        // Not retried: a lost write means the next run may send this again.
        if let Err(e) = store.mark_notified(product).await {
            summary.store_failures += 1;
            tracing::error!(url = %product.url, error = %e, "email sent but notified flag was not saved");
        }
    }
}
