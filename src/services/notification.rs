use std::sync::Arc;

use handlebars::Handlebars;
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

use crate::models::TrackedProduct;

const SUBJECT: &str = include_str!("../../templates/email/subject.hbs");
const PRICE_DROP_TEXT: &str = include_str!("../../templates/email/price_drop.txt.hbs");
const PRICE_DROP_HTML: &str = include_str!("../../templates/email/price_drop.html.hbs");

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Price-drop message templates. The HTML registry escapes interpolated
/// values, the plain one (subject and text body) leaves them as they are.
#[derive(Clone)]
pub struct NotificationTemplates {
    html: Arc<Handlebars<'static>>,
    plain: Arc<Handlebars<'static>>,
    app_name: String,
}

impl NotificationTemplates {
    pub fn build(app_name: &str) -> Result<Self, NotificationError> {
        let mut html = Handlebars::new();
        html.set_strict_mode(true);
        html.register_template_string("email/price_drop", PRICE_DROP_HTML)?;

        let mut plain = Handlebars::new();
        plain.set_strict_mode(true);
        plain.register_escape_fn(handlebars::no_escape);
        plain.register_template_string("email/subject", SUBJECT)?;
        plain.register_template_string("email/price_drop", PRICE_DROP_TEXT)?;

        Ok(Self {
            html: Arc::new(html),
            plain: Arc::new(plain),
            app_name: app_name.to_string(),
        })
    }

    /// Text and HTML bodies carry the same facts: name, link, target and
    /// current price.
    pub fn render_price_drop(
        &self,
        product: &TrackedProduct,
        product_name: &str,
        price: Decimal,
    ) -> Result<RenderedEmail, NotificationError> {
        let ctx = json!({
            "app_name": self.app_name,
            "product_name": product_name,
            "url": product.url,
            "target_price": product.target_price.to_string(),
            "price": price.to_string(),
        });

        let subject = self.plain.render("email/subject", &ctx)?;
        let text_body = self.plain.render("email/price_drop", &ctx)?;
        let html_body = self.html.render("email/price_drop", &ctx)?;

        Ok(RenderedEmail {
            subject: subject.trim().to_string(),
            text_body: text_body.trim().to_string(),
            html_body,
        })
    }
}
