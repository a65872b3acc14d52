pub mod db_init;
pub mod decision;
pub mod mailer;
pub mod notification;
pub mod price_watch;
pub mod product_store;
pub mod scraper;
