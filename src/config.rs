use std::env;

use thiserror::Error;

pub const DEFAULT_PRICE_SELECTOR: &str = ".ssr-product-price__value";
pub const DEFAULT_NAME_SELECTOR: &str = ".product-sumbox-series";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is missing in the environment")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub to_email: String,
    pub from_email: String,

    // store-driven runs only
    pub db_table_name: Option<String>,
    pub mongodb_uri: String,
    pub mongodb_db: String,

    pub app_name: String,
    pub price_selector: String,
    pub name_selector: String,
    pub event_dedup: bool,

    pub host: String,
    pub port: u16,
}

pub fn load() -> Result<Settings, ConfigError> {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    Settings::from_vars(|key| env::var(key).ok())
}

impl Settings {
    /// Builds settings from any variable lookup, so tests don't have to touch
    /// the process environment.
    pub fn from_vars<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let to_email = non_empty("TO_EMAIL").ok_or(ConfigError::Missing("TO_EMAIL"))?;
        let from_email = non_empty("FROM_EMAIL").ok_or(ConfigError::Missing("FROM_EMAIL"))?;

        let db_table_name = non_empty("DB_TABLE_NAME");

        let mongodb_uri = non_empty("MONGODB_URI")
            .unwrap_or_else(|| "mongodb://localhost:27017".to_string());

        let mongodb_db = non_empty("MONGODB_DB").unwrap_or_else(|| "pricewatch".to_string());

        let app_name = non_empty("APP_NAME").unwrap_or_else(|| "AWS Jysk árfigyelő".to_string());

        let price_selector =
            non_empty("PRICE_SELECTOR").unwrap_or_else(|| DEFAULT_PRICE_SELECTOR.to_string());
        let name_selector =
            non_empty("NAME_SELECTOR").unwrap_or_else(|| DEFAULT_NAME_SELECTOR.to_string());

        let event_dedup = match non_empty("EVENT_DEDUP") {
            None => false,
            Some(v) => parse_flag(&v).ok_or(ConfigError::Invalid {
                name: "EVENT_DEDUP",
                value: v,
            })?,
        };

        let host = non_empty("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match non_empty("PORT") {
            None => 3000,
            Some(v) => v.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: v,
            })?,
        };

        Ok(Settings {
            to_email,
            from_email,
            db_table_name,
            mongodb_uri,
            mongodb_db,
            app_name,
            price_selector,
            name_selector,
            event_dedup,
            host,
            port,
        })
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
