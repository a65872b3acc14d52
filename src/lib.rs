//! Library entrypoint for PriceWatch.
//!
//! The binary is a thin wrapper; integration tests under `tests/` build the
//! driver and the HTTP app from here with test doubles plugged in.

pub mod config;
pub mod models;
pub mod services;

pub mod controllers;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub watch: services::price_watch::PriceWatch,
    // None when DB_TABLE_NAME is not set
    pub db: Option<mongodb::Database>,
}
