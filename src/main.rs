use std::io::Read;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use mongodb::Client;
use tracing_subscriber::EnvFilter;

use pricewatch::{
    config::{self, Settings},
    routes,
    services::{
        db_init,
        mailer::SesMailer,
        notification::NotificationTemplates,
        price_watch::PriceWatch,
        product_store::MongoProductStore,
        scraper::{PageScraper, PageSelectors},
    },
    AppState,
};

const USAGE: &str = "usage: PriceWatch [store | event <path|-> | serve]";

enum Mode {
    Store,
    Event(String),
    Serve,
}

fn parse_mode(args: &[String]) -> Option<Mode> {
    match args {
        [] => Some(Mode::Store),
        [m] if m == "store" => Some(Mode::Store),
        [m] if m == "serve" => Some(Mode::Serve),
        [m, source] if m == "event" => Some(Mode::Event(source.clone())),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(mode) = parse_mode(&args) else {
        tracing::error!("{}", USAGE);
        return ExitCode::FAILURE;
    };

    let settings = match config::load() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = match build_state(settings).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match mode {
        Mode::Store => match state.watch.run_store().await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("{}", e);
                ExitCode::FAILURE
            }
        },
        Mode::Event(source) => {
            let event = match read_event(&source) {
                Ok(v) => v,
                Err(e) => {
                    tracing::error!("could not read event from {}: {}. Exiting...", source, e);
                    return ExitCode::FAILURE;
                }
            };

            match state.watch.run_event(&event).await {
                Ok(_) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            }
        }
        Mode::Serve => serve(state).await,
    }
}

async fn build_state(settings: Settings) -> Result<AppState, String> {
    let selectors = PageSelectors::new(&settings.price_selector, &settings.name_selector)
        .map_err(|e| e.to_string())?;
    let scraper = PageScraper::new(selectors).map_err(|e| e.to_string())?;
    let templates = NotificationTemplates::build(&settings.app_name).map_err(|e| e.to_string())?;
    let mailer = SesMailer::from_env().await;

    let mut watch = PriceWatch::new(
        Arc::new(scraper),
        Arc::new(mailer),
        templates,
        settings.to_email.clone(),
        settings.from_email.clone(),
    )
    .with_event_dedup(settings.event_dedup);

    let mut db = None;
    if let Some(table) = settings.db_table_name.as_deref() {
        // Mongo connection
        let client = Client::with_uri_str(&settings.mongodb_uri)
            .await
            .map_err(|e| e.to_string())?;
        let database = client.database(&settings.mongodb_db);

        if let Err(e) = db_init::ensure_indexes(&database, table).await {
            tracing::warn!("could not ensure indexes on {}: {}", table, e);
        }

        let store = MongoProductStore::new(&database, table);
        tracing::info!("using product store {}.{}", settings.mongodb_db, store.collection_name());
        watch = watch.with_store(Arc::new(store));
        db = Some(database);
    }

    Ok(AppState {
        settings,
        watch,
        db,
    })
}

fn read_event(source: &str) -> Result<serde_json::Value, String> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| e.to_string())?;
        buf
    } else {
        std::fs::read_to_string(source).map_err(|e| e.to_string())?
    };

    serde_json::from_str(&raw).map_err(|e| e.to_string())
}

async fn serve(state: AppState) -> ExitCode {
    let ip = match state.settings.host.parse::<std::net::IpAddr>() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::error!("invalid HOST {}: {}", state.settings.host, e);
            return ExitCode::FAILURE;
        }
    };
    let addr = SocketAddr::from((ip, state.settings.port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("could not bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("listening on http://{}", addr);

    match axum::serve(listener, routes::app(state)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
