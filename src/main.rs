use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use organ_match::config::{LoggingSettings, Settings};
use organ_match::core::Matcher;
use organ_match::routes::{self, AppState};
use organ_match::services::{StoreClient, StoreCollections};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.json().init(),
    }
}

fn startup_error(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(startup_error(format!("Configuration error: {}", e)));
        }
    };

    init_tracing(&settings.logging);

    info!("Starting OrganConnect matching service...");

    let defaults = settings.matching.configuration().map_err(|e| {
        error!("Invalid matching defaults: {}", e);
        startup_error(e.to_string())
    })?;

    let store = StoreClient::new(
        settings.store.endpoint,
        settings.store.api_key,
        settings.store.project_id,
        settings.store.database_id,
        StoreCollections {
            users: settings.collection.users,
            requests: settings.collection.requests,
        },
    )
    .map_err(|e| {
        error!("Failed to create document store client: {}", e);
        startup_error(e.to_string())
    })?;

    info!("Document store client initialized");

    let matcher = Matcher::new(defaults);

    info!("Matcher initialized with defaults: {:?}", defaults);

    let app_state = AppState::new(store, matcher);

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
