use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use goodfellows_match::config::{IdentityBackend, Settings, StoreBackend};
use goodfellows_match::core::Matchmaker;
use goodfellows_match::routes::{self, AppState};
use goodfellows_match::services::{
    AppwriteIdentityProvider, IdentityProvider, JwtIdentityProvider, MemoryProfileStore, PostgresProfileStore,
    ProfileStore,
};
use std::io;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn config_error(message: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, message.to_string())
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

async fn build_store(settings: &Settings) -> io::Result<Arc<dyn ProfileStore>> {
    match settings.store.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory profile store; data is lost on restart");
            Ok(Arc::new(MemoryProfileStore::new()))
        }
        StoreBackend::Postgres => {
            let database = settings
                .database
                .as_ref()
                .ok_or_else(|| config_error("missing [database] section"))?;

            let store = PostgresProfileStore::from_settings(
                &database.url,
                database.max_connections,
                database.min_connections,
                database.acquire_timeout_secs,
                database.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                config_error(format!("PostgreSQL connection error: {}", e))
            })?;

            info!(
                "PostgreSQL profile store initialized (max: {} connections)",
                database.max_connections.unwrap_or(10)
            );
            Ok(Arc::new(store))
        }
    }
}

fn build_identity(settings: &Settings) -> io::Result<Arc<dyn IdentityProvider>> {
    let identity = &settings.identity;
    match identity.provider {
        IdentityBackend::Jwt => {
            let secret = identity
                .jwt_secret
                .as_deref()
                .ok_or_else(|| config_error("identity.jwt_secret is required"))?;
            Ok(Arc::new(JwtIdentityProvider::new(secret, identity.admin_emails.clone())))
        }
        IdentityBackend::Appwrite => {
            let appwrite = identity
                .appwrite
                .as_ref()
                .ok_or_else(|| config_error("missing [identity.appwrite] section"))?;
            let provider = AppwriteIdentityProvider::new(
                appwrite.endpoint.clone(),
                appwrite.project_id.clone(),
                identity.admin_emails.clone(),
            )
            .map_err(config_error)?;
            Ok(Arc::new(provider))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| config_error(format!("Configuration error: {}", e)))?;

    init_logging(&settings.logging.level, &settings.logging.format);
    info!("Starting Goodfellows matching service...");

    let store = build_store(&settings).await?;
    let identity = build_identity(&settings)?;
    info!("Identity provider: {:?}", settings.identity.provider);

    let matchmaker = Matchmaker::new(store, settings.service_area.zip_codes.clone());
    info!("Service area: {:?}", settings.service_area.zip_codes);

    let app_state = AppState { matchmaker, identity };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(routes::handle_path_error))
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
