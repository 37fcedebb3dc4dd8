//! Florence
//!
//! Main entry point for the Florence hospital administration server.

use actix_cors::Cors;
use actix_files as fs;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use florence::auth::AuthService;
use florence::store::Store;
use florence::{api, config, db};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = config::load_config()?;

    // Connect to the database and create any missing tables
    let database = db::Database::connect(&config.database.url).await?;

    let store = web::Data::new(Store::new(&database));
    let auth = web::Data::new(AuthService::new(
        database.pool().clone(),
        config.auth.jwt_secret.clone(),
        config.auth.token_ttl_minutes,
    ));

    let bind = (config.server.host.clone(), config.server.port);
    tracing::info!(host = %bind.0, port = bind.1, "starting server");

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            // Add app state
            .app_data(store.clone())
            .app_data(auth.clone())
            // Request logging
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            // API routes
            .configure(api::configure)
            // Serve the built web frontend
            .service(fs::Files::new("/", "./web").index_file("index.html"))
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
