use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use poultry_backend::config::Settings;
use poultry_backend::inference::load_classifier;
use poultry_backend::storage::UploadStore;
use poultry_backend::{configure_routes, flash_framework, AppState};
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    }

    let settings = Settings::load().map_err(|e| {
        log::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;
    if settings.uses_default_secret() {
        log::warn!("SECRET_KEY is not set; flash cookies are signed with the default key");
    }

    UploadStore::new(&settings.upload_dir)
        .ensure_dir()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    log::info!("Storing uploads in {}", settings.upload_dir.display());

    let classifier = load_classifier(&settings.model_path).map_err(|e| {
        log::error!("Failed to load model at startup: {}", e);
        std::io::Error::other(format!("Model loading failed: {}", e))
    })?;

    let bind_address = settings.bind_address();
    let workers = settings.workers;
    let upload_dir = settings.upload_dir.clone();
    let flash = flash_framework(&settings.secret_key);
    let state = web::Data::new(AppState::new(settings, classifier));

    log::info!("Starting server on {}", bind_address);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(flash.clone())
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(|cfg| configure_routes(cfg, &upload_dir))
    });
    if let Some(workers) = workers {
        server = server.workers(workers);
    }
    server.bind(&bind_address)?.run().await
}
