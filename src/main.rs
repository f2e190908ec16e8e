use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Compress, web};
use tracing::info;

use linkpulse::api;
use linkpulse::config::get_config;
use linkpulse::services::geoip::GeoIpProvider;
use linkpulse::storage::SeaOrmStorage;
use linkpulse::system::logging::init_logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = get_config();

    // Guard must stay alive so buffered log writes are flushed on shutdown
    let _log_guard = init_logging(config);

    let storage = SeaOrmStorage::new(&config.database.url, config.database.pool_size)
        .await
        .map_err(|e| std::io::Error::other(format!("Storage initialization failed: {}", e)))?;
    let storage = web::Data::new(storage);

    let geoip = web::Data::new(GeoIpProvider::new(&config.analytics));
    info!("GeoIP provider: {}", geoip.provider_name());

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting linkpulse at http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(storage.clone())
            .app_data(geoip.clone())
            .wrap(build_cors())
            .wrap(Compress::default())
            .configure(api::configure_api)
            .configure(api::configure_redirect)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn build_cors() -> Cors {
    let origins = &get_config().api.cors_allowed_origins;

    let cors = Cors::default()
        .allowed_methods(vec!["GET", "HEAD", "POST", "PUT", "OPTIONS"])
        .allowed_headers(vec!["Content-Type", "Authorization", "Accept"])
        .max_age(3600);

    if origins.is_empty() {
        cors.allow_any_origin()
    } else {
        origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}
