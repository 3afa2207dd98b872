use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;

use transcriptd::config::AppConfig;
use transcriptd::db::Store;
use transcriptd::services;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();
    let store = web::Data::new(Store::new(config.db_path.clone()));
    let app_config = web::Data::new(config.clone());

    info!(
        "transcriptd listening on {}:{} (db: {})",
        config.bind_addr,
        config.port,
        config.db_path.display()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(app_config.clone())
            .service(services::ping::configure_routes())
            .service(services::submissions::configure_routes())
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
