use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;
use std::io;

use heartline::{
    app_state::AppState,
    config::Config,
    database::{self, create_schema},
    routes::{self, middleware::RequestId},
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| io::Error::other(format!("Failed to load configuration: {}", e)))?;

    let db = database::connect().await?;
    create_schema(&db)
        .await
        .map_err(|e| io::Error::other(format!("Failed to create schema: {}", e)))?;

    let host = config.host.clone();
    let port = config.port;
    let body_limit = config.effective_max_body_bytes();
    let static_dir = config.effective_static_dir().to_string();
    let app_state = AppState::new(db, config)
        .map_err(|e| io::Error::other(format!("Failed to initialize services: {}", e)))?;
    let app_state = web::Data::new(app_state);

    log::info!("Starting server at http://{}:{}", host, port);
    log::info!("Serving static files from {}", static_dir);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(RequestId)
            .wrap(middleware::NormalizePath::trim())
            .app_data(app_state.clone())
            .app_data(web::FormConfig::default().limit(body_limit))
            .app_data(web::PayloadConfig::new(body_limit))
            .configure(routes::init_routes)
            .service(Files::new("/", static_dir.clone()))
    })
    .workers(num_cpus::get())
    .bind((host, port))?
    .run()
    .await
}
