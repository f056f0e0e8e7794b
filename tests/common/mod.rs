//! Shared fixtures: an in-memory database behind the full route table.

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{
    App, HttpRequest, HttpResponse, HttpServer, body::MessageBody, cookie::Cookie,
    dev::ServiceResponse, web,
};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;

use heartline::{
    app_state::AppState,
    config::{Config, DatabaseSettings},
    database::{connect_with_settings, create_schema, models::user},
    routes::context::SESSION_COOKIE,
    services::{object_storage::ObjectStorageService, passwords::hash_password, sessions},
};

pub const PASSWORD: &str = "secret1";

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        public_url: None,
        timezone: Some("UTC".to_string()),
        max_body_bytes: None,
        session_ttl_hours: None,
        static_dir: None,
        s3_bucket: "heartline-test".to_string(),
        s3_region: "us-east-1".to_string(),
        s3_endpoint: Some("http://127.0.0.1:9".to_string()),
        s3_access_key_id: "AKID".to_string(),
        s3_secret_access_key: "secret".to_string(),
        stripe_secret_key: "sk_test".to_string(),
        stripe_publishable_key: "pk_test_123".to_string(),
        stripe_api_base: Some("http://127.0.0.1:9".to_string()),
        facebook_app_id: "app".to_string(),
        facebook_app_secret: "secret".to_string(),
        facebook_callback_url: "http://localhost:3000/auth/facebook/callback".to_string(),
        facebook_graph_base: Some("http://127.0.0.1:9".to_string()),
    }
}

pub async fn setup() -> web::Data<AppState> {
    setup_with(test_config()).await
}

/// A single pooled connection keeps the in-memory database alive and shared.
/// Uploads land in an in-memory object store.
pub async fn setup_with(config: Config) -> web::Data<AppState> {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
        min_connections: Some(1),
        connect_timeout_secs: Some(5),
        acquire_timeout_secs: Some(5),
        idle_timeout_secs: Some(3600),
        sql_log: Some(false),
    };
    let db = connect_with_settings(&settings).await.unwrap();
    create_schema(&db).await.unwrap();
    let mut state = AppState::new(db, config.clone()).unwrap();
    state.storage = ObjectStorageService::in_memory(&config);
    web::Data::new(state)
}

/// Serves canned JSON bodies by request path on a local port and returns
/// its base URL. Unknown paths get 404.
pub fn stub_api(responses: Vec<(&'static str, Value)>) -> String {
    let responses = Arc::new(responses);
    let server = HttpServer::new(move || {
        let responses = responses.clone();
        App::new().default_service(web::to(move |req: HttpRequest| {
            let responses = responses.clone();
            async move {
                match responses.iter().find(|(path, _)| *path == req.path()) {
                    Some((_, body)) => HttpResponse::Ok().json(body),
                    None => HttpResponse::NotFound().finish(),
                }
            }
        }))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", addr)
}

macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .configure(heartline::routes::init_routes),
        )
        .await
    };
}

pub async fn seed_user(state: &web::Data<AppState>, name: &str, email: &str, wallet: i64) -> user::Model {
    user::ActiveModel {
        fullname: Set(name.to_string()),
        email: Set(email.to_string()),
        password: Set(None),
        facebook: Set(None),
        gender: Set(None),
        about: Set(None),
        image: Set(None),
        wallet: Set(wallet),
        online: Set(false),
        date: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .unwrap()
}

pub async fn seed_user_with_password(state: &web::Data<AppState>, name: &str, email: &str) -> user::Model {
    let created = seed_user(state, name, email, 0).await;
    let mut active: user::ActiveModel = created.into();
    active.password = Set(Some(hash_password(PASSWORD).unwrap()));
    active.update(&state.db).await.unwrap()
}

pub async fn login_cookie(state: &web::Data<AppState>, user_id: i32) -> Cookie<'static> {
    let token = sessions::create_session(&state.db, user_id, Duration::hours(1))
        .await
        .unwrap();
    Cookie::new(SESSION_COOKIE, token)
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn body_text<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    let bytes = actix_web::test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}
