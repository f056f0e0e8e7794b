use actix_multipart::{Field, Multipart};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use futures_util::TryStreamExt;
use sea_orm::{ActiveModelTrait, Set};

use crate::{
    app_state::AppState,
    database::models::user,
    errors::AppError,
    routes::{
        context::resolve_session_user,
        views::{Layout, redirect, render},
    },
    services::object_storage::sanitize_key,
};

use super::structures::{AvatarForm, UploadImageTemplate, UploadResponse};

const IMAGE_TYPES: [&str; 5] = ["image/jpeg", "image/png", "image/gif", "image/webp", "image/bmp"];

fn is_image(content_type: &str) -> bool {
    IMAGE_TYPES.contains(&content_type)
}

/// Reads one multipart field; `received` counts bytes across the whole request.
async fn read_field(
    field: &mut Field,
    received: &mut usize,
    limit: usize,
) -> Result<Vec<u8>, AppError> {
    let mut body = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed upload: {}", e)))?
    {
        *received += chunk.len();
        if *received > limit {
            return Err(AppError::InvalidInput("Upload is too large".to_string()));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

#[get("/uploadImage")]
pub async fn upload_image(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    resolve_session_user(&req, &app_state).await?;
    render(&UploadImageTemplate {
        layout: Layout::member("Upload"),
    })
}

#[post("/uploadFile")]
pub async fn upload_file(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let limit = app_state.config.effective_max_body_bytes();
    let mut files = Vec::new();
    let mut received = 0usize;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed upload: {}", e)))?
    {
        let Some(file_name) = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string)
        else {
            read_field(&mut field, &mut received, limit).await?;
            continue;
        };

        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();
        if !is_image(&content_type) {
            return Err(AppError::InvalidInput(format!(
                "Only images can be uploaded, got '{}'",
                content_type
            )));
        }

        let body = read_field(&mut field, &mut received, limit).await?;
        files.push((sanitize_key(&file_name), content_type, body));
    }

    if files.is_empty() {
        return Err(AppError::InvalidInput("No file was uploaded".to_string()));
    }

    // Nothing is stored unless the whole request was acceptable.
    let mut stored = UploadResponse::default();
    for (key, content_type, body) in files {
        let url = app_state.storage.put_object(&key, &content_type, body).await?;
        log::info!("User {} uploaded {}", session.id(), key);
        stored.keys.push(key);
        stored.urls.push(url);
    }
    Ok(HttpResponse::Ok().json(stored))
}

#[post("/uploadAvatar")]
pub async fn upload_avatar(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    form: web::Form<AvatarForm>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;

    let name = form.upload.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Choose an image first".to_string()));
    }

    let mut active: user::ActiveModel = session.user.into();
    active.image = Set(Some(app_state.storage.public_url(&sanitize_key(name))));
    active.update(&app_state.db).await?;

    Ok(redirect("/profile"))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_image)
        .service(upload_file)
        .service(upload_avatar);
}
