use std::collections::HashSet;

use actix_web::{HttpRequest, HttpResponse, get, web};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::{
    app_state::AppState,
    database::models::{smile, user},
    errors::AppError,
    routes::{
        context::resolve_session_user,
        moment::TimeFormatter,
        views::{Layout, card_for, load_users, redirect, render},
    },
};

use super::structures::ShowSmileTemplate;

#[get("/sendSmile/{id}")]
pub async fn send_smile(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let receiver = path.into_inner();

    if receiver == session.id() {
        return Err(AppError::InvalidInput("You cannot smile at yourself".to_string()));
    }
    user::Entity::find_by_id(receiver)
        .one(&app_state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let existing = smile::Entity::find()
        .filter(smile::Column::Sender.eq(session.id()))
        .filter(smile::Column::Receiver.eq(receiver))
        .one(&app_state.db)
        .await?;

    if existing.is_none() {
        smile::ActiveModel {
            sender: Set(session.id()),
            receiver: Set(receiver),
            sender_sent: Set(true),
            receiver_received: Set(false),
            date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&app_state.db)
        .await?;
        log::debug!("User {} smiled at {}", session.id(), receiver);
    }

    Ok(redirect(&format!("/userProfile/{}", receiver)))
}

#[get("/deleteSmile/{id}")]
pub async fn delete_smile(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let receiver = path.into_inner();

    smile::Entity::delete_many()
        .filter(smile::Column::Sender.eq(session.id()))
        .filter(smile::Column::Receiver.eq(receiver))
        .exec(&app_state.db)
        .await?;

    Ok(redirect(&format!("/userProfile/{}", receiver)))
}

#[get("/showSmile/{id}")]
pub async fn show_smile(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;

    let found = smile::Entity::find_by_id(path.into_inner())
        .one(&app_state.db)
        .await?
        .filter(|s| s.sender == session.id() || s.receiver == session.id())
        .ok_or_else(|| AppError::NotFound("Smile not found".to_string()))?;

    let found = if found.receiver == session.id() && !found.receiver_received {
        let mut active: smile::ActiveModel = found.into();
        active.receiver_received = Set(true);
        active.update(&app_state.db).await?
    } else {
        found
    };

    let users = load_users(&app_state.db, &HashSet::from([found.sender, found.receiver])).await?;
    let time = TimeFormatter::new(app_state.timezone);

    render(&ShowSmileTemplate {
        layout: Layout::member("Smile"),
        sender: card_for(&users, found.sender, &time),
        receiver: card_for(&users, found.receiver, &time),
        when: time.relative(found.date),
        received: found.receiver == session.id(),
    })
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(send_smile)
        .service(delete_smile)
        .service(show_smile);
}
