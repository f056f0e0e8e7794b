use std::collections::HashSet;

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    app_state::AppState,
    database::models::{chat, chat_message, user},
    errors::AppError,
    routes::{
        context::resolve_session_user,
        moment::TimeFormatter,
        payments::functions::render_payment_page,
        views::{Layout, UserCard, card_for, load_users, redirect, render},
    },
};

use super::functions::{
    ChatRole, SendOutcome, delete_chat as remove_chat, mark_seen, role_of, send_message,
    start_chat as open_chat,
};
use super::structures::{ChatEntryView, ChatForm, ChatRoomTemplate, ChatSummaryView, ChatsTemplate};

/// Loads a chat the user takes part in; anything else is reported as missing.
async fn find_participant_chat(
    app_state: &AppState,
    chat_id: i32,
    user_id: i32,
) -> Result<(chat::Model, ChatRole), AppError> {
    let found = chat::Entity::find_by_id(chat_id)
        .one(&app_state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Chat not found".to_string()))?;
    let role = role_of(&found, user_id)
        .ok_or_else(|| AppError::NotFound("Chat not found".to_string()))?;
    Ok((found, role))
}

async fn render_room(
    app_state: &AppState,
    found: &chat::Model,
    me: &user::Model,
) -> Result<HttpResponse, AppError> {
    let messages = chat_message::Entity::find()
        .filter(chat_message::Column::ChatId.eq(found.id))
        .order_by_asc(chat_message::Column::Date)
        .order_by_asc(chat_message::Column::Id)
        .all(&app_state.db)
        .await?;

    let time = TimeFormatter::new(app_state.timezone);
    let other_id = found.counterpart(me.id);
    let users = load_users(&app_state.db, &HashSet::from([found.sender, found.receiver])).await?;

    let entries = messages
        .iter()
        .map(|m| {
            let author = m.author();
            ChatEntryView {
                author: card_for(&users, author, &time),
                mine: author == me.id,
                text: m.text().to_string(),
                when: time.relative(m.date),
            }
        })
        .collect();

    render(&ChatRoomTemplate {
        layout: Layout::member("Chat"),
        chat_id: found.id,
        me: UserCard::build(me, &time),
        other: card_for(&users, other_id, &time),
        messages: entries,
    })
}

#[get("/startChat/{id}")]
pub async fn start_chat(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let other = path.into_inner();

    if other == session.id() {
        return Err(AppError::InvalidInput(
            "You cannot start a chat with yourself".to_string(),
        ));
    }
    user::Entity::find_by_id(other)
        .one(&app_state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let opened = open_chat(&app_state.db, session.id(), other).await?;
    Ok(redirect(&format!("/chat/{}", opened.id)))
}

#[get("/chat/{id}")]
pub async fn chat_room(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let (found, role) = find_participant_chat(&app_state, path.into_inner(), session.id()).await?;

    let found = mark_seen(&app_state.db, found, role).await?;
    render_room(&app_state, &found, &session.user).await
}

#[post("/chat/{id}")]
pub async fn post_chat(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<i32>,
    form: web::Form<ChatForm>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let (found, _) = find_participant_chat(&app_state, path.into_inner(), session.id()).await?;

    if session.user.wallet < 1 {
        return render_payment_page(&app_state, session.user.wallet, Vec::new());
    }

    let text = form.chat.trim();
    if text.is_empty() {
        return Ok(redirect(&format!("/chat/{}", found.id)));
    }

    match send_message(&app_state.db, found, session.id(), text).await? {
        SendOutcome::Sent(updated) => {
            let me = user::Entity::find_by_id(session.id())
                .one(&app_state.db)
                .await?
                .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;
            render_room(&app_state, &updated, &me).await
        }
        SendOutcome::InsufficientFunds => render_payment_page(&app_state, 0, Vec::new()),
    }
}

#[get("/chats")]
pub async fn chats(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let me = session.id();

    let received = chat::Entity::find()
        .filter(chat::Column::Receiver.eq(me))
        .order_by_desc(chat::Column::Date)
        .all(&app_state.db)
        .await?;
    let sent = chat::Entity::find()
        .filter(chat::Column::Sender.eq(me))
        .order_by_desc(chat::Column::Date)
        .all(&app_state.db)
        .await?;

    let chat_ids: Vec<i32> = received.iter().chain(sent.iter()).map(|c| c.id).collect();
    let messages = if chat_ids.is_empty() {
        Vec::new()
    } else {
        chat_message::Entity::find()
            .filter(chat_message::Column::ChatId.is_in(chat_ids))
            .order_by_asc(chat_message::Column::Date)
            .order_by_asc(chat_message::Column::Id)
            .all(&app_state.db)
            .await?
    };

    let user_ids: HashSet<i32> = received
        .iter()
        .chain(sent.iter())
        .map(|c| c.counterpart(me))
        .collect();
    let users = load_users(&app_state.db, &user_ids).await?;
    let time = TimeFormatter::new(app_state.timezone);

    let summarize = |c: &chat::Model| {
        let last = messages.iter().rev().find(|m| m.chat_id == c.id);
        ChatSummaryView {
            id: c.id,
            other: card_for(&users, c.counterpart(me), &time),
            unread: c.unread_for(me),
            last_message: last.map(|m| m.text().to_string()).unwrap_or_default(),
            when: time.relative(c.date),
        }
    };

    render(&ChatsTemplate {
        layout: Layout::member("Chats"),
        received: received.iter().map(summarize).collect(),
        sent: sent.iter().map(summarize).collect(),
    })
}

#[get("/deleteChat/{id}")]
pub async fn delete_chat(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let (found, _) = find_participant_chat(&app_state, path.into_inner(), session.id()).await?;

    remove_chat(&app_state.db, found.id).await?;
    log::info!("User {} deleted chat {}", session.id(), found.id);
    Ok(redirect("/chats"))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(start_chat)
        .service(chat_room)
        .service(post_chat)
        .service(chats)
        .service(delete_chat);
}
