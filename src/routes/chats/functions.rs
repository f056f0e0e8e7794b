use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait, sea_query::Expr,
};

use crate::{
    database::models::{chat, chat_message, user},
    errors::AppError,
};

/// Which side of a conversation the current user is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRole {
    Sender,
    Receiver,
}

pub fn role_of(chat: &chat::Model, user_id: i32) -> Option<ChatRole> {
    if chat.sender == user_id {
        Some(ChatRole::Sender)
    } else if chat.receiver == user_id {
        Some(ChatRole::Receiver)
    } else {
        None
    }
}

/// Read flags `(sender_read, receiver_read)` after `role` acted on the
/// conversation: the actor has seen everything, the other side has not.
pub fn read_flags_after_activity(role: ChatRole) -> (bool, bool) {
    match role {
        ChatRole::Sender => (true, false),
        ChatRole::Receiver => (false, true),
    }
}

/// The entry appended when `role` writes `text` into `chat`.
pub fn new_entry(
    chat: &chat::Model,
    role: ChatRole,
    text: &str,
    now: DateTime<Utc>,
) -> chat_message::ActiveModel {
    let (sender_read, receiver_read) = read_flags_after_activity(role);
    let (sender_message, receiver_message) = match role {
        ChatRole::Sender => (Some(text.to_string()), None),
        ChatRole::Receiver => (None, Some(text.to_string())),
    };

    chat_message::ActiveModel {
        chat_id: Set(chat.id),
        sender_name: Set(chat.sender),
        receiver_name: Set(chat.receiver),
        sender_read: Set(sender_read),
        receiver_read: Set(receiver_read),
        sender_message: Set(sender_message),
        receiver_message: Set(receiver_message),
        date: Set(now),
        ..Default::default()
    }
}

async fn find_pair(
    db: &DatabaseConnection,
    sender: i32,
    receiver: i32,
) -> Result<Option<chat::Model>, DbErr> {
    chat::Entity::find()
        .filter(chat::Column::Sender.eq(sender))
        .filter(chat::Column::Receiver.eq(receiver))
        .one(db)
        .await
}

/// Opens the conversation between `me` and `other`, reusing an existing one
/// in either direction.
pub async fn start_chat(
    db: &DatabaseConnection,
    me: i32,
    other: i32,
) -> Result<chat::Model, AppError> {
    let now = Utc::now();

    // `other` wrote first: I am the receiver.
    if let Some(existing) = find_pair(db, other, me).await? {
        return touch(db, existing, ChatRole::Receiver, now).await;
    }

    if let Some(existing) = find_pair(db, me, other).await? {
        return touch(db, existing, ChatRole::Sender, now).await;
    }

    let (sender_read, receiver_read) = read_flags_after_activity(ChatRole::Sender);
    let created = chat::ActiveModel {
        sender: Set(me),
        receiver: Set(other),
        sender_read: Set(sender_read),
        receiver_read: Set(receiver_read),
        date: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    log::info!("Opened chat {} between {} and {}", created.id, me, other);
    Ok(created)
}

async fn touch(
    db: &DatabaseConnection,
    existing: chat::Model,
    role: ChatRole,
    now: DateTime<Utc>,
) -> Result<chat::Model, AppError> {
    let (sender_read, receiver_read) = read_flags_after_activity(role);
    let mut active: chat::ActiveModel = existing.into();
    active.sender_read = Set(sender_read);
    active.receiver_read = Set(receiver_read);
    active.date = Set(now);
    Ok(active.update(db).await?)
}

/// Marks the conversation as seen by `role` without touching the other side.
pub async fn mark_seen(
    db: &DatabaseConnection,
    chat: chat::Model,
    role: ChatRole,
) -> Result<chat::Model, AppError> {
    let already_seen = match role {
        ChatRole::Sender => chat.sender_read,
        ChatRole::Receiver => chat.receiver_read,
    };
    if already_seen {
        return Ok(chat);
    }

    let mut active: chat::ActiveModel = chat.into();
    match role {
        ChatRole::Sender => active.sender_read = Set(true),
        ChatRole::Receiver => active.receiver_read = Set(true),
    }
    Ok(active.update(db).await?)
}

/// Outcome of a paid message attempt.
#[derive(Debug)]
pub enum SendOutcome {
    Sent(chat::Model),
    InsufficientFunds,
}

/// Appends a message and charges one credit from the author's wallet in the
/// same transaction. Nothing is stored when the wallet is empty.
pub async fn send_message(
    db: &DatabaseConnection,
    chat: chat::Model,
    author: i32,
    text: &str,
) -> Result<SendOutcome, AppError> {
    let role = role_of(&chat, author)
        .ok_or_else(|| AppError::NotFound("Chat not found".to_string()))?;
    let now = Utc::now();

    let txn = db.begin().await?;

    let debited = user::Entity::update_many()
        .col_expr(user::Column::Wallet, Expr::col(user::Column::Wallet).sub(1))
        .filter(user::Column::Id.eq(author))
        .filter(user::Column::Wallet.gte(1))
        .exec(&txn)
        .await?;
    if debited.rows_affected == 0 {
        txn.rollback().await?;
        log::info!("User {} has no credits left for chat {}", author, chat.id);
        return Ok(SendOutcome::InsufficientFunds);
    }

    new_entry(&chat, role, text, now).insert(&txn).await?;

    let (sender_read, receiver_read) = read_flags_after_activity(role);
    let mut active: chat::ActiveModel = chat.into();
    active.sender_read = Set(sender_read);
    active.receiver_read = Set(receiver_read);
    active.date = Set(now);
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(SendOutcome::Sent(updated))
}

pub async fn delete_chat(db: &DatabaseConnection, chat_id: i32) -> Result<(), AppError> {
    let txn = db.begin().await?;
    chat_message::Entity::delete_many()
        .filter(chat_message::Column::ChatId.eq(chat_id))
        .exec(&txn)
        .await?;
    chat::Entity::delete_by_id(chat_id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}
