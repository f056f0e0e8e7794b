use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    database::models::{session, user},
    errors::AppError,
};

/// Only the digest of a session token is persisted.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Opens a session for `user_id` and returns the raw cookie token.
pub async fn create_session(
    db: &DatabaseConnection,
    user_id: i32,
    ttl: Duration,
) -> Result<String, AppError> {
    let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    let now = Utc::now();

    session::ActiveModel {
        token_hash: Set(hash_token(&token)),
        user_id: Set(user_id),
        created_at: Set(now),
        last_used_at: Set(None),
        expires_at: Set(now + ttl),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::debug!("Opened session for user {}", user_id);
    Ok(token)
}

/// Resolves a cookie token to its user; expired sessions are removed.
pub async fn find_session_user(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<user::Model>, AppError> {
    let found = session::Entity::find()
        .filter(session::Column::TokenHash.eq(hash_token(token)))
        .find_also_related(user::Entity)
        .one(db)
        .await?;

    let Some((session_model, user_model)) = found else {
        return Ok(None);
    };

    if session_model.expires_at <= Utc::now() {
        log::debug!("Session {} expired", session_model.id);
        session::Entity::delete_by_id(session_model.id).exec(db).await?;
        return Ok(None);
    }

    let mut active: session::ActiveModel = session_model.into();
    active.last_used_at = Set(Some(Utc::now()));
    active.update(db).await?;

    Ok(user_model)
}

pub async fn destroy_session(db: &DatabaseConnection, token: &str) -> Result<(), AppError> {
    session::Entity::delete_many()
        .filter(session::Column::TokenHash.eq(hash_token(token)))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn destroy_user_sessions(db: &DatabaseConnection, user_id: i32) -> Result<(), AppError> {
    session::Entity::delete_many()
        .filter(session::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}
