use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};

use crate::{
    database::models::{chat, chat_message, post, post_comment, post_like, session, smile, user},
    errors::AppError,
    routes::validation::{MAX_NAME_LEN, ensure_max_len, validate_email},
    services::{facebook_api::FacebookProfile, passwords::MIN_PASSWORD_LEN},
};

use super::structures::SignupForm;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Form-level signup checks; an empty list means the form is acceptable.
pub fn validate_signup(form: &SignupForm) -> Vec<String> {
    let mut errors = Vec::new();
    if form.password != form.password2 {
        errors.push("Password does not match".to_string());
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("Password must be at least 5 characters".to_string());
    }
    let fullname = form.username.trim();
    if fullname.is_empty() || !ensure_max_len(fullname, MAX_NAME_LEN) {
        errors.push("Please enter your full name".to_string());
    }
    if !validate_email(&normalize_email(&form.email)) {
        errors.push("Please enter a valid email address".to_string());
    }
    errors
}

pub async fn find_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<user::Model>, AppError> {
    Ok(user::Entity::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?)
}

/// Links a Facebook identity to an account: by facebook id, then by email,
/// otherwise a new account is created.
pub async fn find_or_create_facebook_user(
    db: &DatabaseConnection,
    profile: &FacebookProfile,
) -> Result<user::Model, AppError> {
    if let Some(existing) = user::Entity::find()
        .filter(user::Column::Facebook.eq(profile.id.clone()))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    if let Some(email) = profile.email.as_deref().filter(|e| !e.trim().is_empty()) {
        if let Some(existing) = find_by_email(db, email).await? {
            log::info!("Linking Facebook account to user {}", existing.id);
            let image_missing = existing.image.is_none();
            let mut active: user::ActiveModel = existing.into();
            active.facebook = Set(Some(profile.id.clone()));
            if image_missing {
                active.image = Set(Some(profile.picture_url()));
            }
            return Ok(active.update(db).await?);
        }
    }

    let created = user::ActiveModel {
        fullname: Set(profile.name.clone()),
        email: Set(normalize_email(&profile.email_or_placeholder())),
        password: Set(None),
        facebook: Set(Some(profile.id.clone())),
        gender: Set(None),
        about: Set(None),
        image: Set(Some(profile.picture_url())),
        wallet: Set(0),
        online: Set(false),
        date: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!("Created user {} from Facebook login", created.id);
    Ok(created)
}

/// Removes an account together with everything that references it.
pub async fn delete_account(db: &DatabaseConnection, user_id: i32) -> Result<(), AppError> {
    let txn = db.begin().await?;
    delete_account_rows(&txn, user_id).await?;
    txn.commit().await?;
    log::info!("Deleted account {}", user_id);
    Ok(())
}

async fn delete_account_rows<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<(), AppError> {
    session::Entity::delete_many()
        .filter(session::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;

    smile::Entity::delete_many()
        .filter(
            Condition::any()
                .add(smile::Column::Sender.eq(user_id))
                .add(smile::Column::Receiver.eq(user_id)),
        )
        .exec(conn)
        .await?;

    let chat_ids: Vec<i32> = chat::Entity::find()
        .filter(
            Condition::any()
                .add(chat::Column::Sender.eq(user_id))
                .add(chat::Column::Receiver.eq(user_id)),
        )
        .all(conn)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    if !chat_ids.is_empty() {
        chat_message::Entity::delete_many()
            .filter(chat_message::Column::ChatId.is_in(chat_ids.clone()))
            .exec(conn)
            .await?;
        chat::Entity::delete_many()
            .filter(chat::Column::Id.is_in(chat_ids))
            .exec(conn)
            .await?;
    }

    let post_ids: Vec<i32> = post::Entity::find()
        .filter(post::Column::PostUser.eq(user_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    post_like::Entity::delete_many()
        .filter(
            Condition::any()
                .add(post_like::Column::LikeUser.eq(user_id))
                .add(post_like::Column::PostId.is_in(post_ids.clone())),
        )
        .exec(conn)
        .await?;
    post_comment::Entity::delete_many()
        .filter(
            Condition::any()
                .add(post_comment::Column::CommentUser.eq(user_id))
                .add(post_comment::Column::PostId.is_in(post_ids.clone())),
        )
        .exec(conn)
        .await?;
    if !post_ids.is_empty() {
        post::Entity::delete_many()
            .filter(post::Column::Id.is_in(post_ids))
            .exec(conn)
            .await?;
    }

    user::Entity::delete_by_id(user_id).exec(conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(password: &str, password2: &str) -> SignupForm {
        SignupForm {
            username: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            password: password.to_string(),
            password2: password2.to_string(),
        }
    }

    #[test]
    fn accepts_matching_long_passwords() {
        assert!(validate_signup(&form("secret", "secret")).is_empty());
    }

    #[test]
    fn reports_mismatch_and_length_together() {
        let errors = validate_signup(&form("abc", "abd"));
        assert_eq!(
            errors,
            vec![
                "Password does not match".to_string(),
                "Password must be at least 5 characters".to_string(),
            ]
        );
    }

    #[test]
    fn rejects_bad_email() {
        let mut f = form("secret", "secret");
        f.email = "not-an-email".to_string();
        assert_eq!(validate_signup(&f), vec!["Please enter a valid email address".to_string()]);
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
    }
}
