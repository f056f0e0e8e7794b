use std::collections::HashSet;

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::{
    app_state::AppState,
    database::models::{chat, post, smile, user},
    errors::AppError,
    routes::{
        accounts::functions::{find_by_email, normalize_email},
        context::resolve_session_user,
        moment::TimeFormatter,
        posts::functions::PostStatus,
        validation::{MAX_NAME_LEN, MAX_TEXT_LEN, ensure_max_len, non_blank, validate_email},
        views::{Layout, UserCard, build_post_views, card_for, load_users, redirect, render},
    },
};

use super::structures::{
    ProfileTemplate, SinglesTemplate, SmileNotice, UpdateProfileForm, UserProfileTemplate,
};

#[get("/profile")]
pub async fn profile(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let me = session.id();

    let mut active: user::ActiveModel = session.user.into();
    active.online = Set(true);
    let account = active.update(&app_state.db).await?;

    let newest_smile = smile::Entity::find()
        .filter(smile::Column::Receiver.eq(me))
        .filter(smile::Column::ReceiverReceived.eq(false))
        .order_by_desc(smile::Column::Date)
        .one(&app_state.db)
        .await?;

    let has_unread = chat::Entity::find()
        .filter(
            Condition::any()
                .add(
                    Condition::all()
                        .add(chat::Column::Receiver.eq(me))
                        .add(chat::Column::ReceiverRead.eq(false)),
                )
                .add(
                    Condition::all()
                        .add(chat::Column::Sender.eq(me))
                        .add(chat::Column::SenderRead.eq(false)),
                ),
        )
        .one(&app_state.db)
        .await?
        .is_some();

    let posts = post::Entity::find()
        .filter(post::Column::PostUser.eq(me))
        .order_by_desc(post::Column::Date)
        .all(&app_state.db)
        .await?;

    let time = TimeFormatter::new(app_state.timezone);
    let new_smile = match newest_smile {
        Some(found) => {
            let users = load_users(&app_state.db, &HashSet::from([found.sender])).await?;
            Some(SmileNotice {
                id: found.id,
                sender: card_for(&users, found.sender, &time),
            })
        }
        None => None,
    };

    render(&ProfileTemplate {
        layout: Layout::member("Profile"),
        me: UserCard::build(&account, &time),
        new_smile,
        has_unread,
        posts: build_post_views(&app_state.db, posts, true, &time).await?,
    })
}

#[post("/updateProfile")]
pub async fn update_profile(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    form: web::Form<UpdateProfileForm>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let form = form.into_inner();

    let fullname = form.fullname.trim().to_string();
    if fullname.is_empty() || !ensure_max_len(&fullname, MAX_NAME_LEN) {
        return Err(AppError::InvalidInput("Full name is required".to_string()));
    }

    let email = normalize_email(&form.email);
    if !validate_email(&email) {
        return Err(AppError::InvalidInput("Invalid email address".to_string()));
    }
    if let Some(other) = find_by_email(&app_state.db, &email).await? {
        if other.id != session.id() {
            return Err(AppError::InvalidInput("Email already exist".to_string()));
        }
    }

    let about = non_blank(form.about.as_deref());
    if let Some(text) = &about {
        if !ensure_max_len(text, MAX_TEXT_LEN) {
            return Err(AppError::InvalidInput("About text is too long".to_string()));
        }
    }

    let mut active: user::ActiveModel = session.user.into();
    active.fullname = Set(fullname);
    active.email = Set(email);
    active.gender = Set(non_blank(form.gender.as_deref()));
    active.about = Set(about);
    active.update(&app_state.db).await?;

    Ok(redirect("/profile"))
}

#[get("/singles")]
pub async fn singles(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;

    let users = user::Entity::find()
        .order_by_desc(user::Column::Date)
        .all(&app_state.db)
        .await?;

    let time = TimeFormatter::new(app_state.timezone);
    render(&SinglesTemplate {
        layout: Layout::member("Singles"),
        me_id: session.id(),
        singles: users.iter().map(|u| UserCard::build(u, &time)).collect(),
    })
}

#[get("/userProfile/{id}")]
pub async fn user_profile(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let user_id = path.into_inner();

    let one_user = user::Entity::find_by_id(user_id)
        .one(&app_state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let smiled = smile::Entity::find()
        .filter(smile::Column::Sender.eq(session.id()))
        .filter(smile::Column::Receiver.eq(user_id))
        .one(&app_state.db)
        .await?
        .is_some();

    let public_posts = post::Entity::find()
        .filter(post::Column::Status.eq(PostStatus::Public.as_str()))
        .filter(post::Column::PostUser.eq(user_id))
        .order_by_desc(post::Column::Date)
        .all(&app_state.db)
        .await?;

    let time = TimeFormatter::new(app_state.timezone);
    render(&UserProfileTemplate {
        layout: Layout::member("Profile"),
        one_user: UserCard::build(&one_user, &time),
        is_self: one_user.id == session.id(),
        smiled,
        public_posts: build_post_views(&app_state.db, public_posts, true, &time).await?,
    })
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(profile)
        .service(update_profile)
        .service(singles)
        .service(user_profile);
}
