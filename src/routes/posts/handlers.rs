use actix_web::{HttpRequest, HttpResponse, get, post, web};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::{
    app_state::AppState,
    database::models::{post, post_comment, post_like},
    errors::AppError,
    routes::{
        context::resolve_session_user,
        moment::TimeFormatter,
        validation::{MAX_TEXT_LEN, ensure_max_len},
        views::{Layout, build_post_views, redirect, render},
    },
};

use super::functions::{
    PostStatus, find_own_post, find_visible_post, status_options, validate_post,
};
use super::structures::{
    CommentForm, EditPostTemplate, FullPostTemplate, PostForm, PostFormTemplate, PostsTemplate,
};

#[get("/displayPostForm")]
pub async fn display_post_form(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    resolve_session_user(&req, &app_state).await?;
    render(&PostFormTemplate {
        layout: Layout::member("Post"),
        title: String::new(),
        body: String::new(),
        statuses: status_options(PostStatus::Public.as_str()),
        allow_comments: true,
    })
}

#[post("/createPost")]
pub async fn create_post(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    form: web::Form<PostForm>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let draft = validate_post(&form, &app_state.storage)?;

    let created = post::ActiveModel {
        post_user: Set(session.id()),
        title: Set(draft.title),
        body: Set(draft.body),
        status: Set(draft.status.as_str().to_string()),
        icon: Set(draft.status.icon().to_string()),
        image: Set(draft.image),
        allow_comments: Set(draft.allow_comments),
        date: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&app_state.db)
    .await?;
    log::info!("User {} created {} post {}", session.id(), created.status, created.id);

    Ok(redirect(draft.status.landing_page()))
}

#[get("/posts")]
pub async fn posts(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    resolve_session_user(&req, &app_state).await?;

    let public_posts = post::Entity::find()
        .filter(post::Column::Status.eq(PostStatus::Public.as_str()))
        .order_by_desc(post::Column::Date)
        .all(&app_state.db)
        .await?;

    let time = TimeFormatter::new(app_state.timezone);
    render(&PostsTemplate {
        layout: Layout::member("Posts"),
        posts: build_post_views(&app_state.db, public_posts, false, &time).await?,
    })
}

#[get("/deletePost/{id}")]
pub async fn delete_post(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let found = find_own_post(&app_state.db, path.into_inner(), session.id()).await?;

    let txn = app_state.db.begin().await?;
    post_like::Entity::delete_many()
        .filter(post_like::Column::PostId.eq(found.id))
        .exec(&txn)
        .await?;
    post_comment::Entity::delete_many()
        .filter(post_comment::Column::PostId.eq(found.id))
        .exec(&txn)
        .await?;
    post::Entity::delete_by_id(found.id).exec(&txn).await?;
    txn.commit().await?;

    Ok(redirect("/profile"))
}

#[get("/editPost/{id}")]
pub async fn edit_post_form(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let found = find_own_post(&app_state.db, path.into_inner(), session.id()).await?;

    render(&EditPostTemplate {
        layout: Layout::member("Edit post"),
        post_id: found.id,
        statuses: status_options(&found.status),
        allow_comments: found.allow_comments,
        image: found.image.unwrap_or_default(),
        title: found.title,
        body: found.body,
    })
}

#[post("/editPost/{id}")]
pub async fn edit_post(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<i32>,
    form: web::Form<PostForm>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let found = find_own_post(&app_state.db, path.into_inner(), session.id()).await?;
    let draft = validate_post(&form, &app_state.storage)?;

    let mut active: post::ActiveModel = found.into();
    active.title = Set(draft.title);
    active.body = Set(draft.body);
    active.status = Set(draft.status.as_str().to_string());
    active.icon = Set(draft.status.icon().to_string());
    active.allow_comments = Set(draft.allow_comments);
    active.date = Set(Utc::now());
    if let Some(image) = draft.image {
        active.image = Set(Some(image));
    }
    active.update(&app_state.db).await?;

    Ok(redirect("/profile"))
}

#[get("/likePost/{id}")]
pub async fn like_post(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let found = find_visible_post(&app_state.db, path.into_inner(), session.id()).await?;

    let already_liked = post_like::Entity::find()
        .filter(post_like::Column::PostId.eq(found.id))
        .filter(post_like::Column::LikeUser.eq(session.id()))
        .one(&app_state.db)
        .await?
        .is_some();

    if !already_liked {
        post_like::ActiveModel {
            post_id: Set(found.id),
            like_user: Set(session.id()),
            date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&app_state.db)
        .await?;
    }

    Ok(redirect(&format!("/fullpost/{}", found.id)))
}

#[get("/fullpost/{id}")]
pub async fn full_post(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let found = find_visible_post(&app_state.db, path.into_inner(), session.id()).await?;

    let time = TimeFormatter::new(app_state.timezone);
    let post = build_post_views(&app_state.db, vec![found], true, &time)
        .await?
        .pop()
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    render(&FullPostTemplate {
        layout: Layout::member("Post"),
        liked: post.likes.iter().any(|like| like.user.id == session.id()),
        can_comment: post.allow_comments,
        post,
    })
}

#[post("/leaveComment/{id}")]
pub async fn leave_comment(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<i32>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let found = find_visible_post(&app_state.db, path.into_inner(), session.id()).await?;

    if !found.allow_comments {
        return Err(AppError::Forbidden("Comments are closed for this post".to_string()));
    }

    let body = form.comment_body.trim();
    if body.is_empty() {
        return Ok(redirect(&format!("/fullpost/{}", found.id)));
    }
    if !ensure_max_len(body, MAX_TEXT_LEN) {
        return Err(AppError::InvalidInput("Comment is too long".to_string()));
    }

    post_comment::ActiveModel {
        post_id: Set(found.id),
        comment_user: Set(session.id()),
        comment_body: Set(body.to_string()),
        date: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&app_state.db)
    .await?;

    Ok(redirect(&format!("/fullpost/{}", found.id)))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(display_post_form)
        .service(create_post)
        .service(posts)
        .service(delete_post)
        .service(edit_post_form)
        .service(edit_post)
        .service(like_post)
        .service(full_post)
        .service(leave_comment);
}
