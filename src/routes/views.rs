//! View models shared by several pages.

use std::collections::{HashMap, HashSet};

use actix_web::{HttpResponse, http::StatusCode};
use askama::Template;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::{
    database::models::{post, post_comment, post_like, user},
    errors::AppError,
};

use super::moment::TimeFormatter;

pub const DEFAULT_AVATAR: &str = "/img/avatar.svg";

/// Data every page's base layout needs.
#[derive(Debug, Clone)]
pub struct Layout {
    pub title: String,
    pub signed_in: bool,
}

impl Layout {
    pub fn guest(title: &str) -> Self {
        Self {
            title: title.to_string(),
            signed_in: false,
        }
    }

    pub fn member(title: &str) -> Self {
        Self {
            title: title.to_string(),
            signed_in: true,
        }
    }
}

pub fn render<T: Template>(template: &T) -> Result<HttpResponse, AppError> {
    render_with_status(StatusCode::OK, template)
}

pub fn render_with_status<T: Template>(
    status: StatusCode,
    template: &T,
) -> Result<HttpResponse, AppError> {
    let body = template.render()?;
    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body))
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((actix_web::http::header::LOCATION, location))
        .finish()
}

#[derive(Debug, Clone)]
pub struct UserCard {
    pub id: i32,
    pub fullname: String,
    pub email: String,
    pub gender: String,
    pub about: String,
    pub image: String,
    pub wallet: i64,
    pub online: bool,
    pub joined: String,
}

impl UserCard {
    pub fn build(user: &user::Model, time: &TimeFormatter) -> Self {
        Self {
            id: user.id,
            fullname: user.fullname.clone(),
            email: user.email.clone(),
            gender: user.gender.clone().unwrap_or_default(),
            about: user.about.clone().unwrap_or_default(),
            image: user
                .image
                .clone()
                .filter(|image| !image.is_empty())
                .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            wallet: user.wallet,
            online: user.online,
            joined: time.relative(user.date),
        }
    }

    /// Stand-in for a referenced account that no longer exists.
    pub fn deleted(id: i32) -> Self {
        Self {
            id,
            fullname: "Deleted user".to_string(),
            email: String::new(),
            gender: String::new(),
            about: String::new(),
            image: DEFAULT_AVATAR.to_string(),
            wallet: 0,
            online: false,
            joined: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LikeView {
    pub user: UserCard,
    pub when: String,
}

#[derive(Debug, Clone)]
pub struct CommentView {
    pub user: UserCard,
    pub body: String,
    pub when: String,
}

#[derive(Debug, Clone)]
pub struct PostView {
    pub id: i32,
    pub author: UserCard,
    pub title: String,
    pub body: String,
    pub status: String,
    pub icon: String,
    pub image: String,
    pub has_image: bool,
    pub allow_comments: bool,
    pub when: String,
    pub date: String,
    pub likes: Vec<LikeView>,
    pub comments: Vec<CommentView>,
}

/// Loads users by id; the join step for records that reference accounts.
pub async fn load_users(
    db: &DatabaseConnection,
    user_ids: &HashSet<i32>,
) -> Result<HashMap<i32, user::Model>, AppError> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let models = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids.iter().copied().collect::<Vec<_>>()))
        .all(db)
        .await?;

    Ok(models.into_iter().map(|user| (user.id, user)).collect())
}

pub fn card_for(
    user_map: &HashMap<i32, user::Model>,
    id: i32,
    time: &TimeFormatter,
) -> UserCard {
    user_map
        .get(&id)
        .map(|user| UserCard::build(user, time))
        .unwrap_or_else(|| UserCard::deleted(id))
}

/// Builds post views with authors and, when `with_engagement` is set,
/// their likes and comments.
pub async fn build_post_views(
    db: &DatabaseConnection,
    posts: Vec<post::Model>,
    with_engagement: bool,
    time: &TimeFormatter,
) -> Result<Vec<PostView>, AppError> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
    let (likes, comments) = if with_engagement {
        let likes = post_like::Entity::find()
            .filter(post_like::Column::PostId.is_in(post_ids.clone()))
            .all(db)
            .await?;
        let comments = post_comment::Entity::find()
            .filter(post_comment::Column::PostId.is_in(post_ids))
            .all(db)
            .await?;
        (likes, comments)
    } else {
        (Vec::new(), Vec::new())
    };

    let mut user_ids: HashSet<i32> = posts.iter().map(|p| p.post_user).collect();
    user_ids.extend(likes.iter().map(|l| l.like_user));
    user_ids.extend(comments.iter().map(|c| c.comment_user));
    let user_map = load_users(db, &user_ids).await?;

    let mut likes_by_post: HashMap<i32, Vec<LikeView>> = HashMap::new();
    for like in likes {
        likes_by_post.entry(like.post_id).or_default().push(LikeView {
            user: card_for(&user_map, like.like_user, time),
            when: time.relative(like.date),
        });
    }

    let mut comments_by_post: HashMap<i32, Vec<(chrono::DateTime<chrono::Utc>, CommentView)>> =
        HashMap::new();
    for comment in comments {
        comments_by_post
            .entry(comment.post_id)
            .or_default()
            .push((
                comment.date,
                CommentView {
                    user: card_for(&user_map, comment.comment_user, time),
                    body: comment.comment_body,
                    when: time.relative(comment.date),
                },
            ));
    }

    Ok(posts
        .into_iter()
        .map(|p| {
            let mut comments = comments_by_post.remove(&p.id).unwrap_or_default();
            comments.sort_by(|a, b| a.0.cmp(&b.0));
            let image = p.image.clone().unwrap_or_default();
            PostView {
                id: p.id,
                author: card_for(&user_map, p.post_user, time),
                title: p.title,
                body: p.body,
                status: p.status,
                icon: p.icon,
                has_image: !image.is_empty(),
                image,
                allow_comments: p.allow_comments,
                when: time.relative(p.date),
                date: time.absolute(p.date),
                likes: likes_by_post.remove(&p.id).unwrap_or_default(),
                comments: comments.into_iter().map(|(_, view)| view).collect(),
            }
        })
        .collect())
}
