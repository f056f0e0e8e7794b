use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter};

use crate::{
    database::models::{chat, post},
    errors::AppError,
    routes::validation::{MAX_NAME_LEN, MAX_TEXT_LEN, checkbox, ensure_max_len, non_blank},
    services::object_storage::{ObjectStorageService, sanitize_key},
};

use super::structures::{PostForm, StatusOption};

/// Who may read a post.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostStatus {
    Public,
    Private,
    Friends,
}

impl PostStatus {
    pub const ALL: [PostStatus; 3] = [PostStatus::Public, PostStatus::Private, PostStatus::Friends];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            "friends" => Some(Self::Friends),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Friends => "friends",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Public => "fa fa-globe",
            Self::Private => "fa fa-key",
            Self::Friends => "fa fa-group",
        }
    }

    /// Where the author lands after saving a post with this status.
    pub fn landing_page(self) -> &'static str {
        match self {
            Self::Public => "/posts",
            Self::Private | Self::Friends => "/profile",
        }
    }
}

pub fn status_options(current: &str) -> Vec<StatusOption> {
    PostStatus::ALL
        .iter()
        .map(|status| StatusOption {
            value: status.as_str(),
            selected: status.as_str() == current,
        })
        .collect()
}

/// A validated create/edit submission.
#[derive(Debug, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    pub status: PostStatus,
    pub allow_comments: bool,
    pub image: Option<String>,
}

pub fn validate_post(
    form: &PostForm,
    storage: &ObjectStorageService,
) -> Result<PostDraft, AppError> {
    let status = PostStatus::parse(&form.status)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown post status: {}", form.status)))?;

    let title = form.title.trim().to_string();
    if title.is_empty() || !ensure_max_len(&title, MAX_NAME_LEN) {
        return Err(AppError::InvalidInput("Title is required".to_string()));
    }

    let body = form.body.trim().to_string();
    if !ensure_max_len(&body, MAX_TEXT_LEN) {
        return Err(AppError::InvalidInput("Post body is too long".to_string()));
    }

    Ok(PostDraft {
        title,
        body,
        status,
        allow_comments: checkbox(form.allow_comments.as_deref()),
        image: non_blank(form.image.as_deref())
            .map(|name| storage.public_url(&sanitize_key(&name))),
    })
}

/// True when the two users have a conversation in either direction.
pub async fn shares_chat(db: &DatabaseConnection, a: i32, b: i32) -> Result<bool, AppError> {
    let found = chat::Entity::find()
        .filter(
            Condition::any()
                .add(
                    Condition::all()
                        .add(chat::Column::Sender.eq(a))
                        .add(chat::Column::Receiver.eq(b)),
                )
                .add(
                    Condition::all()
                        .add(chat::Column::Sender.eq(b))
                        .add(chat::Column::Receiver.eq(a)),
                ),
        )
        .one(db)
        .await?;
    Ok(found.is_some())
}

pub async fn can_view(
    db: &DatabaseConnection,
    post: &post::Model,
    viewer: i32,
) -> Result<bool, AppError> {
    if post.post_user == viewer {
        return Ok(true);
    }
    match PostStatus::parse(&post.status) {
        Some(PostStatus::Public) => Ok(true),
        Some(PostStatus::Friends) => shares_chat(db, post.post_user, viewer).await,
        Some(PostStatus::Private) | None => Ok(false),
    }
}

/// Loads a post the viewer is allowed to read.
pub async fn find_visible_post(
    db: &DatabaseConnection,
    post_id: i32,
    viewer: i32,
) -> Result<post::Model, AppError> {
    let found = post::Entity::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    if !can_view(db, &found, viewer).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }
    Ok(found)
}

/// Loads a post owned by `author`.
pub async fn find_own_post(
    db: &DatabaseConnection,
    post_id: i32,
    author: i32,
) -> Result<post::Model, AppError> {
    let found = post::Entity::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    if found.post_user != author {
        return Err(AppError::Forbidden("Only the author can change this post".to_string()));
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn storage() -> ObjectStorageService {
        let mut config = Config::sample();
        config.s3_bucket = "heartline-media".to_string();
        ObjectStorageService::in_memory(&config)
    }

    fn form(status: &str) -> PostForm {
        PostForm {
            title: "  Hello  ".to_string(),
            body: "First post".to_string(),
            status: status.to_string(),
            allow_comments: Some("on".to_string()),
            image: None,
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in PostStatus::ALL {
            assert_eq!(PostStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PostStatus::parse(" Public "), Some(PostStatus::Public));
        assert_eq!(PostStatus::parse("secret"), None);
    }

    #[test]
    fn icons_and_landing_pages_follow_status() {
        assert_eq!(PostStatus::Public.icon(), "fa fa-globe");
        assert_eq!(PostStatus::Private.icon(), "fa fa-key");
        assert_eq!(PostStatus::Friends.icon(), "fa fa-group");
        assert_eq!(PostStatus::Public.landing_page(), "/posts");
        assert_eq!(PostStatus::Friends.landing_page(), "/profile");
    }

    #[test]
    fn draft_is_trimmed_and_checkbox_read() {
        let draft = validate_post(&form("friends"), &storage()).unwrap();
        assert_eq!(draft.title, "Hello");
        assert_eq!(draft.status, PostStatus::Friends);
        assert!(draft.allow_comments);
        assert_eq!(draft.image, None);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = validate_post(&form("everyone"), &storage()).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn image_name_becomes_bucket_url() {
        let mut submitted = form("public");
        submitted.image = Some("Beach Day.PNG".to_string());
        let draft = validate_post(&submitted, &storage()).unwrap();
        assert_eq!(
            draft.image.as_deref(),
            Some("https://heartline-media.s3.amazonaws.com/beach-day.png")
        );
    }

    #[test]
    fn current_status_is_preselected() {
        let options = status_options("private");
        assert_eq!(options.len(), 3);
        assert!(options.iter().any(|o| o.value == "private" && o.selected));
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
    }
}
