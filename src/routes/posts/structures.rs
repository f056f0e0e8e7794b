use askama::Template;
use serde::Deserialize;

use crate::routes::views::{Layout, PostView};

#[derive(Template)]
#[template(path = "post/displayPostForm.html")]
pub struct PostFormTemplate {
    pub layout: Layout,
    pub title: String,
    pub body: String,
    pub statuses: Vec<StatusOption>,
    pub allow_comments: bool,
}

#[derive(Template)]
#[template(path = "post/posts.html")]
pub struct PostsTemplate {
    pub layout: Layout,
    pub posts: Vec<PostView>,
}

#[derive(Template)]
#[template(path = "post/editPost.html")]
pub struct EditPostTemplate {
    pub layout: Layout,
    pub post_id: i32,
    pub title: String,
    pub body: String,
    pub statuses: Vec<StatusOption>,
    pub allow_comments: bool,
    pub image: String,
}

pub struct StatusOption {
    pub value: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "post/fullpost.html")]
pub struct FullPostTemplate {
    pub layout: Layout,
    pub post: PostView,
    pub liked: bool,
    pub can_comment: bool,
}

#[derive(Debug, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "allowComments")]
    pub allow_comments: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(rename = "commentBody", default)]
    pub comment_body: String,
}
