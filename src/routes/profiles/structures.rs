use askama::Template;
use serde::Deserialize;

use crate::routes::views::{Layout, PostView, UserCard};

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub me: UserCard,
    pub new_smile: Option<SmileNotice>,
    pub has_unread: bool,
    pub posts: Vec<PostView>,
}

pub struct SmileNotice {
    pub id: i32,
    pub sender: UserCard,
}

#[derive(Template)]
#[template(path = "singles.html")]
pub struct SinglesTemplate {
    pub layout: Layout,
    pub me_id: i32,
    pub singles: Vec<UserCard>,
}

#[derive(Template)]
#[template(path = "userProfile.html")]
pub struct UserProfileTemplate {
    pub layout: Layout,
    pub one_user: UserCard,
    pub is_self: bool,
    pub smiled: bool,
    pub public_posts: Vec<PostView>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileForm {
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub email: String,
    pub gender: Option<String>,
    pub about: Option<String>,
}
