use askama::Template;

use crate::routes::views::{Layout, UserCard};

#[derive(Template)]
#[template(path = "smile/showSmile.html")]
pub struct ShowSmileTemplate {
    pub layout: Layout,
    pub sender: UserCard,
    pub receiver: UserCard,
    pub when: String,
    pub received: bool,
}
