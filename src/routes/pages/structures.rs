use askama::Template;
use serde::Deserialize;

use crate::routes::views::Layout;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub errors: Vec<String>,
    pub success: Vec<String>,
}

impl HomeTemplate {
    pub fn plain() -> Self {
        Self {
            layout: Layout::guest("Home"),
            errors: Vec::new(),
            success: Vec::new(),
        }
    }
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub layout: Layout,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "newmessage.html")]
pub struct NewMessageTemplate {
    pub layout: Layout,
    pub messages: Vec<ContactMessageView>,
}

#[derive(Template)]
#[template(path = "noMessage.html")]
pub struct NoMessageTemplate {
    pub layout: Layout,
}

pub struct ContactMessageView {
    pub fullname: String,
    pub email: String,
    pub message: String,
    pub when: String,
}

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}
