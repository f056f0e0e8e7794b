use askama::Template;
use serde::{Deserialize, Serialize};

use crate::routes::views::Layout;

#[derive(Template)]
#[template(path = "uploadImage.html")]
pub struct UploadImageTemplate {
    pub layout: Layout,
}

#[derive(Debug, Default, Serialize)]
pub struct UploadResponse {
    pub keys: Vec<String>,
    pub urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvatarForm {
    #[serde(default)]
    pub upload: String,
}
