use askama::Template;
use serde::Deserialize;

use crate::routes::views::Layout;

#[derive(Template)]
#[template(path = "newAccount.html")]
pub struct NewAccountTemplate {
    pub layout: Layout,
    pub errors: Vec<String>,
    pub fullname: String,
    pub email: String,
}

#[derive(Template)]
#[template(path = "retrievePwd.html")]
pub struct RetrievePwdTemplate {
    pub layout: Layout,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "pwdDoesNotMatch.html")]
pub struct PwdDoesNotMatchTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "pwdUpdated.html")]
pub struct PwdUpdatedTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "askToDelete.html")]
pub struct AskToDeleteTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "accountDeleted.html")]
pub struct AccountDeletedTemplate {
    pub layout: Layout,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RetrievePwdForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
