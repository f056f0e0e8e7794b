use actix_web::{
    HttpRequest, HttpResponse,
    cookie::{Cookie, SameSite, time::Duration as CookieDuration},
    web,
};

use crate::{
    app_state::AppState,
    database::models::user,
    errors::AppError,
    services::sessions,
};

use super::views::redirect;

pub const SESSION_COOKIE: &str = "session_id";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// The signed-in account behind the current request.
#[derive(Clone, Debug)]
pub struct SessionUser {
    pub user: user::Model,
    pub token: String,
}

impl SessionUser {
    pub fn id(&self) -> i32 {
        self.user.id
    }
}

/// Resolves the session cookie; absent or stale sessions yield `None`.
pub async fn current_user(
    req: &HttpRequest,
    app_state: &web::Data<AppState>,
) -> Result<Option<SessionUser>, AppError> {
    let Some(cookie) = req.cookie(SESSION_COOKIE) else {
        return Ok(None);
    };
    let token = cookie.value().to_string();
    if token.is_empty() {
        return Ok(None);
    }

    let found = sessions::find_session_user(&app_state.db, &token).await?;
    Ok(found.map(|user| SessionUser { user, token }))
}

/// Pages behind a login: anonymous visitors are sent to `/`.
pub async fn resolve_session_user(
    req: &HttpRequest,
    app_state: &web::Data<AppState>,
) -> Result<SessionUser, AppError> {
    current_user(req, app_state)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Login required".to_string()))
}

/// Pages for visitors only: members are sent to their profile.
pub async fn ensure_guest(
    req: &HttpRequest,
    app_state: &web::Data<AppState>,
) -> Result<Option<HttpResponse>, AppError> {
    Ok(current_user(req, app_state)
        .await?
        .map(|_| redirect("/profile")))
}

/// Opens a session for the user and returns the cookie carrying it.
pub async fn start_session(
    app_state: &web::Data<AppState>,
    user_id: i32,
) -> Result<Cookie<'static>, AppError> {
    let ttl = app_state.config.effective_session_ttl();
    let token = sessions::create_session(&app_state.db, user_id, ttl).await?;
    Ok(Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(app_state.config.secure_cookies())
        .max_age(CookieDuration::seconds(ttl.num_seconds()))
        .finish())
}

pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// Short-lived cookie binding the OAuth round trip to this browser.
pub fn oauth_state_cookie(state: String, secure: bool) -> Cookie<'static> {
    Cookie::build(OAUTH_STATE_COOKIE, state)
        .path("/auth")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(CookieDuration::minutes(10))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_cookie_expires_immediately() {
        let cookie = removal_cookie(SESSION_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
    }
}
