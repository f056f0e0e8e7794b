use actix_web::{HttpRequest, HttpResponse, cookie::Cookie, get, post, web};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    database::models::user,
    errors::AppError,
    routes::{
        context::{
            OAUTH_STATE_COOKIE, SESSION_COOKIE, oauth_state_cookie, removal_cookie,
            resolve_session_user, start_session,
        },
        pages::structures::HomeTemplate,
        views::{Layout, redirect, render},
    },
    services::{
        facebook_api::FacebookProfile,
        passwords::{MIN_PASSWORD_LEN, hash_password, verify_password},
        sessions,
    },
};

use super::functions::{
    delete_account as remove_account, find_by_email, find_or_create_facebook_user,
    normalize_email, validate_signup,
};
use super::structures::{
    AccountDeletedTemplate, AskToDeleteTemplate, LoginForm, NewAccountTemplate,
    OAuthCallbackQuery, PwdDoesNotMatchTemplate, PwdUpdatedTemplate, RetrievePwdForm,
    RetrievePwdTemplate, SignupForm,
};

#[get("/newAccount")]
pub async fn new_account() -> Result<HttpResponse, AppError> {
    render(&NewAccountTemplate {
        layout: Layout::guest("Signup"),
        errors: Vec::new(),
        fullname: String::new(),
        email: String::new(),
    })
}

#[post("/signup")]
pub async fn signup(
    app_state: web::Data<AppState>,
    form: web::Form<SignupForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    let errors = validate_signup(&form);
    if !errors.is_empty() {
        return render(&NewAccountTemplate {
            layout: Layout::guest("Error"),
            errors,
            fullname: form.username,
            email: form.email,
        });
    }

    if find_by_email(&app_state.db, &form.email).await?.is_some() {
        return render(&NewAccountTemplate {
            layout: Layout::guest("Signup"),
            errors: vec!["Email already exist".to_string()],
            fullname: form.username,
            email: form.email,
        });
    }

    let created = user::ActiveModel {
        fullname: Set(form.username.trim().to_string()),
        email: Set(normalize_email(&form.email)),
        password: Set(Some(hash_password(&form.password)?)),
        facebook: Set(None),
        gender: Set(None),
        about: Set(None),
        image: Set(None),
        wallet: Set(0),
        online: Set(false),
        date: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&app_state.db)
    .await?;
    log::info!("Registered user {}", created.id);

    render(&HomeTemplate {
        layout: Layout::guest("Home"),
        errors: Vec::new(),
        success: vec![
            "Your account has been successfully created. You can login now".to_string(),
        ],
    })
}

#[post("/login")]
pub async fn login(
    app_state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    let Some(account) = find_by_email(&app_state.db, &form.email).await? else {
        return Ok(redirect("/loginErrors"));
    };

    if !verify_password(&form.password, account.password.as_deref())? {
        log::debug!("Rejected password for user {}", account.id);
        return Ok(redirect("/loginErrors"));
    }

    let cookie = start_session(&app_state, account.id).await?;
    let mut response = redirect("/profile");
    response.add_cookie(&cookie).map_err(|_| AppError::Internal)?;
    Ok(response)
}

#[get("/loginErrors")]
pub async fn login_errors() -> Result<HttpResponse, AppError> {
    render(&HomeTemplate {
        layout: Layout::guest("Home"),
        errors: vec!["User Not found or Password Incorrect".to_string()],
        success: Vec::new(),
    })
}

#[get("/retrievePwd")]
pub async fn retrieve_pwd_form() -> Result<HttpResponse, AppError> {
    render(&RetrievePwdTemplate {
        layout: Layout::guest("Retrieve"),
        errors: Vec::new(),
    })
}

#[post("/retrievePwd")]
pub async fn retrieve_pwd(
    app_state: web::Data<AppState>,
    form: web::Form<RetrievePwdForm>,
) -> Result<HttpResponse, AppError> {
    let email = form.email.trim();
    let password = form.password.trim();
    let password2 = form.password2.trim();

    if password != password2 {
        return render(&PwdDoesNotMatchTemplate {
            layout: Layout::guest("Not match"),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return render(&RetrievePwdTemplate {
            layout: Layout::guest("Retrieve"),
            errors: vec!["Password must be at least 5 characters".to_string()],
        });
    }

    let Some(account) = find_by_email(&app_state.db, email).await? else {
        return render(&RetrievePwdTemplate {
            layout: Layout::guest("Retrieve"),
            errors: vec!["User not found".to_string()],
        });
    };

    let user_id = account.id;
    let mut active: user::ActiveModel = account.into();
    active.password = Set(Some(hash_password(password)?));
    active.update(&app_state.db).await?;
    sessions::destroy_user_sessions(&app_state.db, user_id).await?;
    log::info!("Password reset for user {}", user_id);

    render(&PwdUpdatedTemplate {
        layout: Layout::guest("Updated"),
    })
}

#[get("/auth/facebook")]
pub async fn facebook_login(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let state = Uuid::new_v4().simple().to_string();
    let location = app_state.facebook_api.authorize_url(&state)?;

    let mut response = redirect(&location);
    response
        .add_cookie(&oauth_state_cookie(state, app_state.config.secure_cookies()))
        .map_err(|_| AppError::Internal)?;
    Ok(response)
}

#[get("/auth/facebook/callback")]
pub async fn facebook_callback(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    query: web::Query<OAuthCallbackQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    if let Some(error) = &query.error {
        log::warn!("Facebook login cancelled: {}", error);
        return Ok(redirect("/"));
    }

    let expected_state = req.cookie(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let (Some(code), Some(state)) = (query.code, query.state) else {
        return Ok(redirect("/"));
    };
    if expected_state.as_deref() != Some(state.as_str()) {
        log::warn!("Facebook callback with mismatched state");
        return Ok(redirect("/"));
    }

    let profile = match app_state.facebook_api.exchange_code(&code).await {
        Ok(token) => match app_state.facebook_api.fetch_profile(&token).await {
            Ok(profile) => profile,
            Err(e) => {
                log::error!("Facebook profile lookup failed: {}", e);
                return Ok(redirect("/"));
            }
        },
        Err(e) => {
            log::error!("Facebook code exchange failed: {}", e);
            return Ok(redirect("/"));
        }
    };

    let cookie = match sign_in_facebook_user(&app_state, &profile).await {
        Ok(cookie) => cookie,
        Err(e) => {
            log::error!("Facebook sign-in for {} failed: {}", profile.id, e);
            return Ok(redirect("/"));
        }
    };

    let mut response = redirect("/profile");
    response.add_cookie(&cookie).map_err(|_| AppError::Internal)?;
    response
        .add_removal_cookie(&removal_cookie(OAUTH_STATE_COOKIE))
        .map_err(|_| AppError::Internal)?;
    Ok(response)
}

async fn sign_in_facebook_user(
    app_state: &web::Data<AppState>,
    profile: &FacebookProfile,
) -> Result<Cookie<'static>, AppError> {
    let account = find_or_create_facebook_user(&app_state.db, profile).await?;
    start_session(app_state, account.id).await
}

#[get("/logout")]
pub async fn logout(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;

    let mut active: user::ActiveModel = session.user.into();
    active.online = Set(false);
    active.update(&app_state.db).await?;
    sessions::destroy_session(&app_state.db, &session.token).await?;

    let mut response = redirect("/");
    response
        .add_removal_cookie(&removal_cookie(SESSION_COOKIE))
        .map_err(|_| AppError::Internal)?;
    Ok(response)
}

#[get("/askToDelete")]
pub async fn ask_to_delete(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    resolve_session_user(&req, &app_state).await?;
    render(&AskToDeleteTemplate {
        layout: Layout::member("Delete"),
    })
}

#[get("/deleteAccount")]
pub async fn delete_account(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    remove_account(&app_state.db, session.id()).await?;

    let mut response = render(&AccountDeletedTemplate {
        layout: Layout::guest("Deleted"),
    })?;
    response
        .add_removal_cookie(&removal_cookie(SESSION_COOKIE))
        .map_err(|_| AppError::Internal)?;
    Ok(response)
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(new_account)
        .service(signup)
        .service(login)
        .service(login_errors)
        .service(retrieve_pwd_form)
        .service(retrieve_pwd)
        .service(facebook_login)
        .service(facebook_callback)
        .service(logout)
        .service(ask_to_delete)
        .service(delete_account);
}
