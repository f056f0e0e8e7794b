use actix_web::{HttpRequest, HttpResponse, get, post, web};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};

use crate::{
    app_state::AppState,
    database::models::contact_message,
    errors::AppError,
    routes::{
        context::{current_user, ensure_guest},
        moment::TimeFormatter,
        validation::{MAX_NAME_LEN, MAX_TEXT_LEN, ensure_max_len, validate_email},
        views::{Layout, render},
    },
};

use super::structures::{
    AboutTemplate, ContactForm, ContactMessageView, ContactTemplate, HomeTemplate,
    NewMessageTemplate, NoMessageTemplate,
};

#[get("/")]
pub async fn home(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if let Some(redirect) = ensure_guest(&req, &app_state).await? {
        return Ok(redirect);
    }
    render(&HomeTemplate::plain())
}

#[get("/about")]
pub async fn about(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if let Some(redirect) = ensure_guest(&req, &app_state).await? {
        return Ok(redirect);
    }
    render(&AboutTemplate {
        layout: Layout::guest("About"),
    })
}

#[get("/contact")]
pub async fn contact(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if let Some(redirect) = ensure_guest(&req, &app_state).await? {
        return Ok(redirect);
    }
    render(&ContactTemplate {
        layout: Layout::guest("Contact"),
        errors: Vec::new(),
    })
}

#[post("/contactUs")]
pub async fn contact_us(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    form: web::Form<ContactForm>,
) -> Result<HttpResponse, AppError> {
    let signed_in = current_user(&req, &app_state).await?.is_some();
    let form = form.into_inner();

    let fullname = form.fullname.trim().to_string();
    let email = form.email.trim().to_string();
    let message = form.message.trim().to_string();

    let mut errors = Vec::new();
    if fullname.is_empty() || !ensure_max_len(&fullname, MAX_NAME_LEN) {
        errors.push("Please tell us your name".to_string());
    }
    if !validate_email(&email) {
        errors.push("Please enter a valid email address".to_string());
    }
    if message.is_empty() || !ensure_max_len(&message, MAX_TEXT_LEN) {
        errors.push("Message must not be empty".to_string());
    }
    if !errors.is_empty() {
        return render(&ContactTemplate {
            layout: Layout {
                title: "Contact".to_string(),
                signed_in,
            },
            errors,
        });
    }

    contact_message::ActiveModel {
        fullname: Set(fullname),
        email: Set(email),
        message: Set(message),
        date: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&app_state.db)
    .await?;

    let messages = contact_message::Entity::find()
        .order_by_desc(contact_message::Column::Date)
        .all(&app_state.db)
        .await?;

    if messages.is_empty() {
        return render(&NoMessageTemplate {
            layout: Layout {
                title: "Not found".to_string(),
                signed_in,
            },
        });
    }

    let time = TimeFormatter::new(app_state.timezone);
    let messages = messages
        .into_iter()
        .map(|m| ContactMessageView {
            when: time.relative(m.date),
            fullname: m.fullname,
            email: m.email,
            message: m.message,
        })
        .collect();

    render(&NewMessageTemplate {
        layout: Layout {
            title: "Sent".to_string(),
            signed_in,
        },
        messages,
    })
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home)
        .service(about)
        .service(contact)
        .service(contact_us);
}
