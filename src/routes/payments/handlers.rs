use actix_web::{HttpRequest, HttpResponse, get, post, web};

use crate::{
    app_state::AppState,
    errors::AppError,
    routes::{
        context::resolve_session_user,
        views::{Layout, render},
    },
};

use super::functions::{charge_card, credit_wallet, package_for, render_payment_page};
use super::structures::{ChargeForm, SuccessTemplate};

#[get("/payment")]
pub async fn payment(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    render_payment_page(&app_state, session.user.wallet, Vec::new())
}

#[post("/charge{dollars:\\d+}dollars")]
pub async fn charge(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<u32>,
    form: web::Form<ChargeForm>,
) -> Result<HttpResponse, AppError> {
    let session = resolve_session_user(&req, &app_state).await?;
    let package = package_for(path.into_inner())
        .ok_or_else(|| AppError::NotFound("Unknown package".to_string()))?;

    let form = form.into_inner();
    if form.stripe_token.trim().is_empty() {
        return render_payment_page(
            &app_state,
            session.user.wallet,
            vec!["Card details are missing".to_string()],
        );
    }
    let email = if form.stripe_email.trim().is_empty() {
        session.user.email.clone()
    } else {
        form.stripe_email.trim().to_string()
    };

    let intent = match charge_card(&app_state, &email, form.stripe_token.trim(), package).await {
        Ok(intent) if intent.is_paid() => intent,
        Ok(intent) => {
            log::warn!(
                "Payment intent {} for user {} ended with status {}",
                intent.id,
                session.id(),
                intent.status
            );
            return render_payment_page(
                &app_state,
                session.user.wallet,
                vec!["Your payment could not be completed".to_string()],
            );
        }
        Err(e) => {
            log::error!("Charge for user {} failed: {}", session.id(), e);
            return render_payment_page(
                &app_state,
                session.user.wallet,
                vec!["Your payment could not be completed".to_string()],
            );
        }
    };

    let wallet = credit_wallet(&app_state.db, session.id(), package.messages).await?;
    log::info!(
        "User {} bought {} messages with intent {}",
        session.id(),
        package.messages,
        intent.id
    );

    render(&SuccessTemplate {
        layout: Layout::member("Success"),
        charge_id: intent.id,
        amount: package.display_amount(),
        messages: package.messages,
        wallet,
    })
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(payment).service(charge);
}
