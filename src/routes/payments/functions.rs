use actix_web::HttpResponse;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, sea_query::Expr,
};

use crate::{
    app_state::AppState,
    database::models::user,
    errors::AppError,
    routes::views::{Layout, render},
    services::stripe_api::{PaymentIntent, PaymentIntentRequest},
};

use super::structures::{PackageView, PaymentTemplate};

/// A purchasable bundle of chat messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TopUpPackage {
    pub dollars: u32,
    pub amount_cents: i64,
    pub messages: i64,
}

impl TopUpPackage {
    pub fn description(&self) -> String {
        format!("${} for {} messages", self.dollars, self.messages)
    }

    pub fn charge_path(&self) -> String {
        format!("/charge{}dollars", self.dollars)
    }

    pub fn display_amount(&self) -> String {
        format!("${}.{:02}", self.amount_cents / 100, self.amount_cents % 100)
    }
}

pub const PACKAGES: [TopUpPackage; 4] = [
    TopUpPackage { dollars: 10, amount_cents: 1000, messages: 20 },
    TopUpPackage { dollars: 20, amount_cents: 2000, messages: 50 },
    TopUpPackage { dollars: 30, amount_cents: 3000, messages: 100 },
    TopUpPackage { dollars: 40, amount_cents: 4000, messages: 200 },
];

pub fn package_for(dollars: u32) -> Option<TopUpPackage> {
    PACKAGES.iter().copied().find(|p| p.dollars == dollars)
}

/// Adds `messages` credits to the wallet and returns the new balance.
pub async fn credit_wallet(
    db: &DatabaseConnection,
    user_id: i32,
    messages: i64,
) -> Result<i64, AppError> {
    let result = user::Entity::update_many()
        .col_expr(user::Column::Wallet, Expr::col(user::Column::Wallet).add(messages))
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let account = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(account.wallet)
}

/// Registers the card as a customer and charges it for `package`.
pub async fn charge_card(
    app_state: &AppState,
    email: &str,
    token: &str,
    package: TopUpPackage,
) -> Result<PaymentIntent, AppError> {
    let customer = app_state.stripe_api.create_customer(email, token).await?;
    app_state
        .stripe_api
        .create_payment_intent(
            &customer,
            &PaymentIntentRequest {
                amount: package.amount_cents,
                currency: "usd",
                description: package.description(),
            },
        )
        .await
}

/// The top-up page, shown on demand and whenever the wallet runs dry.
pub fn render_payment_page(
    app_state: &AppState,
    wallet: i64,
    errors: Vec<String>,
) -> Result<HttpResponse, AppError> {
    render(&PaymentTemplate {
        layout: Layout::member("Payment"),
        publishable_key: app_state.config.stripe_publishable_key.clone(),
        packages: PACKAGES
            .iter()
            .map(|p| PackageView {
                path: p.charge_path(),
                amount_cents: p.amount_cents,
                label: p.display_amount(),
                description: p.description(),
            })
            .collect(),
        wallet,
        errors,
    })
}
