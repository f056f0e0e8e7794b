use askama::Template;
use serde::Deserialize;

use crate::routes::views::Layout;

#[derive(Template)]
#[template(path = "payment.html")]
pub struct PaymentTemplate {
    pub layout: Layout,
    pub publishable_key: String,
    pub packages: Vec<PackageView>,
    pub wallet: i64,
    pub errors: Vec<String>,
}

pub struct PackageView {
    pub path: String,
    pub amount_cents: i64,
    pub label: String,
    pub description: String,
}

#[derive(Template)]
#[template(path = "success.html")]
pub struct SuccessTemplate {
    pub layout: Layout,
    pub charge_id: String,
    pub amount: String,
    pub messages: i64,
    pub wallet: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChargeForm {
    #[serde(rename = "stripeEmail", default)]
    pub stripe_email: String,
    #[serde(rename = "stripeToken", default)]
    pub stripe_token: String,
}
