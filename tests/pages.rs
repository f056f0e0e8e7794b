#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use sea_orm::EntityTrait;
use serde_json::json;

use common::{body_text, location, login_cookie, seed_user, setup, setup_with, stub_api, test_config};
use heartline::database::models::{contact_message, user};

#[actix_web::test]
async fn guest_pages_render() {
    let state = setup().await;
    let app = test_app!(state);

    for uri in ["/", "/about", "/contact", "/newAccount", "/retrievePwd"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {}", uri);
    }
}

#[actix_web::test]
async fn contact_form_stores_and_lists_messages() {
    let state = setup().await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/contactUs")
        .set_form([
            ("fullname", "Curious Visitor"),
            ("email", "visitor@example.com"),
            ("message", "Is this site free?"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Is this site free?"));
    assert_eq!(contact_message::Entity::find().all(&state.db).await.unwrap().len(), 1);
}

#[actix_web::test]
async fn contact_form_reports_invalid_input() {
    let state = setup().await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/contactUs")
        .set_form([("fullname", ""), ("email", "nope"), ("message", "")])
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Please enter a valid email address"));
    assert!(contact_message::Entity::find().all(&state.db).await.unwrap().is_empty());
}

#[actix_web::test]
async fn profile_update_and_singles() {
    let state = setup().await;
    let jane = seed_user(&state, "Jane", "jane@example.com", 0).await;
    seed_user(&state, "Bob", "bob@example.com", 0).await;
    let cookie = login_cookie(&state, jane.id).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/updateProfile")
        .cookie(cookie.clone())
        .set_form([
            ("fullname", "Jane Smith"),
            ("email", "JANE.SMITH@example.com"),
            ("gender", "female"),
            ("about", "Likes hiking"),
        ])
        .to_request();
    assert_eq!(location(&test::call_service(&app, req).await), "/profile");

    let updated = user::Entity::find_by_id(jane.id).one(&state.db).await.unwrap().unwrap();
    assert_eq!(updated.fullname, "Jane Smith");
    assert_eq!(updated.email, "jane.smith@example.com");
    assert_eq!(updated.about.as_deref(), Some("Likes hiking"));

    let req = test::TestRequest::post()
        .uri("/updateProfile")
        .cookie(cookie.clone())
        .set_form([("fullname", "Jane"), ("email", "bob@example.com")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/singles").cookie(cookie.clone()).to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Jane Smith"));
    assert!(body.contains("Bob"));

    let req = test::TestRequest::get().uri("/userProfile/999").cookie(cookie).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn payment_page_lists_packages_and_rejects_unknown_ones() {
    let state = setup().await;
    let jane = seed_user(&state, "Jane", "jane@example.com", 4).await;
    let cookie = login_cookie(&state, jane.id).await;
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/payment").cookie(cookie.clone()).to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    for path in ["/charge10dollars", "/charge20dollars", "/charge30dollars", "/charge40dollars"] {
        assert!(body.contains(path), "missing {}", path);
    }
    assert!(body.contains("$40 for 200 messages"));

    let req = test::TestRequest::post()
        .uri("/charge15dollars")
        .cookie(cookie.clone())
        .set_form([("stripeEmail", "jane@example.com"), ("stripeToken", "tok_visa")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/charge10dollars")
        .cookie(cookie)
        .set_form([("stripeEmail", "jane@example.com"), ("stripeToken", "")])
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Card details are missing"));

    let unchanged = user::Entity::find_by_id(jane.id).one(&state.db).await.unwrap().unwrap();
    assert_eq!(unchanged.wallet, 4);
}

fn stripe_stub(intent_status: &str) -> String {
    stub_api(vec![
        (
            "/v1/customers",
            json!({"id": "cus_1", "email": "jane@example.com", "default_source": "card_1"}),
        ),
        (
            "/v1/payment_intents",
            json!({
                "id": "pi_1",
                "amount": 2000,
                "currency": "usd",
                "status": intent_status,
                "description": "$20 for 50 messages"
            }),
        ),
    ])
}

#[actix_web::test]
async fn paid_charge_credits_package_messages() {
    let mut config = test_config();
    config.stripe_api_base = Some(stripe_stub("succeeded"));
    let state = setup_with(config).await;
    let jane = seed_user(&state, "Jane", "jane@example.com", 1).await;
    let cookie = login_cookie(&state, jane.id).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/charge20dollars")
        .cookie(cookie)
        .set_form([("stripeEmail", "jane@example.com"), ("stripeToken", "tok_visa")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("pi_1"));
    assert!(body.contains("$20.00"));

    let credited = user::Entity::find_by_id(jane.id).one(&state.db).await.unwrap().unwrap();
    assert_eq!(credited.wallet, 51);
}

#[actix_web::test]
async fn unconfirmed_charge_leaves_wallet_alone() {
    let mut config = test_config();
    config.stripe_api_base = Some(stripe_stub("requires_payment_method"));
    let state = setup_with(config).await;
    let jane = seed_user(&state, "Jane", "jane@example.com", 1).await;
    let cookie = login_cookie(&state, jane.id).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/charge20dollars")
        .cookie(cookie)
        .set_form([("stripeEmail", "jane@example.com"), ("stripeToken", "tok_visa")])
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Your payment could not be completed"));

    let unchanged = user::Entity::find_by_id(jane.id).one(&state.db).await.unwrap().unwrap();
    assert_eq!(unchanged.wallet, 1);
}
