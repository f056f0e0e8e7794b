#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use sea_orm::EntityTrait;

use common::{body_text, location, login_cookie, seed_user, setup};
use heartline::database::models::smile;

#[actix_web::test]
async fn smiles_are_sent_once_and_can_be_taken_back() {
    let state = setup().await;
    let jane = seed_user(&state, "Jane", "jane@example.com", 0).await;
    let bob = seed_user(&state, "Bob", "bob@example.com", 0).await;
    let cookie = login_cookie(&state, jane.id).await;
    let app = test_app!(state);

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri(&format!("/sendSmile/{}", bob.id))
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp), format!("/userProfile/{}", bob.id));
    }
    let smiles = smile::Entity::find().all(&state.db).await.unwrap();
    assert_eq!(smiles.len(), 1);
    assert!(smiles[0].sender_sent);
    assert!(!smiles[0].receiver_received);

    let req = test::TestRequest::get()
        .uri(&format!("/userProfile/{}", bob.id))
        .cookie(cookie.clone())
        .to_request();
    assert!(body_text(test::call_service(&app, req).await).await.contains("Take back smile"));

    let req = test::TestRequest::get()
        .uri(&format!("/deleteSmile/{}", bob.id))
        .cookie(cookie)
        .to_request();
    assert_eq!(
        location(&test::call_service(&app, req).await),
        format!("/userProfile/{}", bob.id)
    );
    assert!(smile::Entity::find().all(&state.db).await.unwrap().is_empty());
}

#[actix_web::test]
async fn receiver_sees_smile_on_profile_and_marks_it_received() {
    let state = setup().await;
    let jane = seed_user(&state, "Jane", "jane@example.com", 0).await;
    let bob = seed_user(&state, "Bob", "bob@example.com", 0).await;
    let eve = seed_user(&state, "Eve", "eve@example.com", 0).await;
    let jane_cookie = login_cookie(&state, jane.id).await;
    let bob_cookie = login_cookie(&state, bob.id).await;
    let eve_cookie = login_cookie(&state, eve.id).await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/sendSmile/{}", bob.id))
        .cookie(jane_cookie)
        .to_request();
    test::call_service(&app, req).await;
    let sent = smile::Entity::find().one(&state.db).await.unwrap().unwrap();

    let req = test::TestRequest::get().uri("/profile").cookie(bob_cookie.clone()).to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Jane sent you a smile"));
    assert!(body.contains(&format!("/showSmile/{}", sent.id)));

    let req = test::TestRequest::get()
        .uri(&format!("/showSmile/{}", sent.id))
        .cookie(eve_cookie)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/showSmile/{}", sent.id))
        .cookie(bob_cookie.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let seen = smile::Entity::find_by_id(sent.id).one(&state.db).await.unwrap().unwrap();
    assert!(seen.receiver_received);

    let req = test::TestRequest::get().uri("/profile").cookie(bob_cookie).to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(!body.contains("sent you a smile"));
}
