#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use sea_orm::EntityTrait;

use common::{body_text, location, login_cookie, seed_user, setup};
use heartline::{
    database::models::{post, post_comment, post_like},
    routes::chats::functions::start_chat,
};

#[actix_web::test]
async fn create_post_sets_icon_and_redirects_by_status() {
    let state = setup().await;
    let jane = seed_user(&state, "Jane", "jane@example.com", 0).await;
    let cookie = login_cookie(&state, jane.id).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/createPost")
        .cookie(cookie.clone())
        .set_form([
            ("title", "Sunny day"),
            ("body", "Out at the beach"),
            ("status", "public"),
            ("allowComments", "on"),
            ("image", "Beach Day.PNG"),
        ])
        .to_request();
    assert_eq!(location(&test::call_service(&app, req).await), "/posts");

    let req = test::TestRequest::post()
        .uri("/createPost")
        .cookie(cookie.clone())
        .set_form([("title", "Diary"), ("body", "Just for me"), ("status", "private")])
        .to_request();
    assert_eq!(location(&test::call_service(&app, req).await), "/profile");

    let posts = post::Entity::find().all(&state.db).await.unwrap();
    let public = posts.iter().find(|p| p.status == "public").unwrap();
    assert_eq!(public.icon, "fa fa-globe");
    assert!(public.allow_comments);
    assert_eq!(
        public.image.as_deref(),
        Some("http://127.0.0.1:9/heartline-test/beach-day.png")
    );
    let private = posts.iter().find(|p| p.status == "private").unwrap();
    assert_eq!(private.icon, "fa fa-key");
    assert!(!private.allow_comments);

    let req = test::TestRequest::get().uri("/posts").cookie(cookie).to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Sunny day"));
    assert!(!body.contains("Diary"));
}

#[actix_web::test]
async fn unknown_status_is_a_bad_request() {
    let state = setup().await;
    let jane = seed_user(&state, "Jane", "jane@example.com", 0).await;
    let cookie = login_cookie(&state, jane.id).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/createPost")
        .cookie(cookie)
        .set_form([("title", "Hmm"), ("body", ""), ("status", "everyone")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

async fn seed_post(
    state: &actix_web::web::Data<heartline::app_state::AppState>,
    author: i32,
    status: &str,
    allow_comments: bool,
) -> post::Model {
    use sea_orm::{ActiveModelTrait, Set};
    post::ActiveModel {
        post_user: Set(author),
        title: Set(format!("{} post", status)),
        body: Set("body".to_string()),
        status: Set(status.to_string()),
        icon: Set("fa fa-globe".to_string()),
        image: Set(None),
        allow_comments: Set(allow_comments),
        date: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .unwrap()
}

#[actix_web::test]
async fn visibility_follows_status_and_shared_chats() {
    let state = setup().await;
    let jane = seed_user(&state, "Jane", "jane@example.com", 0).await;
    let bob = seed_user(&state, "Bob", "bob@example.com", 0).await;
    let private = seed_post(&state, jane.id, "private", true).await;
    let friends = seed_post(&state, jane.id, "friends", true).await;
    let jane_cookie = login_cookie(&state, jane.id).await;
    let bob_cookie = login_cookie(&state, bob.id).await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/fullpost/{}", private.id))
        .cookie(bob_cookie.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/fullpost/{}", private.id))
        .cookie(jane_cookie)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/fullpost/{}", friends.id))
        .cookie(bob_cookie.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    start_chat(&state.db, bob.id, jane.id).await.unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/fullpost/{}", friends.id))
        .cookie(bob_cookie)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn likes_are_counted_once_per_user() {
    let state = setup().await;
    let jane = seed_user(&state, "Jane", "jane@example.com", 0).await;
    let bob = seed_user(&state, "Bob", "bob@example.com", 0).await;
    let public = seed_post(&state, jane.id, "public", true).await;
    let cookie = login_cookie(&state, bob.id).await;
    let app = test_app!(state);

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri(&format!("/likePost/{}", public.id))
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp), format!("/fullpost/{}", public.id));
    }
    assert_eq!(post_like::Entity::find().all(&state.db).await.unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri(&format!("/fullpost/{}", public.id))
        .cookie(cookie)
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("You like this"));
}

#[actix_web::test]
async fn comments_respect_allow_comments() {
    let state = setup().await;
    let jane = seed_user(&state, "Jane", "jane@example.com", 0).await;
    let bob = seed_user(&state, "Bob", "bob@example.com", 0).await;
    let open = seed_post(&state, jane.id, "public", true).await;
    let closed = seed_post(&state, jane.id, "public", false).await;
    let cookie = login_cookie(&state, bob.id).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/leaveComment/{}", open.id))
        .cookie(cookie.clone())
        .set_form([("commentBody", "Looks great")])
        .to_request();
    assert_eq!(
        location(&test::call_service(&app, req).await),
        format!("/fullpost/{}", open.id)
    );

    let req = test::TestRequest::post()
        .uri(&format!("/leaveComment/{}", closed.id))
        .cookie(cookie.clone())
        .set_form([("commentBody", "Hello?")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let comments = post_comment::Entity::find().all(&state.db).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment_body, "Looks great");

    let req = test::TestRequest::get()
        .uri(&format!("/fullpost/{}", open.id))
        .cookie(cookie)
        .to_request();
    assert!(body_text(test::call_service(&app, req).await).await.contains("Looks great"));
}

#[actix_web::test]
async fn only_the_author_edits_or_deletes() {
    let state = setup().await;
    let jane = seed_user(&state, "Jane", "jane@example.com", 0).await;
    let bob = seed_user(&state, "Bob", "bob@example.com", 0).await;
    let public = seed_post(&state, jane.id, "public", true).await;
    let jane_cookie = login_cookie(&state, jane.id).await;
    let bob_cookie = login_cookie(&state, bob.id).await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/deletePost/{}", public.id))
        .cookie(bob_cookie)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri(&format!("/editPost/{}", public.id))
        .cookie(jane_cookie.clone())
        .set_form([("title", "Renamed"), ("body", "new body"), ("status", "friends")])
        .to_request();
    assert_eq!(location(&test::call_service(&app, req).await), "/profile");

    let edited = post::Entity::find_by_id(public.id).one(&state.db).await.unwrap().unwrap();
    assert_eq!(edited.title, "Renamed");
    assert_eq!(edited.icon, "fa fa-group");
    assert!(!edited.allow_comments);

    let req = test::TestRequest::get()
        .uri(&format!("/deletePost/{}", public.id))
        .cookie(jane_cookie)
        .to_request();
    assert_eq!(location(&test::call_service(&app, req).await), "/profile");
    assert!(post::Entity::find().all(&state.db).await.unwrap().is_empty());
}
