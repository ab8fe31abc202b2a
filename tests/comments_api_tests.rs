use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::json;
use std::sync::Arc;

use askhub::api::{self, AppState};
use askhub::auth::AuthService;
use askhub::store::Store;

fn app_state() -> AppState {
    AppState {
        store: Arc::new(Store::in_memory().unwrap()),
        auth_service: Arc::new(AuthService::new("test_secret".to_string())),
    }
}

macro_rules! register_user {
    ($app:expr, $name:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "name": $name,
                "email": format!("{}@example.com", $name),
                "password": "password123"
            }))
            .to_request();

        let resp: serde_json::Value = test::call_and_read_body_json(&$app, req).await;
        (
            resp["token"].as_str().unwrap().to_string(),
            resp["user"]["id"].as_str().unwrap().to_string(),
        )
    }};
}

macro_rules! ask_question {
    ($app:expr, $token:expr, $name:expr, $body:expr) => {{
        let mut payload = json!({ "name": $name, "content": "content" });
        if let Some(community_id) = $body {
            payload["communityId"] = json!(community_id);
        }
        let req = test::TestRequest::post()
            .uri("/api/questions")
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .set_json(payload)
            .to_request();

        let resp: serde_json::Value = test::call_and_read_body_json(&$app, req).await;
        resp["id"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn test_comment_on_anothers_question() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(api::configure_routes),
    )
    .await;

    let (owner_token, _) = register_user!(app, "owner");
    let (commenter_token, commenter_id) = register_user!(app, "commenter");
    let question_id = ask_question!(app, owner_token, "open question", None::<&str>);

    let req = test::TestRequest::post()
        .uri("/api/comments")
        .insert_header(("Authorization", format!("Bearer {}", commenter_token)))
        .set_json(json!({ "content": "an answer", "questionId": question_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["createdById"], commenter_id.as_str());
    assert_eq!(body["questionId"], question_id.as_str());
    assert_eq!(body["createdBy"]["name"], "commenter");

    // Newest first in the question's comment list
    let req = test::TestRequest::get()
        .uri(&format!("/api/comments?questionId={}", question_id))
        .to_request();
    let list: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let comments = list.as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["content"], "an answer");
}

#[actix_web::test]
async fn test_comment_inherits_question_community() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(api::configure_routes),
    )
    .await;

    let (token, _) = register_user!(app, "alice");

    let req = test::TestRequest::post()
        .uri("/api/communities")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "name": "rustaceans" }))
        .to_request();
    let community: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let community_id = community["id"].as_str().unwrap().to_string();

    let question_id = ask_question!(app, token, "in community", Some(&community_id));

    let req = test::TestRequest::post()
        .uri("/api/comments")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "content": "inherits", "questionId": question_id }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["communityId"], community_id.as_str());

    // The community-scoped comment list sees it too
    let req = test::TestRequest::get()
        .uri(&format!("/api/comments?communityId={}", community_id))
        .to_request();
    let list: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_comment_on_missing_question_is_404() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(api::configure_routes),
    )
    .await;

    let (token, _) = register_user!(app, "alice");

    let req = test::TestRequest::post()
        .uri("/api/comments")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "content": "orphan", "questionId": "missing" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_only_the_author_edits_and_deletes() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(api::configure_routes),
    )
    .await;

    let (owner_token, _) = register_user!(app, "owner");
    let (commenter_token, _) = register_user!(app, "commenter");
    let question_id = ask_question!(app, owner_token, "open question", None::<&str>);

    let req = test::TestRequest::post()
        .uri("/api/comments")
        .insert_header(("Authorization", format!("Bearer {}", commenter_token)))
        .set_json(json!({ "content": "original", "questionId": question_id }))
        .to_request();
    let comment: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let comment_id = comment["id"].as_str().unwrap();

    // The question's owner cannot edit someone else's comment
    let req = test::TestRequest::put()
        .uri(&format!("/api/comments/{}", comment_id))
        .insert_header(("Authorization", format!("Bearer {}", owner_token)))
        .set_json(json!({ "content": "edited by owner" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri(&format!("/api/comments/{}", comment_id))
        .insert_header(("Authorization", format!("Bearer {}", commenter_token)))
        .set_json(json!({ "content": "edited by author" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["content"], "edited by author");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/comments/{}", comment_id))
        .insert_header(("Authorization", format!("Bearer {}", owner_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/comments/{}", comment_id))
        .insert_header(("Authorization", format!("Bearer {}", commenter_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_comment_count_tracks_answers() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(api::configure_routes),
    )
    .await;

    let (token, _) = register_user!(app, "alice");
    let question_id = ask_question!(app, token, "counted", None::<&str>);

    for i in 0..3 {
        let req = test::TestRequest::post()
            .uri("/api/comments")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({ "content": format!("answer {}", i), "questionId": question_id }))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/questions/{}", question_id))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["commentCount"], 3);
}

#[actix_web::test]
async fn test_comment_pagination() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(api::configure_routes),
    )
    .await;

    let (token, _) = register_user!(app, "alice");
    let question_id = ask_question!(app, token, "busy question", None::<&str>);

    for i in 0..12 {
        let req = test::TestRequest::post()
            .uri("/api/comments")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({ "content": format!("answer {}", i), "questionId": question_id }))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/comments?questionId={}&take=9&skip=9", question_id))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn test_unauthenticated_comment_is_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(api::configure_routes),
    )
    .await;

    let (token, _) = register_user!(app, "alice");
    let question_id = ask_question!(app, token, "question", None::<&str>);

    let req = test::TestRequest::post()
        .uri("/api/comments")
        .set_json(json!({ "content": "anonymous", "questionId": question_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
