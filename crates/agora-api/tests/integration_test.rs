use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::IntoResponse,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use agora_api::{build_router, config::Config, error::ApiError, state::AppState};
use agora_persist::ForumBuilder;

async fn app() -> Router {
    let forum = ForumBuilder::new().in_memory().build().await.unwrap();
    build_router(Arc::new(AppState::new(Config::in_memory(), forum)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_user(app: &Router, id: &str) {
    let (status, _) = send(
        app,
        Method::PUT,
        &format!("/users/{}", id),
        Some(json!({ "username": id, "name": id.to_uppercase() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

async fn create_thread(app: &Router, author: &str, text: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/threads",
        Some(json!({ "text": text, "author": author })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["thread_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_api_error_response() {
    let error = ApiError::BadRequest("Test error".to_string());
    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_check() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["memory"], "connected");
}

#[tokio::test]
async fn test_feed_with_comments_and_likes() {
    let app = app().await;
    create_user(&app, "alice").await;
    create_user(&app, "bob").await;
    let thread_id = create_thread(&app, "alice", "first post").await;

    let (status, comment) = send(
        &app,
        Method::POST,
        &format!("/threads/{}/comments", thread_id),
        Some(json!({ "text": "nice", "user_id": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["parent_id"], thread_id.as_str());

    let (status, like) = send(
        &app,
        Method::POST,
        &format!("/threads/{}/likes", thread_id),
        Some(json!({ "user_id": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(like["liked"], true);
    assert_eq!(like["likes_label"], "1 like");

    let (status, feed) = send(&app, Method::GET, "/threads?page=1&page_size=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed["is_next"], false);
    let posts = feed["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["author"]["id"], "alice");
    assert_eq!(posts[0]["likes_count"], 1);
    assert_eq!(posts[0]["children"][0]["author"]["id"], "bob");
}

#[tokio::test]
async fn test_get_and_delete_thread() {
    let app = app().await;
    create_user(&app, "alice").await;
    let thread_id = create_thread(&app, "alice", "short lived").await;

    let (status, body) = send(&app, Method::GET, &format!("/threads/{}", thread_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "short lived");
    assert_eq!(body["likes_label"], Value::Null);

    let (status, body) = send(&app, Method::DELETE, &format!("/threads/{}", thread_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_thread_ids"][0], thread_id.as_str());

    let (status, body) = send(&app, Method::GET, &format!("/threads/{}", thread_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Thread not found"));

    let (_, user) = send(&app, Method::GET, "/users/alice", None).await;
    assert!(user["threads"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_thread_validation() {
    let app = app().await;
    create_user(&app, "alice").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/threads",
        Some(json!({ "text": "", "author": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/threads",
        Some(json!({ "text": "hello", "author": "ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_communities_flow() {
    let app = app().await;
    create_user(&app, "alice").await;
    create_user(&app, "bob").await;

    let new_community = json!({
        "id": "rust",
        "username": "rust",
        "name": "Rust",
        "created_by": "alice"
    });
    let (status, _) = send(&app, Method::POST, "/communities", Some(new_community.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, Method::POST, "/communities", Some(new_community)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::POST,
        "/communities/rust/members",
        Some(json!({ "user_id": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"], json!(["alice", "bob"]));

    let (status, thread) = send(
        &app,
        Method::POST,
        "/threads",
        Some(json!({ "text": "in rust", "author": "bob", "community_id": "rust" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::GET, "/communities/rust/threads", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["threads"][0]["thread_id"], thread["thread_id"]);
    assert_eq!(body["threads"][0]["community"]["name"], "Rust");

    let (status, body) = send(&app, Method::DELETE, "/communities/rust/members/bob", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"], json!(["alice"]));

    let (status, body) = send(&app, Method::GET, "/communities", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["communities"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_navigation_endpoint() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/navigation?pathname=/profile/alice&user_id=alice",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let active: Vec<&Value> = body["links"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|link| link["active"] == true)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["route"], "/profile/alice");
}

#[tokio::test]
async fn test_openapi_document() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/threads/{thread_id}"].is_object());
}

#[tokio::test]
async fn test_extractor_rejections_are_json() {
    let app = app().await;
    create_user(&app, "alice").await;

    let (status, body) = send(&app, Method::POST, "/threads", Some(json!({ "author": "alice" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("text"));

    let (status, body) = send(&app, Method::GET, "/threads?page=first", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::GET, "/navigation", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
