//! End-to-end tests driving the real router against an in-memory SQLite pool.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use thoughts_server::auth::AuthManager;
use thoughts_server::config::AppState;
use thoughts_server::store::ThoughtStore;

async fn test_app() -> Router {
    // One connection, so every request sees the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let auth = Arc::new(AuthManager::new(pool.clone()).await.unwrap());
    let thoughts = Arc::new(ThoughtStore::new(pool).await.unwrap());

    thoughts_server::app(AppState { auth, thoughts })
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(Body::empty()).unwrap()
}

async fn read_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Signs up a user and returns (id, access token).
async fn signup(app: &Router, name: &str, email: &str, password: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users/signup",
            None,
            json!({ "name": name, "email": email, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    (
        body["id"].as_str().unwrap().to_string(),
        body["accessToken"].as_str().unwrap().to_string(),
    )
}

/// Posts a thought as the given token and returns its id.
async fn post_thought(app: &Router, token: &str, message: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/thoughts",
            Some(token),
            json!({ "message": message }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    body["response"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn signup_then_login_returns_the_same_token() {
    let app = test_app().await;

    let (id, token) = signup(&app, "Ann", "ann@example.com", "secret").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users/login",
            None,
            json!({ "email": "ann@example.com", "password": "secret" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["userId"], json!(id));
    assert_eq!(body["accessToken"], json!(token));
}

#[tokio::test]
async fn duplicate_email_is_rejected_regardless_of_case() {
    let app = test_app().await;

    signup(&app, "Ann", "ann@example.com", "secret").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users/signup",
            None,
            json!({ "name": "Other", "email": "ANN@Example.COM", "password": "other" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn login_failures_are_not_enumerable() {
    let app = test_app().await;

    signup(&app, "Ann", "ann@example.com", "secret").await;

    let wrong_password = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users/login",
            None,
            json!({ "email": "ann@example.com", "password": "nope" }),
        ))
        .await
        .unwrap();
    let unknown_email = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users/login",
            None,
            json!({ "email": "ghost@example.com", "password": "nope" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let a = read_json(wrong_password).await;
    let b = read_json(unknown_email).await;
    assert_eq!(a["message"], b["message"]);
}

#[tokio::test]
async fn missing_token_is_rejected_with_logged_out_marker() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/thoughts",
            None,
            json!({ "message": "hello world" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = read_json(response).await;
    assert_eq!(body["loggedOut"], json!(true));
}

#[tokio::test]
async fn message_length_is_bounded() {
    let app = test_app().await;
    let (_, token) = signup(&app, "Ann", "ann@example.com", "secret").await;

    for message in ["tiny", &"x".repeat(141)] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/thoughts",
                Some(&token),
                json!({ "message": message }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // Five characters is the lower bound, inclusive.
    post_thought(&app, &token, "hello").await;
}

#[tokio::test]
async fn second_like_by_same_user_is_rejected_and_counts_once() {
    let app = test_app().await;
    let (_, author) = signup(&app, "Ann", "ann@example.com", "secret").await;
    let (_, liker) = signup(&app, "Ben", "ben@example.com", "secret").await;
    let id = post_thought(&app, &author, "a happy little thought").await;

    let first = app
        .clone()
        .oneshot(empty_request(
            "PATCH",
            &format!("/thoughts/{id}/like"),
            Some(&liker),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let body = read_json(first).await;
    assert_eq!(body["response"]["hearts"], json!(1));

    let second = app
        .clone()
        .oneshot(empty_request(
            "PATCH",
            &format!("/thoughts/{id}/like"),
            Some(&liker),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);

    // The failed duplicate must not have moved the counter.
    let response = app
        .clone()
        .oneshot(get(&format!("/thoughts/{id}"), None))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["response"]["hearts"], json!(1));
}

#[tokio::test]
async fn concurrent_likes_by_distinct_users_all_land() {
    let app = test_app().await;
    let (_, author) = signup(&app, "Ann", "ann@example.com", "secret").await;
    let (_, t1) = signup(&app, "Ben", "ben@example.com", "secret").await;
    let (_, t2) = signup(&app, "Cleo", "cleo@example.com", "secret").await;
    let (_, t3) = signup(&app, "Dee", "dee@example.com", "secret").await;
    let id = post_thought(&app, &author, "a very likeable thought").await;

    let uri = format!("/thoughts/{id}/like");
    let (a, b, c) = tokio::join!(
        app.clone().oneshot(empty_request("PATCH", &uri, Some(&t1))),
        app.clone().oneshot(empty_request("PATCH", &uri, Some(&t2))),
        app.clone().oneshot(empty_request("PATCH", &uri, Some(&t3))),
    );
    assert_eq!(a.unwrap().status(), StatusCode::OK);
    assert_eq!(b.unwrap().status(), StatusCode::OK);
    assert_eq!(c.unwrap().status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/thoughts/{id}"), None))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["response"]["hearts"], json!(3));
}

#[tokio::test]
async fn listing_filters_by_minimum_hearts() {
    let app = test_app().await;
    let (_, author) = signup(&app, "Ann", "ann@example.com", "secret").await;
    let (_, liker) = signup(&app, "Ben", "ben@example.com", "secret").await;

    let popular = post_thought(&app, &author, "the popular thought").await;
    post_thought(&app, &author, "the ignored thought").await;

    let response = app
        .clone()
        .oneshot(empty_request(
            "PATCH",
            &format!("/thoughts/{popular}/like"),
            Some(&liker),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/thoughts?minLikes=1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let listed = body["response"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], json!(popular));

    // No thought has two hearts; empty result is a 404 with an empty array.
    let response = app
        .clone()
        .oneshot(get("/thoughts?minLikes=2", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["response"], json!([]));
}

#[tokio::test]
async fn non_numeric_filter_is_a_bad_request() {
    let app = test_app().await;

    for uri in ["/thoughts?hearts=lots", "/thoughts?minLikes=many"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn malformed_and_unknown_ids_are_distinguished() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(get("/thoughts/not-a-uuid", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(get(
            "/thoughts/00000000-0000-4000-8000-000000000000",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_author_can_edit_or_delete() {
    let app = test_app().await;
    let (_, author) = signup(&app, "Ann", "ann@example.com", "secret").await;
    let (_, stranger) = signup(&app, "Ben", "ben@example.com", "secret").await;
    let id = post_thought(&app, &author, "mine and mine alone").await;

    // A stranger's delete reads as "not found", not "forbidden".
    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/thoughts/{id}"),
            Some(&stranger),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/thoughts/{id}/edit"),
            Some(&stranger),
            json!({ "message": "defaced message" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The author still can.
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/thoughts/{id}/edit"),
            Some(&author),
            json!({ "message": "mine, now edited" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["response"]["message"], json!("mine, now edited"));

    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/thoughts/{id}"),
            Some(&author),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/thoughts/{id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn liked_list_starts_empty_and_tracks_likes() {
    let app = test_app().await;
    let (_, author) = signup(&app, "Ann", "ann@example.com", "secret").await;
    let (_, liker) = signup(&app, "Ben", "ben@example.com", "secret").await;

    let response = app
        .clone()
        .oneshot(get("/thoughts/liked", Some(&liker)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["response"], json!([]));

    let id = post_thought(&app, &author, "worth remembering").await;
    let response = app
        .clone()
        .oneshot(empty_request(
            "PATCH",
            &format!("/thoughts/{id}/like"),
            Some(&liker),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/thoughts/liked", Some(&liker)))
        .await
        .unwrap();
    let body = read_json(response).await;
    let liked = body["response"].as_array().unwrap();
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0]["id"], json!(id));

    // The min-hearts filter applies here too.
    let response = app
        .clone()
        .oneshot(get("/thoughts/liked?minLikes=2", Some(&liker)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["response"], json!([]));
}
