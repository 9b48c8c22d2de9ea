#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use tablewait_api::auth::jwt::{generate_access_token, JwtConfig};
use tablewait_api::auth::password::hash_password;
use tablewait_api::config::ServerConfig;
use tablewait_api::router::build_app_router;
use tablewait_api::state::AppState;
use tablewait_core::hours::DayHours;
use tablewait_core::roles::Role;
use tablewait_core::types::DbId;
use tablewait_db::models::restaurant::{CreateRestaurant, Restaurant};
use tablewait_db::models::user::{CreateUser, User};
use tablewait_db::repositories::{RestaurantRepo, UserRepo};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-of-sufficient-length".to_string(),
        access_token_expiry_mins: 15,
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3001".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        reconcile_interval_secs: 60,
        jwt: test_jwt_config(),
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState {
        pool,
        config: Arc::new(test_config()),
    }
}

/// Full application router over `pool`, with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    build_app_router(test_state(pool), &config)
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

pub async fn create_restaurant(pool: &PgPool, max_capacity: i32, per_customer: i32) -> Restaurant {
    create_restaurant_with_hours(pool, max_capacity, per_customer, Vec::new()).await
}

pub async fn create_restaurant_with_hours(
    pool: &PgPool,
    max_capacity: i32,
    per_customer: i32,
    hours: Vec<DayHours>,
) -> Restaurant {
    let input = CreateRestaurant {
        name: "Test Bistro".to_string(),
        address: None,
        phone: None,
        max_capacity: Some(max_capacity),
        estimated_wait_time_per_customer: Some(per_customer),
        hours: Some(hours),
        utc_offset_minutes: Some(0),
    };
    RestaurantRepo::create(pool, &input)
        .await
        .expect("restaurant creation should succeed")
}

pub async fn create_user(
    pool: &PgPool,
    name: &str,
    role: Role,
    restaurant_id: Option<DbId>,
) -> User {
    let input = CreateUser {
        name: name.to_string(),
        email: format!("{name}@test.com"),
        phone: Some("555-0100".to_string()),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role_id: role.id(),
        restaurant_id,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Mint an access token for `user` without going through the login endpoint.
pub fn token_for(user: &User) -> String {
    let role = user.role().expect("seeded user has a known role");
    generate_access_token(user.id, role, user.restaurant_id, &test_jwt_config())
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn delete_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), Some(body)).await
}
