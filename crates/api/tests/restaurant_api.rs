//! HTTP-level integration tests for the restaurant endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_restaurant, create_user, get, post_json_auth, put_json_auth, token_for};
use serde_json::json;
use sqlx::PgPool;
use tablewait_core::roles::Role;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_creates_restaurant_with_defaults(pool: PgPool) {
    let admin = create_user(&pool, "root", Role::Admin, None).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/restaurants",
        json!({ "name": "Harbor Grill" }),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Harbor Grill");
    assert_eq!(json["data"]["max_capacity"], 50);
    assert_eq!(json["data"]["estimated_wait_time_per_customer"], 15);
    assert_eq!(json["data"]["hours"], json!([]));
    assert_eq!(json["data"]["is_open"], true);

    let id = json["data"]["id"].as_i64().unwrap();
    let fetched = get(app, &format!("/api/v1/restaurants/{id}")).await;
    assert_eq!(fetched.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_restaurant_requires_admin(pool: PgPool) {
    let customer = create_user(&pool, "quin", Role::Customer, None).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/restaurants",
        json!({ "name": "Nope" }),
        &token_for(&customer),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_and_missing_restaurant(pool: PgPool) {
    create_restaurant(&pool, 10, 5).await;
    create_restaurant(&pool, 20, 5).await;
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/restaurants").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    let missing = get(app, "/api/v1/restaurants/987654").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_settings_validation_and_scope(pool: PgPool) {
    let restaurant = create_restaurant(&pool, 10, 5).await;
    let elsewhere = create_restaurant(&pool, 10, 5).await;
    let staff = create_user(&pool, "rex", Role::Staff, Some(restaurant.id)).await;
    let app = common::build_test_app(pool);
    let token = token_for(&staff);

    let zero = put_json_auth(
        app.clone(),
        &format!("/api/v1/restaurants/{}/settings", restaurant.id),
        json!({ "max_capacity": 0 }),
        &token,
    )
    .await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

    let bad_hours = put_json_auth(
        app.clone(),
        &format!("/api/v1/restaurants/{}/settings", restaurant.id),
        json!({ "hours": [{ "day": "Funday", "open": "09:00", "close": "17:00" }] }),
        &token,
    )
    .await;
    assert_eq!(bad_hours.status(), StatusCode::BAD_REQUEST);

    let other = put_json_auth(
        app.clone(),
        &format!("/api/v1/restaurants/{}/settings", elsewhere.id),
        json!({ "max_capacity": 5 }),
        &token,
    )
    .await;
    assert_eq!(other.status(), StatusCode::FORBIDDEN);

    let ok = put_json_auth(
        app,
        &format!("/api/v1/restaurants/{}/settings", restaurant.id),
        json!({
            "max_capacity": 25,
            "hours": [{ "day": "Friday", "open": "17:00", "close": "02:00" }],
            "utc_offset_minutes": 60,
        }),
        &token,
    )
    .await;
    assert_eq!(ok.status(), StatusCode::OK);
    let json = body_json(ok).await;
    assert_eq!(json["data"]["max_capacity"], 25);
    assert_eq!(json["data"]["utc_offset_minutes"], 60);
    assert_eq!(json["data"]["hours"][0]["day"], "Friday");
}
