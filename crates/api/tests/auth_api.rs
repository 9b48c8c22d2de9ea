//! HTTP-level integration tests for auth and admin endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_restaurant, create_user, get, get_auth, post_json, post_json_auth,
    token_for, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;
use tablewait_api::auth::jwt::validate_token;
use tablewait_core::roles::Role;

// ---------------------------------------------------------------------------
// Register / login / me
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_creates_customer_and_returns_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({
            "name": "Greta",
            "email": "Greta@Example.com",
            "phone": "555-0199",
            "password": "long-enough-pw",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["role"], "customer");
    assert_eq!(json["data"]["user"]["email"], "greta@example.com");
    assert!(json["data"]["user"].get("password_hash").is_none());

    let token = json["data"]["access_token"].as_str().unwrap();
    let claims = validate_token(token, &common::test_jwt_config()).unwrap();
    assert_eq!(claims.role, "customer");
    assert_eq!(claims.sub, json["data"]["user"]["id"].as_i64().unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_rejects_duplicate_email(pool: PgPool) {
    create_user(&pool, "hugo", Role::Customer, None).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({ "name": "Hugo Two", "email": "HUGO@test.com", "password": "long-enough-pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_validates_input(pool: PgPool) {
    let app = common::build_test_app(pool);

    let bad_email = post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({ "name": "Ida", "email": "not-an-email", "password": "long-enough-pw" }),
    )
    .await;
    assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(bad_email).await["code"], "VALIDATION_ERROR");

    let short_password = post_json(
        app,
        "/api/v1/auth/register",
        json!({ "name": "Ida", "email": "ida@test.com", "password": "short" }),
    )
    .await;
    assert_eq!(short_password.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success_and_wrong_password(pool: PgPool) {
    let user = create_user(&pool, "jade", Role::Customer, None).await;
    let app = common::build_test_app(pool);

    let ok = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "email": "jade@test.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(ok.status(), StatusCode::OK);
    let json = body_json(ok).await;
    assert!(json["data"]["access_token"].is_string());
    assert_eq!(json["data"]["expires_in"], 15 * 60);
    assert_eq!(json["data"]["user"]["id"], user.id);

    let wrong = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "email": "jade@test.com", "password": "not-the-password" }),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": "nobody@test.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_of_deactivated_account_is_forbidden(pool: PgPool) {
    let user = create_user(&pool, "kurt", Role::Customer, None).await;
    sqlx::query("UPDATE users SET is_active = false WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": "kurt@test.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_staff_token_carries_restaurant(pool: PgPool) {
    let restaurant = create_restaurant(&pool, 10, 5).await;
    create_user(&pool, "lena", Role::Staff, Some(restaurant.id)).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": "lena@test.com", "password": TEST_PASSWORD }),
    )
    .await;
    let json = body_json(response).await;
    let token = json["data"]["access_token"].as_str().unwrap();
    let claims = validate_token(token, &common::test_jwt_config()).unwrap();
    assert_eq!(claims.role, "staff");
    assert_eq!(claims.restaurant_id, Some(restaurant.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me_requires_token(pool: PgPool) {
    let user = create_user(&pool, "mia", Role::Customer, None).await;
    let app = common::build_test_app(pool);

    let anonymous = get(app.clone(), "/api/v1/auth/me").await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let garbage = get_auth(app.clone(), "/api/v1/auth/me", "not.a.jwt").await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/api/v1/auth/me", &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "mia");
}

// ---------------------------------------------------------------------------
// Admin user management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_creates_staff_for_restaurant(pool: PgPool) {
    let restaurant = create_restaurant(&pool, 10, 5).await;
    let admin = create_user(&pool, "root", Role::Admin, None).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/admin/users",
        json!({
            "name": "Ned",
            "email": "ned@test.com",
            "password": "long-enough-pw",
            "role": "staff",
            "restaurant_id": restaurant.id,
        }),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "staff");
    assert_eq!(json["data"]["restaurant_id"], restaurant.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_endpoint_rejects_non_admins_and_customers(pool: PgPool) {
    let restaurant = create_restaurant(&pool, 10, 5).await;
    let admin = create_user(&pool, "root", Role::Admin, None).await;
    let staff = create_user(&pool, "olga", Role::Staff, Some(restaurant.id)).await;
    let app = common::build_test_app(pool);

    let body = json!({
        "name": "Pia",
        "email": "pia@test.com",
        "password": "long-enough-pw",
        "role": "staff",
    });

    let as_staff =
        post_json_auth(app.clone(), "/api/v1/admin/users", body.clone(), &token_for(&staff)).await;
    assert_eq!(as_staff.status(), StatusCode::FORBIDDEN);

    let mut customer_body = body;
    customer_body["role"] = json!("customer");
    let customer_role =
        post_json_auth(app, "/api/v1/admin/users", customer_body, &token_for(&admin)).await;
    assert_eq!(customer_role.status(), StatusCode::BAD_REQUEST);
}
