//! Tests for the background position reconciler.

mod common;

use std::time::Duration;

use common::{create_restaurant, create_user, token_for};
use sqlx::PgPool;
use tablewait_api::background::position_reconciler;
use tablewait_core::roles::Role;
use tokio_util::sync::CancellationToken;

async fn positions(pool: &PgPool, restaurant_id: i64) -> Vec<(i32, i32)> {
    sqlx::query_as::<_, (i32, i32)>(
        "SELECT position, estimated_wait_time FROM waitlist_entries \
         WHERE restaurant_id = $1 ORDER BY joined_at, id",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
    .unwrap()
}

async fn join(app: axum::Router, restaurant_id: i64, token: &str) {
    let response = common::post_json_auth(
        app,
        &format!("/api/v1/waitlist/join/{restaurant_id}"),
        serde_json::json!({ "party_size": 2 }),
        token,
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_renumber_all_repairs_every_restaurant(pool: PgPool) {
    let first = create_restaurant(&pool, 10, 5).await;
    let second = create_restaurant(&pool, 10, 8).await;
    let a = create_user(&pool, "ada", Role::Customer, None).await;
    let b = create_user(&pool, "bo", Role::Customer, None).await;
    let app = common::build_test_app(pool.clone());

    join(app.clone(), first.id, &token_for(&a)).await;
    join(app.clone(), first.id, &token_for(&b)).await;
    join(app, second.id, &token_for(&a)).await;

    sqlx::query("UPDATE waitlist_entries SET position = position + 3")
        .execute(&pool)
        .await
        .unwrap();

    let state = common::test_state(pool.clone());
    let written = state.queue().renumber_all().await.unwrap();
    assert_eq!(written, 3);
    assert_eq!(positions(&pool, first.id).await, vec![(1, 5), (2, 10)]);
    assert_eq!(positions(&pool, second.id).await, vec![(1, 8)]);

    assert_eq!(state.queue().renumber_all().await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reconciler_runs_and_stops_on_cancel(pool: PgPool) {
    let restaurant = create_restaurant(&pool, 10, 5).await;
    let customer = create_user(&pool, "cy", Role::Customer, None).await;
    let app = common::build_test_app(pool.clone());
    join(app, restaurant.id, &token_for(&customer)).await;

    sqlx::query("UPDATE waitlist_entries SET position = 4, estimated_wait_time = 20")
        .execute(&pool)
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(position_reconciler::run(
        pool.clone(),
        Duration::from_millis(50),
        cancel.clone(),
    ));

    // The first tick fires immediately.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(positions(&pool, restaurant.id).await, vec![(1, 5)]);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("reconciler should stop after cancel")
        .unwrap();
}
