//! Integration tests for the HTTP API
//!
//! Run with: cargo test --test api_test

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use cashmachine::api::router;
use cashmachine::game::{Mode, RigOverride};
use cashmachine::storage::{db, get_connection, ledger};
use common::TestEnvironment;

const USER: i64 = 7_751_724_771;

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 100_000).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn bet(user_id: i64, amount: f64, multiplier: f64, mode: &str) -> Request<Body> {
    let payload = json!({
        "user_id": user_id,
        "bet_amount": amount,
        "multiplier": multiplier,
        "mode": mode,
    });
    Request::builder()
        .method("POST")
        .uri("/bet")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
}

fn fund(env: &TestEnvironment, amount: f64) {
    let mut conn = get_connection(&env.pool).unwrap();
    ledger::credit_deposit(&mut conn, USER, amount).unwrap();
}

fn balance(env: &TestEnvironment) -> f64 {
    let conn = get_connection(&env.pool).unwrap();
    db::get_balance(&conn, USER).unwrap()
}

#[tokio::test]
async fn test_tap_bet_pays_configured_rate() {
    let env = TestEnvironment::new(0);
    fund(&env, 100.0);

    let (status, body) = send(router(env.state(), None), bet(USER, 10.0, 1.5, "tap")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["outcome"], "win");
    assert_eq!(body["balance"].as_f64(), Some(110.0));
    assert_eq!(body["crash_point"].as_f64(), Some(1.5));
    assert_eq!(balance(&env), 110.0);

    let messages = env.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("🎮 Tap Action\nAmount: $10.00 @ 1.5x\nOutcome: win"));
    assert!(messages[0].contains("Balance: $110.00"));
}

#[tokio::test]
async fn test_rigged_aviation_loss() {
    let env = TestEnvironment::new(0);
    fund(&env, 100.0);
    {
        let conn = get_connection(&env.pool).unwrap();
        db::set_rig_flag(&conn, RigOverride::WinRate(0.0)).unwrap();
    }

    let (status, body) = send(router(env.state(), None), bet(USER, 10.0, 2.0, "aviation")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "lose");
    assert_eq!(body["balance"].as_f64(), Some(91.0));
    let crash_point = body["crash_point"].as_f64().unwrap();
    assert!((1.0..=1.9).contains(&crash_point));

    // The flag was consumed
    let conn = get_connection(&env.pool).unwrap();
    assert_eq!(db::peek_rig_flag(&conn, Mode::Aviation).unwrap(), None);
    assert_eq!(db::recent_bets(&conn, USER, 10).unwrap().len(), 1);
}

#[tokio::test]
async fn test_rigged_aviation_win() {
    let env = TestEnvironment::new(0);
    fund(&env, 100.0);
    {
        let conn = get_connection(&env.pool).unwrap();
        db::set_rig_flag(&conn, RigOverride::WinRate(1.0)).unwrap();
    }

    let (status, body) = send(router(env.state(), None), bet(USER, 10.0, 2.0, "aviation")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "win");
    // 10 * 1 * 0.9 = 9 to the player, -0.9 to the house
    let balance = body["balance"].as_f64().unwrap();
    assert!((balance - 108.1).abs() < 1e-9);
    assert!(body["crash_point"].as_f64().unwrap() >= 2.1);
}

#[tokio::test]
async fn test_invalid_mode_is_rejected() {
    let env = TestEnvironment::new(0);
    fund(&env, 100.0);

    let (status, body) = send(router(env.state(), None), bet(USER, 10.0, 2.0, "roulette")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid mode");
    assert_eq!(balance(&env), 100.0);
    assert!(env.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_bet_over_balance_is_rejected() {
    let env = TestEnvironment::new(0);
    fund(&env, 5.0);

    let (status, body) = send(router(env.state(), None), bet(USER, 10.0, 2.0, "tap")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Insufficient balance");
    assert_eq!(balance(&env), 5.0);
}

#[tokio::test]
async fn test_bet_with_bad_multiplier_is_rejected() {
    let env = TestEnvironment::new(0);
    fund(&env, 100.0);

    let (status, body) = send(router(env.state(), None), bet(USER, 10.0, 0.5, "aviation")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Multiplier must be at least 1.0");
}

#[tokio::test]
async fn test_deposit_retries_then_credits() {
    let env = TestEnvironment::new(2);

    let uri = format!("/deposit?user_id={}&amount=25.5", USER);
    let (status, body) = send(router(env.state(), None), post(&uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["balance"].as_f64(), Some(25.5));
    assert_eq!(
        body["paystack_url"],
        format!("https://checkout.example.com/player_{}@example.com", USER)
    );
    assert_eq!(env.gateway.calls(), 3);

    let messages = env.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("💸 Deposit\nAmount: $25.50\nNew Balance: $25.50\nPaystack URL: "));
}

#[tokio::test]
async fn test_deposit_fails_after_three_attempts() {
    let env = TestEnvironment::new(3);

    let uri = format!("/deposit?user_id={}&amount=10", USER);
    let (status, body) = send(router(env.state(), None), post(&uri)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("gateway unavailable"));
    assert_eq!(env.gateway.calls(), 3);
    assert_eq!(balance(&env), 0.0);
    assert!(env.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_deposit_rejects_non_positive_amount() {
    let env = TestEnvironment::new(0);

    let uri = format!("/deposit?user_id={}&amount=-3", USER);
    let (status, _) = send(router(env.state(), None), post(&uri)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(env.gateway.calls(), 0);
}

#[tokio::test]
async fn test_bet_with_missing_field_answers_json_detail() {
    let env = TestEnvironment::new(0);
    fund(&env, 100.0);

    let request = Request::builder()
        .method("POST")
        .uri("/bet")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "user_id": USER }).to_string()))
        .unwrap();
    let (status, body) = send(router(env.state(), None), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("bet_amount"), "{}", detail);
    assert_eq!(balance(&env), 100.0);
}

#[tokio::test]
async fn test_non_numeric_amount_answers_json_detail() {
    let env = TestEnvironment::new(0);
    fund(&env, 50.0);

    let uri = format!("/withdraw?user_id={}&amount=abc", USER);
    let (status, body) = send(router(env.state(), None), post(&uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
    assert_eq!(balance(&env), 50.0);

    let uri = format!("/deposit?user_id={}", USER);
    let (status, body) = send(router(env.state(), None), post(&uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("amount"));
    assert_eq!(env.gateway.calls(), 0);
}

#[tokio::test]
async fn test_withdraw() {
    let env = TestEnvironment::new(0);
    fund(&env, 50.0);

    let uri = format!("/withdraw?user_id={}&amount=20", USER);
    let (status, body) = send(router(env.state(), None), post(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "balance": 30.0 }));

    let uri = format!("/withdraw?user_id={}&amount=40", USER);
    let (status, body) = send(router(env.state(), None), post(&uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Insufficient balance");
    assert_eq!(balance(&env), 30.0);

    let messages = env.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("💳 Withdrawal\nAmount: $20.00\nNew Balance: $30.00"));
}

#[tokio::test]
async fn test_health_and_metrics() {
    let env = TestEnvironment::new(0);
    fund(&env, 20.0);
    let app = router(env.state(), None);

    let (status, body) = send(app.clone(), bet(USER, 1.0, 1.0, "tap")).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (status, body) = send(app.clone(), Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 100_000).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("cashmachine_bets_total"));
}

#[tokio::test]
async fn test_static_files_are_served() {
    let env = TestEnvironment::new(0);
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>play</h1>").unwrap();

    let app = router(env.state(), dir.path().to_str());
    let response = app
        .oneshot(Request::get("/static/index.html").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 100_000).await.unwrap();
    assert_eq!(&bytes[..], b"<h1>play</h1>");
}
