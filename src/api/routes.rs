//! Route table and handlers for the game API.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use super::error::ApiError;
use super::state::ApiState;
use crate::core::error::AppError;
use crate::core::metrics;
use crate::core::retry::retry;
use crate::game::{Mode, ThreadRng, Wager};
use crate::payments::player_email;
use crate::storage::{get_connection, ledger};
use crate::telegram::notifications::{bet_message, deposit_message, withdrawal_message};

#[derive(Debug, Deserialize)]
pub struct BetRequest {
    pub user_id: i64,
    pub bet_amount: f64,
    pub multiplier: f64,
    pub mode: String,
}

/// Query string of `/deposit` and `/withdraw`
#[derive(Debug, Deserialize)]
pub struct AmountQuery {
    pub user_id: i64,
    pub amount: f64,
}

/// Builds the API router.
///
/// `static_dir`, when given, is served under `/static`.
pub fn router(state: ApiState, static_dir: Option<&str>) -> Router {
    let mut app = Router::new()
        .route("/bet", post(bet_handler))
        .route("/deposit", post(deposit_handler))
        .route("/withdraw", post(withdraw_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler));

    if let Some(dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.layer(CorsLayer::permissive()).with_state(state)
}

/// POST /bet — settles one round.
async fn bet_handler(
    State(state): State<ApiState>,
    payload: Result<Json<BetRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload?;
    let mode: Mode = req.mode.parse()?;
    let wager = Wager::new(req.bet_amount, req.multiplier, mode);

    let receipt = {
        let mut conn = get_connection(&state.db)?;
        ledger::place_bet(&mut conn, req.user_id, &wager, &state.game, &mut ThreadRng)?
    };

    let outcome = receipt.settlement.outcome;
    metrics::BETS_TOTAL.with_label_values(&[mode.as_str(), outcome.as_str()]).inc();
    metrics::STAKED_AMOUNT_TOTAL.inc_by(wager.amount);

    state.notifier.notify(&bet_message(&wager, &receipt)).await;

    Ok(Json(json!({
        "status": "success",
        "outcome": outcome.as_str(),
        "balance": receipt.balance,
        "crash_point": receipt.settlement.crash_point,
    })))
}

/// POST /deposit — opens a Paystack checkout, then credits the balance.
async fn deposit_handler(
    State(state): State<ApiState>,
    query: Result<Query<AmountQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(AmountQuery { user_id, amount }) = query?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::Validation("Amount must be a positive number".to_string()).into());
    }

    let email = player_email(user_id);
    let payments = state.payments.clone();
    let checkout = retry(&state.payment_retry, "paystack", || {
        let payments = payments.clone();
        let email = email.clone();
        async move { payments.initialize(&email, amount).await }
    })
    .await
    .into_result()?;

    let balance = {
        let mut conn = get_connection(&state.db)?;
        ledger::credit_deposit(&mut conn, user_id, amount)?
    };
    metrics::DEPOSITS_TOTAL.inc();
    log::info!("Deposit of {:.2} credited to {}", amount, user_id);

    state
        .notifier
        .notify(&deposit_message(amount, balance, &checkout.authorization_url))
        .await;

    Ok(Json(json!({
        "status": "success",
        "balance": balance,
        "paystack_url": checkout.authorization_url,
    })))
}

/// POST /withdraw — debits the balance if it covers the amount.
async fn withdraw_handler(
    State(state): State<ApiState>,
    query: Result<Query<AmountQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let balance = {
        let mut conn = get_connection(&state.db)?;
        ledger::withdraw(&mut conn, query.user_id, query.amount)?
    };
    metrics::WITHDRAWALS_TOTAL.inc();
    log::info!("Withdrawal of {:.2} debited from {}", query.amount, query.user_id);

    state
        .notifier
        .notify(&withdrawal_message(query.amount, balance))
        .await;

    Ok(Json(json!({ "status": "success", "balance": balance })))
}

/// GET /health — simple health check.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// GET /metrics — Prometheus text format.
async fn metrics_handler() -> Response {
    match metrics::render() {
        Ok(body) => ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response(),
        Err(e) => {
            log::error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
        }
    }
}
