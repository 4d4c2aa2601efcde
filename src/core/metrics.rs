//! Prometheus counters for the cash machine
//!
//! Everything registers in the default registry so the API can expose it at
//! `/metrics` with `prometheus::gather()`.

use once_cell::sync::Lazy;
use prometheus::{register_counter, register_counter_vec, Counter, CounterVec};

/// Settled bets
/// Labels: mode (aviation/tap), outcome (win/lose)
pub static BETS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "cashmachine_bets_total",
        "Total number of settled bets",
        &["mode", "outcome"]
    )
    .expect("register cashmachine_bets_total")
});

/// Amount staked across all bets
pub static STAKED_AMOUNT_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!("cashmachine_staked_amount_total", "Sum of all bet amounts")
        .expect("register cashmachine_staked_amount_total")
});

/// Completed deposits
pub static DEPOSITS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!("cashmachine_deposits_total", "Total number of credited deposits")
        .expect("register cashmachine_deposits_total")
});

/// Completed withdrawals
pub static WITHDRAWALS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!("cashmachine_withdrawals_total", "Total number of debited withdrawals")
        .expect("register cashmachine_withdrawals_total")
});

/// Bot commands handled
/// Labels: command
pub static COMMANDS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "cashmachine_commands_total",
        "Total number of bot commands handled",
        &["command"]
    )
    .expect("register cashmachine_commands_total")
});

/// Retries performed
/// Labels: operation (notification/paystack)
pub static RETRIES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "cashmachine_retries_total",
        "Total number of retried attempts",
        &["operation"]
    )
    .expect("register cashmachine_retries_total")
});

/// Operator notifications dropped after every attempt failed
pub static NOTIFICATION_FAILURES_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "cashmachine_notification_failures_total",
        "Notifications that could not be delivered"
    )
    .expect("register cashmachine_notification_failures_total")
});

/// Forces registration of every metric so they show up (at zero) on the
/// first scrape.
pub fn init_metrics() {
    Lazy::force(&BETS_TOTAL);
    Lazy::force(&STAKED_AMOUNT_TOTAL);
    Lazy::force(&DEPOSITS_TOTAL);
    Lazy::force(&WITHDRAWALS_TOTAL);
    Lazy::force(&COMMANDS_TOTAL);
    Lazy::force(&RETRIES_TOTAL);
    Lazy::force(&NOTIFICATION_FAILURES_TOTAL);
    log::info!("Metrics registry initialized");
}

/// Encodes the default registry in the Prometheus text format.
pub fn render() -> Result<String, prometheus::Error> {
    use prometheus::{Encoder, TextEncoder};

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
